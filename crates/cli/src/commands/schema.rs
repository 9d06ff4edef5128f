use anyhow::Result;
use resource_factory_core::configs::build::BuildConfig;

pub fn execute() -> Result<()> {
    let schema = schemars::schema_for!(BuildConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
