use anyhow::Result;
use colored::*;
use resource_factory_core::manager::ResourceFactoryManager;
use tracing::info;

pub fn execute(manager: &ResourceFactoryManager, source_sets: &[String]) -> Result<()> {
    let results = manager
        .generate(source_sets)
        .map_err(|e| anyhow::anyhow!("Failed to generate resources: {}", e))?;

    for result in results {
        info!(
            "Wrote {} file(s) for source set '{}'",
            result.files.len(),
            result.source_set
        );
        println!(
            "┌─ {} {}",
            "Generated".bold(),
            result.source_set.cyan().bold()
        );
        println!(
            "└─ {} {}",
            "Output:".bright_black(),
            result.output_dir.display()
        );
        for file in &result.files {
            println!("   {} {}", "✓".green(), file.display());
        }
    }

    Ok(())
}
