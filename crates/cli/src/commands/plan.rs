use anyhow::Result;
use colored::*;
use resource_factory_core::manager::ResourceFactoryManager;
use tracing::info;

pub fn execute(manager: &ResourceFactoryManager) -> Result<()> {
    let plans = manager
        .plan()
        .map_err(|e| anyhow::anyhow!("Failed to plan source sets: {}", e))?;

    info!("Planned {} source set(s)", plans.len());
    if plans.is_empty() {
        println!("  {}", "No source sets configured".dimmed());
        return Ok(());
    }

    for plan in plans {
        println!(
            "{} {} {}",
            "Source set".bold(),
            plan.name.cyan().bold(),
            format!("-> {}", plan.output_dir.display()).dimmed()
        );
        if plan.factories.is_empty() {
            println!("  {}", "No factories".dimmed());
        }
        for (i, factory) in plan.factories.iter().enumerate() {
            println!("  {}. {}", i, factory);
        }
    }

    Ok(())
}
