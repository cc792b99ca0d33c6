use anyhow::Result;
use colored::Colorize;
use joi_energy::config::{self, Config};
use std::path::Path;
use tracing::info;

/// Execute the test command
///
/// This validates the configuration file without starting the server
pub fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Testing configuration...".yellow());
    info!("Loading and validating configuration");

    let cfg = config::load_config(&config_path.to_string_lossy())?;

    println!("{}", "✓ Configuration test successful".green());
    println!();
    print_summary(&cfg);

    info!("Configuration validation completed successfully");
    Ok(())
}

fn print_summary(cfg: &Config) {
    println!("{}", "Configuration Summary:".bold());
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "Log Level".cyan(), cfg.server.log_level);
    println!("  {}: {}", "Log Format".cyan(), cfg.server.log_format);
    println!();

    println!("  {}: {}", "Price Plans".cyan(), cfg.price_plans.len());
    for (idx, plan) in cfg.price_plans.iter().enumerate() {
        println!(
            "    {}. {} ({}) rate {}, {} peak multipliers",
            idx + 1,
            plan.id,
            plan.supplier,
            plan.unit_rate,
            plan.peak_multipliers.len()
        );
    }
    println!();

    println!("  {}: {}", "Accounts".cyan(), cfg.accounts.len());
    for account in &cfg.accounts {
        println!("    {} → {}", account.smart_meter_id, account.price_plan_id);
    }
    println!();

    println!(
        "  {}: {} readings per meter, every {}s",
        "Seed".cyan(),
        cfg.seed.readings_per_meter,
        cfg.seed.reading_interval_seconds
    );

    println!("  {}: {}", "Metrics".cyan(), if cfg.metrics.enabled {
        "enabled".green()
    } else {
        "disabled".red()
    });
    if cfg.metrics.enabled {
        println!("    Endpoint: {}", cfg.metrics.endpoint);
    }
}
