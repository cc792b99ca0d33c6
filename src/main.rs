use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use joi_energy::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    match args.get_command() {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            init_tracing("warn", "text");
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => {
                init_tracing("warn", "text");
                commands::config::show(&args.config)?;
            }
        },
        cli::Commands::Version => {
            println!("JOI Energy v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
