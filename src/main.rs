//! unitsmith CLI entry point.

use clap::Parser;

use unitsmith::cli::commands::{generate, init};
use unitsmith::cli::{Cli, Commands};
use unitsmith::domain::models::GenerationTarget;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init { force } => init::execute(force, cli.json),
        Commands::Method { class, method } => {
            let target = GenerationTarget::Method { class_name: class, method };
            generate::execute(target, config, cli.json).await
        }
        Commands::Class { class } => {
            generate::execute(GenerationTarget::Class { class_name: class }, config, cli.json).await
        }
        Commands::Project => generate::execute(GenerationTarget::Project, config, cli.json).await,
    };

    if let Err(err) = result {
        unitsmith::cli::handle_error(err, cli.json);
    }
}
