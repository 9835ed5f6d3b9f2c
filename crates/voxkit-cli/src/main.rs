//! CLI entry point - the composition root.

use clap::Parser;

use voxkit_cli::{Cli, Commands, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let paths = voxkit_cli::asset_paths(cli.data_dir.as_deref())?;
    let _log_guard = voxkit_cli::logging::init(&paths, cli.verbose);

    if let Commands::Paths = command {
        handlers::paths::execute(&paths);
        return Ok(());
    }

    let voxkit = voxkit_cli::build_orchestrator(paths)?;
    let result = handlers::dispatch(&voxkit, command).await;
    voxkit.shutdown().await;
    result
}
