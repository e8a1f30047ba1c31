mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use libmapmark_core::MapError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays parseable
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run_command(&cli).await {
        output::output_error(&cli, &e);
        std::process::exit(e.exit_code());
    }
}

async fn run_command(cli: &Cli) -> Result<(), MapError> {
    match &cli.command {
        Command::Add { x, y, note, color } => commands::add::run(cli, *x, *y, note, color).await,
        Command::Delete { id } => commands::delete::run(cli, id).await,
        Command::List { at } => commands::list::run(cli, *at).await,
        Command::History => commands::history::run(cli).await,
        Command::Pull => commands::pull::run(cli).await,
        Command::Push => commands::push::run(cli).await,
    }
}
