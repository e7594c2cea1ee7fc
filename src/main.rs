use anyhow::Context as _;
use clap::Parser;
use secportal::cli::{Cli, Context};
use secportal::output;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::open(&cli).context("failed to open the portal store")?;
    cli.command.execute(&ctx).await?;
    Ok(())
}

/// Log to stderr so report output on stdout stays clean.
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "secportal=debug"
    } else if quiet {
        "secportal=warn"
    } else {
        "secportal=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
