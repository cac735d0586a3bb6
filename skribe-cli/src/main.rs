use clap::Parser;
use logger_redacted::init_tracing;
use skribe_cli::cli::{Cli, Command};
use skribe_cli::commands::{print_completions, App};
use skribe_client::ClientConfig;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Completions need neither configuration nor a backend
    if let Command::Completions { shell } = cli.command {
        print_completions(shell);
        return Ok(());
    }

    let config = ClientConfig::load(cli.config.as_deref(), cli.overrides())?;
    init_tracing(&config.logger_config())?;
    debug!(api_url = %config.api_url, ws_url = %config.ws_url, "Configuration loaded");

    let app = App::new(config, cli.wait_timeout())?;
    app.run(cli.command).await
}
