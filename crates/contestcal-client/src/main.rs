//! contestcal CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use contestcal_client::App;
use contestcal_client::cli::{AuthAction, Cli, Command, ConfigAction};
use contestcal_client::commands;
use contestcal_client::config::ClientConfig;
use contestcal_client::error::ClientResult;
use contestcal_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = match cli.command {
        Some(Command::Daemon) if !cli.debug => TracingConfig::daemon(),
        _ => TracingConfig::cli(cli.debug),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    // Config commands must work even when the rest of the setup would fail.
    if let Some(Command::Config { action }) = &cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        };
    }

    config.validate()?;
    let timezone = config.timezone(cli.timezone.as_deref())?;
    let app = App::build(&config, timezone, cli.browser_flow()).await?;

    match cli.command {
        None => commands::contests::list(&app, false, cli.json).await,
        Some(Command::List { refresh }) => commands::contests::list(&app, refresh, cli.json).await,
        Some(Command::Refresh) => commands::contests::list(&app, true, cli.json).await,
        Some(Command::Add { id }) => commands::contests::add(&app, id, cli.json).await,
        Some(Command::Auth { action }) => match action {
            AuthAction::Login { force, .. } => commands::auth::login(&app, force).await,
            AuthAction::Logout => commands::auth::logout(&app).await,
            AuthAction::Status => commands::auth::status(&app, cli.json).await,
        },
        Some(Command::Daemon) => commands::daemon::run(&app).await,
        Some(Command::Config { .. }) => Ok(()),
    }
}
