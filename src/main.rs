use std::time::Duration;

use clap::Parser;

use backlogrelay::backends::backlog;
use backlogrelay::cmdargs::{Args, ServeCommand, SubCommand};
use backlogrelay::config::{BacklogConfig, Config, ConfigError};
use backlogrelay::http::start_server;
use backlogrelay::logging::TracingSetup;
use backlogrelay::relay::TicketPattern;
use backlogrelay::service::ServiceHandler;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> color_eyre::Result<()> {
    dotenv::dotenv().ok();
    color_eyre::install().ok();

    let args = Args::parse();
    let config = build_configuration(&args)?;

    TracingSetup::with_setup(config, |mut config| async move {
        match args.command {
            SubCommand::Serve(serve_args) => {
                apply_server_configuration(&mut config, &serve_args)?;
                let services = ServiceHandler::new_defaults(&config)?;
                if services.backlog().is_none() {
                    tracing::warn!(
                        path = %config.config_path().display(),
                        "Backlog is not configured, webhooks will be refused"
                    );
                }

                start_server(config, services).await?
            }
            SubCommand::CheckConfig => check_configuration(&config)?,
        }

        Ok(())
    })
    .await
}

fn build_configuration(args: &Args) -> Result<Config, ConfigError> {
    let mut config = Config::from_env()?;

    if let Some(t) = &args.telemetry_url {
        config.set_telemetry_url(t.clone());
    }

    if let Some(s) = &args.webhook_secret {
        config.set_webhook_secret(s);
    }

    if let Some(p) = &args.config_path {
        config.set_config_path(p);
    }

    if let Some(u) = &args.backlog_api_url {
        config.set_backlog_api_url(u);
    }

    if let Some(t) = args.dispatch_timeout {
        config.set_dispatch_timeout(Duration::from_secs(t));
    }

    Ok(config)
}

fn apply_server_configuration(
    config: &mut Config,
    args: &ServeCommand,
) -> Result<(), ConfigError> {
    if let Some(m) = &args.bind_ip {
        config.set_bind_ip(m);
    }

    config.validate_configuration()
}

fn check_configuration(config: &Config) -> color_eyre::Result<()> {
    let backlog_config = BacklogConfig::load(config.config_path())?;
    let pattern = TicketPattern::new(
        &backlog_config.project_key,
        backlog_config.require_hyphen_in_ticket_id,
    )?;
    let client = backlog::Client::from_config(&backlog_config, config.backlog_api_url())?;

    println!("Configuration file: {}", config.config_path().display());
    println!("Backlog API: {}", client.api_url());
    println!("Ticket pattern: {}", pattern.as_str());
    println!("Custom field: customField_{}", backlog_config.custom_field_id);
    println!(
        "Commits notified: {}",
        if backlog_config.notify_on_all_commits {
            "all (author)"
        } else {
            "last (committer)"
        }
    );
    println!(
        "Pull requests: {}",
        if backlog_config.subscribe_pull_requests {
            "notified"
        } else {
            "ignored"
        }
    );

    Ok(())
}
