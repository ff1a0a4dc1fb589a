use clap::Parser;

/// Relay GitHub webhooks to Backlog issues
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Args {
    /// Telemetry URL (disabled as default)
    #[clap(long)]
    pub telemetry_url: Option<String>,

    /// Webhook secret (disabled as default)
    #[clap(long)]
    pub webhook_secret: Option<String>,

    /// Backlog configuration file (./config.yaml as default)
    #[clap(long)]
    pub config_path: Option<String>,

    /// Backlog API root URL (https://<spaceKey>.<domain> as default)
    #[clap(long)]
    pub backlog_api_url: Option<String>,

    /// Timeout for all Backlog calls of one webhook, in seconds (30 as default)
    #[clap(long)]
    pub dispatch_timeout: Option<u64>,

    /// Command
    #[clap(subcommand)]
    pub command: SubCommand,
}

#[derive(Parser, Debug)]
pub enum SubCommand {
    /// Run server
    Serve(ServeCommand),
    /// Load the Backlog configuration and show how it will be used
    CheckConfig,
}

#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Bind IP (127.0.0.1:3000 as default)
    #[clap(long)]
    pub bind_ip: Option<String>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::{Args, SubCommand};

    #[test]
    fn test_parse_serve() {
        let args = Args::parse_from([
            "backlogrelay",
            "--dispatch-timeout",
            "5",
            "serve",
            "--bind-ip",
            "0.0.0.0:8080",
        ]);

        assert_eq!(args.dispatch_timeout, Some(5));
        assert_matches!(args.command, SubCommand::Serve(s) if s.bind_ip.as_deref() == Some("0.0.0.0:8080"));
    }

    #[test]
    fn test_parse_check_config() {
        let args = Args::parse_from(["backlogrelay", "--config-path", "conf.yaml", "check-config"]);

        assert_eq!(args.config_path.as_deref(), Some("conf.yaml"));
        assert_matches!(args.command, SubCommand::CheckConfig);
    }
}
