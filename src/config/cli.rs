use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the devscribe binary.
#[derive(Debug, Parser)]
#[command(name = "devscribe", version, about = "DevScribe blog front-end")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "DEVSCRIBE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public HTTP server.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the CMS project id.
    #[arg(long = "cms-project-id", value_name = "ID")]
    pub cms_project_id: Option<String>,

    /// Override the CMS dataset.
    #[arg(long = "cms-dataset", value_name = "NAME")]
    pub cms_dataset: Option<String>,

    /// Override the CMS API version (e.g. 2024-01-01).
    #[arg(long = "cms-api-version", value_name = "DATE")]
    pub cms_api_version: Option<String>,

    /// Toggle reads through the CMS CDN.
    #[arg(
        long = "cms-use-cdn",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cms_use_cdn: Option<bool>,

    /// Write token used for comment submissions.
    #[arg(
        long = "cms-token",
        env = "DEVSCRIBE_CMS_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true
    )]
    pub cms_token: Option<String>,

    /// Override the CMS request timeout.
    #[arg(long = "cms-timeout-seconds", value_name = "SECONDS")]
    pub cms_timeout_seconds: Option<u64>,

    /// Toggle the response cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override how long cached pages are served before refetching.
    #[arg(long = "cache-revalidate-seconds", value_name = "SECONDS")]
    pub cache_revalidate_seconds: Option<u64>,

    /// Override the response cache capacity.
    #[arg(long = "cache-max-entries", value_name = "COUNT")]
    pub cache_max_entries: Option<u64>,

    /// Override the public site URL used for canonical and Open Graph links.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub site_public_url: Option<String>,
}
