//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroUsize, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::{CliArgs, Command, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "devscribe";
const ENV_PREFIX: &str = "DEVSCRIBE";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_CMS_DATASET: &str = "production";
const DEFAULT_CMS_API_VERSION: &str = "2024-01-01";
const DEFAULT_CMS_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_REVALIDATE_SECS: u64 = 60;
const DEFAULT_CACHE_MAX_ENTRIES: u64 = 200;
const DEFAULT_SITE_TITLE: &str = "Dev Scribe - A blog for developers";
const DEFAULT_SITE_DESCRIPTION: &str = "A blog for developers by developers!";
const DEFAULT_SITE_NAME: &str = "DevScribe";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub cms: CmsSettings,
    pub cache: CacheSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct CmsSettings {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
    pub timeout: Duration,
    /// Replaces the derived `https://{project}.api.sanity.io` host, mainly for tests.
    pub api_base_url: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub revalidate: Duration,
    pub max_entries: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
    pub site_name: String,
    /// Absolute base URL without a trailing slash.
    pub public_url: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    cms: RawCmsSettings,
    cache: RawCacheSettings,
    site: RawSiteSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(project_id) = overrides.cms_project_id.as_ref() {
            self.cms.project_id = Some(project_id.clone());
        }
        if let Some(dataset) = overrides.cms_dataset.as_ref() {
            self.cms.dataset = Some(dataset.clone());
        }
        if let Some(version) = overrides.cms_api_version.as_ref() {
            self.cms.api_version = Some(version.clone());
        }
        if let Some(use_cdn) = overrides.cms_use_cdn {
            self.cms.use_cdn = Some(use_cdn);
        }
        if let Some(token) = overrides.cms_token.as_ref() {
            self.cms.token = Some(token.clone());
        }
        if let Some(seconds) = overrides.cms_timeout_seconds {
            self.cms.timeout_seconds = Some(seconds);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(seconds) = overrides.cache_revalidate_seconds {
            self.cache.revalidate_seconds = Some(seconds);
        }
        if let Some(max) = overrides.cache_max_entries {
            self.cache.max_entries = Some(max);
        }
        if let Some(url) = overrides.site_public_url.as_ref() {
            self.site.public_url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            cms,
            cache,
            site,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            cms: build_cms_settings(cms)?,
            cache: build_cache_settings(cache)?,
            site: build_site_settings(site)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.host", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_cms_settings(cms: RawCmsSettings) -> Result<CmsSettings, LoadError> {
    let project_id = non_empty(cms.project_id)
        .ok_or_else(|| LoadError::invalid("cms.project_id", "must be set"))?;
    if !is_identifier(&project_id) {
        return Err(LoadError::invalid(
            "cms.project_id",
            "may only contain ASCII letters, digits, `-` and `_`",
        ));
    }

    let dataset = non_empty(cms.dataset).unwrap_or_else(|| DEFAULT_CMS_DATASET.to_string());
    if !is_identifier(&dataset) {
        return Err(LoadError::invalid(
            "cms.dataset",
            "may only contain ASCII letters, digits, `-` and `_`",
        ));
    }

    let api_version =
        non_empty(cms.api_version).unwrap_or_else(|| DEFAULT_CMS_API_VERSION.to_string());
    let api_version = api_version.trim_start_matches('v').to_string();
    if !is_api_version(&api_version) {
        return Err(LoadError::invalid(
            "cms.api_version",
            "expected a date such as 2024-01-01",
        ));
    }

    let timeout_secs = cms.timeout_seconds.unwrap_or(DEFAULT_CMS_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "cms.timeout_seconds",
            "must be greater than zero",
        ));
    }

    let api_base_url = match non_empty(cms.api_base_url) {
        Some(value) => Some(
            Url::parse(&value)
                .map_err(|err| LoadError::invalid("cms.api_base_url", err.to_string()))?,
        ),
        None => None,
    };

    Ok(CmsSettings {
        project_id,
        dataset,
        api_version,
        use_cdn: cms.use_cdn.unwrap_or(true),
        token: non_empty(cms.token),
        timeout: Duration::from_secs(timeout_secs),
        api_base_url,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let revalidate_secs = cache
        .revalidate_seconds
        .unwrap_or(DEFAULT_CACHE_REVALIDATE_SECS);
    if revalidate_secs == 0 {
        return Err(LoadError::invalid(
            "cache.revalidate_seconds",
            "must be greater than zero",
        ));
    }

    let max_entries_value = cache.max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES);
    let max_entries = usize::try_from(max_entries_value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| LoadError::invalid("cache.max_entries", "must be greater than zero"))?;

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        revalidate: Duration::from_secs(revalidate_secs),
        max_entries,
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let public_url = non_empty(site.public_url).unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
    let parsed = Url::parse(&public_url)
        .map_err(|err| LoadError::invalid("site.public_url", err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "site.public_url",
            "must use http or https",
        ));
    }

    Ok(SiteSettings {
        title: non_empty(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
        description: non_empty(site.description)
            .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string()),
        site_name: non_empty(site.site_name).unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
        public_url: public_url.trim_end_matches('/').to_string(),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCmsSettings {
    project_id: Option<String>,
    dataset: Option<String>,
    api_version: Option<String>,
    use_cdn: Option<bool>,
    token: Option<String>,
    timeout_seconds: Option<u64>,
    api_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    revalidate_seconds: Option<u64>,
    max_entries: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    description: Option<String>,
    site_name: Option<String>,
    public_url: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Project ids and dataset names end up in host names and URL paths.
fn is_identifier(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

fn is_api_version(value: &str) -> bool {
    value == "1"
        || (value.len() == 10 && value.chars().all(|ch| ch.is_ascii_digit() || ch == '-'))
}
