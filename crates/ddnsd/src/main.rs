// # ddnsd - DDNS Daemon
//
// Keeps one Cloudflare A record pointed at this machine's public IPv4
// address.
//
// This is a THIN integration layer. All decision logic lives in ddns-core;
// this binary only:
// 1. Reads its own settings from environment variables
// 2. Installs the logging sink (console + daily-rotated files)
// 3. Loads the JSON configuration file
// 4. Wires the IP source, DoH lookup and Cloudflare provider together
// 5. Runs the scheduler until SIGINT/SIGTERM
//
// ## Environment
//
// - `DDNS_CONFIG_PATH`: Path to the JSON config (default: config/config.json)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `DDNS_LOG_DIR`: Directory for rotated log files (default: logs)
// - `DDNS_MODE`: Set to `dry-run` to skip the record write
//
// ## Example
//
// ```bash
// cp config/config.sample.json config/config.json
// $EDITOR config/config.json
//
// DDNS_LOG_LEVEL=debug ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::{DdnsConfig, Reconciler, Scheduler};
use ddns_dns_doh::DohLookup;
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::CloudflareProvider;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder as RollingBuilder, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Rotated log files kept on disk (one per day)
const LOG_RETENTION_FILES: usize = 30;

const HTTP_CLIENT_DIRECTIVES: &str = "hyper=info,hyper_util=info,reqwest=info,h2=info,rustls=info";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon settings (everything that is not in the config file)
#[derive(Debug, Clone, PartialEq, Eq)]
struct DaemonSettings {
    config_path: PathBuf,
    log_level: String,
    log_dir: PathBuf,
    dry_run: bool,
}

impl DaemonSettings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through `lookup`, which maps a variable name to its value
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings = Self {
            config_path: lookup("DDNS_CONFIG_PATH")
                .unwrap_or_else(|| "config/config.json".to_string())
                .into(),
            log_level: lookup("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_dir: lookup("DDNS_LOG_DIR")
                .unwrap_or_else(|| "logs".to_string())
                .into(),
            dry_run: lookup("DDNS_MODE")
                .unwrap_or_default()
                .eq_ignore_ascii_case("dry-run"),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if self.log_dir.as_os_str().is_empty() {
            anyhow::bail!("DDNS_LOG_DIR cannot be empty");
        }

        Ok(())
    }

    fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }

    /// Level for the rotated log files: debug, or finer if requested
    fn file_level(&self) -> LevelFilter {
        LevelFilter::from_level(self.level()).max(LevelFilter::DEBUG)
    }
}

/// Validate that a string is a valid domain name
///
/// This implements basic DNS domain name validation per RFC 1035.
/// It's not comprehensive but catches common errors.
fn validate_domain_name(field: &str, domain: &str) -> Result<()> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    if domain.is_empty() {
        anyhow::bail!("{} cannot be empty", field);
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        anyhow::bail!(
            "{} too long: {} chars (max 253). Got: {}",
            field,
            domain.len(),
            domain
        );
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("{} has empty label: '{}'", field, domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "{} label too long: {} chars (max 63). Label: '{}'",
                field,
                label.len(),
                label
            );
        }

        // Underscore is allowed for service-style labels
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            anyhow::bail!(
                "{} label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric, hyphen and underscore only.",
                field,
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "{} label cannot start or end with hyphen. Label: '{}'",
                field,
                label
            );
        }
    }

    Ok(())
}

/// Load the config file and check the names in it
fn load_config(path: &Path) -> Result<DdnsConfig> {
    let config = DdnsConfig::load(path)?;
    validate_domain_name("zone", &config.zone)?;
    validate_domain_name("dnsrecord", &config.record_name)?;
    Ok(config)
}

/// Install the global subscriber: colored console plus daily-rotated files
///
/// The returned guard flushes the file writer on drop and must live until
/// the process exits.
fn init_logging(settings: &DaemonSettings) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&settings.log_dir).with_context(|| {
        format!(
            "Failed to create log directory {}",
            settings.log_dir.display()
        )
    })?;

    let file_appender = RollingBuilder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix("dns_update")
        .filename_suffix("log")
        .max_log_files(LOG_RETENTION_FILES)
        .build(&settings.log_dir)
        .context("Failed to create rolling log file")?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Console follows DDNS_LOG_LEVEL / RUST_LOG
    let console_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(settings.level()).into())
        .from_env_lossy();

    // File keeps at least debug detail; HTTP client internals stay at info
    let file_filter = EnvFilter::builder()
        .with_default_directive(settings.file_level().into())
        .parse_lossy(HTTP_CLIENT_DIRECTIVES);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(console_filter))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(guard)
}

/// Build the scheduler and all of its collaborators from the config
fn build_scheduler(config: &DdnsConfig, dry_run: bool) -> ddns_core::Result<Scheduler> {
    let ip_source = HttpIpSource::from_config(config)?;
    let lookup = DohLookup::from_config(config)?;
    let provider = CloudflareProvider::from_config(config, dry_run)?;

    let reconciler = Reconciler::new(
        Box::new(ip_source),
        Box::new(lookup),
        Box::new(provider),
        config,
    )?;

    Scheduler::from_config(reconciler, &config.engine)
}

fn main() -> ExitCode {
    let settings = match DaemonSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let _log_guard = match init_logging(&settings) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };
    info!("Logging initialized");

    let config = match load_config(&settings.config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            info!("Please create a config.json file with the required parameters");
            info!("See config/config.sample.json for an example");
            return DdnsExitCode::ConfigError.into();
        }
    };

    // One logical thread: cycles run strictly one after another
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config, settings.dry_run).await {
            Ok(()) => DdnsExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: DdnsConfig, dry_run: bool) -> Result<()> {
    let scheduler = build_scheduler(&config, dry_run).context("Failed to build updater")?;

    // Install handlers before the first cycle so an early signal is not lost
    let mut signals = ShutdownSignals::install()?;

    info!(
        dry_run,
        "Updater ready for {} in zone {}. Press Ctrl+C to stop.",
        config.record_name,
        config.zone
    );

    scheduler
        .run_until(async {
            let name = signals.recv().await;
            info!("Received {}, exiting gracefully...", name);
        })
        .await;

    Ok(())
}

/// SIGTERM and SIGINT handlers
#[cfg(unix)]
struct ShutdownSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;
        Ok(Self { sigterm, sigint })
    }

    /// Wait for either signal and return its name
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// Ctrl-C handler
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
        }
        "SIGINT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = DaemonSettings::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(settings.config_path, PathBuf::from("config/config.json"));
        assert_eq!(settings.log_dir, PathBuf::from("logs"));
        assert_eq!(settings.level(), Level::INFO);
        assert!(!settings.dry_run);
    }

    #[test]
    fn test_settings_overrides() {
        let settings = DaemonSettings::from_lookup(lookup_from(&[
            ("DDNS_CONFIG_PATH", "/etc/ddns/config.json"),
            ("DDNS_LOG_LEVEL", "DEBUG"),
            ("DDNS_LOG_DIR", "/var/log/ddns"),
            ("DDNS_MODE", "dry-run"),
        ]))
        .unwrap();

        assert_eq!(settings.config_path, PathBuf::from("/etc/ddns/config.json"));
        assert_eq!(settings.level(), Level::DEBUG);
        assert!(settings.dry_run);
    }

    #[test]
    fn test_file_log_keeps_debug_detail() {
        let default = DaemonSettings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(default.file_level(), LevelFilter::DEBUG);

        let quiet =
            DaemonSettings::from_lookup(lookup_from(&[("DDNS_LOG_LEVEL", "error")])).unwrap();
        assert_eq!(quiet.file_level(), LevelFilter::DEBUG);

        let verbose =
            DaemonSettings::from_lookup(lookup_from(&[("DDNS_LOG_LEVEL", "trace")])).unwrap();
        assert_eq!(verbose.file_level(), LevelFilter::TRACE);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = DaemonSettings::from_lookup(lookup_from(&[("DDNS_LOG_LEVEL", "loud")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_domain_name() {
        assert!(validate_domain_name("zone", "example.com").is_ok());
        assert!(validate_domain_name("dnsrecord", "home.example.com").is_ok());
        assert!(validate_domain_name("dnsrecord", "_acme.example.com").is_ok());
        assert!(validate_domain_name("zone", "").is_err());
        assert!(validate_domain_name("zone", "bad..example.com").is_err());
        assert!(validate_domain_name("zone", "-bad.example.com").is_err());
        assert!(validate_domain_name("zone", "sp ace.example.com").is_err());
        assert!(validate_domain_name("zone", &"a".repeat(64)).is_err());
    }

    #[test]
    fn test_load_config_checks_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "zone": "example.com",
                "dnsrecord": "home example.com",
                "cloudflare_auth_email": "admin@example.com",
                "cloudflare_auth_key": "key"
            }"#,
        )
        .unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("dnsrecord"));
    }

    #[test]
    fn test_load_config_strips_root_dot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "zone": "example.com.",
                "dnsrecord": "home.example.com.",
                "cloudflare_auth_email": "admin@example.com",
                "cloudflare_auth_key": "key"
            }"#,
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.zone, "example.com");
        assert_eq!(config.record_name, "home.example.com");
    }

    #[test]
    fn test_build_scheduler_uses_configured_interval() {
        let mut config = DdnsConfig::new("example.com", "home.example.com", "a@b.c", "key");
        config.engine.interval_secs = 300;

        let scheduler = build_scheduler(&config, true).unwrap();
        assert_eq!(scheduler.period(), std::time::Duration::from_secs(300));
    }
}
