//! CLI command implementations
//!
//! `serve` opens the store from the mirror file and runs the HTTP API until
//! the process is stopped. `check` revalidates the mirror file offline.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::http_server::{AppleState, HttpServer, HttpServerConfig, ImportMode};
use crate::observability::{init_logging, LogLevel};
use crate::schema::{revalidate, AppleRecord};
use crate::storage::{MirrorFile, DEFAULT_MIRROR_PATH};
use crate::store::RecordStore;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener and CORS settings
    #[serde(default)]
    pub server: HttpServerConfig,

    /// CSV mirror file (default: "data/apple_stats.csv")
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Upload admission mode (default: validated)
    #[serde(default)]
    pub import_mode: ImportMode,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_MIRROR_PATH)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            data_file: default_data_file(),
            import_mode: ImportMode::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        Ok(config)
    }

    /// Load from the given file, or start from defaults when none is given
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.server.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }

        if self.data_file.as_os_str().is_empty() {
            return Err(CliError::config_error("data_file must not be empty"));
        }

        Ok(())
    }
}

/// Main CLI entry point
///
/// Parses arguments, installs logging and dispatches to the appropriate
/// command. This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_logging(&LogLevel::parse(&cli.log));
    run_command(cli.command.unwrap_or_default())
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            config,
            host,
            port,
            data_file,
            trusted_import,
        } => {
            let mut app = AppConfig::load_or_default(config.as_deref())?;
            if let Some(host) = host {
                app.server.host = host;
            }
            if let Some(port) = port {
                app.server.port = port;
            }
            if let Some(data_file) = data_file {
                app.data_file = data_file;
            }
            if trusted_import {
                app.import_mode = ImportMode::Trusted;
            }
            serve(app)
        }
        Command::Check { config, data_file } => {
            let mut app = AppConfig::load_or_default(config.as_deref())?;
            if let Some(data_file) = data_file {
                app.data_file = data_file;
            }
            check(&app)
        }
    }
}

/// Open the store and run the HTTP API
pub fn serve(config: AppConfig) -> CliResult<()> {
    config.validate()?;

    let store = RecordStore::open(MirrorFile::new(&config.data_file)).map_err(|e| {
        CliError::boot_failed(format!(
            "Failed to load {}: {}",
            config.data_file.display(),
            e
        ))
    })?;

    info!(
        data_file = %config.data_file.display(),
        records = store.len(),
        import_mode = ?config.import_mode,
        "store opened"
    );

    let server = HttpServer::new(config.server, AppleState::new(store, config.import_mode));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Revalidate every record in the mirror file and print a report
pub fn check(config: &AppConfig) -> CliResult<()> {
    config.validate()?;

    let records = MirrorFile::new(&config.data_file)
        .load()
        .map_err(|e| CliError::boot_failed(format!("Failed to load mirror: {}", e)))?;

    let invalid = invalid_records(&records);
    let invalid_count = invalid.len();

    write_response(json!({
        "records": records.len(),
        "invalid": invalid,
    }))?;

    if invalid_count > 0 {
        return Err(CliError::invalid_records(invalid_count));
    }

    Ok(())
}

fn invalid_records(records: &[AppleRecord]) -> Vec<Value> {
    records
        .iter()
        .filter_map(|record| revalidate(record).err().map(|e| (record, e)))
        .map(|(record, e)| {
            json!({
                "marketing_year": record.marketing_year,
                "code": e.code().code(),
                "field": e.field(),
                "error": e.to_string(),
            })
        })
        .collect()
}
