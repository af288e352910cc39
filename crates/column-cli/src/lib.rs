//! # Column CLI
//!
//! Command-line interface over the Column SDK.
//!
//! This module provides CLI commands for:
//! - Signing and verifying webhook payloads
//! - Loan payment, schedule and delinquency calculations
//! - Listing API resources through the paginated client
//!
//! Configuration is layered: built-in defaults, the user configuration file
//! (`<config dir>/column/config.toml`), an explicit `--config` file, and
//! finally `COLUMN__` environment variables such as `COLUMN__API__API_KEY`.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use column_sdk::client::{
    mask_secret, ClientConfig, ColumnClient, Environment, Resource, RetryPolicy,
};
use column_sdk::loan::{
    days_past_due, payoff_amount, validate_loan_parameters, DelinquencyStatus, LoanTerms,
};
use column_sdk::webhook::{
    build_signature_header, generate_signature, parse_signature_header, SignatureValidator,
};
use column_sdk::{ApiError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// CLI Structure
// ============================================================================

/// Column CLI - tools for the Column banking API
#[derive(Parser)]
#[command(name = "column")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tools for the Column banking API")]
#[command(
    long_about = "Signs and verifies Column webhooks, runs loan calculations and lists API resources"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "COLUMN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level, overrides `logging.level` from the configuration
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Sign and verify webhook payloads
    Webhook {
        #[command(subcommand)]
        action: WebhookCommands,
    },

    /// Loan and credit line calculations
    Loan {
        #[command(subcommand)]
        action: LoanCommands,
    },

    /// List every item of an API resource
    List {
        /// Resource to list (e.g. ach-transfers, bank-accounts)
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        /// Maximum number of items to fetch
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Check API credentials and connectivity
    Ping,

    /// Inspect the resolved configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Output format options
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

fn parse_resource(value: &str) -> Result<Resource, String> {
    value.parse().map_err(|e: ValidationError| e.to_string())
}

// ============================================================================
// Webhook Commands
// ============================================================================

/// Webhook subcommands
#[derive(Subcommand)]
pub enum WebhookCommands {
    /// Print the signature header for a payload
    Sign {
        /// Payload file, or `-` for stdin
        #[arg(short, long)]
        payload: PathBuf,

        /// Webhook signing secret
        #[arg(short, long, env = "COLUMN_WEBHOOK_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// Unix timestamp to sign with (defaults to now)
        #[arg(short, long)]
        timestamp: Option<i64>,
    },

    /// Check a payload against a signature
    Verify {
        /// Payload file, or `-` for stdin
        #[arg(short, long)]
        payload: PathBuf,

        /// Hex signature, or a full `t=...,v1=...` header
        #[arg(long)]
        signature: String,

        /// Webhook signing secret
        #[arg(short, long, env = "COLUMN_WEBHOOK_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// Timestamp header value, when the signature is a bare digest
        #[arg(short, long)]
        timestamp: Option<String>,
    },

    /// Split a signature header into its parts
    ParseHeader {
        /// Header value, e.g. `t=1700000000,v1=ab12...`
        header: String,
    },
}

// ============================================================================
// Loan Commands
// ============================================================================

/// Loan subcommands. Rates are annual percentages unless noted.
#[derive(Subcommand)]
pub enum LoanCommands {
    /// Monthly payment, total interest and APR
    Payment {
        #[arg(long)]
        principal: f64,

        /// Annual rate in percent (5 = 5%)
        #[arg(long)]
        rate: f64,

        /// Term in months
        #[arg(long)]
        term: u32,

        /// Up-front fees included in the APR
        #[arg(long, default_value = "0")]
        fees: f64,
    },

    /// Full amortization schedule
    Schedule {
        #[arg(long)]
        principal: f64,

        /// Annual rate in percent (5 = 5%)
        #[arg(long)]
        rate: f64,

        /// Term in months
        #[arg(long)]
        term: u32,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Amount required to pay off a balance
    Payoff {
        #[arg(long)]
        balance: f64,

        /// Daily rate as a decimal fraction
        #[arg(long)]
        daily_rate: f64,

        /// Days until payoff
        #[arg(long)]
        days: u32,
    },

    /// Check loan parameters
    Validate {
        #[arg(long, allow_negative_numbers = true)]
        principal: f64,

        /// Annual rate as a decimal fraction (0.05 = 5%)
        #[arg(long, allow_negative_numbers = true)]
        rate: f64,

        /// Term in months
        #[arg(long)]
        term: u32,
    },

    /// Days past due and delinquency bucket
    Delinquency {
        /// Payment due date (RFC 3339)
        #[arg(long)]
        due: String,

        /// Evaluation time (RFC 3339, defaults to now)
        #[arg(long)]
        now: Option<String>,
    },
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the resolved configuration with secrets masked
    Show,
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 1,
            Self::Api(_) => 2,
            Self::CommandFailed { .. } => 3,
            Self::InvalidArgument { .. } => 4,
            Self::Io(_) => 5,
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(error: ValidationError) -> Self {
        let arg = match &error {
            ValidationError::Required { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::OutOfRange { field, .. } => field.clone(),
        };
        Self::InvalidArgument {
            arg,
            message: error.to_string(),
        }
    }
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

// ============================================================================
// Configuration Types
// ============================================================================

/// CLI configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// API client settings
    pub api: ApiSettings,

    /// Webhook signing settings
    pub webhook: WebhookSettings,

    /// Default logging configuration
    pub logging: LoggingConfig,

    /// Output formatting preferences
    pub output: OutputConfig,
}

impl CliConfig {
    /// Copy of this configuration with every secret masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api.api_key = copy.api.api_key.as_deref().map(mask_secret);
        copy.webhook.secret = copy.webhook.secret.as_deref().map(mask_secret);
        copy
    }
}

/// API client settings
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSettings {
    pub api_key: Option<String>,
    pub environment: Environment,
    /// Base URL, used when `environment = "custom"`
    pub custom_endpoint: Option<String>,
    pub platform_id: Option<String>,
    pub timeout_seconds: u64,
    /// Retries for rate-limited (429) responses
    pub max_retries: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            environment: Environment::Production,
            custom_endpoint: None,
            platform_id: None,
            timeout_seconds: 30,
            max_retries: 3,
        }
    }
}

impl ApiSettings {
    /// Build a validated SDK client configuration.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "api.api_key".to_string(),
            })?;

        let mut config = ClientConfig::new(api_key)
            .with_environment(self.environment)
            .with_timeout(Duration::from_secs(self.timeout_seconds))
            .with_retry_policy(RetryPolicy {
                max_retries: self.max_retries,
                ..RetryPolicy::default()
            });
        config.custom_endpoint = self.custom_endpoint.clone();
        if let Some(platform_id) = &self.platform_id {
            config = config.with_platform_id(platform_id.clone());
        }

        config.validate().map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
        Ok(config)
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .field("environment", &self.environment)
            .field("custom_endpoint", &self.custom_endpoint)
            .field("platform_id", &self.platform_id)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Webhook signing settings
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WebhookSettings {
    pub secret: Option<String>,
}

impl fmt::Debug for WebhookSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSettings")
            .field("secret", &self.secret.as_deref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum LogFormat {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json")]
    Json,
}

/// Output formatting preferences
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

// ============================================================================
// Configuration Loading
// ============================================================================

/// Location of the per-user configuration file, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("column").join("config.toml"))
}

/// Load configuration from the standard locations and the process environment.
pub fn load_configuration(explicit: Option<&Path>) -> Result<CliConfig, ConfigError> {
    build_configuration(
        default_config_path().as_deref(),
        explicit,
        config::Environment::with_prefix("COLUMN")
            .separator("__")
            .try_parsing(true),
    )
}

/// Layer the user file, an explicit file and an environment source over the defaults.
///
/// The user file is optional. An explicit file must exist.
pub fn build_configuration(
    user_file: Option<&Path>,
    explicit: Option<&Path>,
    environment: config::Environment,
) -> Result<CliConfig, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = user_file {
        builder = builder.add_source(
            config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(false),
        );
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder.add_source(environment).build()?;
    Ok(settings.try_deserialize()?)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `--log-level`, which wins over `logging.level`.
/// Logs go to stderr so command output on stdout stays parseable.
pub fn initialize_logging(cli: &Cli, logging: &LoggingConfig) -> Result<(), CliError> {
    let level = cli.log_level.as_deref().unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| CliError::InvalidArgument {
            arg: "log-level".to_string(),
            message: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if cli.json_logs || logging.format == LogFormat::Json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::CommandFailed {
        message: format!("Failed to initialize logging: {}", e),
    })
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref())?;
    initialize_logging(&cli, &config.logging)?;
    debug!(config_file = ?cli.config, "Configuration loaded");

    let output = execute(cli.command, &config).await?;
    println!("{}", output);
    Ok(())
}

/// Run a command and return the text to print.
pub async fn execute(command: Commands, config: &CliConfig) -> Result<String, CliError> {
    match command {
        Commands::Webhook { action } => execute_webhook_command(action, config),
        Commands::Loan { action } => execute_loan_command(action, config),
        Commands::List {
            resource,
            limit,
            format,
        } => {
            execute_list_command(resource, limit, format.unwrap_or(config.output.format), config)
                .await
        }
        Commands::Ping => execute_ping_command(config).await,
        Commands::Config { action } => match action {
            ConfigCommands::Show => toml::to_string_pretty(&config.redacted()).map_err(|e| {
                CliError::CommandFailed {
                    message: format!("Failed to render configuration: {}", e),
                }
            }),
        },
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

fn read_payload(path: &Path) -> Result<Vec<u8>, CliError> {
    if path == Path::new("-") {
        let mut buffer = Vec::new();
        std::io::stdin().read_to_end(&mut buffer)?;
        return Ok(buffer);
    }
    Ok(std::fs::read(path)?)
}

fn webhook_secret(flag: Option<String>, config: &CliConfig) -> Result<String, CliError> {
    flag.or_else(|| config.webhook.secret.clone())
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| CliError::InvalidArgument {
            arg: "secret".to_string(),
            message: "pass --secret, set COLUMN_WEBHOOK_SECRET or webhook.secret".to_string(),
        })
}

fn parse_time(arg: &str, value: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| CliError::InvalidArgument {
            arg: arg.to_string(),
            message: format!("'{}' is not an RFC 3339 timestamp: {}", value, e),
        })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::CommandFailed {
        message: format!("Failed to render JSON: {}", e),
    })
}

fn execute_webhook_command(action: WebhookCommands, config: &CliConfig) -> Result<String, CliError> {
    match action {
        WebhookCommands::Sign {
            payload,
            secret,
            timestamp,
        } => {
            let secret = webhook_secret(secret, config)?;
            let body = read_payload(&payload)?;
            let signed = generate_signature(&body, &secret, timestamp);
            debug!(timestamp = signed.timestamp, bytes = body.len(), "Signed payload");
            Ok(build_signature_header(&signed.signature, signed.timestamp))
        }
        WebhookCommands::Verify {
            payload,
            signature,
            secret,
            timestamp,
        } => {
            let secret = webhook_secret(secret, config)?;
            let body = read_payload(&payload)?;
            SignatureValidator::new(secret)
                .validate(&body, Some(signature.as_str()), timestamp.as_deref())
                .map_err(|e| CliError::CommandFailed {
                    message: e.to_string(),
                })?;
            Ok("valid".to_string())
        }
        WebhookCommands::ParseHeader { header } => {
            let parsed =
                parse_signature_header(&header).ok_or_else(|| CliError::InvalidArgument {
                    arg: "header".to_string(),
                    message: "expected t=<unix seconds>,v1=<hex digest>".to_string(),
                })?;
            Ok(format!(
                "timestamp: {}\nsignature: {}",
                parsed.timestamp, parsed.signature
            ))
        }
    }
}

fn execute_loan_command(action: LoanCommands, config: &CliConfig) -> Result<String, CliError> {
    match action {
        LoanCommands::Payment {
            principal,
            rate,
            term,
            fees,
        } => {
            let terms = LoanTerms::new(principal, rate, term)?;
            Ok(format!(
                "monthly payment: {:.2}\ntotal interest:  {:.2}\nAPR:             {:.2}%",
                terms.monthly_payment(),
                terms.total_interest(),
                terms.apr(fees)
            ))
        }
        LoanCommands::Schedule {
            principal,
            rate,
            term,
            format,
        } => {
            let rows = LoanTerms::new(principal, rate, term)?.schedule();
            match format.unwrap_or(config.output.format) {
                OutputFormat::Json => to_json(&rows),
                OutputFormat::Text => {
                    let mut lines = vec![format!(
                        "{:>6} {:>12} {:>12} {:>12} {:>14}",
                        "period", "payment", "principal", "interest", "balance"
                    )];
                    lines.extend(rows.iter().map(|row| {
                        format!(
                            "{:>6} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                            row.period, row.payment, row.principal, row.interest, row.balance
                        )
                    }));
                    Ok(lines.join("\n"))
                }
            }
        }
        LoanCommands::Payoff {
            balance,
            daily_rate,
            days,
        } => Ok(format!("{:.2}", payoff_amount(balance, daily_rate, days))),
        LoanCommands::Validate {
            principal,
            rate,
            term,
        } => {
            let validation = validate_loan_parameters(principal, rate, term);
            if validation.valid {
                Ok("valid".to_string())
            } else {
                Err(CliError::CommandFailed {
                    message: validation.errors.join("; "),
                })
            }
        }
        LoanCommands::Delinquency { due, now } => {
            let due = parse_time("due", &due)?;
            let now = match now {
                Some(now) => parse_time("now", &now)?,
                None => Utc::now(),
            };
            let days = days_past_due(due, now);
            Ok(format!(
                "days past due: {}\nstatus:       {}",
                days,
                DelinquencyStatus::from_days_past_due(days)
            ))
        }
    }
}

fn build_client(config: &CliConfig) -> Result<ColumnClient, CliError> {
    let client_config = config.api.client_config()?;
    ColumnClient::new(client_config).map_err(|e| {
        CliError::Configuration(ConfigError::Invalid {
            message: e.to_string(),
        })
    })
}

async fn execute_list_command(
    resource: Resource,
    limit: Option<usize>,
    format: OutputFormat,
    config: &CliConfig,
) -> Result<String, CliError> {
    let client = build_client(config)?;
    info!(resource = %resource, limit = ?limit, "Listing resource");

    let items: Vec<Value> = client.list_all(resource, limit).await?;
    info!(resource = %resource, count = items.len(), "Listed resource");

    match format {
        OutputFormat::Json => to_json(&items),
        OutputFormat::Text => Ok(items
            .iter()
            .map(|item| match item.get("id").and_then(Value::as_str) {
                Some(id) => id.to_string(),
                None => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

async fn execute_ping_command(config: &CliConfig) -> Result<String, CliError> {
    let client = build_client(config)?;
    client.test_connection().await?;
    info!(base_url = %client.base_url(), "Connection verified");
    Ok(format!("ok: {}", client.base_url()))
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
