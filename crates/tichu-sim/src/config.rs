use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_BIG_BONUS_RATE: f64 = 0.02;
const DEFAULT_SMALL_BONUS_RATE: f64 = 0.08;
const DEFAULT_PASS_RATE: f64 = 0.25;
const MAX_ROOMS: usize = 256;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root simulation configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimConfig {
    pub run_id: String,
    pub rooms: usize,
    pub turns: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub agents: AgentConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SimConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        validate_counts(self.rooms, self.turns)?;
        self.agents.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (`{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        let jsonl = resolve_template(&self.run_id, &self.outputs.jsonl);
        let telemetry = jsonl
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("telemetry.jsonl");
        ResolvedOutputs { jsonl, telemetry }
    }
}

fn validate_counts(rooms: usize, turns: usize) -> Result<(), ValidationError> {
    if rooms == 0 {
        return Err(ValidationError::field("rooms", "number of rooms must be greater than zero"));
    }

    if rooms > MAX_ROOMS {
        return Err(ValidationError::field(
            "rooms",
            format!("at most {MAX_ROOMS} rooms can run at once"),
        ));
    }

    if turns == 0 {
        return Err(ValidationError::field("turns", "number of turns must be greater than zero"));
    }

    Ok(())
}

/// How often the random agents take optional actions. Every rate is a
/// probability in `0.0..=1.0`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default = "default_big_bonus_rate")]
    pub big_bonus_rate: f64,
    #[serde(default = "default_small_bonus_rate")]
    pub small_bonus_rate: f64,
    /// Chance of passing even when a legal play exists.
    #[serde(default = "default_pass_rate")]
    pub pass_rate: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            big_bonus_rate: DEFAULT_BIG_BONUS_RATE,
            small_bonus_rate: DEFAULT_SMALL_BONUS_RATE,
            pass_rate: DEFAULT_PASS_RATE,
        }
    }
}

impl AgentConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (label, value) in [
            ("agents.big_bonus_rate", self.big_bonus_rate),
            ("agents.small_bonus_rate", self.small_bonus_rate),
            ("agents.pass_rate", self.pass_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::field(
                    label,
                    format!("probability must lie within 0.0..=1.0, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

fn default_big_bonus_rate() -> f64 {
    DEFAULT_BIG_BONUS_RATE
}

fn default_small_bonus_rate() -> f64 {
    DEFAULT_SMALL_BONUS_RATE
}

fn default_pass_rate() -> f64 {
    DEFAULT_PASS_RATE
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        if self.jsonl.trim().is_empty() {
            return Err(ValidationError::field("outputs.jsonl", "path must not be empty"));
        }

        let resolved = resolve_template(run_id, &self.jsonl);
        if resolved.file_name().is_none() {
            return Err(ValidationError::field(
                "outputs.jsonl",
                "resolved path does not name a file",
            ));
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    /// The configured level, or `None` when the name is not a tracing level.
    pub fn level(&self) -> Option<Level> {
        self.tracing_level.trim().parse().ok()
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::field("run_id", "run_id must not be empty"));
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::field(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths. Structured logs land next to the JSONL rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub telemetry: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
