//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RERANK_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_SEQ_LEN, DEFAULT_MODEL_ID, DEFAULT_PAYLOAD_LIMIT, DEFAULT_PORT,
};

/// Files a local model directory must contain.
pub const REQUIRED_MODEL_FILES: [&str; 3] = ["config.json", "model.safetensors", "tokenizer.json"];

/// Where the scoring model comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Local directory with config, weights and tokenizer.
    Local(PathBuf),
    /// Hugging Face Hub repository id, downloaded on startup.
    Hub(String),
    /// Lexical stub scorer, only when explicitly requested.
    Stub,
}

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RERANK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Local cross-encoder directory. Takes precedence over `model_id`.
    pub model_path: Option<PathBuf>,

    /// Hugging Face Hub model id. Default: `BAAI/bge-reranker-base`.
    pub model_id: String,

    /// Serve lexical stub scores instead of loading a model. Default: `false`.
    pub stub_scorer: bool,

    /// Initial documents per backend call. Default: `10`.
    pub batch_size: usize,

    /// Tokenizer truncation length. Default: `512`.
    pub max_seq_len: usize,

    /// Largest accepted `POST /rerank` body in bytes. Default: 64 MiB.
    pub payload_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model_path: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            stub_scorer: false,
            batch_size: DEFAULT_BATCH_SIZE,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            payload_limit: DEFAULT_PAYLOAD_LIMIT,
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "RERANK_PORT";
    const ENV_BIND_ADDR: &'static str = "RERANK_BIND_ADDR";
    const ENV_MODEL_PATH: &'static str = "RERANK_MODEL_PATH";
    const ENV_MODEL_ID: &'static str = "RERANK_MODEL_ID";
    const ENV_BATCH_SIZE: &'static str = "RERANK_BATCH_SIZE";
    const ENV_MAX_SEQ_LEN: &'static str = "RERANK_MAX_SEQ_LEN";
    const ENV_PAYLOAD_LIMIT: &'static str = "RERANK_PAYLOAD_LIMIT";
    const ENV_STUB_SCORER: &'static str = "RERANK_STUB_SCORER";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_path =
            Self::parse_optional_string_from_env(Self::ENV_MODEL_PATH).map(PathBuf::from);
        let model_id =
            Self::parse_optional_string_from_env(Self::ENV_MODEL_ID).unwrap_or(defaults.model_id);
        let stub_scorer = Self::parse_flag_from_env(Self::ENV_STUB_SCORER, defaults.stub_scorer)?;
        let batch_size =
            Self::parse_size_from_env(Self::ENV_BATCH_SIZE, "batch size", defaults.batch_size)?;
        let max_seq_len = Self::parse_size_from_env(
            Self::ENV_MAX_SEQ_LEN,
            "max sequence length",
            defaults.max_seq_len,
        )?;
        let payload_limit = Self::parse_size_from_env(
            Self::ENV_PAYLOAD_LIMIT,
            "payload limit",
            defaults.payload_limit,
        )?;

        Ok(Self {
            port,
            bind_addr,
            model_path,
            model_id,
            stub_scorer,
            batch_size,
            max_seq_len,
            payload_limit,
        })
    }

    /// Validates paths and basic invariants (does not download anything).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidSize {
                name: "batch size",
                value: self.batch_size.to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(ConfigError::InvalidSize {
                name: "max sequence length",
                value: self.max_seq_len.to_string(),
            });
        }

        if self.payload_limit == 0 {
            return Err(ConfigError::InvalidSize {
                name: "payload limit",
                value: self.payload_limit.to_string(),
            });
        }

        if self.stub_scorer {
            return Ok(());
        }

        if let Some(ref dir) = self.model_path {
            if !dir.exists() {
                return Err(ConfigError::PathNotFound { path: dir.clone() });
            }
            if !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
            for file in REQUIRED_MODEL_FILES {
                if !dir.join(file).is_file() {
                    return Err(ConfigError::MissingModelFile {
                        dir: dir.clone(),
                        file,
                    });
                }
            }
        }

        Ok(())
    }

    /// Resolves which model the server should load.
    pub fn model_source(&self) -> ModelSource {
        if self.stub_scorer {
            return ModelSource::Stub;
        }

        match &self.model_path {
            Some(path) => ModelSource::Local(path.clone()),
            None => ModelSource::Hub(self.model_id.clone()),
        }
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_flag_from_env(var_name: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = Self::parse_optional_string_from_env(var_name) else {
            return Ok(default);
        };

        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag {
                name: var_name.to_string(),
                value,
            }),
        }
    }

    fn parse_size_from_env(
        var_name: &str,
        name: &'static str,
        default: usize,
    ) -> Result<usize, ConfigError> {
        let Some(value) = Self::parse_optional_string_from_env(var_name) else {
            return Ok(default);
        };

        match value.parse::<usize>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(ConfigError::InvalidSize { name, value }),
        }
    }
}
