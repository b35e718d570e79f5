use anyhow::Context;
use serde::Deserialize;

/// Environment variable naming a YAML configuration file.
pub const CONFIG_ENV: &str = "STRAND_CONFIG";

/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Size of the scratch buffer used for each socket read.
    pub read_buffer_size: usize,
    /// Write the violation's status line back before closing.
    pub error_responses: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            read_buffer_size: 4096,
            error_responses: true,
        }
    }
}

/// Hard limits applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_method_len: usize,
    pub max_path_len: usize,
    /// Cap on buffered plus decoded bytes for one request.
    pub max_request_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_method_len: 255,
            max_path_len: 4096,
            max_request_len: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// Reads the YAML file named by `STRAND_CONFIG` if set, otherwise starts
    /// from defaults. `LISTEN` always wins over the configured address.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path))?;
                Self::from_yaml(&text)
                    .with_context(|| format!("Failed to parse config file {}", path))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text).context("Invalid YAML configuration")?;
        Ok(cfg)
    }
}
