use crate::error::{Result, StreamError};
use crate::streaming::FramingMode;
use crate::streaming::line::DEFAULT_PREFIX;
use serde::Deserialize;
use std::env;
use std::fs;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub mode: FramingMode,
    /// Line prefix marking a data line (SSE mode only)
    pub prefix: String,
    /// Discard the buffer if it grows past this without yielding a frame
    pub max_buffer_bytes: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            mode: FramingMode::Sse,
            prefix: DEFAULT_PREFIX.to_string(),
            max_buffer_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Longest wait for any single read; the stream as a whole is unbounded
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
            connect_timeout_secs: 10,
        }
    }
}

impl StreamConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = StreamConfig::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| StreamError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml_str(&contents)?;

        // Allow environment variables to override file config
        config.apply_env()?;

        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| StreamError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(mode) = env::var("STREAMFRAME_MODE") {
            self.decoder.mode = mode.parse()?;
        }

        if let Ok(prefix) = env::var("STREAMFRAME_PREFIX") {
            self.decoder.prefix = prefix;
        }

        if let Ok(max) = env::var("STREAMFRAME_MAX_BUFFER") {
            let max = max.parse::<usize>().map_err(|e| {
                StreamError::ConfigError(format!("Invalid max buffer value: {}", e))
            })?;
            self.decoder.max_buffer_bytes = Some(max);
        }

        if let Ok(base_url) = env::var("STREAMFRAME_BASE_URL") {
            self.backend.base_url = base_url;
        }

        if let Ok(timeout) = env::var("STREAMFRAME_TIMEOUT_SECS") {
            self.backend.timeout_secs = timeout.parse::<u64>().map_err(|e| {
                StreamError::ConfigError(format!("Invalid timeout value: {}", e))
            })?;
        }

        if let Ok(timeout) = env::var("STREAMFRAME_CONNECT_TIMEOUT_SECS") {
            self.backend.connect_timeout_secs = timeout.parse::<u64>().map_err(|e| {
                StreamError::ConfigError(format!("Invalid connect timeout value: {}", e))
            })?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.decoder.validate()?;

        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(StreamError::ConfigError(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.backend.base_url
            )));
        }

        if self.backend.timeout_secs == 0 || self.backend.connect_timeout_secs == 0 {
            return Err(StreamError::ConfigError(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl DecoderConfig {
    pub fn new(mode: FramingMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mode == FramingMode::Sse && self.prefix.trim().is_empty() {
            return Err(StreamError::ConfigError("Prefix is empty".to_string()));
        }

        if self.prefix.contains('\n') {
            return Err(StreamError::ConfigError(
                "Prefix must not contain a newline".to_string(),
            ));
        }

        if self.max_buffer_bytes == Some(0) {
            return Err(StreamError::ConfigError(
                "Max buffer must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let valid_config = StreamConfig::default();
        assert!(valid_config.validate().is_ok());

        let invalid_config = StreamConfig {
            decoder: DecoderConfig {
                mode: FramingMode::Sse,
                prefix: "  ".to_string(),
                max_buffer_bytes: None,
            },
            backend: BackendConfig::default(),
        };
        assert!(invalid_config.validate().is_err());

        let invalid_config = StreamConfig {
            decoder: DecoderConfig::new(FramingMode::Brace),
            backend: BackendConfig {
                base_url: "localhost:8000".to_string(),
                ..Default::default()
            },
        };
        assert!(invalid_config.validate().is_err());

        let invalid_config = StreamConfig {
            decoder: DecoderConfig {
                max_buffer_bytes: Some(0),
                ..Default::default()
            },
            backend: BackendConfig::default(),
        };
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = StreamConfig::from_toml_str(
            r#"
            [decoder]
            mode = "brace"
            max_buffer_bytes = 1048576

            [backend]
            base_url = "http://127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.decoder.mode, FramingMode::Brace);
        assert_eq!(config.decoder.prefix, "data: ");
        assert_eq!(config.decoder.max_buffer_bytes, Some(1048576));
        assert_eq!(config.backend.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.backend.timeout_secs, 300);
        assert_eq!(config.backend.connect_timeout_secs, 10);
    }

    #[test]
    fn test_parse_toml_defaults() {
        let config = StreamConfig::from_toml_str("").unwrap();
        assert_eq!(config.decoder.mode, FramingMode::Sse);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_bad_mode() {
        let result = StreamConfig::from_toml_str("[decoder]\nmode = \"xml\"\n");
        assert!(matches!(result, Err(StreamError::ConfigError(_))));
    }
}
