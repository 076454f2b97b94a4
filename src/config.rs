use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSection,
    pub flow: FlowSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlowSection {
    pub loading_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiSection::default(),
            flow: FlowSection::default(),
        }
    }
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for FlowSection {
    fn default() -> Self {
        // Matches the original flow: a short pause while the backend warms up
        // the first AI turn.
        Self {
            loading_delay_ms: 2500,
        }
    }
}

impl AppConfig {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path_ref = path.as_ref();
        match fs::read_to_string(path_ref) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!(
                        "Failed to parse config file '{}': {err}. Using defaults.",
                        path_ref.display()
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn loading_delay(&self) -> Duration {
        Duration::from_millis(self.flow.loading_delay_ms)
    }
}
