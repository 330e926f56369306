use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Complete configuration for the explainer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub provider: ProviderConfig,
}

/// Simulation parameters and the beta control's range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Starting DPO beta (default: 0.1).
    pub default_beta: f64,
    /// Lower bound of the beta control (default: 0.05).
    pub beta_min: f64,
    /// Upper bound of the beta control (default: 1.0).
    pub beta_max: f64,
    /// Beta control granularity (default: 0.05).
    pub beta_step: f64,
    /// Displayed learning rate (default: 1e-5).
    pub learning_rate: f64,
    /// Seed for the simulated log-prob draw. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

/// Scenario provider endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the generative language API.
    pub api_base: String,
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model_id: String,
    /// API key. Filled from `GEMINI_API_KEY` or `API_KEY` when empty.
    pub api_key: String,
    /// Request timeout in seconds (default: 60).
    pub timeout_secs: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_beta: 0.1,
            beta_min: 0.05,
            beta_max: 1.0,
            beta_step: 0.05,
            learning_rate: 1e-5,
            seed: None,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".into(),
            model_id: "gemini-2.5-flash".into(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file, or defaults when no path is given, then fill
    /// the API key from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file: {}", path.display()))?;
                serde_json::from_str(&data).context("failed to parse config JSON")?
            }
            None => Self::default(),
        };
        config.apply_env_key(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn apply_env_key(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if !self.provider.api_key.is_empty() {
            return;
        }
        if let Some(key) = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
        {
            self.provider.api_key = key;
        }
    }

    fn validate(&self) -> Result<()> {
        let s = &self.simulation;
        if !(s.beta_min > 0.0 && s.beta_min <= s.beta_max && s.beta_step > 0.0) {
            anyhow::bail!(
                "invalid beta range: min {}, max {}, step {}",
                s.beta_min,
                s.beta_max,
                s.beta_step
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"simulation":{"seed":7},"provider":{"timeout_secs":5}}"#)
                .unwrap();
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.default_beta, 0.1);
        assert_eq!(config.provider.timeout_secs, 5);
        assert_eq!(config.provider.model_id, "gemini-2.5-flash");
    }

    #[test]
    fn test_env_key_fills_empty_key_only() {
        let mut config = AppConfig::default();
        config.apply_env_key(|name| (name == "API_KEY").then(|| "from-env".to_string()));
        assert_eq!(config.provider.api_key, "from-env");

        let mut config = AppConfig::default();
        config.provider.api_key = "explicit".into();
        config.apply_env_key(|_| Some("from-env".to_string()));
        assert_eq!(config.provider.api_key, "explicit");
    }

    #[test]
    fn test_gemini_key_takes_precedence() {
        let mut config = AppConfig::default();
        config.apply_env_key(|name| Some(name.to_lowercase()));
        assert_eq!(config.provider.api_key, "gemini_api_key");
    }

    #[test]
    fn test_rejects_inverted_beta_range() {
        let mut config = AppConfig::default();
        config.simulation.beta_min = 2.0;
        assert!(config.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }
}
