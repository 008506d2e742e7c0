use anyhow::{Context, Result};
use ootd_core::parse_tz;
use ootd_suggest::{EngineSettings, GenerationParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::ensure_ootd_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub llm: LlmSection,
    pub history: HistorySection,
    pub profile: ProfileSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Overridden by `DATABASE_URL`.
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// "gemini" or "openai". The API key comes from GEMINI_API_KEY / OPENAI_API_KEY.
    pub provider: String,
    pub model: String,
    /// Provider default when unset.
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    /// How many previous suggestion sets per user are fed back to the model.
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSection {
    /// IANA timezone for "today" when deriving a user's age.
    pub timezone: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/ootd".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        let generation = GenerationParams::default();
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            base_url: None,
            temperature: generation.temperature,
            max_output_tokens: generation.max_output_tokens,
            timeout_secs: 60,
        }
    }
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            capacity: ootd_suggest::DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

impl Config {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            generation: GenerationParams {
                max_output_tokens: self.llm.max_output_tokens,
                temperature: self.llm.temperature,
            },
            model_timeout: Duration::from_secs(self.llm.timeout_secs),
            timezone: self.profile.timezone.clone(),
        }
    }

    /// Reject values that would otherwise only surface mid-request.
    pub fn validate(&self) -> Result<()> {
        parse_tz(&self.profile.timezone).context("profile.timezone")?;
        Ok(())
    }

    /// Database URL, preferring `DATABASE_URL` from the environment.
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.database.url.clone())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_ootd_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s).context("parse config.toml")?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back = parse_config(&s).unwrap();
        assert_eq!(back.llm.model, "gemini-2.0-flash");
        assert_eq!(back.history.capacity, 1);
        assert_eq!(back.server.bind, "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg = parse_config("[llm]\nprovider = \"openai\"\nmodel = \"gpt-4o-mini\"\n").unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.max_output_tokens, 690);
        assert_eq!(cfg.profile.timezone, "UTC");

        let settings = cfg.engine_settings();
        assert_eq!(settings.model_timeout, Duration::from_secs(60));
        assert_eq!(settings.generation.temperature, 0.7);
    }

    #[test]
    fn test_invalid_timezone_rejected_on_load() {
        let err = parse_config("[profile]\ntimezone = \"Mars/Olympus\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid timezone: Mars/Olympus"));

        let cfg = parse_config("[profile]\ntimezone = \"America/Chicago\"\n").unwrap();
        assert_eq!(cfg.engine_settings().timezone, "America/Chicago");
    }
}
