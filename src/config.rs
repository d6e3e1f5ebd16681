//! Service configuration from environment variables.
//!
//! Every key has a default except the vendor credentials; a missing
//! credential disables that vendor instead of failing startup.

use crate::assistant::gemini::{DEFAULT_BASE_URL as GEMINI_BASE_URL, DEFAULT_MODEL as GEMINI_MODEL};
use crate::conversation::voice::DEFAULT_VOICE_BASE_URL;
use crate::model::Language;
use ::config::{Config as ConfigLib, Environment};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const PORT_ENV_VAR: &str = "PORT";
pub const RESTAURANT_NAME_ENV_VAR: &str = "RESTAURANT_NAME";
pub const TAX_RATE_ENV_VAR: &str = "TAX_RATE";
pub const MENU_CACHE_TTL_ENV_VAR: &str = "MENU_CACHE_TTL_SECS";
pub const MUTATION_RETRIES_ENV_VAR: &str = "ORDER_MUTATION_RETRIES";
pub const CHECKOUT_URL_ENV_VAR: &str = "CHECKOUT_URL";
pub const GEMINI_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL_ENV_VAR: &str = "GEMINI_MODEL";
pub const GEMINI_BASE_URL_ENV_VAR: &str = "GEMINI_BASE_URL";
pub const HTTP_TIMEOUT_ENV_VAR: &str = "HTTP_TIMEOUT_SECS";
pub const VOICE_RESTAURANT_ENV_VAR: &str = "VOICE_DEFAULT_RESTAURANT_ID";
pub const VOICE_TABLE_ENV_VAR: &str = "VOICE_DEFAULT_TABLE_ID";
pub const VOICE_LANGUAGE_ENV_VAR: &str = "VOICE_DEFAULT_LANGUAGE";
pub const ELEVENLABS_API_KEY_ENV_VAR: &str = "ELEVENLABS_API_KEY";
pub const ELEVENLABS_AGENT_ID_ENV_VAR: &str = "ELEVENLABS_AGENT_ID";
pub const ELEVENLABS_BASE_URL_ENV_VAR: &str = "ELEVENLABS_BASE_URL";
pub const ACTOR_BUFFER_ENV_VAR: &str = "ACTOR_BUFFER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceVendorConfig {
    pub api_key: String,
    pub agent_id: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub restaurant_name: String,
    /// One rate for every restaurant.
    pub tax_rate: f64,
    pub menu_cache_ttl: Duration,
    pub mutation_retries: u32,
    pub checkout_url: String,
    pub http_timeout: Duration,
    pub actor_buffer: usize,
    pub voice_restaurant_id: String,
    pub voice_table_id: String,
    pub voice_language: Language,
    /// `None` without `GEMINI_API_KEY`.
    pub gemini: Option<GeminiConfig>,
    /// `None` unless both the voice key and agent id are set.
    pub voice_vendor: Option<VoiceVendorConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            restaurant_name: "Restaurant AI Demo".to_string(),
            tax_rate: 0.08,
            menu_cache_ttl: Duration::from_secs(300),
            mutation_retries: 3,
            checkout_url: "/checkout".to_string(),
            http_timeout: Duration::from_secs(30),
            actor_buffer: 64,
            voice_restaurant_id: "demo_restaurant".to_string(),
            voice_table_id: "table_1".to_string(),
            voice_language: Language::Es,
            gemini: None,
            voice_vendor: None,
        }
    }
}

/// Flat view of the environment. Field names are the lowercased variable
/// names.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct EnvSettings {
    port: u16,
    restaurant_name: String,
    tax_rate: f64,
    menu_cache_ttl_secs: u64,
    order_mutation_retries: u32,
    checkout_url: String,
    http_timeout_secs: u64,
    actor_buffer: usize,
    voice_default_restaurant_id: String,
    voice_default_table_id: String,
    voice_default_language: String,
    gemini_api_key: Option<String>,
    gemini_model: String,
    gemini_base_url: String,
    elevenlabs_api_key: Option<String>,
    elevenlabs_agent_id: Option<String>,
    elevenlabs_base_url: String,
}

impl Default for EnvSettings {
    fn default() -> Self {
        let d = Config::default();
        Self {
            port: d.port,
            restaurant_name: d.restaurant_name,
            tax_rate: d.tax_rate,
            menu_cache_ttl_secs: d.menu_cache_ttl.as_secs(),
            order_mutation_retries: d.mutation_retries,
            checkout_url: d.checkout_url,
            http_timeout_secs: d.http_timeout.as_secs(),
            actor_buffer: d.actor_buffer,
            voice_default_restaurant_id: d.voice_restaurant_id,
            voice_default_table_id: d.voice_table_id,
            voice_default_language: d.voice_language.code().to_string(),
            gemini_api_key: None,
            gemini_model: GEMINI_MODEL.to_string(),
            gemini_base_url: GEMINI_BASE_URL.to_string(),
            elevenlabs_api_key: None,
            elevenlabs_agent_id: None,
            elevenlabs_base_url: DEFAULT_VOICE_BASE_URL.to_string(),
        }
    }
}

fn credential(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        let settings: EnvSettings = ConfigLib::builder()
            .add_source(env.try_parsing(true).ignore_empty(true))
            .build()?
            .try_deserialize()?;
        let config = Self::validate(settings)?;
        info!(
            port = config.port,
            restaurant = %config.restaurant_name,
            tax_rate = config.tax_rate,
            language = %config.voice_language,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn validate(s: EnvSettings) -> Result<Self, ConfigError> {
        if !(0.0..1.0).contains(&s.tax_rate) {
            return Err(ConfigError::Invalid {
                key: TAX_RATE_ENV_VAR,
                value: s.tax_rate.to_string(),
                reason: "must be in [0, 1)".to_string(),
            });
        }
        if s.actor_buffer == 0 {
            return Err(ConfigError::Invalid {
                key: ACTOR_BUFFER_ENV_VAR,
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        let voice_language = s
            .voice_default_language
            .parse::<Language>()
            .map_err(|reason| ConfigError::Invalid {
                key: VOICE_LANGUAGE_ENV_VAR,
                value: s.voice_default_language.clone(),
                reason,
            })?;

        let gemini = credential(s.gemini_api_key).map(|api_key| GeminiConfig {
            api_key,
            model: s.gemini_model,
            base_url: s.gemini_base_url,
        });
        if gemini.is_none() {
            info!("{GEMINI_API_KEY_ENV_VAR} not set; chat replies are disabled");
        }
        let voice_vendor = match (
            credential(s.elevenlabs_api_key),
            credential(s.elevenlabs_agent_id),
        ) {
            (Some(api_key), Some(agent_id)) => Some(VoiceVendorConfig {
                api_key,
                agent_id,
                base_url: s.elevenlabs_base_url,
            }),
            _ => {
                info!("Voice vendor credentials not set; signed URLs are disabled");
                None
            }
        };

        Ok(Self {
            port: s.port,
            restaurant_name: s.restaurant_name,
            tax_rate: s.tax_rate,
            menu_cache_ttl: Duration::from_secs(s.menu_cache_ttl_secs),
            mutation_retries: s.order_mutation_retries,
            checkout_url: s.checkout_url,
            http_timeout: Duration::from_secs(s.http_timeout_secs),
            actor_buffer: s.actor_buffer,
            voice_restaurant_id: s.voice_default_restaurant_id,
            voice_table_id: s.voice_default_table_id,
            voice_language,
            gemini,
            voice_vendor,
        })
    }
}
