use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub thresholds: ThresholdConfig,
    pub energy: EnergyRates,
    pub llm: LlmConfig,
    pub sampling: SamplingConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

/// Settings that parse but cannot drive the controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("light band inverted: on_lux ({on}) must be below off_lux ({off})")]
    InvertedLightBand { on: f64, off: f64 },
    #[error("temperature band inverted: off_c ({off}) must be below on_c ({on})")]
    InvertedTemperatureBand { on: f64, off: f64 },
    #[error("posture bad_threshold ({0}) must lie in [0, 1]")]
    PostureOutOfRange(f64),
    #[error("power draw for {device} must be non-negative, got {watts} W")]
    NegativePower { device: &'static str, watts: f64 },
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("llm.max_tokens must be greater than zero")]
    ZeroMaxTokens,
    #[error("sampling.period_seconds must be greater than zero")]
    ZeroSamplePeriod,
}

impl DeskConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied and the result is validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: DeskConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                Self::from_env()
            }
        }
    }

    /// Built-in defaults with env var overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        self.energy.validate()?;
        if self.llm.max_tokens == Some(0) {
            return Err(ConfigError::ZeroMaxTokens);
        }
        if self.sampling.period_seconds == 0 {
            return Err(ConfigError::ZeroSamplePeriod);
        }
        Ok(())
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DESK_LLM_ENABLED") {
            self.llm.enabled = matches!(v.trim(), "1" | "true" | "yes" | "on");
        }
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_ENDPOINT") {
            self.llm.endpoint = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = Some(n);
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TIMEOUT_MS") {
            if let Ok(n) = v.parse() {
                self.llm.request_timeout_ms = n;
            }
        }
    }
}

// ============================================================================
// Thresholds
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub light: LightThresholds,
    pub temperature: TemperatureThresholds,
    pub humidity: HumidityThresholds,
    pub posture: PostureThresholds,
}

/// `NaN` and infinities are legal TOML but compare false against every bound.
fn ensure_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("thresholds.light.on_lux", self.light.on_lux)?;
        ensure_finite("thresholds.light.off_lux", self.light.off_lux)?;
        ensure_finite("thresholds.temperature.on_c", self.temperature.on_c)?;
        ensure_finite("thresholds.temperature.off_c", self.temperature.off_c)?;
        ensure_finite("thresholds.humidity.on_pct", self.humidity.on_pct)?;
        ensure_finite("thresholds.posture.bad_threshold", self.posture.bad_threshold)?;
        if self.light.on_lux >= self.light.off_lux {
            return Err(ConfigError::InvertedLightBand {
                on: self.light.on_lux,
                off: self.light.off_lux,
            });
        }
        if self.temperature.off_c >= self.temperature.on_c {
            return Err(ConfigError::InvertedTemperatureBand {
                on: self.temperature.on_c,
                off: self.temperature.off_c,
            });
        }
        if !(0.0..=1.0).contains(&self.posture.bad_threshold) {
            return Err(ConfigError::PostureOutOfRange(self.posture.bad_threshold));
        }
        Ok(())
    }
}

/// Below `on_lux` the light turns on, above `off_lux` it turns off.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightThresholds {
    pub on_lux: f64,
    pub off_lux: f64,
}

impl Default for LightThresholds {
    fn default() -> Self {
        Self {
            on_lux: 200.0,
            off_lux: 400.0,
        }
    }
}

/// Above `on_c` the fan turns on, below `off_c` it turns off.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TemperatureThresholds {
    pub on_c: f64,
    pub off_c: f64,
}

impl Default for TemperatureThresholds {
    fn default() -> Self {
        Self {
            on_c: 27.0,
            off_c: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HumidityThresholds {
    pub on_pct: f64,
}

impl Default for HumidityThresholds {
    fn default() -> Self {
        Self { on_pct: 65.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PostureThresholds {
    pub bad_threshold: f64,
}

impl Default for PostureThresholds {
    fn default() -> Self {
        Self { bad_threshold: 0.7 }
    }
}

// ============================================================================
// Energy
// ============================================================================

/// Constant power draw (watts) while each device is on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnergyRates {
    pub light_w: f64,
    pub fan_w: f64,
}

impl Default for EnergyRates {
    fn default() -> Self {
        Self {
            light_w: 10.0,
            fan_w: 30.0,
        }
    }
}

impl EnergyRates {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("energy.light_w", self.light_w)?;
        ensure_finite("energy.fan_w", self.fan_w)?;
        if self.light_w < 0.0 {
            return Err(ConfigError::NegativePower {
                device: "light",
                watts: self.light_w,
            });
        }
        if self.fan_w < 0.0 {
            return Err(ConfigError::NegativePower {
                device: "fan",
                watts: self.fan_w,
            });
        }
        Ok(())
    }
}

// ============================================================================
// LLM
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gates every remote call. Off unless explicitly enabled.
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: f32,
    /// Base URL of the provider API. `None` uses the provider's default.
    pub endpoint: Option<String>,
    pub request_timeout_ms: u64,
    /// Name of the env var holding the API key. `None` uses the provider's default.
    pub api_key_env: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "ollama".to_string(),
            model: "llama3".to_string(),
            max_tokens: None,
            temperature: 0.3,
            endpoint: None,
            request_timeout_ms: 3_000,
            api_key_env: None,
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}

// ============================================================================
// Simulation surfaces
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub period_seconds: u64,
    pub duration_seconds: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            period_seconds: 10,
            duration_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Also explain ticks that emitted no action.
    pub explain_every_tick: bool,
    pub posture_message: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            explain_every_tick: false,
            posture_message:
                "Your posture is degrading. Please sit upright and relax your shoulders."
                    .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
