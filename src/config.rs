use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::consts::{
    CONFIG_ENV_PREFIX, DEFAULT_FETCH_PARALLELISM, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_IMAGE_BYTES,
    DEFAULT_PORT, MAX_SCORE,
};
use crate::error::{Error, Result};

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub scoring: ScoringConfig,
    pub sentry_dsn: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let conf = Config::builder()
            .add_source(File::with_name("config.toml").required(false))
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let conf: AppConfig = conf.try_deserialize()?;
        conf.validate()?;

        Ok(conf)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.parallelism == 0 {
            return Err(Error::InvalidConfig(
                "fetch.parallelism must be at least 1".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "fetch.timeout_secs must be at least 1".into(),
            ));
        }
        if self.fetch.max_image_bytes == 0 {
            return Err(Error::InvalidConfig(
                "fetch.max_image_bytes must be at least 1".into(),
            ));
        }

        self.scoring.validate()
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub parallelism: usize,
    pub max_image_bytes: usize,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            parallelism: DEFAULT_FETCH_PARALLELISM,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Every tunable number the scoring pipeline uses.
///
/// The defaults are the reference constants: gradient/mean fusion 0.6/0.4, match threshold 0.25
/// (about 16 of 64 bits), visual-only composite 0.65/0.35, multi-modal composite 0.45/0.35/0.20
/// and band limits 30/120/300 on the 0..=1023 score.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the normalised gradient-hash distance in the fused frame distance
    pub gradient_weight: f64,
    /// Weight of the normalised mean-hash distance in the fused frame distance
    pub mean_weight: f64,
    /// A reference matches when its best fused distance is at most this
    pub match_threshold: f64,
    pub visual_only: VisualOnlyWeights,
    pub multi_modal: MultiModalWeights,
    pub bands: BandLimits,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            gradient_weight: 0.6,
            mean_weight: 0.4,
            match_threshold: 0.25,
            visual_only: VisualOnlyWeights::default(),
            multi_modal: MultiModalWeights::default(),
            bands: BandLimits::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(default)]
pub struct VisualOnlyWeights {
    pub visual: f64,
    pub temporal: f64,
}

impl Default for VisualOnlyWeights {
    fn default() -> Self {
        Self {
            visual: 0.65,
            temporal: 0.35,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(default)]
pub struct MultiModalWeights {
    pub visual: f64,
    pub audio: f64,
    pub temporal: f64,
}

impl Default for MultiModalWeights {
    fn default() -> Self {
        Self {
            visual: 0.45,
            audio: 0.35,
            temporal: 0.20,
        }
    }
}

/// Inclusive upper score of each band; anything above `modified_content_max` is divergent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(default)]
pub struct BandLimits {
    pub verified_original_max: u32,
    pub platform_consistent_max: u32,
    pub modified_content_max: u32,
}

impl Default for BandLimits {
    fn default() -> Self {
        Self {
            verified_original_max: 30,
            platform_consistent_max: 120,
            modified_content_max: 300,
        }
    }
}

fn check_weight(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        check_weight("scoring.gradient_weight", self.gradient_weight)?;
        check_weight("scoring.mean_weight", self.mean_weight)?;
        check_weight("scoring.visual_only.visual", self.visual_only.visual)?;
        check_weight("scoring.visual_only.temporal", self.visual_only.temporal)?;
        check_weight("scoring.multi_modal.visual", self.multi_modal.visual)?;
        check_weight("scoring.multi_modal.audio", self.multi_modal.audio)?;
        check_weight("scoring.multi_modal.temporal", self.multi_modal.temporal)?;

        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(Error::InvalidConfig(format!(
                "scoring.match_threshold must be within [0, 1], got {}",
                self.match_threshold
            )));
        }

        let bands = &self.bands;
        if bands.verified_original_max >= bands.platform_consistent_max
            || bands.platform_consistent_max >= bands.modified_content_max
            || bands.modified_content_max > MAX_SCORE
        {
            return Err(Error::InvalidConfig(format!(
                "scoring.bands must be strictly increasing and at most {}, got {}/{}/{}",
                MAX_SCORE,
                bands.verified_original_max,
                bands.platform_consistent_max,
                bands.modified_content_max
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config_is_valid() {
        let conf = ScoringConfig::default();
        assert!(conf.validate().is_ok());
        assert_eq!(conf.gradient_weight, 0.6);
        assert_eq!(conf.mean_weight, 0.4);
        assert_eq!(conf.match_threshold, 0.25);
        assert_eq!(conf.bands.verified_original_max, 30);
        assert_eq!(conf.bands.platform_consistent_max, 120);
        assert_eq!(conf.bands.modified_content_max, 300);
    }

    #[test]
    fn test_rejects_unordered_bands() {
        let mut conf = ScoringConfig::default();
        conf.bands.platform_consistent_max = 20;
        assert!(matches!(conf.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut conf = ScoringConfig::default();
        conf.multi_modal.audio = -0.1;
        assert!(matches!(conf.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let mut conf = ScoringConfig::default();
        conf.match_threshold = 1.5;
        assert!(conf.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let conf: AppConfig = Config::builder()
            .add_source(config::File::from_str(
                "[fetch]\nparallelism = 4\n[scoring]\nmatch_threshold = 0.2\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(conf.fetch.parallelism, 4);
        assert_eq!(conf.fetch.timeout(), DEFAULT_FETCH_TIMEOUT);
        assert_eq!(conf.scoring.match_threshold, 0.2);
        assert_eq!(conf.scoring.gradient_weight, 0.6);
        assert_eq!(conf.server.port, DEFAULT_PORT);
        assert!(conf.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_parallelism() {
        let mut conf = AppConfig::default();
        conf.fetch.parallelism = 0;
        assert!(conf.validate().is_err());
    }
}
