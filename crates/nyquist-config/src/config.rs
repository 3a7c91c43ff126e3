//! Service configuration file format.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::paths::default_config_path;

/// Complete configuration of the analyze/resample service.
///
/// Every section and field is optional in the file; missing values take the
/// defaults listed on each field.
///
/// # TOML Format
///
/// ```toml
/// [analysis]
/// significance_ratio = 0.01
///
/// [playback]
/// headroom = 0.85
/// playback_rate = 44100
/// min_native_rate = 8000
///
/// [limits]
/// max_input_bytes = 67108864
/// max_duration_secs = 600.0
/// max_target_rate = 768000
///
/// [sessions]
/// ttl_secs = 3600
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Bandwidth measurement settings.
    pub analysis: AnalysisConfig,
    /// Playback encoding settings.
    pub playback: PlaybackConfig,
    /// Per-request resource limits.
    pub limits: LimitsConfig,
    /// Session retention settings.
    pub sessions: SessionsConfig,
}

/// `[analysis]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Fraction of the peak magnitude a bin must exceed (default 0.01).
    pub significance_ratio: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_ratio: 0.01,
        }
    }
}

/// `[playback]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlaybackConfig {
    /// Peak level after normalization (default 0.85).
    pub headroom: f32,
    /// Rate low-rate output is converted back up to (default 44100).
    pub playback_rate: u32,
    /// Targets below this rate are converted to `playback_rate` (default 8000).
    pub min_native_rate: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            headroom: 0.85,
            playback_rate: 44100,
            min_native_rate: 8000,
        }
    }
}

/// `[limits]` section. Omitted keys keep their defaults; a key set to `0`
/// removes that limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest accepted upload in bytes.
    #[serde(with = "zero_is_unlimited")]
    pub max_input_bytes: Option<u64>,
    /// Longest accepted recording in seconds.
    #[serde(with = "zero_is_unlimited")]
    pub max_duration_secs: Option<f64>,
    /// Highest accepted resampling target in Hz.
    #[serde(with = "zero_is_unlimited")]
    pub max_target_rate: Option<u32>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: Some(64 * 1024 * 1024),
            max_duration_secs: Some(600.0),
            max_target_rate: Some(768_000),
        }
    }
}

impl LimitsConfig {
    /// No limits at all.
    pub fn unlimited() -> Self {
        Self {
            max_input_bytes: None,
            max_duration_secs: None,
            max_target_rate: None,
        }
    }
}

/// Maps a TOML `0` to `None` and back.
mod zero_is_unlimited {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize + Default + Copy,
    {
        value.unwrap_or_default().serialize(serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default + PartialEq,
    {
        let value = T::deserialize(deserializer)?;
        Ok((value != T::default()).then_some(value))
    }
}

/// `[sessions]` section. With neither field set, sessions live for the
/// whole process.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionsConfig {
    /// Forget sessions this many seconds after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
    /// Keep at most this many sessions, dropping the oldest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

impl SessionsConfig {
    /// Session time-to-live, if configured.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl ServiceConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for a process.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present, and built-in defaults otherwise.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let path = default_config_path();
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;

        Ok(())
    }

    /// Check every setting against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.analysis.significance_ratio;
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::invalid(
                "analysis.significance_ratio",
                format!("must be within [0, 1], got {ratio}"),
            ));
        }

        let headroom = self.playback.headroom;
        if !headroom.is_finite() || headroom <= 0.0 || headroom > 1.0 {
            return Err(ConfigError::invalid(
                "playback.headroom",
                format!("must be within (0, 1], got {headroom}"),
            ));
        }
        if self.playback.playback_rate == 0 {
            return Err(ConfigError::invalid("playback.playback_rate", "must be positive"));
        }

        if self.limits.max_input_bytes == Some(0) {
            return Err(ConfigError::invalid(
                "limits.max_input_bytes",
                "must be positive (None removes the limit)",
            ));
        }
        if let Some(secs) = self.limits.max_duration_secs
            && !(secs.is_finite() && secs > 0.0)
        {
            return Err(ConfigError::invalid(
                "limits.max_duration_secs",
                format!("must be a positive number of seconds or 0 for no limit, got {secs}"),
            ));
        }
        if self.limits.max_target_rate == Some(0) {
            return Err(ConfigError::invalid(
                "limits.max_target_rate",
                "must be positive (None removes the limit)",
            ));
        }

        match (self.sessions.ttl_secs, self.sessions.capacity) {
            (Some(_), Some(_)) => Err(ConfigError::invalid(
                "sessions",
                "set either ttl_secs or capacity, not both",
            )),
            (Some(0), None) => Err(ConfigError::invalid("sessions.ttl_secs", "must be positive")),
            (None, Some(0)) => Err(ConfigError::invalid("sessions.capacity", "must be positive")),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = ServiceConfig::default();
        assert_eq!(config.analysis.significance_ratio, 0.01);
        assert_eq!(config.playback.headroom, 0.85);
        assert_eq!(config.playback.playback_rate, 44100);
        assert_eq!(config.playback.min_native_rate, 8000);
        assert_eq!(config.sessions, SessionsConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(ServiceConfig::from_toml("").unwrap(), ServiceConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = ServiceConfig::from_toml("[playback]\nheadroom = 0.5\n").unwrap();
        assert_eq!(config.playback.headroom, 0.5);
        assert_eq!(config.playback.playback_rate, 44100);
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn partial_limits_section_keeps_other_limits() {
        let config = ServiceConfig::from_toml("[limits]\nmax_target_rate = 96000\n").unwrap();
        let defaults = LimitsConfig::default();
        assert_eq!(config.limits.max_target_rate, Some(96000));
        assert_eq!(config.limits.max_input_bytes, defaults.max_input_bytes);
        assert_eq!(config.limits.max_duration_secs, defaults.max_duration_secs);
    }

    #[test]
    fn zero_limit_means_unlimited() {
        let config = ServiceConfig::from_toml(
            "[limits]\nmax_input_bytes = 0\nmax_duration_secs = 0\nmax_target_rate = 0\n",
        )
        .unwrap();
        assert_eq!(config.limits, LimitsConfig::unlimited());

        let config = ServiceConfig::from_toml("[limits]\nmax_duration_secs = 0.0\n").unwrap();
        assert_eq!(config.limits.max_duration_secs, None);
        assert_eq!(config.limits.max_target_rate, Some(768_000));
    }

    #[test]
    fn unlimited_serializes_as_zero() {
        let config = ServiceConfig {
            limits: LimitsConfig::unlimited(),
            ..ServiceConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert!(text.contains("max_target_rate = 0"), "{text}");
    }

    #[test]
    fn sessions_ttl() {
        let config = ServiceConfig::from_toml("[sessions]\nttl_secs = 90\n").unwrap();
        assert_eq!(config.sessions.ttl(), Some(Duration::from_secs(90)));
        assert_eq!(config.sessions.capacity, None);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = ServiceConfig::from_toml("[playback]\nvolume = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cases = [
            "[analysis]\nsignificance_ratio = 1.5\n",
            "[playback]\nheadroom = 0.0\n",
            "[playback]\nplayback_rate = 0\n",
            "[limits]\nmax_duration_secs = -1.0\n",
            "[limits]\nmax_duration_secs = nan\n",
            "[sessions]\nttl_secs = 0\n",
            "[sessions]\nttl_secs = 5\ncapacity = 10\n",
        ];
        for case in cases {
            let err = ServiceConfig::from_toml(case).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{case}: {err}");
        }
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = ServiceConfig::default();
        config.sessions.capacity = Some(32);
        config.limits = LimitsConfig::unlimited();

        let text = config.to_toml().unwrap();
        assert_eq!(ServiceConfig::from_toml(&text).unwrap(), config);
    }
}
