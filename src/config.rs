use std::{
    error::Error,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// Default feature columns of the house dataset.
pub const DEFAULT_FEATURES: [&str; 3] = ["GrLivArea", "BedroomAbvGr", "FullBath"];

/// Application settings, read from a JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub features: Vec<String>,
    pub target: String,
    pub test_size: f64,
    pub seed: u64,
    pub fill_value: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/house_data.csv"),
            model_path: PathBuf::from("models/linear_regression_model.json"),
            scaler_path: PathBuf::from("models/scaler.json"),
            features: DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect(),
            target: "SalePrice".to_string(),
            test_size: 0.2,
            seed: 42,
            fill_value: 0.0,
        }
    }
}

/// Errors produced while loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
            ConfigError::Parse { path, source } if path.as_os_str().is_empty() => {
                write!(f, "invalid config: {source}")
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config '{}': {source}", path.display())
            }
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl AppConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    /// `ConfigError` if the file cannot be read, is not valid JSON for this
    /// structure, or holds inconsistent values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.features.is_empty() {
            return Err(ConfigError::Invalid("features must not be empty".into()));
        }
        if let Some(dup) = self
            .features
            .iter()
            .enumerate()
            .find(|&(i, f)| self.features[..i].contains(f))
            .map(|(_, f)| f)
        {
            return Err(ConfigError::Invalid(format!("feature '{dup}' is listed twice")));
        }
        if self.features.contains(&self.target) {
            return Err(ConfigError::Invalid(format!(
                "target '{}' is also listed as a feature",
                self.target
            )));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if !self.fill_value.is_finite() {
            return Err(ConfigError::Invalid("fill_value must be finite".into()));
        }
        Ok(())
    }

    /// Whether the feature list is the stock one of the house dataset.
    pub fn uses_default_features(&self) -> bool {
        self.features.iter().map(String::as_str).eq(DEFAULT_FEATURES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.uses_default_features());
        assert_eq!(config.seed, 42);
        assert_eq!(config.test_size, 0.2);
    }

    #[test]
    fn partial_override() {
        let config = AppConfig::from_json(
            r#"{ "features": ["LotArea", "GrLivArea"], "seed": 7, "model_path": "out/m.json" }"#,
        )
        .unwrap();
        assert_eq!(config.features, vec!["LotArea", "GrLivArea"]);
        assert_eq!(config.seed, 7);
        assert_eq!(config.model_path, PathBuf::from("out/m.json"));
        assert_eq!(config.target, "SalePrice");
        assert!(!config.uses_default_features());
    }

    #[test]
    fn rejects_inconsistent_values() {
        for json in [
            r#"{ "features": [] }"#,
            r#"{ "features": ["A", "A"] }"#,
            r#"{ "features": ["SalePrice"] }"#,
            r#"{ "test_size": 1.0 }"#,
            r#"{ "test_size": 0 }"#,
        ] {
            assert!(
                matches!(AppConfig::from_json(json), Err(ConfigError::Invalid(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_unknown_fields_and_bad_json() {
        assert!(matches!(
            AppConfig::from_json(r#"{ "learning_rate": 0.1 }"#),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            AppConfig::from_json("not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file() {
        let err = AppConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
