//! Layered settings loading.
//!
//! A [`Loader`] starts from the framework defaults, optionally replaces
//! them with a settings file, then applies environment overrides and
//! connection-string variables on top. Later layers win.

use std::path::Path;

use sextant_dsn::{CacheDsn, DatabaseDsn};
use serde_json::Value;

use crate::env::{overrides_from_env, EnvSource};
use crate::error::SettingsError;
use crate::schema::{DsnField, DsnTarget};
use crate::settings::{Settings, SettingsMap};

/// Settings file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Result<Self, SettingsError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(SettingsError::validation(format!(
                "unsupported settings file extension: {}",
                path.display()
            ))),
        }
    }
}

/// Builder assembling [`Settings`] from layered sources.
///
/// # Example
///
/// ```
/// use sextant_settings::{EnvSource, Loader};
///
/// let env = EnvSource::from_pairs([("DJANGO_DEBUG", "true")]);
/// let settings = Loader::new().with_env(env).load().unwrap();
/// assert!(settings.debug);
/// ```
#[derive(Debug)]
pub struct Loader {
    settings: Settings,
    env: Option<EnvSource>,
    dsn_fields: Vec<DsnField>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Start from the framework defaults and the built-in DSN variables.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            env: None,
            dsn_fields: DsnField::builtin(),
        }
    }

    /// Replace the base layer with explicit settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the base layer with a settings file. The format is chosen
    /// from the file extension (`.toml` or `.json`).
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::file_not_found(path));
        }
        let format = FileFormat::from_path(path)?;
        let content =
            std::fs::read_to_string(path).map_err(|err| SettingsError::read_error(path, err))?;
        tracing::debug!(path = %path.display(), "loading settings file");
        self.settings = parse_document(&content, format)?;
        Ok(self)
    }

    /// As [`Loader::with_file`], but a missing file leaves the current base
    /// layer in place.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if path.exists() {
            self.with_file(path)
        } else {
            tracing::debug!(path = %path.display(), "optional settings file not present");
            Ok(self)
        }
    }

    /// Replace the base layer with an in-memory document.
    pub fn with_string(mut self, content: &str, format: FileFormat) -> Result<Self, SettingsError> {
        self.settings = parse_document(content, format)?;
        Ok(self)
    }

    /// Apply overrides from the given environment snapshot.
    #[must_use]
    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = Some(env);
        self
    }

    /// Apply overrides from the live process environment.
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env(EnvSource::from_process())
    }

    /// Load a `.env` file into the process environment before snapshotting
    /// it. Variables already set in the process keep their values.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded dotenv file");
        }
        self.with_process_env()
    }

    /// Register an additional connection-string variable, e.g.
    /// `SECONDARY_DATABASE_URL` feeding the `secondary` database alias.
    #[must_use]
    pub fn with_dsn_field(
        mut self,
        var: impl Into<String>,
        target: DsnTarget,
        alias: impl Into<String>,
    ) -> Self {
        self.dsn_fields.push(DsnField::new(var, target, alias));
        self
    }

    /// Resolve all layers into a [`Settings`] value.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value fails its registered
    /// conversion, a DSN fails to parse, or the merged document no longer
    /// satisfies the settings model.
    pub fn load(self) -> Result<Settings, SettingsError> {
        let mut settings = self.settings;
        let Some(env) = self.env else {
            return Ok(settings);
        };

        let overrides = overrides_from_env(&env)?;
        if !overrides.is_empty() {
            settings = apply_overrides(settings, overrides)?;
        }
        for dsn_field in &self.dsn_fields {
            let Some(raw) = env.get(&dsn_field.var) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            match dsn_field.target {
                DsnTarget::Database => {
                    let dsn = DatabaseDsn::parse(raw)?;
                    settings
                        .dsn_defaults
                        .databases
                        .push((dsn_field.alias.clone(), dsn));
                }
                DsnTarget::Cache => {
                    let dsn = CacheDsn::parse(raw)?;
                    settings
                        .dsn_defaults
                        .caches
                        .push((dsn_field.alias.clone(), dsn));
                }
            }
        }
        Ok(settings)
    }
}

fn parse_document(content: &str, format: FileFormat) -> Result<Settings, SettingsError> {
    match format {
        FileFormat::Toml => Ok(toml::from_str(content)?),
        FileFormat::Json => Ok(serde_json::from_str(content)?),
    }
}

/// Re-validate the settings with the given names replaced.
fn apply_overrides(settings: Settings, overrides: SettingsMap) -> Result<Settings, SettingsError> {
    let dsn_defaults = settings.dsn_defaults.clone();
    let Value::Object(mut document) = serde_json::to_value(&settings)? else {
        return Err(SettingsError::validation(
            "settings did not serialize to a mapping",
        ));
    };
    for (name, value) in overrides {
        document.insert(name, value);
    }
    let mut merged: Settings = serde_json::from_value(Value::Object(document))?;
    merged.dsn_defaults = dsn_defaults;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_defaults_without_env() {
        let settings = Loader::new().load().unwrap();
        assert!(!settings.debug);
        assert!(settings.databases.is_empty());
    }

    #[test]
    fn test_env_overrides_apply() {
        let env = EnvSource::from_pairs([
            ("DJANGO_DEBUG", "1"),
            ("DJANGO_TIME_ZONE", "UTC"),
            ("DJANGO_SESSION_COOKIE_AGE", "3600"),
        ]);
        let settings = Loader::new().with_env(env).load().unwrap();
        assert!(settings.debug);
        assert_eq!(settings.time_zone, "UTC");
        assert_eq!(settings.session_cookie_age, 3600);
    }

    #[test]
    fn test_dsn_variables_are_queued() {
        let env = EnvSource::from_pairs([
            ("DATABASE_URL", "postgres://user@host/app"),
            ("CACHE_URL", "redis://host:6379/0"),
        ]);
        let settings = Loader::new().with_env(env).load().unwrap();
        assert_eq!(settings.dsn_defaults.databases.len(), 1);
        assert_eq!(settings.dsn_defaults.databases[0].0, "default");
        assert_eq!(settings.dsn_defaults.caches.len(), 1);
    }

    #[test]
    fn test_invalid_dsn_variable_fails() {
        let env = EnvSource::from_pairs([("DATABASE_URL", "gopher://nope")]);
        assert!(Loader::new().with_env(env).load().is_err());
    }

    #[test]
    fn test_custom_dsn_field() {
        let env = EnvSource::from_pairs([("SECONDARY_DATABASE_URL", "sqlite:///two.db")]);
        let settings = Loader::new()
            .with_env(env)
            .with_dsn_field("SECONDARY_DATABASE_URL", DsnTarget::Database, "secondary")
            .load()
            .unwrap();
        assert_eq!(settings.dsn_defaults.databases[0].0, "secondary");
    }

    #[test]
    fn test_toml_document() {
        let content = r#"
            DEBUG = true
            ALLOWED_HOSTS = ["example.com"]

            [DATABASES]
            default = "sqlite:///app.db"
        "#;
        let settings = Loader::new()
            .with_string(content, FileFormat::Toml)
            .unwrap()
            .load()
            .unwrap();
        assert!(settings.debug);
        assert_eq!(settings.allowed_hosts, ["example.com"]);
        assert_eq!(settings.databases["default"].name, "app.db");
    }

    #[test]
    fn test_env_wins_over_file() {
        let content = "DEBUG = true\nTIME_ZONE = \"UTC\"\n";
        let env = EnvSource::from_pairs([("DJANGO_DEBUG", "false")]);
        let settings = Loader::new()
            .with_string(content, FileFormat::Toml)
            .unwrap()
            .with_env(env)
            .load()
            .unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.time_zone, "UTC");
    }

    #[test]
    fn test_file_roundtrip() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"DEBUG": true}}"#).unwrap();
        let settings = Loader::new().with_file(file.path()).unwrap().load().unwrap();
        assert!(settings.debug);
    }

    #[test]
    fn test_missing_file_errors() {
        let err = Loader::new()
            .with_file("/nonexistent/settings.toml")
            .unwrap_err();
        assert!(matches!(err, SettingsError::FileNotFound { .. }));
    }

    #[test]
    fn test_missing_optional_file_is_skipped() {
        let settings = Loader::new()
            .with_optional_file("/nonexistent/settings.toml")
            .unwrap()
            .load()
            .unwrap();
        assert!(!settings.debug);
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        let result = Loader::new().with_string("NOT_A_SETTING = 1\n", FileFormat::Toml);
        assert!(result.is_err());
    }
}
