//! Environment variable layer.
//!
//! Settings overrides are read as `DJANGO_<NAME>` and converted according
//! to the [`FieldKind`] registered for the name. Connection-string
//! variables (`DATABASE_URL` and friends) are read without the prefix.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::SettingsError;
use crate::schema::{FieldKind, FIELDS};
use crate::settings::SettingsMap;

/// Prefix for settings override variables.
pub const ENV_PREFIX: &str = "DJANGO_";

/// A snapshot of environment variables.
///
/// Loading always reads from a snapshot rather than the live process
/// environment, so tests can feed literal pairs without mutating global
/// state.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: BTreeMap<String, String>,
}

impl EnvSource {
    /// An empty source.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a source from literal `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable by exact name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Collect prefixed overrides from `env`, converted per the field table.
pub(crate) fn overrides_from_env(env: &EnvSource) -> Result<SettingsMap, SettingsError> {
    let mut overrides = SettingsMap::new();
    for spec in FIELDS {
        let var = format!("{ENV_PREFIX}{}", spec.name);
        let Some(raw) = env.get(&var) else {
            continue;
        };
        let value =
            convert(spec.kind, raw).map_err(|reason| SettingsError::env_parse(&var, reason))?;
        tracing::trace!(var = %var, "applying environment override");
        overrides.insert(spec.name.to_string(), value);
    }
    Ok(overrides)
}

/// Convert one raw environment string.
fn convert(kind: FieldKind, raw: &str) -> Result<Value, String> {
    match kind {
        FieldKind::Str | FieldKind::Path => Ok(Value::String(raw.to_string())),
        FieldKind::OptStr | FieldKind::OptPath => {
            if raw.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(Value::String(raw.to_string()))
            }
        }
        FieldKind::Bool => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| format!("expected a boolean, got {raw:?}")),
        FieldKind::OptBool => {
            if raw.is_empty() {
                Ok(Value::Null)
            } else {
                parse_bool(raw)
                    .map(Value::Bool)
                    .ok_or_else(|| format!("expected a boolean, got {raw:?}"))
            }
        }
        FieldKind::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("expected an integer, got {raw:?}")),
        FieldKind::OptInt => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                Ok(Value::Null)
            } else {
                trimmed
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| format!("expected an integer, got {raw:?}"))
            }
        }
        FieldKind::Json => {
            serde_json::from_str(raw).map_err(|err| format!("expected JSON ({err})"))
        }
    }
}

/// Parse the conventional boolean spellings.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_spellings() {
        for raw in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(parse_bool(raw), Some(true), "{raw}");
        }
        for raw in ["false", "0", "No", "OFF"] {
            assert_eq!(parse_bool(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_convert_scalars() {
        assert_eq!(
            convert(FieldKind::Str, "en-us").unwrap(),
            Value::String("en-us".to_string())
        );
        assert_eq!(convert(FieldKind::Int, "25").unwrap(), Value::from(25));
        assert_eq!(convert(FieldKind::Bool, "yes").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_convert_optional_empty_clears() {
        assert_eq!(convert(FieldKind::OptStr, "").unwrap(), Value::Null);
        assert_eq!(convert(FieldKind::OptInt, "").unwrap(), Value::Null);
        assert_eq!(convert(FieldKind::OptInt, "none").unwrap(), Value::Null);
        assert_eq!(convert(FieldKind::OptInt, "30").unwrap(), Value::from(30));
    }

    #[test]
    fn test_convert_json() {
        assert_eq!(
            convert(FieldKind::Json, r#"["a.example.com", "b.example.com"]"#).unwrap(),
            serde_json::json!(["a.example.com", "b.example.com"])
        );
        assert!(convert(FieldKind::Json, "not json").is_err());
    }

    #[test]
    fn test_convert_rejects_bad_scalars() {
        assert!(convert(FieldKind::Bool, "definitely").is_err());
        assert!(convert(FieldKind::Int, "threeve").is_err());
    }

    #[test]
    fn test_overrides_from_env() {
        let env = EnvSource::from_pairs([
            ("DJANGO_DEBUG", "true"),
            ("DJANGO_ALLOWED_HOSTS", r#"["example.com"]"#),
            ("DJANGO_EMAIL_PORT", "587"),
            ("UNRELATED", "ignored"),
            ("DEBUG", "ignored without prefix"),
        ]);
        let overrides = overrides_from_env(&env).unwrap();
        assert_eq!(overrides.len(), 3);
        assert_eq!(overrides["DEBUG"], Value::Bool(true));
        assert_eq!(overrides["ALLOWED_HOSTS"], serde_json::json!(["example.com"]));
        assert_eq!(overrides["EMAIL_PORT"], Value::from(587));
    }

    #[test]
    fn test_overrides_report_offending_variable() {
        let env = EnvSource::from_pairs([("DJANGO_EMAIL_PORT", "smtp")]);
        let err = overrides_from_env(&env).unwrap_err();
        assert!(err.to_string().contains("DJANGO_EMAIL_PORT"));
    }
}
