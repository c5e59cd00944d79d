//! Static schema tables.
//!
//! [`FIELDS`] enumerates every recognized setting with the conversion its
//! environment override uses, and [`DsnField`] describes which environment
//! variables carry connection strings. Both are plain data; lookups never
//! involve runtime type inspection.

/// How a raw environment string converts into a settings value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Taken verbatim.
    Str,
    /// Verbatim; the empty string clears the value.
    OptStr,
    /// `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`, case-insensitive.
    Bool,
    /// As [`FieldKind::Bool`]; the empty string clears the value.
    OptBool,
    /// Decimal integer.
    Int,
    /// As [`FieldKind::Int`]; the empty string or `none` clears the value.
    OptInt,
    /// Parsed as a JSON document.
    Json,
    /// Filesystem path, taken verbatim.
    Path,
    /// As [`FieldKind::Path`]; the empty string clears the value.
    OptPath,
}

/// One recognized setting.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Installed settings name, also the environment variable suffix.
    pub name: &'static str,
    /// Conversion applied to the raw environment value.
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Every recognized setting, in installation order.
pub const FIELDS: &[FieldSpec] = &[
    field("BASE_DIR", FieldKind::OptPath),
    field("DEBUG", FieldKind::Bool),
    field("DEBUG_PROPAGATE_EXCEPTIONS", FieldKind::Bool),
    field("ADMINS", FieldKind::Json),
    field("INTERNAL_IPS", FieldKind::Json),
    field("ALLOWED_HOSTS", FieldKind::Json),
    field("TIME_ZONE", FieldKind::Str),
    field("USE_TZ", FieldKind::Bool),
    field("LANGUAGE_CODE", FieldKind::Str),
    field("LANGUAGES", FieldKind::Json),
    field("LANGUAGES_BIDI", FieldKind::Json),
    field("USE_I18N", FieldKind::Bool),
    field("LOCALE_PATHS", FieldKind::Json),
    field("LANGUAGE_COOKIE_NAME", FieldKind::Str),
    field("LANGUAGE_COOKIE_AGE", FieldKind::OptInt),
    field("LANGUAGE_COOKIE_DOMAIN", FieldKind::OptStr),
    field("LANGUAGE_COOKIE_PATH", FieldKind::Str),
    field("LANGUAGE_COOKIE_SECURE", FieldKind::Bool),
    field("LANGUAGE_COOKIE_HTTPONLY", FieldKind::Bool),
    field("LANGUAGE_COOKIE_SAMESITE", FieldKind::OptStr),
    field("USE_L10N", FieldKind::Bool),
    field("MANAGERS", FieldKind::Json),
    field("DEFAULT_CHARSET", FieldKind::Str),
    field("SERVER_EMAIL", FieldKind::Str),
    field("DATABASES", FieldKind::Json),
    field("DATABASE_ROUTERS", FieldKind::Json),
    field("DEFAULT_AUTO_FIELD", FieldKind::Str),
    field("EMAIL_BACKEND", FieldKind::Str),
    field("EMAIL_HOST", FieldKind::Str),
    field("EMAIL_PORT", FieldKind::Int),
    field("EMAIL_USE_LOCALTIME", FieldKind::Bool),
    field("EMAIL_HOST_USER", FieldKind::Str),
    field("EMAIL_HOST_PASSWORD", FieldKind::Str),
    field("EMAIL_USE_TLS", FieldKind::Bool),
    field("EMAIL_USE_SSL", FieldKind::Bool),
    field("EMAIL_SSL_CERTFILE", FieldKind::OptPath),
    field("EMAIL_SSL_KEYFILE", FieldKind::OptPath),
    field("EMAIL_TIMEOUT", FieldKind::OptInt),
    field("DEFAULT_FROM_EMAIL", FieldKind::Str),
    field("EMAIL_SUBJECT_PREFIX", FieldKind::Str),
    field("INSTALLED_APPS", FieldKind::Json),
    field("TEMPLATES", FieldKind::Json),
    field("FORM_RENDERER", FieldKind::Str),
    field("APPEND_SLASH", FieldKind::Bool),
    field("PREPEND_WWW", FieldKind::Bool),
    field("FORCE_SCRIPT_NAME", FieldKind::OptStr),
    field("DISALLOWED_USER_AGENTS", FieldKind::Json),
    field("IGNORABLE_404_URLS", FieldKind::Json),
    field("SECRET_KEY", FieldKind::Str),
    field("DEFAULT_FILE_STORAGE", FieldKind::Str),
    field("MEDIA_ROOT", FieldKind::Str),
    field("MEDIA_URL", FieldKind::Str),
    field("STATIC_ROOT", FieldKind::OptPath),
    field("STATIC_URL", FieldKind::OptStr),
    field("FILE_UPLOAD_HANDLERS", FieldKind::Json),
    field("FILE_UPLOAD_MAX_MEMORY_SIZE", FieldKind::Int),
    field("DATA_UPLOAD_MAX_MEMORY_SIZE", FieldKind::Int),
    field("DATA_UPLOAD_MAX_NUMBER_FIELDS", FieldKind::OptInt),
    field("FILE_UPLOAD_TEMP_DIR", FieldKind::OptPath),
    field("FILE_UPLOAD_PERMISSIONS", FieldKind::OptInt),
    field("FILE_UPLOAD_DIRECTORY_PERMISSIONS", FieldKind::OptInt),
    field("FORMAT_MODULE_PATH", FieldKind::OptStr),
    field("DATE_FORMAT", FieldKind::Str),
    field("DATETIME_FORMAT", FieldKind::Str),
    field("TIME_FORMAT", FieldKind::Str),
    field("YEAR_MONTH_FORMAT", FieldKind::Str),
    field("MONTH_DAY_FORMAT", FieldKind::Str),
    field("SHORT_DATE_FORMAT", FieldKind::Str),
    field("SHORT_DATETIME_FORMAT", FieldKind::Str),
    field("DATE_INPUT_FORMATS", FieldKind::Json),
    field("TIME_INPUT_FORMATS", FieldKind::Json),
    field("DATETIME_INPUT_FORMATS", FieldKind::Json),
    field("FIRST_DAY_OF_WEEK", FieldKind::Int),
    field("DECIMAL_SEPARATOR", FieldKind::Str),
    field("USE_THOUSAND_SEPARATOR", FieldKind::Bool),
    field("THOUSAND_SEPARATOR", FieldKind::Str),
    field("DEFAULT_TABLESPACE", FieldKind::Str),
    field("DEFAULT_INDEX_TABLESPACE", FieldKind::Str),
    field("X_FRAME_OPTIONS", FieldKind::Str),
    field("USE_X_FORWARDED_HOST", FieldKind::Bool),
    field("USE_X_FORWARDED_PORT", FieldKind::Bool),
    field("WSGI_APPLICATION", FieldKind::OptStr),
    field("SECURE_PROXY_SSL_HEADER", FieldKind::Json),
    field("DEFAULT_HASHING_ALGORITHM", FieldKind::OptStr),
    field("MIDDLEWARE", FieldKind::Json),
    field("SESSION_CACHE_ALIAS", FieldKind::Str),
    field("SESSION_COOKIE_NAME", FieldKind::Str),
    field("SESSION_COOKIE_AGE", FieldKind::Int),
    field("SESSION_COOKIE_DOMAIN", FieldKind::OptStr),
    field("SESSION_COOKIE_SECURE", FieldKind::Bool),
    field("SESSION_COOKIE_PATH", FieldKind::Str),
    field("SESSION_COOKIE_HTTPONLY", FieldKind::Bool),
    field("SESSION_COOKIE_SAMESITE", FieldKind::OptStr),
    field("SESSION_SAVE_EVERY_REQUEST", FieldKind::Bool),
    field("SESSION_EXPIRE_AT_BROWSER_CLOSE", FieldKind::Bool),
    field("SESSION_ENGINE", FieldKind::Str),
    field("SESSION_FILE_PATH", FieldKind::OptPath),
    field("SESSION_SERIALIZER", FieldKind::Str),
    field("CACHES", FieldKind::Json),
    field("CACHE_MIDDLEWARE_KEY_PREFIX", FieldKind::Str),
    field("CACHE_MIDDLEWARE_SECONDS", FieldKind::Int),
    field("CACHE_MIDDLEWARE_ALIAS", FieldKind::Str),
    field("AUTH_USER_MODEL", FieldKind::Str),
    field("AUTHENTICATION_BACKENDS", FieldKind::Json),
    field("LOGIN_URL", FieldKind::Str),
    field("LOGIN_REDIRECT_URL", FieldKind::Str),
    field("PASSWORD_RESET_TIMEOUT_DAYS", FieldKind::OptInt),
    field("PASSWORD_RESET_TIMEOUT", FieldKind::OptInt),
    field("PASSWORD_HASHERS", FieldKind::Json),
    field("AUTH_PASSWORD_VALIDATORS", FieldKind::Json),
    field("SIGNING_BACKEND", FieldKind::Str),
    field("CSRF_FAILURE_VIEW", FieldKind::Str),
    field("CSRF_COOKIE_NAME", FieldKind::Str),
    field("CSRF_COOKIE_AGE", FieldKind::Int),
    field("CSRF_COOKIE_DOMAIN", FieldKind::OptStr),
    field("CSRF_COOKIE_PATH", FieldKind::Str),
    field("CSRF_COOKIE_SECURE", FieldKind::Bool),
    field("CSRF_COOKIE_HTTPONLY", FieldKind::Bool),
    field("CSRF_COOKIE_SAMESITE", FieldKind::OptStr),
    field("CSRF_HEADER_NAME", FieldKind::Str),
    field("CSRF_TRUSTED_ORIGINS", FieldKind::Json),
    field("CSRF_USE_SESSIONS", FieldKind::Bool),
    field("MESSAGE_STORAGE", FieldKind::Str),
    field("LOGGING_CONFIG", FieldKind::Str),
    field("LOGGING", FieldKind::Json),
    field("DEFAULT_EXCEPTION_REPORTER", FieldKind::OptStr),
    field("DEFAULT_EXCEPTION_REPORTER_FILTER", FieldKind::Str),
    field("TEST_RUNNER", FieldKind::Str),
    field("TEST_NON_SERIALIZED_APPS", FieldKind::Json),
    field("FIXTURE_DIRS", FieldKind::Json),
    field("STATICFILES_DIRS", FieldKind::Json),
    field("STATICFILES_STORAGE", FieldKind::Str),
    field("STATICFILES_FINDERS", FieldKind::Json),
    field("MIGRATION_MODULES", FieldKind::Json),
    field("SILENCED_SYSTEM_CHECKS", FieldKind::Json),
    field("SECURE_BROWSER_XSS_FILTER", FieldKind::OptBool),
    field("SECURE_CONTENT_TYPE_NOSNIFF", FieldKind::Bool),
    field("SECURE_HSTS_INCLUDE_SUBDOMAINS", FieldKind::Bool),
    field("SECURE_HSTS_PRELOAD", FieldKind::Bool),
    field("SECURE_HSTS_SECONDS", FieldKind::Int),
    field("SECURE_REDIRECT_EXEMPT", FieldKind::Json),
    field("SECURE_REFERRER_POLICY", FieldKind::OptStr),
    field("SECURE_SSL_HOST", FieldKind::OptStr),
    field("SECURE_SSL_REDIRECT", FieldKind::Bool),
    field("ROOT_URLCONF", FieldKind::OptStr),
];

/// Which connection map a DSN variable feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsnTarget {
    /// An alias of `DATABASES`.
    Database,
    /// An alias of `CACHES`.
    Cache,
}

/// A registered connection-string environment variable.
#[derive(Debug, Clone)]
pub struct DsnField {
    /// Environment variable name, read without the settings prefix.
    pub var: String,
    /// Connection map the parsed DSN feeds.
    pub target: DsnTarget,
    /// Alias filled inside that map.
    pub alias: String,
}

impl DsnField {
    /// Register `var` as a DSN source for `alias` of the given map.
    pub fn new(var: impl Into<String>, target: DsnTarget, alias: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            target,
            alias: alias.into(),
        }
    }

    /// The built-in registrations: `DATABASE_URL` and `CACHE_URL`, each
    /// feeding the `default` alias.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new("DATABASE_URL", DsnTarget::Database, "default"),
            Self::new("CACHE_URL", DsnTarget::Cache, "default"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_no_duplicate_field_names() {
        let mut names: Vec<&str> = FIELDS.iter().map(|spec| spec.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn test_fields_match_settings_model() {
        let serialized = serde_json::to_value(Settings::default()).unwrap();
        let model: Vec<&str> = serialized
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let mut table: Vec<&str> = FIELDS.iter().map(|spec| spec.name).collect();
        table.sort_unstable();
        let mut model_sorted = model.clone();
        model_sorted.sort_unstable();
        assert_eq!(table, model_sorted);
    }

    #[test]
    fn test_builtin_dsn_fields() {
        let fields = DsnField::builtin();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].var, "DATABASE_URL");
        assert_eq!(fields[0].target, DsnTarget::Database);
        assert_eq!(fields[1].var, "CACHE_URL");
        assert_eq!(fields[1].alias, "default");
    }
}
