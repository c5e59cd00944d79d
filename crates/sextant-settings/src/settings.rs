//! The typed settings model.
//!
//! [`Settings`] is a single explicit struct mirroring the framework's
//! recognized option names. Every field carries the framework default as an
//! ordinary literal (or `None` where the field inherits a framework default
//! too large to restate); [`Settings::to_overrides`] diffs an instance
//! against those defaults to produce the flat mapping that gets installed.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use sextant_dsn::{CacheConfig, CacheDsn, DatabaseConfig, DatabaseDsn};

use crate::error::SettingsError;

/// The flat `NAME -> value` mapping installed into a configuration context.
pub type SettingsMap = serde_json::Map<String, Value>;

/// Settings names that are always installed, even when equal to the
/// default. Test harnesses mutate the installed connection map in place, so
/// a fresh copy must always win.
const ALWAYS_INSTALLED: &[&str] = &["DATABASES"];

/// Settings names with no framework-default counterpart; they are installed
/// unconditionally.
const NO_FRAMEWORK_DEFAULT: &[&str] = &["BASE_DIR", "ROOT_URLCONF"];

/// A template engine declaration inside `TEMPLATES`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct TemplateBackend {
    /// Template backend class path.
    pub backend: String,

    /// Optional alias for this engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Directories searched for template sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dirs: Option<Vec<PathBuf>>,

    /// Whether application template directories are searched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_dirs: Option<bool>,

    /// Backend-specific options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Parsed connection strings waiting to fill a key of `DATABASES` or
/// `CACHES` at merge time. These never appear in the installed mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DsnDefaults {
    /// `(alias, DSN)` pairs destined for `DATABASES`.
    pub databases: Vec<(String, DatabaseDsn)>,
    /// `(alias, DSN)` pairs destined for `CACHES`.
    pub caches: Vec<(String, CacheDsn)>,
}

impl DsnDefaults {
    fn is_empty(&self) -> bool {
        self.databases.is_empty() && self.caches.is_empty()
    }
}

/// The full enumeration of framework-recognized settings.
///
/// Constructed once at process startup from environment variables, a
/// settings file and/or explicit values, then merged into a
/// [`ConfigContext`](crate::ConfigContext) exactly once.
///
/// # Example
///
/// ```
/// use sextant_settings::Settings;
///
/// let mut settings = Settings::default();
/// settings.debug = true;
/// let overrides = settings.to_overrides().unwrap();
/// assert_eq!(overrides["DEBUG"], serde_json::json!(true));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct Settings {
    /// Project base directory; derived from the project descriptor when not
    /// set explicitly.
    pub base_dir: Option<PathBuf>,

    pub debug: bool,
    pub debug_propagate_exceptions: bool,
    /// `(name, email)` pairs receiving error reports.
    pub admins: Vec<(String, String)>,
    pub internal_ips: Vec<String>,
    pub allowed_hosts: Vec<String>,

    pub time_zone: String,
    pub use_tz: bool,

    pub language_code: String,
    /// `None` inherits the framework's full language list.
    pub languages: Option<Vec<(String, String)>>,
    pub languages_bidi: Option<Vec<String>>,
    pub use_i18n: bool,
    pub locale_paths: Vec<PathBuf>,
    pub language_cookie_name: String,
    pub language_cookie_age: Option<i64>,
    pub language_cookie_domain: Option<String>,
    pub language_cookie_path: String,
    pub language_cookie_secure: bool,
    pub language_cookie_httponly: bool,
    pub language_cookie_samesite: Option<String>,
    pub use_l10n: bool,

    pub managers: Vec<(String, String)>,
    pub default_charset: String,
    pub server_email: String,

    /// Connection map keyed by alias; entries may be written as raw DSN
    /// strings and are parsed into descriptors on deserialization.
    #[serde(deserialize_with = "database_map")]
    pub databases: IndexMap<String, DatabaseConfig>,
    pub database_routers: Vec<String>,
    pub default_auto_field: String,

    pub email_backend: String,
    pub email_host: String,
    pub email_port: u16,
    pub email_use_localtime: bool,
    pub email_host_user: String,
    pub email_host_password: String,
    pub email_use_tls: bool,
    pub email_use_ssl: bool,
    pub email_ssl_certfile: Option<PathBuf>,
    pub email_ssl_keyfile: Option<PathBuf>,
    pub email_timeout: Option<i64>,
    pub default_from_email: String,
    pub email_subject_prefix: String,

    pub installed_apps: Vec<String>,
    pub templates: Vec<TemplateBackend>,
    pub form_renderer: String,

    pub append_slash: bool,
    pub prepend_www: bool,
    pub force_script_name: Option<String>,
    /// User-agent patterns denied access.
    pub disallowed_user_agents: Vec<String>,
    pub ignorable_404_urls: Vec<String>,

    /// Always installed: the default is freshly generated per instance.
    pub secret_key: String,

    pub default_file_storage: String,
    pub media_root: String,
    pub media_url: String,
    pub static_root: Option<PathBuf>,
    pub static_url: Option<String>,

    pub file_upload_handlers: Vec<String>,
    pub file_upload_max_memory_size: i64,
    pub data_upload_max_memory_size: i64,
    pub data_upload_max_number_fields: Option<i64>,
    pub file_upload_temp_dir: Option<PathBuf>,
    pub file_upload_permissions: Option<u32>,
    pub file_upload_directory_permissions: Option<u32>,

    pub format_module_path: Option<String>,
    pub date_format: String,
    pub datetime_format: String,
    pub time_format: String,
    pub year_month_format: String,
    pub month_day_format: String,
    pub short_date_format: String,
    pub short_datetime_format: String,
    pub date_input_formats: Option<Vec<String>>,
    pub time_input_formats: Option<Vec<String>>,
    pub datetime_input_formats: Option<Vec<String>>,
    pub first_day_of_week: i64,
    pub decimal_separator: String,
    pub use_thousand_separator: bool,
    pub thousand_separator: String,

    pub default_tablespace: String,
    pub default_index_tablespace: String,

    pub x_frame_options: String,
    pub use_x_forwarded_host: bool,
    pub use_x_forwarded_port: bool,

    /// Derived from the project descriptor when not set explicitly.
    pub wsgi_application: Option<String>,

    pub secure_proxy_ssl_header: Option<(String, String)>,
    pub default_hashing_algorithm: Option<String>,

    pub middleware: Vec<String>,

    pub session_cache_alias: String,
    pub session_cookie_name: String,
    pub session_cookie_age: i64,
    pub session_cookie_domain: Option<String>,
    pub session_cookie_secure: bool,
    pub session_cookie_path: String,
    pub session_cookie_httponly: bool,
    pub session_cookie_samesite: Option<String>,
    pub session_save_every_request: bool,
    pub session_expire_at_browser_close: bool,
    pub session_engine: String,
    pub session_file_path: Option<PathBuf>,
    pub session_serializer: String,

    /// Cache map keyed by alias; entries may be written as raw DSN strings.
    #[serde(deserialize_with = "cache_map")]
    pub caches: IndexMap<String, CacheConfig>,
    pub cache_middleware_key_prefix: String,
    pub cache_middleware_seconds: i64,
    pub cache_middleware_alias: String,

    pub auth_user_model: String,
    pub authentication_backends: Vec<String>,
    pub login_url: String,
    pub login_redirect_url: String,
    pub password_reset_timeout_days: Option<i64>,
    pub password_reset_timeout: Option<i64>,
    pub password_hashers: Vec<String>,
    pub auth_password_validators: Vec<Value>,

    pub signing_backend: String,

    pub csrf_failure_view: String,
    pub csrf_cookie_name: String,
    pub csrf_cookie_age: i64,
    pub csrf_cookie_domain: Option<String>,
    pub csrf_cookie_path: String,
    pub csrf_cookie_secure: bool,
    pub csrf_cookie_httponly: bool,
    pub csrf_cookie_samesite: Option<String>,
    pub csrf_header_name: String,
    pub csrf_trusted_origins: Vec<String>,
    pub csrf_use_sessions: bool,

    pub message_storage: String,

    pub logging_config: String,
    pub logging: Value,
    pub default_exception_reporter: Option<String>,
    pub default_exception_reporter_filter: String,

    pub test_runner: String,
    pub test_non_serialized_apps: Vec<String>,
    pub fixture_dirs: Vec<PathBuf>,

    pub staticfiles_dirs: Vec<PathBuf>,
    pub staticfiles_storage: String,
    pub staticfiles_finders: Vec<String>,

    pub migration_modules: IndexMap<String, String>,
    pub silenced_system_checks: Vec<String>,

    pub secure_browser_xss_filter: Option<bool>,
    pub secure_content_type_nosniff: bool,
    pub secure_hsts_include_subdomains: bool,
    pub secure_hsts_preload: bool,
    pub secure_hsts_seconds: i64,
    pub secure_redirect_exempt: Vec<String>,
    pub secure_referrer_policy: Option<String>,
    pub secure_ssl_host: Option<String>,
    pub secure_ssl_redirect: bool,

    /// Derived from the project descriptor when not set explicitly.
    pub root_urlconf: Option<String>,

    /// Parsed DSN defaults applied at merge time; never installed
    /// themselves.
    #[serde(skip)]
    pub dsn_defaults: DsnDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: None,
            debug: false,
            debug_propagate_exceptions: false,
            admins: Vec::new(),
            internal_ips: Vec::new(),
            allowed_hosts: Vec::new(),
            time_zone: "America/Chicago".to_string(),
            use_tz: false,
            language_code: "en-us".to_string(),
            languages: None,
            languages_bidi: None,
            use_i18n: true,
            locale_paths: Vec::new(),
            language_cookie_name: "django_language".to_string(),
            language_cookie_age: None,
            language_cookie_domain: None,
            language_cookie_path: "/".to_string(),
            language_cookie_secure: false,
            language_cookie_httponly: false,
            language_cookie_samesite: None,
            use_l10n: true,
            managers: Vec::new(),
            default_charset: "utf-8".to_string(),
            server_email: "root@localhost".to_string(),
            databases: IndexMap::new(),
            database_routers: Vec::new(),
            default_auto_field: "django.db.models.AutoField".to_string(),
            email_backend: "django.core.mail.backends.smtp.EmailBackend".to_string(),
            email_host: "localhost".to_string(),
            email_port: 25,
            email_use_localtime: false,
            email_host_user: String::new(),
            email_host_password: String::new(),
            email_use_tls: false,
            email_use_ssl: false,
            email_ssl_certfile: None,
            email_ssl_keyfile: None,
            email_timeout: None,
            default_from_email: "webmaster@localhost".to_string(),
            email_subject_prefix: "[Django] ".to_string(),
            installed_apps: Vec::new(),
            templates: Vec::new(),
            form_renderer: "django.forms.renderers.DjangoTemplates".to_string(),
            append_slash: true,
            prepend_www: false,
            force_script_name: None,
            disallowed_user_agents: Vec::new(),
            ignorable_404_urls: Vec::new(),
            secret_key: generate_secret_key(),
            default_file_storage: "django.core.files.storage.FileSystemStorage".to_string(),
            media_root: String::new(),
            media_url: String::new(),
            static_root: None,
            static_url: None,
            file_upload_handlers: vec![
                "django.core.files.uploadhandler.MemoryFileUploadHandler".to_string(),
                "django.core.files.uploadhandler.TemporaryFileUploadHandler".to_string(),
            ],
            file_upload_max_memory_size: 2_621_440,
            data_upload_max_memory_size: 2_621_440,
            data_upload_max_number_fields: Some(1000),
            file_upload_temp_dir: None,
            file_upload_permissions: Some(0o644),
            file_upload_directory_permissions: None,
            format_module_path: None,
            date_format: "N j, Y".to_string(),
            datetime_format: "N j, Y, P".to_string(),
            time_format: "P".to_string(),
            year_month_format: "F Y".to_string(),
            month_day_format: "F j".to_string(),
            short_date_format: "m/d/Y".to_string(),
            short_datetime_format: "m/d/Y P".to_string(),
            date_input_formats: None,
            time_input_formats: None,
            datetime_input_formats: None,
            first_day_of_week: 0,
            decimal_separator: ".".to_string(),
            use_thousand_separator: false,
            thousand_separator: ",".to_string(),
            default_tablespace: String::new(),
            default_index_tablespace: String::new(),
            x_frame_options: "DENY".to_string(),
            use_x_forwarded_host: false,
            use_x_forwarded_port: false,
            wsgi_application: None,
            secure_proxy_ssl_header: None,
            default_hashing_algorithm: None,
            middleware: Vec::new(),
            session_cache_alias: "default".to_string(),
            session_cookie_name: "sessionid".to_string(),
            session_cookie_age: 1_209_600,
            session_cookie_domain: None,
            session_cookie_secure: false,
            session_cookie_path: "/".to_string(),
            session_cookie_httponly: true,
            session_cookie_samesite: Some("Lax".to_string()),
            session_save_every_request: false,
            session_expire_at_browser_close: false,
            session_engine: "django.contrib.sessions.backends.db".to_string(),
            session_file_path: None,
            session_serializer: "django.contrib.sessions.serializers.JSONSerializer".to_string(),
            caches: default_caches(),
            cache_middleware_key_prefix: String::new(),
            cache_middleware_seconds: 600,
            cache_middleware_alias: "default".to_string(),
            auth_user_model: "auth.User".to_string(),
            authentication_backends: vec![
                "django.contrib.auth.backends.ModelBackend".to_string()
            ],
            login_url: "/accounts/login/".to_string(),
            login_redirect_url: "/accounts/profile/".to_string(),
            password_reset_timeout_days: None,
            password_reset_timeout: Some(259_200),
            password_hashers: vec![
                "django.contrib.auth.hashers.PBKDF2PasswordHasher".to_string(),
                "django.contrib.auth.hashers.PBKDF2SHA1PasswordHasher".to_string(),
                "django.contrib.auth.hashers.Argon2PasswordHasher".to_string(),
                "django.contrib.auth.hashers.BCryptSHA256PasswordHasher".to_string(),
                "django.contrib.auth.hashers.ScryptPasswordHasher".to_string(),
            ],
            auth_password_validators: Vec::new(),
            signing_backend: "django.core.signing.TimestampSigner".to_string(),
            csrf_failure_view: "django.views.csrf.csrf_failure".to_string(),
            csrf_cookie_name: "csrftoken".to_string(),
            csrf_cookie_age: 31_449_600,
            csrf_cookie_domain: None,
            csrf_cookie_path: "/".to_string(),
            csrf_cookie_secure: false,
            csrf_cookie_httponly: false,
            csrf_cookie_samesite: Some("Lax".to_string()),
            csrf_header_name: "HTTP_X_CSRFTOKEN".to_string(),
            csrf_trusted_origins: Vec::new(),
            csrf_use_sessions: false,
            message_storage: "django.contrib.messages.storage.fallback.FallbackStorage"
                .to_string(),
            logging_config: "logging.config.dictConfig".to_string(),
            logging: Value::Object(serde_json::Map::new()),
            default_exception_reporter: Some("django.views.debug.ExceptionReporter".to_string()),
            default_exception_reporter_filter: "django.views.debug.SafeExceptionReporterFilter"
                .to_string(),
            test_runner: "django.test.runner.DiscoverRunner".to_string(),
            test_non_serialized_apps: Vec::new(),
            fixture_dirs: Vec::new(),
            staticfiles_dirs: Vec::new(),
            staticfiles_storage: "django.contrib.staticfiles.storage.StaticFilesStorage"
                .to_string(),
            staticfiles_finders: vec![
                "django.contrib.staticfiles.finders.FileSystemFinder".to_string(),
                "django.contrib.staticfiles.finders.AppDirectoriesFinder".to_string(),
            ],
            migration_modules: IndexMap::new(),
            silenced_system_checks: Vec::new(),
            secure_browser_xss_filter: None,
            secure_content_type_nosniff: true,
            secure_hsts_include_subdomains: false,
            secure_hsts_preload: false,
            secure_hsts_seconds: 0,
            secure_redirect_exempt: Vec::new(),
            secure_referrer_policy: Some("same-origin".to_string()),
            secure_ssl_host: None,
            secure_ssl_redirect: false,
            root_urlconf: None,
            dsn_defaults: DsnDefaults::default(),
        }
    }
}

impl Settings {
    /// The settings the framework generates for a new project: an sqlite
    /// database, the standard template engine, installed apps, middleware
    /// and password validators, UTC with timezone support, and big auto
    /// fields.
    ///
    /// Use as a base layer via [`Loader::with_settings`](crate::Loader)
    /// when shimming a stock project.
    pub fn django_default_project() -> Self {
        let mut databases = IndexMap::new();
        databases.insert(
            "default".to_string(),
            DatabaseConfig {
                engine: "django.db.backends.sqlite3".to_string(),
                name: "db.sqlite3".to_string(),
                ..DatabaseConfig::default()
            },
        );

        Self {
            databases,
            templates: vec![TemplateBackend {
                backend: "django.template.backends.django.DjangoTemplates".to_string(),
                name: None,
                dirs: Some(Vec::new()),
                app_dirs: Some(true),
                options: Some(serde_json::json!({
                    "context_processors": [
                        "django.template.context_processors.debug",
                        "django.template.context_processors.request",
                        "django.contrib.auth.context_processors.auth",
                        "django.contrib.messages.context_processors.messages",
                    ],
                })),
            }],
            installed_apps: vec![
                "django.contrib.admin".to_string(),
                "django.contrib.auth".to_string(),
                "django.contrib.contenttypes".to_string(),
                "django.contrib.sessions".to_string(),
                "django.contrib.messages".to_string(),
                "django.contrib.staticfiles".to_string(),
            ],
            middleware: vec![
                "django.middleware.security.SecurityMiddleware".to_string(),
                "django.contrib.sessions.middleware.SessionMiddleware".to_string(),
                "django.middleware.common.CommonMiddleware".to_string(),
                "django.middleware.csrf.CsrfViewMiddleware".to_string(),
                "django.contrib.auth.middleware.AuthenticationMiddleware".to_string(),
                "django.contrib.messages.middleware.MessageMiddleware".to_string(),
                "django.middleware.clickjacking.XFrameOptionsMiddleware".to_string(),
            ],
            auth_password_validators: vec![
                serde_json::json!({
                    "NAME": "django.contrib.auth.password_validation.UserAttributeSimilarityValidator",
                }),
                serde_json::json!({
                    "NAME": "django.contrib.auth.password_validation.MinimumLengthValidator",
                }),
                serde_json::json!({
                    "NAME": "django.contrib.auth.password_validation.CommonPasswordValidator",
                }),
                serde_json::json!({
                    "NAME": "django.contrib.auth.password_validation.NumericPasswordValidator",
                }),
            ],
            time_zone: "UTC".to_string(),
            use_tz: true,
            static_url: Some("static/".to_string()),
            default_auto_field: "django.db.models.BigAutoField".to_string(),
            ..Self::default()
        }
    }

    /// Queue a database DSN to fill the `default` alias of `DATABASES` at
    /// merge time, unless that alias was set explicitly.
    pub fn set_default_database_dsn(&mut self, dsn: DatabaseDsn) {
        self.dsn_defaults
            .databases
            .push(("default".to_string(), dsn));
    }

    /// Queue a cache DSN to fill the `default` alias of `CACHES` at merge
    /// time, unless that alias was set explicitly.
    pub fn set_default_cache_dsn(&mut self, dsn: CacheDsn) {
        self.dsn_defaults.caches.push(("default".to_string(), dsn));
    }

    /// Apply queued DSN defaults to `DATABASES` and `CACHES`.
    ///
    /// A database alias is filled only when absent. A cache alias is filled
    /// when absent or still carrying the built-in default backend, since
    /// the framework pre-populates the `default` cache alias.
    pub fn apply_dsn_defaults(&mut self) -> Result<(), SettingsError> {
        let queued = std::mem::take(&mut self.dsn_defaults);
        if queued.is_empty() {
            return Ok(());
        }
        for (alias, dsn) in queued.databases {
            if !self.databases.contains_key(&alias) {
                tracing::debug!(alias = %alias, "filling database alias from DSN");
                self.databases.insert(alias, dsn.to_database_config());
            }
        }
        let builtin = default_caches();
        for (alias, dsn) in queued.caches {
            let unset = self
                .caches
                .get(&alias)
                .map_or(true, |current| builtin.get(&alias) == Some(current));
            if unset {
                tracing::debug!(alias = %alias, "filling cache alias from DSN");
                self.caches.insert(alias, dsn.to_cache_config()?);
            }
        }
        Ok(())
    }

    /// Produce the flat mapping of settings to install.
    ///
    /// Keeps every field whose value differs from the framework default,
    /// every field with no framework-default counterpart, and the
    /// connection map unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Json`] if the settings fail to serialize.
    pub fn to_overrides(&self) -> Result<SettingsMap, SettingsError> {
        let Value::Object(current) = serde_json::to_value(self)? else {
            return Err(SettingsError::validation(
                "settings did not serialize to a mapping",
            ));
        };
        let Value::Object(defaults) = serde_json::to_value(Self::default())? else {
            return Err(SettingsError::validation(
                "default settings did not serialize to a mapping",
            ));
        };

        let mut overrides = SettingsMap::new();
        for (name, value) in current {
            let keep = ALWAYS_INSTALLED.contains(&name.as_str())
                || NO_FRAMEWORK_DEFAULT.contains(&name.as_str())
                || defaults.get(&name) != Some(&value);
            if keep {
                overrides.insert(name, value);
            }
        }
        Ok(overrides)
    }
}

/// The framework's built-in cache map: a single local-memory cache.
pub(crate) fn default_caches() -> IndexMap<String, CacheConfig> {
    let mut caches = IndexMap::new();
    caches.insert(
        "default".to_string(),
        CacheConfig {
            backend: "django.core.cache.backends.locmem.LocMemCache".to_string(),
            ..CacheConfig::default()
        },
    );
    caches
}

/// Generate a fresh secret key.
///
/// The default differs per instance, which keeps `SECRET_KEY` in every
/// installed mapping unless the caller supplies an explicit value.
fn generate_secret_key() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

fn database_map<'de, D>(deserializer: D) -> Result<IndexMap<String, DatabaseConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Dsn(String),
        Config(DatabaseConfig),
    }

    let raw: IndexMap<String, Entry> = IndexMap::deserialize(deserializer)?;
    let mut databases = IndexMap::with_capacity(raw.len());
    for (alias, entry) in raw {
        match entry {
            Entry::Dsn(dsn) if dsn.is_empty() => {}
            Entry::Dsn(dsn) => {
                let parsed = DatabaseDsn::parse(&dsn).map_err(D::Error::custom)?;
                databases.insert(alias, parsed.to_database_config());
            }
            Entry::Config(config) => {
                databases.insert(alias, config);
            }
        }
    }
    Ok(databases)
}

fn cache_map<'de, D>(deserializer: D) -> Result<IndexMap<String, CacheConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Dsn(String),
        Config(CacheConfig),
    }

    let raw: IndexMap<String, Entry> = IndexMap::deserialize(deserializer)?;
    let mut caches = IndexMap::with_capacity(raw.len());
    for (alias, entry) in raw {
        match entry {
            Entry::Dsn(dsn) if dsn.is_empty() => {}
            Entry::Dsn(dsn) => {
                let config = CacheDsn::parse(&dsn)
                    .and_then(|parsed| parsed.to_cache_config())
                    .map_err(D::Error::custom)?;
                caches.insert(alias, config);
            }
            Entry::Config(config) => {
                caches.insert(alias, config);
            }
        }
    }
    Ok(caches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_defaults() {
        let settings = Settings::default();
        assert!(!settings.debug);
        assert!(settings.databases.is_empty());
        assert_eq!(settings.time_zone, "America/Chicago");
        assert_eq!(
            settings.caches["default"].backend,
            "django.core.cache.backends.locmem.LocMemCache"
        );
        assert_eq!(settings.secret_key.len(), 64);
    }

    #[test]
    fn test_default_overrides_are_minimal() {
        let overrides = Settings::default().to_overrides().unwrap();
        let mut names: Vec<&str> = overrides.keys().map(String::as_str).collect();
        names.sort_unstable();
        // SECRET_KEY is freshly generated, so it always differs.
        assert_eq!(names, ["BASE_DIR", "DATABASES", "ROOT_URLCONF", "SECRET_KEY"]);
        assert_eq!(overrides["DATABASES"], serde_json::json!({}));
    }

    #[test]
    fn test_changed_field_is_installed() {
        let mut settings = Settings::default();
        settings.language_cookie_path = "/foo/bar".to_string();
        let overrides = settings.to_overrides().unwrap();
        assert_eq!(overrides["LANGUAGE_COOKIE_PATH"], "/foo/bar");
        assert!(!overrides.contains_key("TIME_ZONE"));
    }

    #[test]
    fn test_databases_accept_dsn_strings() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "DATABASES": {"default": "sqlite:///db.sqlite3"}
        }))
        .unwrap();
        assert_eq!(settings.databases["default"].name, "db.sqlite3");
        assert_eq!(
            settings.databases["default"].engine,
            "django.db.backends.sqlite3"
        );
    }

    #[test]
    fn test_databases_accept_structured_descriptors() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "DATABASES": {
                "default": {"ENGINE": "django.db.backends.postgresql", "NAME": "app"}
            }
        }))
        .unwrap();
        assert_eq!(settings.databases["default"].name, "app");
    }

    #[test]
    fn test_empty_database_entry_is_dropped() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "DATABASES": {"default": ""}
        }))
        .unwrap();
        assert!(settings.databases.is_empty());
    }

    #[test]
    fn test_invalid_database_dsn_is_rejected() {
        let result: Result<Settings, _> = serde_json::from_value(serde_json::json!({
            "DATABASES": {"default": "gopher://nope"}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_caches_accept_dsn_strings() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "CACHES": {"default": "redis://localhost:6379/2"}
        }))
        .unwrap();
        assert_eq!(
            settings.caches["default"].location,
            "redis://localhost:6379/2"
        );
    }

    #[test]
    fn test_dsn_default_fills_absent_database_alias() {
        let mut settings = Settings::default();
        settings.set_default_database_dsn(DatabaseDsn::parse("sqlite:///foo").unwrap());
        settings.apply_dsn_defaults().unwrap();
        assert_eq!(settings.databases["default"].name, "foo");
        assert!(settings.dsn_defaults.databases.is_empty());
    }

    #[test]
    fn test_dsn_default_does_not_clobber_explicit_database() {
        let mut settings = Settings::default();
        settings.databases.insert(
            "default".to_string(),
            DatabaseDsn::parse("postgres://u@h/explicit")
                .unwrap()
                .to_database_config(),
        );
        settings.set_default_database_dsn(DatabaseDsn::parse("sqlite:///foo").unwrap());
        settings.apply_dsn_defaults().unwrap();
        assert_eq!(settings.databases["default"].name, "explicit");
    }

    #[test]
    fn test_cache_dsn_replaces_builtin_default_alias() {
        let mut settings = Settings::default();
        settings.set_default_cache_dsn(CacheDsn::parse("redis:///1").unwrap());
        settings.apply_dsn_defaults().unwrap();
        assert_eq!(
            settings.caches["default"].location,
            "redis://localhost:6379/1"
        );
    }

    #[test]
    fn test_cache_dsn_does_not_clobber_explicit_cache() {
        let mut settings = Settings::default();
        settings.caches.insert(
            "default".to_string(),
            CacheDsn::parse("memcached://localhost:11211")
                .unwrap()
                .to_cache_config()
                .unwrap(),
        );
        settings.set_default_cache_dsn(CacheDsn::parse("redis:///1").unwrap());
        settings.apply_dsn_defaults().unwrap();
        assert_eq!(
            settings.caches["default"].backend,
            "django.core.cache.backends.memcached.PyLibMCCache"
        );
    }

    #[test]
    fn test_django_default_project_preset() {
        let settings = Settings::django_default_project();
        assert_eq!(
            settings.databases["default"].engine,
            "django.db.backends.sqlite3"
        );
        assert_eq!(settings.databases["default"].name, "db.sqlite3");
        assert_eq!(settings.installed_apps.len(), 6);
        assert_eq!(settings.middleware.len(), 7);
        assert_eq!(settings.auth_password_validators.len(), 4);
        assert!(settings.use_tz);
        assert_eq!(settings.time_zone, "UTC");
        assert_eq!(settings.static_url.as_deref(), Some("static/"));
        assert_eq!(settings.default_auto_field, "django.db.models.BigAutoField");
    }

    #[test]
    fn test_django_default_project_overrides() {
        let overrides = Settings::django_default_project().to_overrides().unwrap();
        assert_eq!(overrides["TIME_ZONE"], "UTC");
        assert_eq!(overrides["DATABASES"]["default"]["NAME"], "db.sqlite3");
        assert_eq!(
            overrides["TEMPLATES"][0]["BACKEND"],
            "django.template.backends.django.DjangoTemplates"
        );
        // Untouched framework defaults still stay out of the mapping.
        assert!(!overrides.contains_key("SESSION_COOKIE_AGE"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Settings, _> = serde_json::from_value(serde_json::json!({
            "NOT_A_SETTING": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_templates_deserialize() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "TEMPLATES": [{
                "BACKEND": "django.template.backends.django.DjangoTemplates",
                "APP_DIRS": true
            }]
        }))
        .unwrap();
        assert_eq!(
            settings.templates[0].backend,
            "django.template.backends.django.DjangoTemplates"
        );
        assert_eq!(settings.templates[0].app_dirs, Some(true));
    }
}
