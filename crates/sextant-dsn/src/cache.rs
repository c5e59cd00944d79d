//! Cache connection-string parsing.
//!
//! A cache DSN is a URL of the form
//! `scheme://[user:password@]host[:port]/[db][?options]` for networked
//! caches, or `scheme:///path` for file and socket based caches. The scheme
//! selects the backend class; Redis-family schemes carry a database index
//! and may embed a password, and memcached-family socket locations are
//! prefixed with `unix:`.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::DsnError;

/// Backend class selected for the Redis-family schemes.
///
/// This is the framework's built-in Redis backend; passwords for it are
/// embedded in the location authority rather than placed in `OPTIONS`.
pub const BUILTIN_REDIS_BACKEND: &str = "django.core.cache.backends.redis.RedisCache";

/// Scheme to backend class table.
pub const CACHE_ENGINES: &[(&str, &str)] = &[
    ("db", "django.core.cache.backends.db.DatabaseCache"),
    ("djangopylibmc", "django_pylibmc.memcached.PyLibMCCache"),
    ("dummy", "django.core.cache.backends.dummy.DummyCache"),
    ("elasticache", "django_elasticache.memcached.ElastiCache"),
    ("file", "django.core.cache.backends.filebased.FileBasedCache"),
    ("hiredis", BUILTIN_REDIS_BACKEND),
    ("locmem", "django.core.cache.backends.locmem.LocMemCache"),
    ("memcached", "django.core.cache.backends.memcached.PyLibMCCache"),
    ("pymemcache", "django.core.cache.backends.memcached.PyMemcacheCache"),
    ("pymemcached", "django.core.cache.backends.memcached.MemcachedCache"),
    ("redis-cache", "redis_cache.RedisCache"),
    ("redis", BUILTIN_REDIS_BACKEND),
    ("rediss", BUILTIN_REDIS_BACKEND),
    ("uwsgicache", "uwsgicache.UWSGICache"),
];

/// Parser class options keyed by scheme.
const REDIS_PARSERS: &[(&str, &str)] = &[("hiredis", "redis.connection.HiredisParser")];

/// Schemes whose file locations are Unix-socket paths and get a `unix:`
/// prefix.
const FILE_UNIX_PREFIX: &[&str] = &[
    "memcached",
    "pymemcached",
    "pymemcache",
    "djangopylibmc",
    "redis",
    "hiredis",
];

const REDIS_SCHEMES: &[&str] = &["redis", "rediss", "hiredis", "redis-cache"];

const DEFAULT_REDIS_HOST: &str = "localhost";
const DEFAULT_REDIS_PORT: u16 = 6379;

fn backend_for(scheme: &str) -> Option<&'static str> {
    CACHE_ENGINES
        .iter()
        .find(|(s, _)| *s == scheme)
        .map(|(_, backend)| *backend)
}

/// A validated cache connection string.
///
/// Query-string keys are upper-cased on construction; a repeated key has its
/// values joined with `;`.
///
/// # Example
///
/// ```
/// use sextant_dsn::CacheDsn;
///
/// let dsn = CacheDsn::parse("redis://localhost:6379/0").unwrap();
/// let config = dsn.to_cache_config().unwrap();
/// assert_eq!(config.location, "redis://localhost:6379/0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDsn {
    url: Url,
    query_args: IndexMap<String, String>,
}

impl CacheDsn {
    /// Parse and validate a cache connection string.
    ///
    /// # Errors
    ///
    /// Returns [`DsnError::InvalidUrl`] for a malformed URL and
    /// [`DsnError::SchemeNotAllowed`] when the scheme has no backend
    /// mapping.
    pub fn parse(input: &str) -> Result<Self, DsnError> {
        let url = Url::parse(input).map_err(|source| DsnError::invalid_url(input, source))?;
        if backend_for(url.scheme()).is_none() {
            return Err(DsnError::scheme_not_allowed(url.scheme()));
        }

        let mut query_args: IndexMap<String, String> = IndexMap::new();
        for (key, value) in url.query_pairs() {
            match query_args.entry(key.to_uppercase()) {
                Entry::Occupied(mut entry) => {
                    let joined = entry.get_mut();
                    joined.push(';');
                    joined.push_str(&value);
                }
                Entry::Vacant(entry) => {
                    entry.insert(value.into_owned());
                }
            }
        }

        Ok(Self { url, query_args })
    }

    /// The URL scheme.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The backend class selected by the scheme.
    pub fn backend(&self) -> &'static str {
        backend_for(self.url.scheme()).unwrap_or_default()
    }

    /// Upper-cased query arguments, repeated keys joined with `;`.
    pub fn query_args(&self) -> &IndexMap<String, String> {
        &self.query_args
    }

    /// Whether the scheme belongs to the Redis family.
    pub fn is_redis_scheme(&self) -> bool {
        REDIS_SCHEMES.contains(&self.url.scheme())
    }

    /// Produce the structured backend descriptor for this DSN.
    ///
    /// # Errors
    ///
    /// Returns [`DsnError::InvalidOption`] when a numeric query argument
    /// (`MAX_ENTRIES`, `CULL_FREQUENCY`, `TIMEOUT`, `VERSION`) does not
    /// parse as an integer.
    pub fn to_cache_config(&self) -> Result<CacheConfig, DsnError> {
        let scheme = self.url.scheme();
        let backend = self.backend();

        let mut options: IndexMap<String, Value> = IndexMap::new();
        if let Some((_, parser)) = REDIS_PARSERS.iter().find(|(s, _)| *s == scheme) {
            options.insert("PARSER_CLASS".to_string(), Value::String((*parser).to_string()));
        }

        let mut args = self.query_args.clone();
        let host = self.url.host_str().unwrap_or("");
        let mut location = String::new();

        if host.is_empty() {
            let path = self.url.path();
            if self.is_redis_scheme() && is_bare_db_index(path) {
                // A hostless Redis URL whose path is just a database index
                // is networked against the default host, not file-based.
                let db = path.strip_prefix('/').filter(|p| !p.is_empty()).unwrap_or("0");
                location = format!(
                    "{}://{DEFAULT_REDIS_HOST}:{DEFAULT_REDIS_PORT}/{db}",
                    location_scheme(scheme)
                );
            } else {
                let mut path = path.to_string();
                if FILE_UNIX_PREFIX.contains(&scheme) {
                    path = format!("unix:{path}");
                }
                if self.is_redis_scheme() {
                    let db = match split_trailing_db_index(&path) {
                        Some((head, db)) => {
                            path = head.to_string();
                            db
                        }
                        None => "0".to_string(),
                    };
                    path = format!("{path}?db={db}");
                }
                location = path;
            }
        } else if self.is_redis_scheme() {
            let db = self
                .url
                .path()
                .strip_prefix('/')
                .filter(|p| !p.is_empty())
                .unwrap_or("0");
            let port = self.url.port().unwrap_or(DEFAULT_REDIS_PORT);
            location = format!("{}://{host}:{port}/{db}", location_scheme(scheme));
            if let Some(password) = self.url.password() {
                if backend == BUILTIN_REDIS_BACKEND || scheme == "redis-cache" {
                    location = location.replacen("://", &format!("://{password}@"), 1);
                } else {
                    options.insert("PASSWORD".to_string(), Value::String(password.to_string()));
                }
            }
        }

        // redis-cache recognizes a handful of client-specific arguments.
        if scheme == "redis-cache" {
            for key in ["PARSER_CLASS", "CONNECTION_POOL_CLASS"] {
                if let Some(value) = args.shift_remove(key) {
                    options.insert(key.to_string(), Value::String(value));
                }
            }
            let mut pool_kwargs = serde_json::Map::new();
            for key in ["MAX_CONNECTIONS", "TIMEOUT"] {
                if let Some(value) = args.shift_remove(key) {
                    pool_kwargs.insert(key.to_string(), Value::String(value));
                }
            }
            if !pool_kwargs.is_empty() {
                options.insert(
                    "CONNECTION_POOL_CLASS_KWARGS".to_string(),
                    Value::Object(pool_kwargs),
                );
            }
        }

        if scheme == "uwsgicache" && location.is_empty() {
            location = "default".to_string();
        }

        for key in ["MAX_ENTRIES", "CULL_FREQUENCY"] {
            if let Some(value) = args.shift_remove(key) {
                let parsed: i64 = value
                    .parse()
                    .map_err(|_| DsnError::invalid_option(key, value.clone()))?;
                options.insert(key.to_string(), Value::Number(parsed.into()));
            }
        }

        let mut config = CacheConfig {
            backend: backend.to_string(),
            location,
            options,
            ..CacheConfig::default()
        };

        // Remaining arguments pass through to the top-level descriptor.
        for (key, value) in args {
            match key.as_str() {
                "KEY_PREFIX" => config.key_prefix = Some(value),
                "KEY_FUNCTION" => config.key_function = Some(value),
                "TIMEOUT" => {
                    config.timeout = Some(
                        value
                            .parse()
                            .map_err(|_| DsnError::invalid_option("TIMEOUT", value.clone()))?,
                    );
                }
                "VERSION" => {
                    config.version = Some(
                        value
                            .parse()
                            .map_err(|_| DsnError::invalid_option("VERSION", value.clone()))?,
                    );
                }
                _ => {
                    config.extra.insert(key, value);
                }
            }
        }

        Ok(config)
    }
}

impl std::str::FromStr for CacheDsn {
    type Err = DsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for CacheDsn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.url.fmt(f)
    }
}

fn location_scheme(scheme: &str) -> &'static str {
    if scheme == "rediss" {
        "rediss"
    } else {
        "redis"
    }
}

/// Whether a hostless path is nothing more than a database index, e.g. ``,
/// `/` or `/2`.
fn is_bare_db_index(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);
    rest.is_empty() || rest.bytes().all(|b| b.is_ascii_digit())
}

/// Split a trailing `/<digits>` database index off a location path.
fn split_trailing_db_index(path: &str) -> Option<(&str, String)> {
    let (head, tail) = path.rsplit_once('/')?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((head, tail.to_string()))
}

/// Structured cache backend descriptor.
///
/// Serializes with the upper-case key names the target framework consumes:
/// `BACKEND`, `LOCATION` and `OPTIONS`, the standard cache arguments
/// `KEY_PREFIX`, `KEY_FUNCTION`, `TIMEOUT` and `VERSION`, and any
/// passthrough query keys flattened at the top level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CacheConfig {
    /// Backend class path.
    pub backend: String,

    /// Location string: `host:port/db` URL, file path or `unix:` socket.
    #[serde(default)]
    pub location: String,

    /// Backend-specific options; omitted when empty.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, Value>,

    /// Prefix prepended to every cache key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<String>,

    /// Dotted path of a custom key function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_function: Option<String>,

    /// Default timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,

    /// Default version for cache keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,

    /// Passthrough arguments merged into the top level.
    #[serde(flatten)]
    pub extra: IndexMap<String, String>,
}
