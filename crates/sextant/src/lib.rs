//! Environment-driven framework settings.
//!
//! Sextant turns connection strings and `DJANGO_`-prefixed environment
//! variables into a validated settings mapping and installs it into a
//! caller-owned configuration context, once.
//!
//! The crate is a facade over two members:
//!
//! - [`dsn`]: parsers turning database and cache URLs into framework
//!   connection descriptors.
//! - [`settings`]: the typed settings model, the layered loader and the
//!   one-shot bootstrap.
//!
//! # Quick start
//!
//! ```
//! use sextant::{Bootstrap, ConfigContext, EnvSource};
//!
//! let env = EnvSource::from_pairs([
//!     ("DJANGO_DEBUG", "true"),
//!     ("DATABASE_URL", "sqlite:///db.sqlite3"),
//!     ("CACHE_URL", "redis://cache.example.com:6379/0"),
//! ]);
//!
//! let mut ctx = ConfigContext::new();
//! Bootstrap::from_env(env).configure(&mut ctx).unwrap();
//!
//! assert_eq!(ctx.get("DEBUG").unwrap(), true);
//! assert_eq!(
//!     ctx.get("DATABASES").unwrap()["default"]["NAME"],
//!     "db.sqlite3"
//! );
//! ```

#![warn(missing_docs)]

pub use sextant_dsn as dsn;
pub use sextant_settings as settings;

pub use sextant_dsn::{CacheConfig, CacheDsn, DatabaseConfig, DatabaseDsn, DsnError};
pub use sextant_settings::{
    Bootstrap, ConfigContext, ConfigureOutcome, DsnTarget, EnvSource, Loader, Settings,
    SettingsError,
};
