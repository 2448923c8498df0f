//! Directory client configuration and its validation.
//!
//! This module is split into logical submodules:
//! - [`types`]: the `ClientConfig` record and its defaults
//! - [`tls_version`]: TLS version labels and ordering
//! - [`certificate`]: PEM certificate and key-pair parsing
//! - [`validation`]: the ordered validation rules and `ValidatedConfig`

mod certificate;
mod tls_version;
mod types;
mod validation;

pub use certificate::{ClientIdentity, parse_client_key_pair, validate_certificate};
pub use tls_version::{TlsVersion, TlsVersionRange, UnknownTlsVersion};
pub use types::{
    ClientConfig, DEFAULT_GROUP_ATTR, DEFAULT_GROUP_FILTER, DEFAULT_TLS_MAX_VERSION,
    DEFAULT_TLS_MIN_VERSION, DEFAULT_URL, DEFAULT_USER_ATTR,
};
pub use validation::ValidatedConfig;
