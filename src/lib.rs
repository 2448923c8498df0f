//! ldap-client-config - validation gate for directory client configuration.
//!
//! A [`ClientConfig`] describes how to reach and authenticate to an LDAP
//! directory. Before any connection is attempted it must pass
//! [`ClientConfig::validate`] (or [`ClientConfig::resolve`], which also
//! hands back the decoded TLS material). [`tls::client_config`] then turns
//! the accepted configuration into a rustls client config.
//!
//! ```no_run
//! use ldap_client_config::ClientConfig;
//!
//! let config = ClientConfig {
//!     urls: vec!["ldaps://ldap.example.com:636".to_string()],
//!     tls_min_version: "tls12".to_string(),
//!     tls_max_version: "tls13".to_string(),
//!     ..Default::default()
//! };
//! let validated = config.resolve()?;
//! let _tls = ldap_client_config::tls::client_config(&validated)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod tls;

pub use config::{ClientConfig, ClientIdentity, TlsVersion, TlsVersionRange, ValidatedConfig};
pub use error::{CertificateError, ConfigError, ConfigResult, ErrorKind, TlsSetupError};
