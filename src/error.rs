//! Error types for client configuration validation and TLS setup.
//!
//! Every rejection is a distinguishable value: callers match on the variant
//! to learn which rule failed, or on [`ErrorKind`] to learn whether the
//! configuration itself is malformed or the embedded PEM material is.
//!
//! ## Security Note
//!
//! Error messages never echo bind passwords or private key material.

use thiserror::Error;

// ============================================================================
// Error Kind
// ============================================================================

/// Broad classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structural or policy violation in the configuration itself.
    InvalidParameter,
    /// PEM, X.509 or key-pair material failed to parse or to match.
    CertificateParse,
}

// ============================================================================
// Certificate Errors
// ============================================================================

/// Failures while decoding PEM certificate and key material.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("missing certificate pem block")]
    MissingPemBlock,

    #[error("failed to decode PEM block in the certificate: {}", describe_label(.label))]
    BadPemBlock { label: Option<String> },

    #[error("failed to parse certificate: {0}")]
    X509(String),

    #[error("failed to parse certificate: {0} trailing bytes after DER structure")]
    TrailingData(usize),

    #[error("failed to find any PEM data in certificate input")]
    NoCertificates,

    #[error("failed to find any PEM data in key input")]
    NoPrivateKey,

    #[error("failed to read PEM data: {0}")]
    Pem(#[from] std::io::Error),

    #[error("failed to parse private key: {0}")]
    PrivateKey(String),

    #[error("cannot check private key against certificate: unsupported key algorithm ({0})")]
    UnsupportedKeyAlgorithm(String),

    #[error("private key does not match public key")]
    KeyMismatch,
}

fn describe_label(label: &Option<String>) -> String {
    match label {
        Some(label) => format!("unexpected PEM type '{label}', expected 'CERTIFICATE'"),
        None => "no PEM block found".to_string(),
    }
}

impl CertificateError {
    /// Classify this error.
    ///
    /// A missing or mistyped PEM block is a parameter problem; anything that
    /// got as far as DER or key decoding is a parse problem.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingPemBlock | Self::BadPemBlock { .. } => ErrorKind::InvalidParameter,
            Self::X509(_)
            | Self::TrailingData(_)
            | Self::NoCertificates
            | Self::NoPrivateKey
            | Self::Pem(_)
            | Self::PrivateKey(_)
            | Self::UnsupportedKeyAlgorithm(_)
            | Self::KeyMismatch => ErrorKind::CertificateParse,
        }
    }
}

// ============================================================================
// Config Errors
// ============================================================================

/// Rejection of a [`ClientConfig`](crate::ClientConfig).
///
/// Variants are listed in the order the rules are checked; only the first
/// failing rule is reported.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one url must be provided")]
    MissingUrls,

    #[error("invalid 'tls_min_version' in config: {0:?}")]
    InvalidTlsMinVersion(String),

    #[error("invalid 'tls_max_version' in config: {0:?}")]
    InvalidTlsMaxVersion(String),

    #[error("'tls_max_version' ({max}) must be greater than or equal to 'tls_min_version' ({min})")]
    TlsVersionOrder { min: String, max: String },

    #[error("failed to parse server tls cert: {0}")]
    ServerCertificate(#[source] CertificateError),

    #[error("both client_tls_cert and client_tls_key must be set in configuration")]
    IncompleteClientIdentity,

    #[error("failed to parse client X509 key pair: {0}")]
    ClientKeyPair(#[source] CertificateError),
}

impl ConfigError {
    /// Classify this error, looking through wrapped certificate errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingUrls
            | Self::InvalidTlsMinVersion(_)
            | Self::InvalidTlsMaxVersion(_)
            | Self::TlsVersionOrder { .. }
            | Self::IncompleteClientIdentity => ErrorKind::InvalidParameter,
            Self::ServerCertificate(e) | Self::ClientKeyPair(e) => e.kind(),
        }
    }

    /// Static name of the rule that failed, for log fields and metrics labels.
    #[inline]
    pub fn rule(&self) -> &'static str {
        match self {
            Self::MissingUrls => "urls",
            Self::InvalidTlsMinVersion(_) => "tls_min_version",
            Self::InvalidTlsMaxVersion(_) => "tls_max_version",
            Self::TlsVersionOrder { .. } => "tls_version_order",
            Self::ServerCertificate(_) => "certificate",
            Self::IncompleteClientIdentity => "client_tls_pair",
            Self::ClientKeyPair(_) => "client_tls_key_pair",
        }
    }
}

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

// ============================================================================
// TLS Setup Errors
// ============================================================================

/// Failures while turning a validated configuration into a rustls client config.
#[derive(Debug, Error)]
pub enum TlsSetupError {
    #[error("no TLS protocol version between {min} and {max} is supported")]
    NoSupportedVersion { min: String, max: String },

    #[error("failed to add trust anchor: {0}")]
    TrustAnchor(#[source] rustls::Error),

    #[error("failed to build TLS client config: {0}")]
    Rustls(#[from] rustls::Error),
}
