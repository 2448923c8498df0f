//! TLS protocol version labels.
//!
//! Configuration names TLS versions with short labels (`tls12`). The table
//! below is the single source of truth for which labels are recognized and
//! how they order.

use std::fmt;
use std::str::FromStr;

/// A TLS protocol version, ordered oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TlsVersion {
    Tls10,
    Tls11,
    Tls12,
    Tls13,
}

/// Recognized configuration labels.
const TLS_LOOKUP: &[(&str, TlsVersion)] = &[
    ("tls10", TlsVersion::Tls10),
    ("tls11", TlsVersion::Tls11),
    ("tls12", TlsVersion::Tls12),
    ("tls13", TlsVersion::Tls13),
];

impl TlsVersion {
    /// Look up a configuration label. Matching is exact and case-sensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        TLS_LOOKUP
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, version)| *version)
    }

    /// The configuration label for this version.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tls10 => "tls10",
            Self::Tls11 => "tls11",
            Self::Tls12 => "tls12",
            Self::Tls13 => "tls13",
        }
    }

    /// All recognized labels, oldest first.
    pub fn labels() -> impl Iterator<Item = &'static str> {
        TLS_LOOKUP.iter().map(|(name, _)| *name)
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unrecognized label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized TLS version label: {0:?}")]
pub struct UnknownTlsVersion(pub String);

impl FromStr for TlsVersion {
    type Err = UnknownTlsVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownTlsVersion(s.to_string()))
    }
}

/// An inclusive, non-empty range of acceptable TLS versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsVersionRange {
    min: TlsVersion,
    max: TlsVersion,
}

impl TlsVersionRange {
    /// Create a range, returning `None` when `max < min`.
    pub fn new(min: TlsVersion, max: TlsVersion) -> Option<Self> {
        (max >= min).then_some(Self { min, max })
    }

    pub fn min(&self) -> TlsVersion {
        self.min
    }

    pub fn max(&self) -> TlsVersion {
        self.max
    }

    /// Whether `version` falls inside the range.
    pub fn contains(&self, version: TlsVersion) -> bool {
        self.min <= version && version <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_recognizes_all_labels() {
        assert_eq!(TlsVersion::from_label("tls10"), Some(TlsVersion::Tls10));
        assert_eq!(TlsVersion::from_label("tls11"), Some(TlsVersion::Tls11));
        assert_eq!(TlsVersion::from_label("tls12"), Some(TlsVersion::Tls12));
        assert_eq!(TlsVersion::from_label("tls13"), Some(TlsVersion::Tls13));
    }

    #[test]
    fn lookup_rejects_unknown_labels() {
        assert_eq!(TlsVersion::from_label("tls9"), None);
        assert_eq!(TlsVersion::from_label("TLS12"), None);
        assert_eq!(TlsVersion::from_label(""), None);
        assert_eq!(TlsVersion::from_label("tls1.2"), None);
    }

    #[test]
    fn ordering_is_by_version_not_label() {
        assert!(TlsVersion::Tls10 < TlsVersion::Tls11);
        assert!(TlsVersion::Tls11 < TlsVersion::Tls12);
        assert!(TlsVersion::Tls12 < TlsVersion::Tls13);
    }

    #[test]
    fn label_round_trips_through_table() {
        for label in TlsVersion::labels() {
            let version: TlsVersion = label.parse().unwrap();
            assert_eq!(version.label(), label);
            assert_eq!(version.to_string(), label);
        }
        assert_eq!(TlsVersion::labels().count(), 4);
    }

    #[test]
    fn from_str_error_names_label() {
        let err = "ssl3".parse::<TlsVersion>().unwrap_err();
        assert_eq!(err, UnknownTlsVersion("ssl3".to_string()));
        assert!(err.to_string().contains("ssl3"));
    }

    #[test]
    fn range_requires_max_at_least_min() {
        assert!(TlsVersionRange::new(TlsVersion::Tls13, TlsVersion::Tls11).is_none());
        assert!(TlsVersionRange::new(TlsVersion::Tls12, TlsVersion::Tls12).is_some());

        let range = TlsVersionRange::new(TlsVersion::Tls11, TlsVersion::Tls13).unwrap();
        assert_eq!(range.min(), TlsVersion::Tls11);
        assert_eq!(range.max(), TlsVersion::Tls13);
        assert!(range.contains(TlsVersion::Tls12));
        assert!(!range.contains(TlsVersion::Tls10));
    }
}
