//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`VersionLabel`] - Validated OCFL version label (`v1`, `v002`, ...)
//! - [`DigestAlgorithm`] - Digest algorithm declared by an inventory
//! - [`ContentDigest`] - Normalized hexadecimal content digest
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so the inventory model never has to re-check them.
//!
//! # Examples
//!
//! ```
//! use ocfl_audit::core::types::{ContentDigest, DigestAlgorithm, VersionLabel};
//!
//! let v2 = VersionLabel::new("v2").unwrap();
//! let v10 = VersionLabel::new("v10").unwrap();
//! assert!(v2 < v10);
//!
//! let digest = ContentDigest::new("ABCD1234").unwrap();
//! assert_eq!(digest.as_str(), "abcd1234");
//!
//! assert_eq!("sha512".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha512);
//! assert!(VersionLabel::new("version-1").is_err());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid version label: {0}")]
    InvalidVersionLabel(String),

    #[error("invalid content digest: {0}")]
    InvalidDigest(String),

    #[error("unsupported digest algorithm: {0}")]
    UnsupportedDigestAlgorithm(String),
}

/// A validated OCFL version label.
///
/// Labels are `v` followed by one or more decimal digits. Zero-padded
/// labels (`v001`) are accepted. Ordering compares the numeric value, so
/// `v9 < v10` even though the strings sort the other way.
///
/// # Example
///
/// ```
/// use ocfl_audit::core::types::VersionLabel;
///
/// let label = VersionLabel::new("v3").unwrap();
/// assert_eq!(label.number(), 3);
/// assert_eq!(label.as_str(), "v3");
///
/// assert!(VersionLabel::new("").is_err());
/// assert!(VersionLabel::new("v").is_err());
/// assert!(VersionLabel::new("3").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionLabel {
    label: String,
    number: u64,
}

impl VersionLabel {
    /// Create a new validated version label.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidVersionLabel` if the label is not `v<digits>`.
    pub fn new(label: impl Into<String>) -> Result<Self, TypeError> {
        let label = label.into();
        let digits = label
            .strip_prefix('v')
            .ok_or_else(|| TypeError::InvalidVersionLabel(label.clone()))?;

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(TypeError::InvalidVersionLabel(label));
        }

        let number = digits
            .parse::<u64>()
            .map_err(|_| TypeError::InvalidVersionLabel(label.clone()))?;

        Ok(Self { label, number })
    }

    /// Get the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// Get the numeric version.
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl Ord for VersionLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for VersionLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<String> for VersionLabel {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VersionLabel> for String {
    fn from(label: VersionLabel) -> Self {
        label.label
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Digest algorithm used by a repository's manifest keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// The algorithm name as written in an inventory.
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Length of a hex-encoded digest for this algorithm.
    pub fn hex_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(TypeError::UnsupportedDigestAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hexadecimal content digest.
///
/// Stored lowercase. Manifest keys may be written in either case, and two
/// digests of the same bytes must compare equal regardless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Create a new normalized digest.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidDigest` if the value is empty or contains
    /// non-hex characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidDigest(value));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Build a digest from raw hash output.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Get the digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod version_label {
        use super::*;

        #[test]
        fn valid_labels() {
            assert!(VersionLabel::new("v1").is_ok());
            assert!(VersionLabel::new("v10").is_ok());
            assert!(VersionLabel::new("v0003").is_ok());
        }

        #[test]
        fn invalid_labels() {
            assert!(VersionLabel::new("").is_err());
            assert!(VersionLabel::new("v").is_err());
            assert!(VersionLabel::new("V1").is_err());
            assert!(VersionLabel::new("v1a").is_err());
            assert!(VersionLabel::new("v-1").is_err());
            assert!(VersionLabel::new("1").is_err());
        }

        #[test]
        fn numeric_ordering() {
            let mut labels: Vec<VersionLabel> = ["v10", "v2", "v1", "v9"]
                .into_iter()
                .map(|s| VersionLabel::new(s).unwrap())
                .collect();
            labels.sort();
            let ordered: Vec<&str> = labels.iter().map(|l| l.as_str()).collect();
            assert_eq!(ordered, vec!["v1", "v2", "v9", "v10"]);
        }

        #[test]
        fn padded_labels_order_by_number() {
            let v002 = VersionLabel::new("v002").unwrap();
            let v010 = VersionLabel::new("v010").unwrap();
            assert!(v002 < v010);
            assert_eq!(v010.number(), 10);
        }

        #[test]
        fn serde_roundtrip() {
            let label = VersionLabel::new("v4").unwrap();
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, "\"v4\"");
            let parsed: VersionLabel = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, label);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<VersionLabel, _> = serde_json::from_str("\"head\"");
            assert!(result.is_err());
        }
    }

    mod digest {
        use super::*;

        #[test]
        fn normalizes_case() {
            let upper = ContentDigest::new("ABCDEF01").unwrap();
            let lower = ContentDigest::new("abcdef01").unwrap();
            assert_eq!(upper, lower);
        }

        #[test]
        fn rejects_non_hex() {
            assert!(ContentDigest::new("").is_err());
            assert!(ContentDigest::new("xyz").is_err());
            assert!(ContentDigest::new("abcd 1234").is_err());
        }

        #[test]
        fn from_bytes_is_hex() {
            let digest = ContentDigest::from_bytes(&[0xde, 0xad, 0xbe, 0xef]);
            assert_eq!(digest.as_str(), "deadbeef");
        }
    }

    mod algorithm {
        use super::*;

        #[test]
        fn parse_supported() {
            assert_eq!(
                "sha256".parse::<DigestAlgorithm>().unwrap(),
                DigestAlgorithm::Sha256
            );
            assert_eq!(
                "SHA512".parse::<DigestAlgorithm>().unwrap(),
                DigestAlgorithm::Sha512
            );
        }

        #[test]
        fn parse_unsupported() {
            let err = "md5".parse::<DigestAlgorithm>().unwrap_err();
            assert_eq!(err, TypeError::UnsupportedDigestAlgorithm("md5".into()));
        }

        #[test]
        fn hex_lengths() {
            assert_eq!(DigestAlgorithm::Sha256.hex_len(), 64);
            assert_eq!(DigestAlgorithm::Sha512.hex_len(), 128);
        }
    }
}
