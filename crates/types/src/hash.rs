//! Canonical 32-byte hash type, hex codec, and RFC-8785-style canonical JSON.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 32-byte hash value, normalized to lowercase hex at every boundary.
///
/// External (hex) form is always exactly 64 lowercase `[0-9a-f]` characters.
/// Fixing the string form at parse time eliminates case-mismatch false
/// negatives in downstream comparisons.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash32([u8; 32]);

impl Hash32 {
    /// Number of bytes in a `Hash32`.
    pub const BYTES: usize = 32;

    /// The all-zero hash, used as the empty-tree Merkle root and as the
    /// hash-chain genesis sentinel.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Build a `Hash32` from raw bytes without hashing.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Compute SHA-256 over the given data.
    pub fn digest(data: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(data);
        let out = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&out);
        Self(bytes)
    }

    /// Parse a lowercase 64-character hex string. Fails on any other
    /// length, on uppercase characters, or on non-hex characters.
    pub fn parse_hex32(s: &str) -> Result<Self, HexError> {
        if s.len() != 64 {
            return Err(HexError::InvalidLength {
                expected: 64,
                actual: s.len(),
            });
        }
        if !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return Err(HexError::NotLowercaseHex);
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| HexError::NotLowercaseHex)?;
        Ok(Self(bytes))
    }

    /// Render as a lowercase 64-character hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Borrow the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Consume into the underlying bytes.
    pub fn into_bytes(self) -> [u8; 32] {
        self.0
    }

    /// `true` iff every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash32::parse_hex32(&s).map_err(D::Error::custom)
    }
}

/// Errors parsing a hex-encoded 32-byte hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    /// Input was not exactly 64 characters.
    #[error("invalid hex length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Input contained characters outside lowercase `[0-9a-f]`.
    #[error("hash must be lowercase hex")]
    NotLowercaseHex,
}

/// Hash two 32-byte nodes together: `SHA-256(left || right)`.
///
/// Both inputs must be exactly 32 bytes; `Hash32` enforces this by
/// construction, so this function never fails.
pub fn hash_pair(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left.as_bytes());
    data[32..].copy_from_slice(right.as_bytes());
    Hash32::digest(&data)
}

/// Serialize a value to RFC-8785-style canonical JSON: object keys sorted
/// lexicographically, no insignificant whitespace, minimal numbers and
/// string escaping (delegated to `serde_json`'s compact writer once keys
/// are sorted).
///
/// Hashing over structured data must always go through this function;
/// direct `serde_json::to_vec` is forbidden wherever the result feeds a
/// hash, because key order and whitespace are otherwise unspecified.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    let canon = canonicalize_value(v);
    serde_json::to_vec(&canon)
}

/// Compute the SHA-256 hash of a value's canonical JSON encoding.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<Hash32, serde_json::Error> {
    Ok(Hash32::digest(&canonical_json(value)?))
}

fn canonicalize_value(v: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match v {
        Value::Object(map) => {
            let mut sorted: std::collections::BTreeMap<String, Value> =
                std::collections::BTreeMap::new();
            for (k, val) in map {
                sorted.insert(k, canonicalize_value(val));
            }
            let mut out = serde_json::Map::new();
            for (k, val) in sorted {
                out.insert(k, val);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}
