//! BLS12-381 sign/verify/aggregate pipeline with domain separation.
//!
//! Uses `blst`'s `min_sig` scheme: 48-byte G1 signatures, 96-byte G2
//! public keys.

use blst::min_sig::{
    AggregatePublicKey, AggregateSignature, PublicKey as BlstPublicKey, SecretKey,
    Signature as BlstSignature,
};
use blst::BLST_ERROR;
use certen_types::{Hash32, BLS_SIG_BYTES};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Hash-to-curve domain separation tag required by the BLS ciphersuite.
/// Distinct from the application-level `domain` string passed to `sign`;
/// this is the fixed IETF hash-to-curve DST, not a per-purpose tag.
const HASH_TO_CURVE_DST: &[u8] = b"CERTEN-CPE-BLS12381G1_XMD:SHA-256_SSWU_RO_SIG_";

/// Errors from BLS key generation, signing, verification, or aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlsError {
    /// Seed was shorter than the 32 bytes `blst` requires for key generation.
    #[error("seed must be at least 32 bytes")]
    SeedTooShort,

    /// A secret key, public key, or signature was malformed.
    #[error("invalid BLS key or signature encoding")]
    InvalidEncoding,

    /// Signature verification failed.
    #[error("BLS signature verification failed")]
    VerifyFailed,

    /// Attempted to aggregate an empty list of signatures or public keys.
    #[error("cannot aggregate an empty list")]
    EmptyAggregate,

    /// Aggregation itself failed (e.g. a point failed its subgroup check).
    #[error("BLS aggregation failed")]
    AggregationFailed,
}

/// A BLS12-381 secret key.
pub struct SecretSigningKey(SecretKey);

/// A BLS12-381 public key (96-byte compressed G2 point).
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(BlstPublicKey);

/// A BLS12-381 signature (48-byte compressed G1 point).
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(BlstSignature);

impl SecretSigningKey {
    /// Generate a fresh random key pair.
    pub fn generate() -> (Self, PublicKey) {
        let mut ikm = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut ikm);
        // key_gen only fails on a too-short ikm slice, which cannot happen here.
        let sk = SecretKey::key_gen(&ikm, &[]).expect("32-byte ikm is always valid");
        let pk = PublicKey(sk.sk_to_pk());
        (Self(sk), pk)
    }

    /// Deterministically derive a key pair from a seed, for validator key
    /// rotation and reproducible tests. Requires a seed of at least 32
    /// bytes.
    pub fn from_seed(seed: &[u8]) -> Result<(Self, PublicKey), BlsError> {
        if seed.len() < 32 {
            return Err(BlsError::SeedTooShort);
        }
        let sk = SecretKey::key_gen(seed, &[]).map_err(|_| BlsError::InvalidEncoding)?;
        let pk = PublicKey(sk.sk_to_pk());
        Ok((Self(sk), pk))
    }

    /// Sign `msg` under the given domain-separation tag.
    ///
    /// The signed payload is `SHA-256(domain || msg)`, not `msg` directly —
    /// this keeps attestations, and any future signature purpose added
    /// under a different `domain`, from being interchangeable even if the
    /// underlying message bytes collide.
    pub fn sign(&self, msg: &[u8], domain: &str) -> Signature {
        let digest = domain_digest(domain, msg);
        Signature(self.0.sign(&digest, HASH_TO_CURVE_DST, &[]))
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.sk_to_pk())
    }
}

impl PublicKey {
    /// Parse from a 96-byte compressed G2 point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlsError> {
        BlstPublicKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| BlsError::InvalidEncoding)
    }

    /// Serialize to a 96-byte compressed G2 point.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    /// Verify that `signature` is a valid signature over `msg` under
    /// `domain`.
    pub fn verify(&self, msg: &[u8], domain: &str, signature: &Signature) -> bool {
        let digest = domain_digest(domain, msg);
        signature
            .0
            .verify(true, &digest, HASH_TO_CURVE_DST, &[], &self.0, true)
            == BLST_ERROR::BLST_SUCCESS
    }

    /// Aggregate several public keys into one (order-independent).
    pub fn aggregate(keys: &[PublicKey]) -> Result<PublicKey, BlsError> {
        if keys.is_empty() {
            return Err(BlsError::EmptyAggregate);
        }
        let refs: Vec<&BlstPublicKey> = keys.iter().map(|k| &k.0).collect();
        let agg = AggregatePublicKey::aggregate(&refs, false)
            .map_err(|_| BlsError::AggregationFailed)?;
        Ok(PublicKey(agg.to_public_key()))
    }
}

impl Signature {
    /// Parse from a 48-byte compressed G1 point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlsError> {
        if bytes.len() != BLS_SIG_BYTES {
            return Err(BlsError::InvalidEncoding);
        }
        BlstSignature::from_bytes(bytes)
            .map(Self)
            .map_err(|_| BlsError::InvalidEncoding)
    }

    /// Serialize to a 48-byte compressed G1 point.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    /// Aggregate several signatures into one (order-independent; callers
    /// verify against the matching aggregated public key via
    /// `verify_aggregate`).
    pub fn aggregate(signatures: &[Signature]) -> Result<Signature, BlsError> {
        if signatures.is_empty() {
            return Err(BlsError::EmptyAggregate);
        }
        let refs: Vec<&BlstSignature> = signatures.iter().map(|s| &s.0).collect();
        let agg = AggregateSignature::aggregate(&refs, true)
            .map_err(|_| BlsError::AggregationFailed)?;
        Ok(Signature(agg.to_signature()))
    }
}

/// Verify an aggregated signature against a set of public keys, all
/// having signed the same `msg` under the same `domain`.
///
/// Removing any one public key from `keys` falsifies verification, since
/// the aggregated public key changes.
pub fn verify_aggregate(
    aggregate_sig: &Signature,
    keys: &[PublicKey],
    msg: &[u8],
    domain: &str,
) -> Result<(), BlsError> {
    let agg_pk = PublicKey::aggregate(keys)?;
    if agg_pk.verify(msg, domain, aggregate_sig) {
        Ok(())
    } else {
        Err(BlsError::VerifyFailed)
    }
}

fn domain_digest(domain: &str, msg: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(msg);
    hasher.finalize().to_vec()
}

/// The `SHA-256(domain || msg)` digest actually signed by [`SecretSigningKey::sign`],
/// exposed as a `Hash32` so callers can record it (e.g. as an
/// `AttestationAggregate::message_hash`) without recomputing the hash
/// construction themselves.
pub fn signing_digest(domain: &str, msg: &[u8]) -> Hash32 {
    Hash32::from_bytes(
        domain_digest(domain, msg)
            .try_into()
            .expect("SHA-256 digest is always 32 bytes"),
    )
}
