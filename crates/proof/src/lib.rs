//! Layered receipt proof construction and verification: per-layer
//! builders (component D), consensus binding (component E), and the
//! composed `ChainedProof`'s cross-layer invariants (component C).

pub mod builder;
pub mod chained;
pub mod client;
pub mod consensus;
pub mod error;

pub use builder::{build_layer1, build_layer2, build_layer3};
pub use chained::{check_invariants, compose, verify, VerifyMode};
pub use client::{ChainEntryRecord, ChainQueryClient, CommitHeader, ConsensusClient};
pub use consensus::bind_app_hash;
pub use error::{ConsensusError, ProofError};
