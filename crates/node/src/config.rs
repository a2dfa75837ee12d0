//! Node-level configuration: plain `Clone + Debug` structs with a
//! `Default` impl plus named constructors for the variants callers
//! actually reach for, rather than a builder.

use certen_attestation::QuorumConfig;
use certen_proof::VerifyMode;
use std::time::Duration;

/// Configuration for the batch collector and its cadence scheduler.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum leaves per batch before it closes immediately.
    pub max_batch_size: usize,

    /// How often the cadence scheduler polls to decide whether an open
    /// `BatchKind::OnCadence` batch should close.
    pub check_interval: Duration,

    /// The accumulation window: an open batch closes once its age (now
    /// minus its open time) reaches this duration, on the next poll.
    pub batch_interval: Duration,

    /// Whether the scheduler closes an empty open batch on a cadence tick
    /// (producing an empty batch) or skips the tick.
    pub close_empty_batches: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 5000,
            check_interval: Duration::from_millis(500),
            batch_interval: Duration::from_secs(2),
            close_empty_batches: false,
        }
    }
}

impl BatchConfig {
    /// A config with a custom size cap, polling cadence and accumulation
    /// window left at their defaults.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size,
            ..Default::default()
        }
    }

    /// A config that closes on every cadence tick even when empty, useful
    /// for target chains that need a steady heartbeat of anchors.
    pub fn always_close_on_cadence(batch_interval: Duration) -> Self {
        Self {
            batch_interval,
            close_empty_batches: true,
            ..Default::default()
        }
    }
}

/// Configuration for consensus app-hash binding during proof verification.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusBindConfig {
    pub mode: VerifyMode,
}

impl Default for ConsensusBindConfig {
    /// Proof-grade (full cryptographic binding) is the only mode this
    /// workspace recommends running in production.
    fn default() -> Self {
        Self {
            mode: VerifyMode::ProofGrade,
        }
    }
}

impl ConsensusBindConfig {
    /// Skip consensus app-hash re-binding; checks only the chained proof's
    /// own receipt and cross-layer invariants.
    pub fn integrity_only() -> Self {
        Self {
            mode: VerifyMode::IntegrityOnly,
        }
    }
}

/// A two-thirds-plus-one majority quorum over equal-weight validators,
/// with conservative concurrency and timeout defaults.
pub fn default_quorum_config() -> QuorumConfig {
    QuorumConfig {
        numerator: 2,
        denominator: 3,
        min_validators: 1,
        concurrent_requests: 16,
        per_peer_timeout: Duration::from_millis(500),
        overall_timeout: Duration::from_secs(2),
    }
}
