//! Per-target-chain append-only hash chain over external execution
//! results (component I).

pub mod chain;
pub mod error;
pub mod hashing;
pub mod observer;

pub use chain::{verify_chain, ResultHashChain};
pub use error::ChainError;
pub use hashing::{compute_result_hash, compute_result_id};
pub use observer::{ChainObserver, ObserverError};
