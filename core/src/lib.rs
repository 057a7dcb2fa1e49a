//! Domain types and the patch algebra sitting between block execution and
//! durable storage: a patch captures the effect of executing blocks against a
//! stable baseline without mutating it, and patches are merged, purged and
//! validated to reconcile concurrent speculative execution paths.

pub mod contract;
pub mod errors;
pub mod patch;
pub mod receipt;
pub mod tx;
