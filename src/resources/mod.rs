//! Shared resources: pools every player contests.
//!
//! - `SharedResourceDefinition` / `PoolState`: a pool as authored and as
//!   it currently stands
//! - `ClaimRule`: how contested claims are decided
//! - `SharedResourceArbiter`: contests, queued claims, renewals

mod arbiter;
mod pool;

pub use arbiter::{ClaimOutcome, ClaimRequest, ClaimResult, Renewal, SharedResourceArbiter};
pub use pool::{ClaimRule, PoolState, SharedResourceDefinition};
