//! Sync policy evaluation
//!
//! Decides, from the global `RefreshMode` and the state of a cache entry,
//! how a source is brought up to date before its content is read:
//!
//! | mode          | existing entry                 | new entry                 |
//! |---------------|--------------------------------|---------------------------|
//! | `always`      | fetch, reset, checkout         | fetch, checkout           |
//! | `last-resort` | checkout, fetch only on failure| fetch, checkout           |
//! | `skip`        | use as is                      | unavailable               |

use crate::cache::CacheEntry;
use crate::config::RefreshMode;

/// What the checkout engine does for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPlan {
    /// Fetch the branch tip, then force a checkout of it. With `reset`, local
    /// modifications are discarded first.
    FetchThenCheckout { reset: bool },
    /// Force a checkout from refs already known locally; on failure other
    /// than sparse exclusion, fetch once and retry.
    CheckoutThenFetch,
    /// Use the working tree as it is.
    UseAsIs,
    /// No checkout exists and the mode forbids creating one.
    Unavailable,
}

impl SyncPlan {
    /// Whether this plan creates the cache entry when it is missing.
    pub fn initializes(&self) -> bool {
        matches!(
            self,
            SyncPlan::FetchThenCheckout { .. } | SyncPlan::CheckoutThenFetch
        )
    }
}

/// Plan the synchronization of a working-tree checkout.
pub fn plan(mode: RefreshMode, entry: &CacheEntry) -> SyncPlan {
    match (mode, entry.exists()) {
        (RefreshMode::Always, exists) => SyncPlan::FetchThenCheckout { reset: exists },
        // A fresh entry has no refs to check out from.
        (RefreshMode::LastResort, false) => SyncPlan::FetchThenCheckout { reset: false },
        (RefreshMode::LastResort, true) => SyncPlan::CheckoutThenFetch,
        (RefreshMode::Skip, true) => SyncPlan::UseAsIs,
        (RefreshMode::Skip, false) => SyncPlan::Unavailable,
    }
}

/// Whether refs must be fetched for a timestamp-only sync, given whether
/// the tracked branch is already known locally.
pub fn should_fetch_refs(mode: RefreshMode, entry: &CacheEntry, ref_known: bool) -> bool {
    match mode {
        RefreshMode::Always => true,
        RefreshMode::LastResort => !entry.exists() || !ref_known,
        RefreshMode::Skip => false,
    }
}
