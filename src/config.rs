//! # Broadcast group configuration.
//!
//! Provides [`GroupConfig`], the settings a [`Group`](crate::Group) is
//! created with.
//!
//! ## Sentinel values
//! - `retry = 0s`: no `retry:` advice is sent to subscribers.
//! - `history_limit = 0`: history is disabled; late subscribers get no
//!   replay.
//! - `command_capacity` is clamped to a minimum of 1 when the
//!   coordinator channel is built.

use std::time::Duration;

/// Configuration for a broadcast [`Group`](crate::Group).
///
/// ## Field semantics
/// - `retry`: reconnection delay advice pushed to each subscriber on
///   attach (`0s` = never sent)
/// - `history_limit`: number of past events retained for replay
///   (`0` = no history)
/// - `command_capacity`: depth of the coordinator's command queue
///   (min 1; clamped)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over sprinkling
/// sentinel checks across call sites.
#[derive(Clone, Debug)]
pub struct GroupConfig {
    /// Client-side reconnection delay advice.
    ///
    /// When nonzero, every subscriber receives a `retry:` record
    /// before history replay. Can later be changed for the whole group
    /// via [`Group::set_retry_time`](crate::Group::set_retry_time).
    pub retry: Duration,

    /// Number of past events kept for replay to late subscribers.
    ///
    /// The retained sequence never exceeds this length; the oldest
    /// event is evicted first. `0` disables history entirely.
    pub history_limit: usize,

    /// Capacity of the coordinator's command queue.
    ///
    /// Producers awaiting [`Group::send`](crate::Group::send) queue up
    /// here while the coordinator is busy. Minimum value is 1
    /// (enforced when the channel is built).
    pub command_capacity: usize,
}

impl GroupConfig {
    /// Returns the retry advice as an `Option`.
    ///
    /// - `None`: never sent
    /// - `Some(d)`: pushed to each subscriber on attach
    #[inline]
    pub fn retry_time(&self) -> Option<Duration> {
        if self.retry == Duration::ZERO {
            None
        } else {
            Some(self.retry)
        }
    }

    /// Returns the command queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn command_capacity_clamped(&self) -> usize {
        self.command_capacity.max(1)
    }
}

impl Default for GroupConfig {
    /// Default configuration:
    ///
    /// - `retry = 0s` (no advice sent)
    /// - `history_limit = 0` (no replay)
    /// - `command_capacity = 64`
    fn default() -> Self {
        Self {
            retry: Duration::ZERO,
            history_limit: 0,
            command_capacity: 64,
        }
    }
}
