//! The firing predicate.
//!
//! A registration fires when the remaining blocks sit inside the
//! threshold window `[T, T + tolerance]` AND the debounce distance from
//! the previous fire has elapsed. The window tolerance exists because
//! the exact threshold block can be skipped between polls when blocks
//! land close together; it lets a registration fire up to `tolerance`
//! blocks early, never late by more than one polling period.

use cinder_types::Height;

/// Decide fire/no-fire for one registration in one cycle.
///
/// `remaining` is recomputed fresh every cycle; the predicate is
/// level-triggered, not edge-triggered on entering the window.
pub fn should_fire(
    threshold: i64,
    remaining: i64,
    last_fired: Option<Height>,
    current: Height,
    tolerance: i64,
    debounce: i64,
) -> bool {
    let in_window = threshold <= remaining && threshold >= remaining - tolerance;
    let debounce_elapsed = last_fired.is_none_or(|height| height < current - debounce);
    in_window && debounce_elapsed
}
