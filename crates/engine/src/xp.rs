//! XP award computation.
//!
//! Awards are computed in `f64` with a floor after every modifier, so the
//! values match the ones learners have already been given: `1.0 - 6 * 0.1`
//! is slightly under `0.4`, and 100 XP with six hints is 39, not 40. Each
//! modifier floors before the next one applies, so the order below is part
//! of the result.

use std::time::Duration;

/// Multiplier applied when the challenge was solved under the time threshold.
pub const TIME_BONUS_FACTOR: f64 = 1.2;

/// Fraction of XP removed per hint used.
pub const HINT_PENALTY: f64 = 0.1;

/// Floor on any award, whatever the penalties.
pub const MIN_AWARD: u64 = 5;

/// Compute the XP awarded for one solved challenge.
///
/// 1. start from `base_xp`
/// 2. time bonus: `floor(xp * 1.2)`
/// 3. hints: `floor(xp * (1 - hints_used * 0.1))`
/// 4. streak: `floor(xp * streak_multiplier)` when the multiplier exceeds 1
/// 5. at least [`MIN_AWARD`]
///
/// The hint factor is not clamped: ten or more hints drive the intermediate
/// value to zero or below and the award falls to the floor. A NaN multiplier
/// is ignored; an infinite one saturates at `u64::MAX`.
pub fn compute_xp(base_xp: u32, time_bonus: bool, hints_used: u32, streak_multiplier: f64) -> u64 {
    let mut xp = f64::from(base_xp);

    if time_bonus {
        xp = (xp * TIME_BONUS_FACTOR).floor();
    }

    if hints_used > 0 {
        xp = (xp * (1.0 - f64::from(hints_used) * HINT_PENALTY)).floor();
    }

    if streak_multiplier > 1.0 {
        xp = (xp * streak_multiplier).floor();
    }

    // `as` saturates at u64::MAX; the floor has already removed negatives
    xp.max(MIN_AWARD as f64) as u64
}

/// Whether a solve time earns the time bonus: strictly under `threshold`.
pub fn qualifies_for_time_bonus(time_taken: Duration, threshold: Duration) -> bool {
    time_taken < threshold
}
