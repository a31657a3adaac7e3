//! Level thresholds and level-derived figures.

use serde::Serialize;

/// Highest reachable level.
pub const MAX_LEVEL: u8 = 5;

/// Inclusive lower XP bound of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelThreshold {
    pub level: u8,
    pub min_xp: u64,
}

/// Level thresholds in ascending order. The highest matching threshold wins.
pub const LEVEL_THRESHOLDS: [LevelThreshold; 5] = [
    LevelThreshold { level: 1, min_xp: 0 },
    LevelThreshold { level: 2, min_xp: 100 },
    LevelThreshold { level: 3, min_xp: 250 },
    LevelThreshold { level: 4, min_xp: 500 },
    LevelThreshold { level: 5, min_xp: 750 },
];

/// Level for a total XP value. Always in `1..=MAX_LEVEL`.
pub fn level_from_xp(total_xp: u64) -> u8 {
    LEVEL_THRESHOLDS
        .iter()
        .rev()
        .find(|t| total_xp >= t.min_xp)
        .map(|t| t.level)
        .unwrap_or(1)
}

/// XP still needed to reach `current_level + 1`, or `None` when there is no
/// next level. Saturates at 0 if `total_xp` is already past the threshold.
pub fn xp_to_next_level(current_level: u8, total_xp: u64) -> Option<u64> {
    let next = current_level.checked_add(1)?;
    LEVEL_THRESHOLDS
        .iter()
        .find(|t| t.level == next)
        .map(|t| t.min_xp.saturating_sub(total_xp))
}

/// XP range covered by a level. `max` is exclusive; `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelBand {
    pub min: u64,
    pub max: Option<u64>,
}

/// The XP band of `level`. Levels outside `1..=MAX_LEVEL` get `0..`.
pub fn level_band(level: u8) -> LevelBand {
    let Some(idx) = LEVEL_THRESHOLDS.iter().position(|t| t.level == level) else {
        return LevelBand { min: 0, max: None };
    };
    LevelBand {
        min: LEVEL_THRESHOLDS[idx].min_xp,
        max: LEVEL_THRESHOLDS.get(idx + 1).map(|t| t.min_xp),
    }
}

/// `current / target` as a percentage, capped at 100.
///
/// A zero target counts as complete.
pub fn progress_percent(current: u64, target: u64) -> f64 {
    if target == 0 {
        return 100.0;
    }
    (current as f64 / target as f64 * 100.0).min(100.0)
}

/// Where a total XP value sits within its level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: u8,
    pub band: LevelBand,
    /// XP earned since entering `level`.
    pub xp_into_level: u64,
    /// XP still needed for the next level; `None` at max level.
    pub xp_to_next: Option<u64>,
    /// Progress through the current band; 100 at max level.
    pub percent: f64,
}

impl LevelProgress {
    pub fn from_total_xp(total_xp: u64) -> Self {
        let level = level_from_xp(total_xp);
        let band = level_band(level);
        let xp_into_level = total_xp.saturating_sub(band.min);
        let percent = match band.max {
            Some(max) => progress_percent(xp_into_level, max - band.min),
            None => 100.0,
        };
        Self {
            level,
            band,
            xp_into_level,
            xp_to_next: xp_to_next_level(level, total_xp),
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(level_from_xp(0), 1);
        assert_eq!(level_from_xp(99), 1);
        assert_eq!(level_from_xp(100), 2);
        assert_eq!(level_from_xp(249), 2);
        assert_eq!(level_from_xp(250), 3);
        assert_eq!(level_from_xp(499), 3);
        assert_eq!(level_from_xp(500), 4);
        assert_eq!(level_from_xp(749), 4);
        assert_eq!(level_from_xp(750), 5);
        assert_eq!(level_from_xp(u64::MAX), 5);
    }

    #[test]
    fn level_is_monotonic_in_xp() {
        let mut previous = level_from_xp(0);
        for xp in 1..=2_000 {
            let level = level_from_xp(xp);
            assert!(level >= previous, "level dropped at {xp} XP");
            assert!((1..=MAX_LEVEL).contains(&level));
            previous = level;
        }
    }

    #[test]
    fn xp_to_next_level_counts_down_to_threshold() {
        assert_eq!(xp_to_next_level(1, 0), Some(100));
        assert_eq!(xp_to_next_level(1, 25), Some(75));
        assert_eq!(xp_to_next_level(4, 700), Some(50));
    }

    #[test]
    fn xp_to_next_level_is_none_at_max() {
        assert_eq!(xp_to_next_level(5, 750), None);
        assert_eq!(xp_to_next_level(5, 10_000), None);
        assert_eq!(xp_to_next_level(u8::MAX, 0), None);
    }

    #[test]
    fn xp_to_next_level_never_negative() {
        // stale level paired with a larger total
        assert_eq!(xp_to_next_level(1, 400), Some(0));
    }

    #[test]
    fn bands() {
        assert_eq!(level_band(1), LevelBand { min: 0, max: Some(100) });
        assert_eq!(level_band(4), LevelBand { min: 500, max: Some(750) });
        assert_eq!(level_band(5), LevelBand { min: 750, max: None });
        assert_eq!(level_band(0), LevelBand { min: 0, max: None });
    }

    #[test]
    fn percent_is_capped() {
        assert_eq!(progress_percent(50, 100), 50.0);
        assert_eq!(progress_percent(150, 100), 100.0);
        assert_eq!(progress_percent(3, 0), 100.0);
    }

    #[test]
    fn level_progress_mid_band() {
        let p = LevelProgress::from_total_xp(175);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp_into_level, 75);
        assert_eq!(p.xp_to_next, Some(75));
        assert_eq!(p.percent, 50.0);
    }

    #[test]
    fn level_progress_at_max() {
        let p = LevelProgress::from_total_xp(900);
        assert_eq!(p.level, 5);
        assert_eq!(p.xp_into_level, 150);
        assert_eq!(p.xp_to_next, None);
        assert_eq!(p.percent, 100.0);
    }
}
