use time::OffsetDateTime;

/// Whole calendar days from `last_activity` to `now`.
///
/// Both instants are truncated to their date in `now`'s UTC offset, so two
/// completions at 23:59 and 00:01 are one day apart. Negative when
/// `last_activity` lies in the future (clock skew).
pub fn days_between(last_activity: OffsetDateTime, now: OffsetDateTime) -> i64 {
    let today = now.date();
    let last_day = last_activity.to_offset(now.offset()).date();
    (today - last_day).whole_days()
}

/// Streak length after a completion `days_diff` days after the previous one.
///
/// The next day extends the streak, the same day keeps it, anything else
/// (a gap, or a negative difference) starts over at 1.
pub fn next_streak(previous: u32, days_diff: i64) -> u32 {
    match days_diff {
        0 => previous,
        1 => previous.saturating_add(1),
        _ => 1,
    }
}
