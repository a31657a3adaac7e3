use std::time::Duration;

use bughunter_engine::compute_xp;
use bughunter_engine::xp::qualifies_for_time_bonus;

use crate::config::Config;
use crate::{print_json, OutputFormat};

pub(crate) fn cmd_xp(
    config: &Config,
    base: u32,
    time_taken: Option<u64>,
    hints: u32,
    streak_multiplier: f64,
    output: OutputFormat,
    quiet: bool,
) {
    let time_bonus = time_taken.is_some_and(|secs| {
        qualifies_for_time_bonus(
            Duration::from_secs(secs),
            config.engine.time_bonus_threshold(),
        )
    });
    let xp = compute_xp(base, time_bonus, hints, streak_multiplier);

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "xp": xp,
            "time_bonus": time_bonus,
            "hints_used": hints,
            "streak_multiplier": streak_multiplier,
        })),
        OutputFormat::Text => {
            if time_bonus {
                println!("{} XP (time bonus)", xp);
            } else {
                println!("{} XP", xp);
            }
        }
    }
}
