use std::process;
use std::time::Duration;

use bughunter_engine::format::format_duration;
use bughunter_engine::{Completion, EngineError};
use bughunter_storage::CourseType;
use time::OffsetDateTime;

use super::{open_engine, runtime};
use crate::config::Config;
use crate::state::save_store;
use crate::{print_json, report_error, OutputFormat};

pub(crate) struct CompleteArgs<'a> {
    pub user: &'a str,
    pub course: &'a str,
    pub base_xp: u32,
    pub time_taken: Option<u64>,
    pub hints: u32,
    pub streak_multiplier: f64,
}

pub(crate) fn cmd_complete(
    config: &Config,
    args: CompleteArgs<'_>,
    output: OutputFormat,
    quiet: bool,
) {
    let course_type = match args.course.parse::<CourseType>() {
        Ok(c) => c,
        Err(e) => {
            let err = EngineError::from(e);
            report_error(&format!("error: {}", err), output, quiet);
            process::exit(1);
        }
    };

    let engine = open_engine(config, output, quiet);
    let rt = runtime(output, quiet);

    let completion = Completion {
        user_id: args.user.to_string(),
        course_type,
        base_xp: args.base_xp,
        time_taken: args.time_taken.map(Duration::from_secs),
        hints_used: args.hints,
        streak_multiplier: args.streak_multiplier,
    };

    let now = OffsetDateTime::now_utc();
    let outcome = match rt.block_on(engine.record_completion_at(&completion, now)) {
        Ok(o) => o,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if let Err(e) = save_store(engine.store(), &config.store.state_file) {
        report_error(&format!("error: {}", e), output, quiet);
        process::exit(1);
    }

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Text => {
            let bonus = if outcome.time_bonus { " (time bonus)" } else { "" };
            let elapsed = completion
                .time_taken
                .map(|t| format!(" in {}", format_duration(t)))
                .unwrap_or_default();
            let p = &outcome.progress;
            println!(
                "+{} XP{}{} -> {}: {} XP, level {}, streak {} day(s)",
                outcome.xp_earned,
                bonus,
                elapsed,
                p.course_type,
                p.total_xp,
                p.current_level,
                p.streak_days
            );
            for earned in &outcome.new_achievements {
                println!(
                    "Achievement unlocked: {} (+{} XP)",
                    earned.achievement.name, earned.achievement.xp_reward
                );
            }
        }
    }
}
