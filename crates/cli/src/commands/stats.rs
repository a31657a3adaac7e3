use std::process;

use bughunter_engine::format::format_xp;

use super::{open_engine, runtime};
use crate::config::Config;
use crate::{print_json, report_error, OutputFormat};

pub(crate) fn cmd_stats(config: &Config, user: &str, output: OutputFormat, quiet: bool) {
    let engine = open_engine(config, output, quiet);
    let rt = runtime(output, quiet);

    let stats = match rt.block_on(engine.user_stats(user)) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Text => {
            println!("User: {}", stats.user_id);
            println!(
                "Level {} with {} XP across {} challenge(s)",
                stats.current_level,
                format_xp(stats.total_xp),
                stats.total_challenges
            );
            if let Some(needed) = stats.level_progress.xp_to_next {
                println!("{} XP to level {}", needed, stats.current_level + 1);
            }
            println!("Best streak: {} day(s)", stats.max_streak);
            for p in &stats.progress {
                println!(
                    "  {}: {} completed, {} XP, level {}, streak {}",
                    p.course_type,
                    p.challenges_completed,
                    p.total_xp,
                    p.current_level,
                    p.streak_days
                );
            }
            if !stats.achievements.is_empty() {
                println!("Achievements:");
                for earned in &stats.achievements {
                    println!("  {}", earned.achievement.name);
                }
            }
        }
    }
}
