use std::process;

use bughunter_engine::AchievementKind;
use bughunter_storage::ProgressStore;

use super::{open_engine, runtime};
use crate::config::Config;
use crate::{print_json, report_error, OutputFormat};

pub(crate) fn cmd_catalog(config: &Config, output: OutputFormat, quiet: bool) {
    let engine = open_engine(config, output, quiet);
    let rt = runtime(output, quiet);

    let catalog = match rt.block_on(engine.store().list_achievement_catalog()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&catalog),
        OutputFormat::Text => {
            for a in &catalog {
                let manual = match a.name.parse::<AchievementKind>() {
                    Ok(kind) if kind.is_auto_awarded() => "",
                    _ => " [not auto-awarded]",
                };
                println!(
                    "{} ({} XP): {}{}",
                    a.name, a.xp_reward, a.description, manual
                );
            }
        }
    }
}
