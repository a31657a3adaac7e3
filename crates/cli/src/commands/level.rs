use bughunter_engine::LevelProgress;

use crate::{print_json, OutputFormat};

pub(crate) fn cmd_level(xp: u64, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    let progress = LevelProgress::from_total_xp(xp);
    match output {
        OutputFormat::Json => print_json(&progress),
        OutputFormat::Text => {
            let band = match progress.band.max {
                Some(max) => format!("{}-{} XP", progress.band.min, max),
                None => format!("{}+ XP", progress.band.min),
            };
            println!("Level {} ({})", progress.level, band);
            match progress.xp_to_next {
                Some(needed) => println!(
                    "{} XP to level {} ({:.0}% through this level)",
                    needed,
                    progress.level + 1,
                    progress.percent
                ),
                None => println!("Max level reached"),
            }
        }
    }
}
