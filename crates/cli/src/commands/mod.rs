mod catalog;
mod complete;
mod level;
mod stats;
mod xp;

use std::process;

use bughunter_engine::Engine;
use bughunter_storage::MemoryStore;

pub(crate) use catalog::cmd_catalog;
pub(crate) use complete::{cmd_complete, CompleteArgs};
pub(crate) use level::cmd_level;
pub(crate) use stats::cmd_stats;
pub(crate) use xp::cmd_xp;

use crate::config::Config;
use crate::state::load_store;
use crate::{report_error, OutputFormat};

/// Single-threaded runtime for the store-driving commands.
fn runtime(output: OutputFormat, quiet: bool) -> tokio::runtime::Runtime {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            report_error(
                &format!("error: failed to start runtime: {}", e),
                output,
                quiet,
            );
            process::exit(1);
        }
    }
}

/// Load the state file and wrap it in an engine, or exit.
fn open_engine(config: &Config, output: OutputFormat, quiet: bool) -> Engine<MemoryStore> {
    match load_store(&config.store.state_file) {
        Ok(store) => Engine::with_config(store, config.engine.clone()),
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}
