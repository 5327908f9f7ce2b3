//! Terminal host for a single shortening field.
//!
//! Each stdin line is committed as the field's value, as if the field lost
//! focus. Lines starting with `:` invoke field operations.

mod app;
mod config;
mod effects;
mod input;
mod logging;
mod msg;

use anyhow::Context;
use clap::Parser;

pub fn run_app() -> anyhow::Result<()> {
    let args = config::CliArgs::parse();
    let config = config::load(&args.config_path)
        .with_context(|| format!("loading {}", args.config_path.display()))?
        .with_overrides(&args);

    logging::initialize(config.log);
    app::run(config)
}
