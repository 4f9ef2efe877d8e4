//! Implementation of the `unitsmith init` command.

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::setup::{initialize, SetupPaths};

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_file: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub fn execute(force: bool, json_mode: bool) -> Result<()> {
    let paths = SetupPaths::new()?;
    let report = initialize(&paths, force)?;

    let message = if report.wrote_config {
        format!("Wrote {}", report.config_file.display())
    } else {
        format!(
            "{} already exists. Use --force to overwrite it.",
            report.config_file.display()
        )
    };
    output(
        &InitOutput { success: report.wrote_config, message, config_file: report.config_file },
        json_mode,
    );
    Ok(())
}
