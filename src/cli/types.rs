//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "unitsmith")]
#[command(about = "unitsmith - model-driven unit test generation", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over .unitsmith/config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .unitsmith/config.yaml with default settings
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate tests for one method (every overload when given by name)
    Method {
        /// Fully-qualified or simple class name
        class: String,

        /// Method name or numeric method id
        method: String,
    },

    /// Generate tests for every eligible method of one class
    Class {
        /// Fully-qualified or simple class name
        class: String,
    },

    /// Generate tests for every eligible method of the project
    Project,
}
