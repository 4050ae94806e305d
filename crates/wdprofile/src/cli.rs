// Author: Dustin Pilgrim
// License: MIT

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use wdprofile_core::OutputNaming;

#[derive(Debug, Parser)]
#[command(name = "wdprofile", version, about = "Save the current output layout as a kanshi profile")]
pub struct Args {
    /// Config file to update (default: $XDG_CONFIG_HOME/kanshi/config)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Log to stderr (in addition to the log file)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Override log file path (default: $XDG_STATE_HOME/wdprofile/wdprofile.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Save the connected outputs, rewriting their profile if one exists
    Store {
        /// How output lines name their display
        #[arg(long, value_enum)]
        naming: Option<OutputNaming>,
        /// Name for a newly created profile block
        #[arg(long)]
        name: Option<String>,
    },

    /// Show which profile describes the connected outputs
    Match,

    /// Print the output lines that would be written
    Outputs {
        #[arg(long, value_enum)]
        naming: Option<OutputNaming>,
    },

    /// Print the resolved config path
    Path,
}
