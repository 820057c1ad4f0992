use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "deenbot-link",
    about = "Probe and talk to a DeenBot backend through the resilience client"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
    /// Base URL of the backend, overrides the config file
    #[arg(long, short = 's', global = true)]
    pub server_url: Option<String>,
    /// TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single health check and print the connection stats
    Health,
    /// Send one message and print the reply
    Send {
        message: String,
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Run the timers and print connection notices
    Watch {
        /// Stop after this many seconds; runs until Ctrl-C when omitted
        #[arg(long)]
        seconds: Option<u64>,
    },
}
