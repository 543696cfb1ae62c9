use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "goalpost", version, author, about = "A terminal companion for tracking personal goals")]
pub struct Cli {
    /// Use this entries file instead of the configured one
    #[arg(long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List goals with their completion
    List,
    /// Show one goal and its progress history
    Show {
        /// Slot number as shown by `list`
        slot: usize,
    },
    /// Add a new goal
    Add {
        /// Short name of the goal
        name: String,
        /// What you want to achieve
        #[arg(long)]
        goal: String,
        /// How you plan to get there
        #[arg(long)]
        details: String,
        /// Starting rating, 1-10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: u8,
        /// Target date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(long)]
        date: Option<String>,
    },
    /// Change fields of an existing goal
    Edit {
        /// Slot number as shown by `list`
        slot: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        details: Option<String>,
        /// New base rating, 1-10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: Option<u8>,
        /// New target date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(long)]
        date: Option<String>,
    },
    /// Record progress on a goal
    Progress {
        /// Slot number as shown by `list`
        slot: usize,
        /// What you did
        label: String,
        /// How far along you are now, 1-10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: u8,
        /// Date of the progress, defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a goal and its progress
    Delete {
        /// Slot number as shown by `list`
        slot: usize,
    },
    /// Print where goals and configuration are stored
    Path,
}
