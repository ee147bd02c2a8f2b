//! CLI parse: clap types for mangaflow. No behavior; definitions only.

use crate::types::MangaStyle;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mangaflow CLI - plan comic projects and generate their panel art
#[derive(Parser)]
#[command(name = "mangaflow")]
#[command(about = "Plan comic projects and generate panel illustrations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a project from a premise and generate its panels
    Create {
        /// Story premise; also the project description
        premise: String,
        /// Project title (defaults to the first words of the premise)
        #[arg(long, default_value = "")]
        title: String,
        /// Visual style tag (see `mangaflow styles`)
        #[arg(long, default_value_t = MangaStyle::ClassicShonen)]
        style: MangaStyle,
        /// Store the project without generating any images
        #[arg(long)]
        no_generate: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List projects, newest first
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one project and its panels
    Show {
        /// Project id or unique id prefix
        project: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Generate a new image for one panel
    Regenerate {
        /// Project id or unique id prefix
        project: String,
        /// Panel number (1-based) or panel id prefix
        panel: String,
    },
    /// Edit a panel's caption and/or prompt
    Edit {
        /// Project id or unique id prefix
        project: String,
        /// Panel number (1-based) or panel id prefix
        panel: String,
        /// New caption
        #[arg(long)]
        caption: Option<String>,
        /// New prompt (takes effect on the next generation)
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Delete a project
    Delete {
        /// Project id or unique id prefix
        project: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List the available visual styles
    Styles {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
