//! Configuration types for fs-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 1024;

/// Parallel directory walker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fs-walker",
    version,
    about = "Count directories, files and bytes under a path using a pool of worker threads",
    long_about = "Walks a directory tree with a pool of worker threads sharing one work queue.\n\n\
                  Prints three lines on completion: Dirs, Files and Bytes.\n\
                  Unreadable nodes are reported on stderr and skipped; symlinks are not followed.",
    after_help = "EXAMPLES:\n    \
        fs-walker /data\n    \
        fs-walker /data 16\n    \
        fs-walker /home -p --exclude '/\\.cache(/|$)'\n    \
        fs-walker /srv -d 3 -v"
)]
pub struct CliArgs {
    /// Directory (or file) to start the walk from
    #[arg(value_name = "ROOT_PATH")]
    pub root: PathBuf,

    /// Number of worker threads (default: available parallelism, 0 is treated as 1)
    #[arg(value_name = "THREADS")]
    pub threads: Option<usize>,

    /// Show a live progress spinner and a summary on stderr
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Maximum directory depth below the root (unlimited if not set)
    #[arg(short = 'd', long, value_name = "NUM")]
    pub max_depth: Option<usize>,

    /// Skip paths matching this regex (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,
}

fn default_workers() -> usize {
    num_cpus::get().max(1)
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Node the walk starts from
    pub root: PathBuf,

    /// Number of worker threads
    pub worker_count: usize,

    /// Maximum traversal depth (root is depth 0)
    pub max_depth: Option<usize>,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl WalkConfig {
    /// Configuration with defaults for walking `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            worker_count: default_workers(),
            max_depth: None,
            exclude_patterns: Vec::new(),
            show_progress: false,
            verbose: false,
        }
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let worker_count = args.threads.map(|t| t.max(1)).unwrap_or_else(default_workers);
        if worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: worker_count,
                max: MAX_WORKERS,
            });
        }

        let exclude_patterns = args
            .exclude_patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: args.root,
            worker_count,
            max_depth: args.max_depth,
            exclude_patterns,
            show_progress: args.progress,
            verbose: args.verbose,
        })
    }

    /// Set the worker count (clamped to at least 1)
    pub fn with_workers(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    /// Limit the traversal depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Add an exclude pattern
    pub fn with_exclude(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.exclude_patterns.push(compile_pattern(pattern)?);
        Ok(self)
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude_patterns.is_empty() {
            return false;
        }
        let path = path.to_string_lossy();
        self.exclude_patterns.iter().any(|re| re.is_match(&path))
    }

    /// Check if a node at `depth` is within the depth limit
    pub fn within_depth(&self, depth: u32) -> bool {
        self.max_depth
            .map(|max| depth as usize <= max)
            .unwrap_or(true)
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidExcludePattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
