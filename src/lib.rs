//! fs-walker - Parallel Directory Tree Walker
//!
//! Counts the directories, regular files and total file bytes below a
//! root path using a fixed pool of worker threads.
//!
//! # Features
//!
//! - **Shared Work Queue**: Workers pull nodes from one queue and push
//!   the children of every directory they list back onto it.
//!
//! - **Exact Termination**: The queue counts tasks that are queued or
//!   being processed and closes itself when that count reaches zero, so
//!   the walk never stops while a worker is still discovering children.
//!
//! - **Error Isolation**: An unreadable node is reported and skipped;
//!   the rest of the tree is still counted.
//!
//! - **Pluggable Filesystem**: The engine walks anything implementing
//!   [`fs::FileSystem`], including the in-memory [`fs::MemoryFs`].
//!
//! # Example
//!
//! ```no_run
//! use fs_walker::{LocalFs, WalkConfig, WalkEngine};
//! use std::sync::Arc;
//!
//! let config = WalkConfig::new("/data").with_workers(8);
//! let result = WalkEngine::new(config, Arc::new(LocalFs::new())).run().unwrap();
//!
//! println!("Dirs: {}", result.stats.dirs);
//! println!("Files: {}", result.stats.files);
//! println!("Bytes: {}", result.stats.bytes);
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod progress;
pub mod walker;

pub use config::{CliArgs, WalkConfig};
pub use error::{Result, WalkerError};
pub use fs::{FileSystem, LocalFs, MemoryFs};
pub use walker::{WalkEngine, WalkResult, WalkStats};
