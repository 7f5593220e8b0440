//! Parallel tree walker
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │        WalkEngine        │
//!                    │  - seeds the root task   │
//!                    │  - spawns / joins pool   │
//!                    └────────────┬─────────────┘
//!                                 │
//!                                 ▼
//!                    ┌──────────────────────────┐
//!          ┌────────▶│        WorkQueue         │◀────────┐
//!          │  push   │  - FIFO of tasks         │  push   │
//!          │         │  - in-flight counter     │         │
//!          │         │  - closes at zero        │         │
//!          │         └────────────┬─────────────┘         │
//!          │               pop    │    pop                │
//!    ┌─────┴─────┐          ┌─────▼─────┐           ┌─────┴─────┐
//!    │ Worker 1  │          │ Worker 2  │    ...    │ Worker N  │
//!    │ classify  │          │ classify  │           │ classify  │
//!    │ list/size │          │ list/size │           │ list/size │
//!    └─────┬─────┘          └─────┬─────┘           └─────┬─────┘
//!          └──────────────────────┼───────────────────────┘
//!                                 ▼
//!                    ┌──────────────────────────┐
//!                    │      AggregateStats      │
//!                    │  dirs / files / bytes    │
//!                    └──────────────────────────┘
//! ```

pub mod engine;
pub mod queue;
pub mod stats;
pub mod worker;

pub use engine::{CancelHandle, WalkEngine, WalkProgress, WalkResult};
pub use queue::{QueueSnapshot, QueueStats, Task, TaskGuard, WorkQueue};
pub use stats::{AggregateStats, WalkStats};
pub use worker::{process_task, Worker};
