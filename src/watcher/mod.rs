//! File-change watching for the lint pipeline.
//!
//! One platform event source and one background poll thread serve every
//! watched file; handler invocations run on per-path worker threads.
//!
//! # Architecture
//!
//! ```text
//! FileWatcher
//!   - Single notify::RecommendedWatcher
//!   - WatchRegistry (path -> handle + mask)
//!   - Poll thread: bounded blocking wait, mask filter
//!         |
//!    +----------+----------+
//!    |          |          |
//!  queue A    queue B    queue C     one single-consumer queue
//!  worker A   worker B   worker C    per watched path (FIFO)
//! ```

mod error;
mod event;
mod registry;
mod watch;

pub use error::WatchError;
pub use event::{ChangeEvent, ChangeKind};
pub use registry::{WatchRegistry, WatchedPath};
pub use watch::{ChangeHandler, FileWatcher};
