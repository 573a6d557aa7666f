mod debug;
mod report;
mod summary;

pub use debug::{DebugSink, DirSink, TracingSink};
pub use report::write_questions;
pub use summary::write_summary;
