//! Request-level orchestration
//!
//! Services fetch input through a source, then hand it to the pure search or
//! timeline components. They hold no per-request state.

mod search;
mod timeline;

pub use search::SearchService;
pub use timeline::TimelineService;
