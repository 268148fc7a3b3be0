//! Stream records and the hierarchy arena.
//!
//! Streams arrive from the host as flat records carrying a parent
//! back-reference. The arena reconstructs an explicit indexed tree once per
//! update so the projector and layout walk child lists instead of re-scanning
//! the record list.

mod arena;
mod record;

pub use arena::StreamArena;
pub use record::{SourceType, Stream, StreamStatus};
