//! Common Framework
//!
//! Source positions shared between the escape-translating reader and the
//! tokenizer that consumes it.

pub mod position;
pub mod reporter;

pub use position::Position;
pub use reporter::{PositionReporter, SharedPosition};
