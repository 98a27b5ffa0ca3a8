//! Domain models for de-identification.

mod result;
mod span;
mod taxonomy;

pub use result::*;
pub use span::*;
pub use taxonomy::*;
