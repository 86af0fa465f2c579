pub mod entry;
pub mod exposure;
pub mod target;

pub use entry::*;
pub use exposure::*;
pub use target::*;
