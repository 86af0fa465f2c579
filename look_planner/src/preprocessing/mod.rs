pub mod filter;

pub use filter::{PrefilterConfig, PrefilterStats};
