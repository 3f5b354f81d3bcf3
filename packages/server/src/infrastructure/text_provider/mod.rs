//! TextProvider implementations.

pub mod fixed;
pub mod http;

pub use fixed::FixedTextProvider;
pub use http::HttpTextProvider;
