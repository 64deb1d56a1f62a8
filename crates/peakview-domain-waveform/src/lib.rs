pub mod analyzer;
pub mod reduce;
pub mod segment;
pub mod zoom;

pub use analyzer::*;
pub use reduce::*;
pub use segment::*;
pub use zoom::*;
