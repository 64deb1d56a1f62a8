pub mod diagnostics;
pub mod loader;
pub mod waveform_data;

pub use diagnostics::*;
pub use loader::*;
pub use waveform_data::*;
