pub mod decode;
pub mod settings;
pub mod types;
pub mod waveform;

pub use decode::*;
pub use settings::*;
pub use types::*;
pub use waveform::*;
