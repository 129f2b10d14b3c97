pub mod buffer;
pub mod decode;
pub mod resample;

pub use buffer::{AudioBuffer, InputError};
pub use decode::{decode_audio, DecodedTrack};
pub use resample::resample;
