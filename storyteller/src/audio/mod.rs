//! WAV handling: chunk walking, header inspection and segment stitching.

pub mod riff;
pub mod stitch;
pub mod wav;

pub use stitch::stitch;
pub use wav::inspect;
