/// Assembling encoded chunks into a downloaded file.
pub mod download;
/// Timed capture of rendered frames into an encoding stream.
pub mod recorder;
