/// ffmpeg-backed encoding stream.
pub mod ffmpeg;
/// Encoding stream contract and an in-memory implementation.
pub mod sink;
