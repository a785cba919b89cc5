//! Image intake: drops, file picks and decoding.

pub mod file;
pub mod texture;
