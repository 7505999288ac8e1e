// src/dac/mod.rs
pub mod bank;
pub mod datafile;
pub mod error;
pub mod link;
pub mod shutter;
// re-exports used by the panel
pub use bank::{ChannelBank, CHANNEL_COUNT};
pub use error::DacError;
pub use shutter::{SHUTTER_CHANNELS, SHUTTER_COUNT};
