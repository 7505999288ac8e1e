use thiserror::Error;
#[derive(Debug, Error)]
pub enum DacError {
    #[error("data file length mismatch: expected {expected} entries, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("data file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed entry {token:?} on line {line}")]
    Malformed { line: usize, token: String },
    #[error("voltage {value} V on channel {channel} is outside the +/-10 V range")]
    RangeWarning { channel: usize, value: f64 },
    #[error("channel index {0} out of range")]
    ChannelIndex(usize),
    #[error("shutter index {0} out of range")]
    ShutterIndex(usize),
}
