//! Shutter outputs are ordinary DAC channels driven to one of two levels.
//!
//! A shutter's state is never stored on its own: it is read back from the
//! channel voltage. Readings near 0 V are closed, readings near 5 V are open,
//! and anything else is resolved by [`resolve`]:
//! - previously displayed open: show closed, leave the voltage alone;
//! - previously displayed closed: snap the channel to exactly 0 V.
//!
//! The two branches are intentionally asymmetric and must stay that way.
/// Number of shutter outputs on the board.
pub const SHUTTER_COUNT: usize = 4;
/// Logical channel driving each shutter (0-based).
pub const SHUTTER_CHANNELS: [usize; SHUTTER_COUNT] = [11, 12, 13, 14];
pub const SHUTTER_OPEN_VOLTS: f64 = 5.0;
pub const SHUTTER_CLOSED_VOLTS: f64 = 0.0;
/// Half-width of the band around each level that still counts as that level.
pub const SHUTTER_TOLERANCE_VOLTS: f64 = 0.1;
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutterReading {
    Closed,
    Open,
    Ambiguous,
}
impl ShutterReading {
    pub fn classify(volts: f64) -> Self {
        if volts.abs() < SHUTTER_TOLERANCE_VOLTS {
            ShutterReading::Closed
        } else if (volts - SHUTTER_OPEN_VOLTS).abs() < SHUTTER_TOLERANCE_VOLTS {
            ShutterReading::Open
        } else {
            ShutterReading::Ambiguous
        }
    }
}
/// What the bank should do after reading a shutter channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correction {
    /// Show this state; the channel voltage stays as it is.
    Display(bool),
    /// Write the closed level to the channel and derive again.
    SnapClosed,
}
pub fn resolve(reading: ShutterReading, previously_open: bool) -> Correction {
    match reading {
        ShutterReading::Closed => Correction::Display(false),
        ShutterReading::Open => Correction::Display(true),
        ShutterReading::Ambiguous if previously_open => Correction::Display(false),
        ShutterReading::Ambiguous => Correction::SnapClosed,
    }
}
/// Shutter number driven by `channel`, if any.
pub fn shutter_for_channel(channel: usize) -> Option<usize> {
    SHUTTER_CHANNELS.iter().position(|&c| c == channel)
}
/// Voltage that drives a shutter into `open`.
pub fn level_for(open: bool) -> f64 {
    if open {
        SHUTTER_OPEN_VOLTS
    } else {
        SHUTTER_CLOSED_VOLTS
    }
}
