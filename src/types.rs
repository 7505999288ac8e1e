// src/types.rs
use std::ops::Range;

// Notifications the bank sends to subscribers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BankEvent {
    // raised on every write, including writes of the current value
    ValueChanged { index: usize, value: f64 },
    ShutterChanged { shutter: usize, open: bool },
}

// Channels shifted together by a bias offset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BiasGroup {
    Up,
    Down,
}

impl BiasGroup {
    pub const ALL: [BiasGroup; 2] = [BiasGroup::Up, BiasGroup::Down];

    pub fn channels(self) -> Range<usize> {
        match self {
            BiasGroup::Up => 0..5,
            BiasGroup::Down => 5..10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BiasGroup::Up => "Bias UpUp",
            BiasGroup::Down => "Bias Down",
        }
    }
}

// Electrode combinations used to null the ion's micromotion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compensation {
    Horizontal,
    Vertical,
    Axial,
    Dc1,
    Dc2,
    RfPair,
    All,
}

/// RF electrode that receives the ratio-scaled share of horizontal/vertical moves.
pub const RF_UP_CHANNEL: usize = 10;
pub const RF_DOWN_CHANNEL: usize = 11;

impl Compensation {
    pub const ALL: [Compensation; 7] = [
        Compensation::Horizontal,
        Compensation::Vertical,
        Compensation::Axial,
        Compensation::Dc1,
        Compensation::Dc2,
        Compensation::RfPair,
        Compensation::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Compensation::Horizontal => "Horizontal",
            Compensation::Vertical => "Vertical",
            Compensation::Axial => "Axial",
            Compensation::Dc1 => "DC1",
            Compensation::Dc2 => "DC2",
            Compensation::RfPair => "RFs",
            Compensation::All => "All",
        }
    }

    /// Per-channel increments for moving by `amount`.
    pub fn deltas(self, amount: f64, ratio: f64) -> Vec<(usize, f64)> {
        let uniform = |channels: Vec<usize>| -> Vec<(usize, f64)> {
            channels.into_iter().map(|c| (c, amount)).collect()
        };
        match self {
            Compensation::Horizontal | Compensation::Vertical => {
                let sign = if self == Compensation::Horizontal { 1.0 } else { -1.0 };
                let mut d = uniform(BiasGroup::Up.channels().collect());
                d.push((RF_UP_CHANNEL, sign * ratio * amount));
                d
            }
            Compensation::Axial => uniform(vec![0, 5]),
            Compensation::Dc1 => uniform(BiasGroup::Up.channels().collect()),
            Compensation::Dc2 => uniform(BiasGroup::Down.channels().collect()),
            Compensation::RfPair => uniform(vec![RF_UP_CHANNEL, RF_DOWN_CHANNEL]),
            Compensation::All => uniform((0..12).collect()),
        }
    }
}
