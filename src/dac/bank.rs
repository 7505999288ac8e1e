use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use log::{info, warn};
use crate::dac::datafile;
use crate::dac::link::{physical_channel, DacLink, StubLink, VOLTAGE_LIMIT};
use crate::dac::shutter::{self, Correction, ShutterReading, SHUTTER_CHANNELS, SHUTTER_COUNT};
use crate::dac::DacError;
use crate::types::{BankEvent, BiasGroup, Compensation};
pub const CHANNEL_COUNT: usize = 32;
pub const DEFAULT_DATA_FILE: &str = "ad5372_data.dat";
/// The 32 output voltages of one AD5372 board and everything derived from them.
///
/// Every write goes through the same chain: store, notify subscribers,
/// forward to the hardware link, and re-derive the shutter if the channel
/// drives one. Loads and resets are just sequences of such writes.
pub struct ChannelBank<L: DacLink = StubLink> {
    channels: [f64; CHANNEL_COUNT],
    // last displayed state; only the derivation rule reads it
    shutter_open: [bool; SHUTTER_COUNT],
    data_file: PathBuf,
    link: L,
    subscribers: Vec<Sender<BankEvent>>,
}
impl ChannelBank<StubLink> {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self::with_link(data_file, StubLink)
    }
}
impl<L: DacLink> ChannelBank<L> {
    pub fn with_link(data_file: impl Into<PathBuf>, link: L) -> Self {
        Self {
            channels: [0.0; CHANNEL_COUNT],
            shutter_open: [false; SHUTTER_COUNT],
            data_file: data_file.into(),
            link,
            subscribers: Vec::new(),
        }
    }
    pub fn value(&self, index: usize) -> Option<f64> {
        self.channels.get(index).copied()
    }
    pub fn values(&self) -> &[f64; CHANNEL_COUNT] {
        &self.channels
    }
    pub fn shutter_open(&self, shutter: usize) -> Option<bool> {
        self.shutter_open.get(shutter).copied()
    }
    pub fn shutter_channel(&self, shutter: usize) -> Option<usize> {
        SHUTTER_CHANNELS.get(shutter).copied()
    }
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
    #[cfg(test)]
    pub fn link(&self) -> &L {
        &self.link
    }
    /// New receiver for value and shutter notifications.
    pub fn subscribe(&mut self) -> Receiver<BankEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }
    fn emit(&mut self, event: BankEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
    /// Store `value` on a channel. Notifies even if the value did not change.
    pub fn set_value(&mut self, index: usize, value: f64) -> Result<(), DacError> {
        if index >= CHANNEL_COUNT {
            return Err(DacError::ChannelIndex(index));
        }
        self.write(index, value);
        Ok(())
    }
    // `index` must be < CHANNEL_COUNT
    fn write(&mut self, index: usize, value: f64) {
        self.channels[index] = value;
        self.emit(BankEvent::ValueChanged { index, value });
        if let Err(err) = self.forward_to_hardware(index, value) {
            warn!("{err}; write dropped");
        }
        if let Some(shutter) = shutter::shutter_for_channel(index) {
            self.rederive(shutter);
        }
    }
    /// Hand a logical channel's value to the hardware link.
    ///
    /// Values beyond the output range are refused with [`DacError::RangeWarning`]
    /// and never reach the link. The stored channel value is not touched.
    pub fn forward_to_hardware(&mut self, logical: usize, value: f64) -> Result<(), DacError> {
        let physical = physical_channel(logical).ok_or(DacError::ChannelIndex(logical))?;
        // also refuses NaN
        if !(value.abs() <= VOLTAGE_LIMIT) {
            return Err(DacError::RangeWarning {
                channel: logical,
                value,
            });
        }
        self.link.write(physical, value)
    }
    pub fn apply_bias(&mut self, group: BiasGroup, delta: f64) {
        for index in group.channels() {
            self.write(index, self.channels[index] + delta);
        }
    }
    pub fn apply_compensation(&mut self, kind: Compensation, amount: f64, ratio: f64) {
        for (index, delta) in kind.deltas(amount, ratio) {
            self.write(index, self.channels[index] + delta);
        }
    }
    /// Re-read a shutter from its channel voltage and return the displayed state.
    pub fn derive_shutter_state(&mut self, shutter: usize) -> Result<bool, DacError> {
        if shutter >= SHUTTER_COUNT {
            return Err(DacError::ShutterIndex(shutter));
        }
        Ok(self.rederive(shutter))
    }
    fn rederive(&mut self, shutter: usize) -> bool {
        let channel = SHUTTER_CHANNELS[shutter];
        let volts = self.channels[channel];
        let reading = ShutterReading::classify(volts);
        match shutter::resolve(reading, self.shutter_open[shutter]) {
            Correction::Display(open) => {
                if reading == ShutterReading::Ambiguous {
                    warn!("shutter {shutter} drifted to {volts} V while open, showing closed");
                }
                self.display_shutter(shutter, open);
            }
            Correction::SnapClosed => {
                warn!("shutter {shutter} at {volts} V, snapping channel {channel} to closed");
                self.write(channel, shutter::level_for(false));
            }
        }
        self.shutter_open[shutter]
    }
    fn display_shutter(&mut self, shutter: usize, open: bool) {
        if self.shutter_open[shutter] != open {
            self.shutter_open[shutter] = open;
            self.emit(BankEvent::ShutterChanged { shutter, open });
        }
    }
    /// Drive a shutter channel to its open or closed level.
    pub fn set_shutter(&mut self, shutter: usize, open: bool) -> Result<(), DacError> {
        let channel = self
            .shutter_channel(shutter)
            .ok_or(DacError::ShutterIndex(shutter))?;
        self.write(channel, shutter::level_for(open));
        Ok(())
    }
    /// Same as [`Self::set_shutter`] with shutters numbered from 1.
    pub fn set_shutter_by_number(&mut self, number: usize, open: bool) -> Result<(), DacError> {
        match number.checked_sub(1) {
            Some(shutter) if shutter < SHUTTER_COUNT => self.set_shutter(shutter, open),
            _ => Err(DacError::ShutterIndex(number)),
        }
    }
    /// Zero every channel in index order.
    pub fn reset(&mut self) {
        for index in 0..CHANNEL_COUNT {
            self.write(index, 0.0);
        }
    }
    /// Load the vector from `path`, creating a zeroed file if there is none.
    ///
    /// The in-memory vector is left untouched unless the whole file parses
    /// to exactly [`CHANNEL_COUNT`] values.
    pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<(), DacError> {
        let path = path.as_ref();
        if !path.is_file() {
            datafile::write_values(path, &[0.0; CHANNEL_COUNT])?;
            info!("created {} with zeroed channels", path.display());
            self.data_file = path.to_path_buf();
            self.reset();
            return Ok(());
        }
        let values = datafile::read_values(path)?;
        if values.len() != CHANNEL_COUNT {
            return Err(DacError::LengthMismatch {
                expected: CHANNEL_COUNT,
                actual: values.len(),
            });
        }
        for (index, &value) in values.iter().enumerate() {
            self.write(index, value);
        }
        for shutter in 0..SHUTTER_COUNT {
            self.rederive(shutter);
        }
        self.data_file = path.to_path_buf();
        info!("loaded {} channels from {}", CHANNEL_COUNT, path.display());
        Ok(())
    }
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<(), DacError> {
        let path = path.as_ref();
        datafile::write_values(path, &self.channels)?;
        self.data_file = path.to_path_buf();
        info!("saved {} channels to {}", CHANNEL_COUNT, path.display());
        Ok(())
    }
    pub fn reload(&mut self) -> Result<(), DacError> {
        let path = self.data_file.clone();
        self.load_from(path)
    }
    pub fn save(&mut self) -> Result<(), DacError> {
        let path = self.data_file.clone();
        self.save_to(path)
    }
}
