use crate::dac::DacError;
/// Physical DAC channel wired to each logical channel. Neighbouring pairs are swapped.
pub const CHANNEL_ORDER: [usize; 32] = [
    1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14, 17, 16, 19, 18, 21, 20, 23, 22, 25, 24,
    27, 26, 29, 28, 31, 30,
];
/// Largest magnitude the AD5372 outputs accept, with a little slack for rounding.
pub const VOLTAGE_LIMIT: f64 = 10.00001;
pub fn physical_channel(logical: usize) -> Option<usize> {
    CHANNEL_ORDER.get(logical).copied()
}
/// Something that can push a voltage onto a physical DAC output.
///
/// Writes reaching a link are already range-checked and remapped.
pub trait DacLink {
    fn write(&mut self, physical: usize, volts: f64) -> Result<(), DacError>;
}
/// Link used when no controller is attached: the write is only logged.
#[derive(Debug, Default)]
pub struct StubLink;
impl DacLink for StubLink {
    fn write(&mut self, physical: usize, volts: f64) -> Result<(), DacError> {
        log::trace!("dac write: physical channel {physical} <- {volts:.4} V");
        Ok(())
    }
}
/// In-memory link useful for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingLink {
    pub writes: Vec<(usize, f64)>,
}
#[cfg(test)]
impl DacLink for RecordingLink {
    fn write(&mut self, physical: usize, volts: f64) -> Result<(), DacError> {
        self.writes.push((physical, volts));
        Ok(())
    }
}
