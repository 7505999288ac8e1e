//! Flat text format for the channel vector.
//!
//! One value per line in channel order, written like NumPy's `savetxt`
//! default (`%.18e`) so existing `.dat` files stay interchangeable.
//! Reading accepts any whitespace-separated numbers and skips `#` comments.
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use crate::dac::DacError;
/// `%.18e` style: 19 significant digits, signed two-digit exponent.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let formatted = format!("{value:.18e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}
pub fn parse_values(text: &str) -> Result<Vec<f64>, DacError> {
    let mut values = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let content = match line.split_once('#') {
            Some((before, _comment)) => before,
            None => line,
        };
        for token in content.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| DacError::Malformed {
                line: line_idx + 1,
                token: token.to_owned(),
            })?;
            values.push(value);
        }
    }
    Ok(values)
}
pub fn read_values(path: &Path) -> Result<Vec<f64>, DacError> {
    let text = fs::read_to_string(path)?;
    parse_values(&text)
}
pub fn write_values(path: &Path, values: &[f64]) -> Result<(), DacError> {
    let mut w = BufWriter::new(File::create(path)?);
    for &value in values {
        writeln!(w, "{}", format_value(value))?;
    }
    w.flush()?;
    Ok(())
}
