// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Stimulation parameters and their validation.
//!
//! Raw operator input goes through two stages: [`parse_fields`] turns the four
//! text fields into integers, then [`validate`] checks every field against its
//! physiological range. Validation reports all violations, not just the first.

use std::fmt;
use thiserror::Error;

/// Error message shown when any field cannot be parsed.
pub const BLANK_FIELD_MESSAGE: &str = "Do not leave any values blank.";

/// One of the four stimulation fields, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PulseFrequency,
    RiseTime,
    MaxCurrent,
    DecayCoefficient,
}

impl Field {
    /// All fields in declaration (and wire) order.
    pub const ALL: [Field; 4] = [
        Field::PulseFrequency,
        Field::RiseTime,
        Field::MaxCurrent,
        Field::DecayCoefficient,
    ];

    /// Key used in the preference store.
    pub fn key(&self) -> &'static str {
        match self {
            Field::PulseFrequency => "pulse_frequency",
            Field::RiseTime => "rise_time",
            Field::MaxCurrent => "max_current",
            Field::DecayCoefficient => "decay_coefficient",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Field::PulseFrequency => "Pulse frequency",
            Field::RiseTime => "Rise time",
            Field::MaxCurrent => "Max current",
            Field::DecayCoefficient => "Decay coefficient",
        }
    }

    /// Inclusive valid range.
    pub fn range(&self) -> (i32, i32) {
        match self {
            Field::PulseFrequency => (1, 100),
            Field::RiseTime => (1, 500),
            Field::MaxCurrent => (1, 100),
            Field::DecayCoefficient => (1, 1000),
        }
    }

    /// Required divisor, if the field has one.
    pub fn step(&self) -> Option<i32> {
        match self {
            Field::RiseTime => Some(4),
            _ => None,
        }
    }

    fn unit(&self) -> Option<&'static str> {
        match self {
            Field::PulseFrequency => Some("hertz"),
            Field::RiseTime => Some("microseconds"),
            Field::MaxCurrent => Some("milliamps"),
            Field::DecayCoefficient => None,
        }
    }

    /// Check a single value against this field's rules.
    pub fn accepts(&self, value: i32) -> bool {
        let (min, max) = self.range();
        let in_range = (min..=max).contains(&value);
        match self.step() {
            Some(step) => in_range && value % step == 0,
            None => in_range,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A field value that could not be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Do not leave any values blank.")]
pub struct ParseError {
    pub field: Field,
    pub input: String,
}

/// A field value outside its domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct RangeError {
    pub field: Field,
    pub value: i32,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min, max) = self.field.range();
        write!(f, "{} should be in the range {} to {}", self.field, min, max)?;
        if let Some(unit) = self.field.unit() {
            write!(f, " {}", unit)?;
        }
        if let Some(step) = self.field.step() {
            write!(f, " and a multiple of {}", step)?;
        }
        f.write_str(".")
    }
}

/// Every rule violated by one set of inputs, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} invalid stimulation parameter(s)", .violations.len())]
pub struct InvalidParameters {
    pub violations: Vec<RangeError>,
}

impl InvalidParameters {
    /// User-facing messages, one per violation.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    /// Fields that failed, in field order.
    pub fn fields(&self) -> Vec<Field> {
        self.violations.iter().map(|v| v.field).collect()
    }
}

/// Result of validating a set of inputs.
pub type ValidationResult = Result<StimulationParameters, InvalidParameters>;

/// A validated set of stimulation parameters.
///
/// Only [`validate`] constructs this type, so every instance holds in-range
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulationParameters {
    pulse_frequency_hz: u16,
    rise_time_us: u16,
    max_current_ma: u16,
    decay_coefficient: u16,
}

impl StimulationParameters {
    pub fn pulse_frequency_hz(&self) -> u16 {
        self.pulse_frequency_hz
    }

    pub fn rise_time_us(&self) -> u16 {
        self.rise_time_us
    }

    pub fn max_current_ma(&self) -> u16 {
        self.max_current_ma
    }

    pub fn decay_coefficient(&self) -> u16 {
        self.decay_coefficient
    }

    /// Values in wire order.
    pub fn values(&self) -> [u16; 4] {
        [
            self.pulse_frequency_hz,
            self.rise_time_us,
            self.max_current_ma,
            self.decay_coefficient,
        ]
    }

    /// Pair each value with its field.
    pub fn fields(&self) -> impl Iterator<Item = (Field, u16)> {
        Field::ALL.into_iter().zip(self.values())
    }
}

impl fmt::Display for StimulationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {} us, {} mA, decay {}",
            self.pulse_frequency_hz, self.rise_time_us, self.max_current_ma, self.decay_coefficient
        )
    }
}

/// Validate four raw integers.
///
/// All rules are evaluated; the error lists one violation per failing field.
pub fn validate(
    pulse_frequency: i32,
    rise_time: i32,
    max_current: i32,
    decay: i32,
) -> ValidationResult {
    let values = [pulse_frequency, rise_time, max_current, decay];

    let violations: Vec<RangeError> = Field::ALL
        .into_iter()
        .zip(values)
        .filter(|(field, value)| !field.accepts(*value))
        .map(|(field, value)| RangeError { field, value })
        .collect();

    if !violations.is_empty() {
        return Err(InvalidParameters { violations });
    }

    // Every value passed its range check, so each fits in a u16.
    Ok(StimulationParameters {
        pulse_frequency_hz: pulse_frequency as u16,
        rise_time_us: rise_time as u16,
        max_current_ma: max_current as u16,
        decay_coefficient: decay as u16,
    })
}

/// Validate values already in wire order.
pub fn validate_values(values: [i32; 4]) -> ValidationResult {
    validate(values[0], values[1], values[2], values[3])
}

/// Parse one field as a single-precision decimal and truncate it toward zero.
///
/// Fractional input is accepted ("12.7" reads as 12). The value is read at
/// `f32` precision, so "3.99999999" rounds to 4 before truncation. One
/// trailing `f`/`d` type suffix is tolerated ("40f"). Out-of-range
/// magnitudes saturate at the `i32` bounds and are then rejected by
/// validation.
pub fn parse_field(field: Field, input: &str) -> Result<i32, ParseError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_suffix(['f', 'F', 'd', 'D']).unwrap_or(trimmed);
    let number: f32 = digits.parse().map_err(|_| ParseError {
        field,
        input: input.to_string(),
    })?;

    // `as` truncates toward zero, saturates, and maps NaN to 0.
    Ok(number as i32)
}

/// Parse all four fields, stopping at the first one that fails.
pub fn parse_fields(inputs: [&str; 4]) -> Result<[i32; 4], ParseError> {
    let mut values = [0; 4];
    for (slot, (field, input)) in values.iter_mut().zip(Field::ALL.into_iter().zip(inputs)) {
        *slot = parse_field(field, input)?;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_accepted() {
        let low = validate(1, 4, 1, 1).unwrap();
        assert_eq!(low.values(), [1, 4, 1, 1]);

        let high = validate(100, 500, 100, 1000).unwrap();
        assert_eq!(high.values(), [100, 500, 100, 1000]);
    }

    #[test]
    fn test_frequency_out_of_range() {
        for frequency in [0, 101] {
            let err = validate(frequency, 4, 1, 1).unwrap_err();
            assert_eq!(err.fields(), vec![Field::PulseFrequency]);
        }
    }

    #[test]
    fn test_rise_time_multiple_of_four() {
        let err = validate(10, 499, 10, 10).unwrap_err();
        assert_eq!(err.fields(), vec![Field::RiseTime]);
        assert!(validate(10, 500, 10, 10).is_ok());
        assert!(validate(10, 2, 10, 10).is_err());
    }

    #[test]
    fn test_violations_accumulate() {
        let err = validate(0, 501, 0, 0).unwrap_err();
        assert_eq!(
            err.fields(),
            vec![
                Field::PulseFrequency,
                Field::RiseTime,
                Field::MaxCurrent,
                Field::DecayCoefficient
            ]
        );
        assert_eq!(err.violations[1].value, 501);
    }

    #[test]
    fn test_messages() {
        let err = validate(0, 501, 0, 1001).unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                "Pulse frequency should be in the range 1 to 100 hertz.",
                "Rise time should be in the range 1 to 500 microseconds and a multiple of 4.",
                "Max current should be in the range 1 to 100 milliamps.",
                "Decay coefficient should be in the range 1 to 1000.",
            ]
        );
    }

    #[test]
    fn test_parse_truncates() {
        assert_eq!(parse_field(Field::MaxCurrent, "12.9").unwrap(), 12);
        assert_eq!(parse_field(Field::MaxCurrent, " 40 ").unwrap(), 40);
        assert_eq!(parse_field(Field::MaxCurrent, "-0.5").unwrap(), 0);
        assert_eq!(parse_field(Field::MaxCurrent, "1e2").unwrap(), 100);
    }

    #[test]
    fn test_parse_single_precision() {
        // Rounds to 4.0 at f32 precision, so the rise time is valid.
        assert_eq!(parse_field(Field::RiseTime, "3.99999999").unwrap(), 4);
        assert_eq!(parse_field(Field::RiseTime, "3.9").unwrap(), 3);
        assert_eq!(parse_fields(["3.99999999", "3.99999999", "1", "1"]).unwrap(), [4, 4, 1, 1]);
    }

    #[test]
    fn test_parse_type_suffix() {
        assert_eq!(parse_field(Field::MaxCurrent, "40f").unwrap(), 40);
        assert_eq!(parse_field(Field::MaxCurrent, " 12.5D ").unwrap(), 12);
        assert!(parse_field(Field::MaxCurrent, "f").is_err());
        assert!(parse_field(Field::MaxCurrent, "40ff").is_err());
    }

    #[test]
    fn test_parse_blank_reported_once() {
        let err = parse_fields(["10", "", "abc", "5"]).unwrap_err();
        assert_eq!(err.field, Field::RiseTime);
        assert_eq!(err.to_string(), BLANK_FIELD_MESSAGE);
    }

    #[test]
    fn test_parse_fields_in_order() {
        assert_eq!(parse_fields(["50", "100.5", "20", "300"]).unwrap(), [50, 100, 20, 300]);
    }
}
