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

//! Wire encoding of stimulation parameters.
//!
//! Each value becomes two ASCII characters, digits offset from `'0'`:
//!
//! - `v > 78`: `'0' + v / 78` followed by `'0' + v % 78`
//! - otherwise: `'0'` followed by `'0' + v`
//!
//! The four pairs are concatenated in field order. There is no header,
//! delimiter, checksum or terminator; the device frames by length alone.
//! The low branch is not plain base 78 (78 encodes as `"0~"`, not `"10"`)
//! and the firmware expects exactly this layout.

use std::fmt;
use thiserror::Error;

use crate::params::{validate, InvalidParameters, StimulationParameters};

/// Radix of the high digit.
pub const BASE: u16 = 78;

/// ASCII offset of digit zero.
pub const DIGIT_OFFSET: u8 = b'0';

/// Characters per encoded field.
pub const FIELD_WIDTH: usize = 2;

/// Length of a complete message.
pub const MESSAGE_LEN: usize = FIELD_WIDTH * 4;

/// An encoded 8-byte message, ready for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedMessage([u8; MESSAGE_LEN]);

impl EncodedMessage {
    /// Raw bytes, one per ASCII character.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The message as text.
    pub fn as_str(&self) -> &str {
        // Every byte is built from DIGIT_OFFSET plus a digit below 79, so the
        // buffer is always printable ASCII.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for EncodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<[u8]> for EncodedMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Errors when reading a message back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("message must be 8 bytes, got {0}")]
    Length(usize),

    #[error("invalid digit {byte:#04x} at offset {offset}")]
    Digit { offset: usize, byte: u8 },

    #[error("decoded values are not valid parameters: {0}")]
    Invalid(#[from] InvalidParameters),
}

/// Encode one value into its two characters.
pub fn encode_value(value: u16) -> [u8; FIELD_WIDTH] {
    if value > BASE {
        [digit(value / BASE), digit(value % BASE)]
    } else {
        [DIGIT_OFFSET, digit(value)]
    }
}

fn digit(value: u16) -> u8 {
    // Callers keep value well under 256 - DIGIT_OFFSET.
    DIGIT_OFFSET + value as u8
}

/// Encode validated parameters into a wire message.
pub fn encode(params: &StimulationParameters) -> EncodedMessage {
    let mut buf = [0u8; MESSAGE_LEN];
    for (chunk, value) in buf.chunks_exact_mut(FIELD_WIDTH).zip(params.values()) {
        chunk.copy_from_slice(&encode_value(value));
    }
    EncodedMessage(buf)
}

/// Decode one two-character field.
///
/// A leading `'0'` selects the low branch; anything else is the high digit.
pub fn decode_value(pair: [u8; FIELD_WIDTH], offset: usize) -> Result<u16, DecodeError> {
    let [high, low] = pair;
    let low_digit = low
        .checked_sub(DIGIT_OFFSET)
        .ok_or(DecodeError::Digit { offset: offset + 1, byte: low })? as u16;

    if high == DIGIT_OFFSET {
        if low_digit > BASE {
            return Err(DecodeError::Digit { offset: offset + 1, byte: low });
        }
        return Ok(low_digit);
    }

    let high_digit = high
        .checked_sub(DIGIT_OFFSET)
        .ok_or(DecodeError::Digit { offset, byte: high })? as u16;
    if low_digit >= BASE {
        return Err(DecodeError::Digit { offset: offset + 1, byte: low });
    }

    Ok(high_digit * BASE + low_digit)
}

/// Decode a full message back into parameters.
pub fn decode(bytes: &[u8]) -> Result<StimulationParameters, DecodeError> {
    if bytes.len() != MESSAGE_LEN {
        return Err(DecodeError::Length(bytes.len()));
    }

    let mut values = [0i32; 4];
    for (i, chunk) in bytes.chunks_exact(FIELD_WIDTH).enumerate() {
        let value = decode_value([chunk[0], chunk[1]], i * FIELD_WIDTH)?;
        values[i] = i32::from(value);
    }

    Ok(validate(values[0], values[1], values[2], values[3])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::validate;

    #[test]
    fn test_low_branch() {
        for v in 1..=78u16 {
            let pair = encode_value(v);
            assert_eq!(pair[0], b'0');
            assert_eq!(pair[1], 48 + v as u8);
            assert_eq!(decode_value(pair, 0).unwrap(), v);
        }
        assert_eq!(&encode_value(78), b"0~");
    }

    #[test]
    fn test_high_branch() {
        for v in 79..=1000u16 {
            let pair = encode_value(v);
            assert_eq!(pair[0], 48 + (v / 78) as u8);
            assert_eq!(pair[1], 48 + (v % 78) as u8);
            assert_ne!(pair[0], b'0');
            assert_eq!(decode_value(pair, 0).unwrap(), v);
        }
        assert_eq!(&encode_value(79), b"11");
        assert_eq!(&encode_value(156), b"20");
        assert_eq!(&encode_value(1000), b"<p");
    }

    #[test]
    fn test_encode_message() {
        let params = validate(50, 100, 20, 500).unwrap();
        let message = encode(&params);
        assert_eq!(message.as_bytes().len(), MESSAGE_LEN);
        // 50 -> "0b", 100 -> "1F", 20 -> "0D", 500 -> "6P"
        assert_eq!(message.as_str(), "0b1F0D6P");
    }

    #[test]
    fn test_boundary_messages() {
        let low = encode(&validate(1, 4, 1, 1).unwrap());
        assert_eq!(low.as_str(), "01040101");

        let high = encode(&validate(100, 500, 100, 1000).unwrap());
        assert_eq!(high.as_str(), "1F6P1F<p");
        assert_eq!(decode(high.as_bytes()).unwrap(), validate(100, 500, 100, 1000).unwrap());
    }

    #[test]
    fn test_round_trip_all_rise_times() {
        for rise in (4..=500).step_by(4) {
            let params = validate(78, rise, 79, 1000 - rise).unwrap();
            assert_eq!(decode(encode(&params).as_bytes()).unwrap(), params);
        }
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(decode(b"0101"), Err(DecodeError::Length(4)));
        assert!(matches!(
            decode(b"0/040101"),
            Err(DecodeError::Digit { offset: 1, .. })
        ));
        // Decodes cleanly but 0 Hz is outside the valid range.
        assert!(matches!(decode(b"00040101"), Err(DecodeError::Invalid(_))));
    }
}
