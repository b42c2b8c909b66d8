//! Turning raw holding-register words into typed values.
//!
//! This is the seam between the transport (whatever read the words off the
//! wire) and the register catalog. It owns no I/O and keeps no state; every
//! failure is reported back to the caller as a value and never logged here.

use crate::registers::{NonAsciiByte, RegisterIndex, Value};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The address is not present in the catalog at all. Recoverable; the
    /// caller should skip the register and move on.
    #[error("register {0} is not documented in the catalog")]
    UnknownRegister(u16),
    /// The caller sized its read wrong for this register's data type. This
    /// is a bug in the read planning upstream, not something a retry fixes.
    #[error("register {address} decodes from {expected} words, got {actual}")]
    InvalidWordCount { address: u16, expected: usize, actual: usize },
    /// The register contents violated a decoder precondition. The register
    /// can be treated as unreadable for this cycle.
    #[error("could not decode the contents of register {address}")]
    Value {
        address: u16,
        #[source]
        source: NonAsciiByte,
    },
}

/// A single decoded register, ready for display or publishing.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DecodedValue {
    pub address: u16,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub value: Value,
}

impl std::fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{} = {}", self.name, self.value))?;
        if let Some(unit) = self.unit {
            f.write_fmt(format_args!(" {unit}"))?;
        }
        Ok(())
    }
}

/// Decode the raw `words` read from holding register `address`.
///
/// Registers documented by name but with an unknown interpretation pass
/// their words through untouched as [`Value::Raw`], with no unit attached.
pub fn decode(address: u16, words: &[u16]) -> Result<DecodedValue, Error> {
    let Some(register) = RegisterIndex::from_address(address) else {
        return Err(Error::UnknownRegister(address));
    };
    let Some(data_type) = register.data_type() else {
        return Ok(DecodedValue {
            address,
            name: register.name(),
            unit: None,
            value: Value::Raw(words.to_vec()),
        });
    };
    let expected = data_type.word_count();
    if words.len() != expected {
        return Err(Error::InvalidWordCount { address, expected, actual: words.len() });
    }
    let value = data_type
        .decode(words)
        .map_err(|source| Error::Value { address, source })?;
    Ok(DecodedValue {
        address,
        name: register.name(),
        unit: register.unit(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::DataType;

    #[test]
    fn unsigned_sixteen_bit() {
        let decoded = decode(16, &[230]).unwrap();
        assert_eq!(decoded.value, Value::U16(230));
        assert_eq!(decoded.unit, Some("V"));
        assert_eq!(decoded.name, "Line Voltage");
    }

    #[test]
    fn signed_sixteen_bit_boundaries() {
        assert_eq!(decode(346, &[0x8000]).unwrap().value, Value::I16(-32768));
        assert_eq!(decode(346, &[0x7FFF]).unwrap().value, Value::I16(32767));
        assert_eq!(decode(346, &[0x0000]).unwrap().value, Value::I16(0));
    }

    #[test]
    fn thirty_two_bit_word_pairs() {
        assert_eq!(
            decode(1146, &[0x0001, 0x0000]).unwrap().value,
            Value::U32(65536),
        );
        assert_eq!(
            decode(1154, &[0xFFFF, 0xFFFF]).unwrap().value,
            Value::I32(-1),
        );
    }

    #[test]
    fn numeric_round_trips_through_big_endian_bytes() {
        for words in [[0xDEAD, 0xBEEF], [0x0000, 0x0001], [0x8000, 0x0000]] {
            let bytes = crate::registers::words_to_bytes(&words);
            let expected = u32::from_be_bytes(bytes.try_into().unwrap());
            assert_eq!(decode(1152, &words).unwrap().value, Value::U32(expected));
            assert_eq!(
                decode(1156, &words).unwrap().value,
                Value::I32(expected as i32),
            );
        }
    }

    #[test]
    fn fixed_point_scaling() {
        assert_eq!(decode(2, &[12345]).unwrap().value, Value::Scaled(123.45));
        assert_eq!(decode(745, &[205]).unwrap().value, Value::Scaled(20.5));
        // Signed tenths go through two's complement first.
        assert_eq!(decode(19, &[0xFFFF]).unwrap().value, Value::Scaled(-0.1));
    }

    #[test]
    fn ascii_text_keeps_word_then_byte_order() {
        let value = DataType::Str(2).decode(&[0x5465, 0x7374]).unwrap();
        assert_eq!(value, Value::Text("Test".into()));
        // Trailing padding is preserved as-is.
        let decoded = decode(88, &[0x4142, 0x4344, 0x2020, 0x0000]).unwrap();
        assert_eq!(decoded.value, Value::Text("ABCD  \0\0".into()));
    }

    #[test]
    fn non_ascii_text_is_a_decode_error() {
        let error = decode(88, &[0x41FF, 0x4344, 0x2020, 0x2020]).unwrap_err();
        assert_eq!(
            error,
            Error::Value {
                address: 88,
                source: NonAsciiByte { byte: 0xFF, position: 1 },
            },
        );
    }

    #[test]
    fn brine_type_labels() {
        assert_eq!(decode(402, &[485]).unwrap().value, Value::Label("Antifreeze"));
        assert_eq!(decode(402, &[1]).unwrap().value, Value::Label("Unknown"));
    }

    #[test]
    fn undocumented_addresses_are_errors() {
        assert_eq!(decode(5, &[0]).unwrap_err(), Error::UnknownRegister(5));
    }

    #[test]
    fn opaque_registers_pass_words_through() {
        let decoded = decode(31, &[0x0102]).unwrap();
        assert_eq!(decoded.value, Value::Raw(vec![0x0102]));
        assert_eq!(decoded.unit, None);
    }

    #[test]
    fn wrong_word_counts_are_rejected() {
        assert_eq!(
            decode(1146, &[1]).unwrap_err(),
            Error::InvalidWordCount { address: 1146, expected: 2, actual: 1 },
        );
        assert_eq!(
            decode(16, &[1, 2]).unwrap_err(),
            Error::InvalidWordCount { address: 16, expected: 1, actual: 2 },
        );
    }

    #[test]
    fn decoding_is_idempotent() {
        let first = decode(745, &[205]).unwrap();
        let second = decode(745, &[205]).unwrap();
        assert_eq!(first, second);
    }
}
