//! # Value Codec
//!
//! Converts raw 16-bit register words into engineering values and back.
//!
//! ## Interpretation order
//!
//! 1. `is_float` registers: words packed big-endian, 2 words → IEEE-754 f32,
//!    4 words → f64. No decimal scaling.
//! 2. Otherwise the words form a `16 × word_length`-bit integer, big-endian,
//!    two's-complement when signed.
//! 3. A raw integer matching the active null-sentinel set decodes to `None` —
//!    the meter is saying "no data", which is not the same as zero.
//! 4. Anything else becomes `raw / 10^decimals` (negative decimals multiply).
//! 5. A per-register correction, if configured, runs after scaling.
//!
//! All integer arithmetic happens in `i128` so the 64-bit unsigned sentinel
//! (`2^64 - 1`) and signed two's-complement values share one code path.

use std::collections::HashMap;

use crate::error::{MeterError, MeterResult};
use crate::register::Register;

/// Mapping from register name to decoded value; `None` marks a null-sentinel
/// reading.
pub type ReadResult = HashMap<&'static str, Option<f64>>;

/// Null sentinels used by serial meters: `2^n - 1` for the widths the
/// register maps use (64, 63, 32, 31, 16 and 15 bits).
pub const SERIAL_NULLS: &[i128] = &[
    (1 << 64) - 1,
    (1 << 63) - 1,
    (1 << 32) - 1,
    (1 << 31) - 1,
    (1 << 16) - 1,
    (1 << 15) - 1,
];

/// Null sentinels used by TCP meters.
pub const TCP_NULLS: &[i128] = &[0xFFFF, 0x7FFF, 0x8000, -0x8000];

/// Decode one register's words into an engineering value.
///
/// `words` must hold exactly `register.word_length` entries. Returns
/// `Ok(None)` for a null-sentinel reading. The register's correction, if
/// any, is applied by the caller so that sentinel readings never reach it.
pub fn decode_registers(
    words: &[u16],
    register: &Register,
    nulls: &[i128],
) -> MeterResult<Option<f64>> {
    if words.len() != usize::from(register.word_length) {
        return Err(MeterError::invalid_data(format!(
            "register '{}' needs {} words, got {}",
            register.name,
            register.word_length,
            words.len()
        )));
    }

    if register.is_float {
        return decode_float(words, register).map(Some);
    }

    let raw = pack_raw(words, register.signed);
    if nulls.contains(&raw) {
        return Ok(None);
    }

    Ok(Some(raw as f64 / 10f64.powi(register.decimals)))
}

/// Decode every register of a window from its raw word buffer.
///
/// `window_first` is the address the buffer starts at; each register's words
/// are sliced at `register.start - window_first`. Corrections run here, after
/// scaling, and only on non-sentinel values.
pub fn decode_window(
    words: &[u16],
    registers: &[Register],
    window_first: u16,
    nulls: &[i128],
) -> MeterResult<ReadResult> {
    let mut results = ReadResult::with_capacity(registers.len());

    for register in registers {
        let start = usize::from(register.start - window_first);
        let end = start + usize::from(register.word_length);
        let slice = words.get(start..end).ok_or_else(|| {
            MeterError::invalid_data(format!(
                "window buffer of {} words too short for register '{}' at offset {}",
                words.len(),
                register.name,
                start
            ))
        })?;

        let mut value = decode_registers(slice, register, nulls)?;
        if let (Some(v), Some(fix)) = (value, register.correction) {
            value = Some(fix(v));
        }
        results.insert(register.name, value);
    }

    Ok(results)
}

fn decode_float(words: &[u16], register: &Register) -> MeterResult<f64> {
    match words {
        [a, b] => {
            let bytes = [(a >> 8) as u8, *a as u8, (b >> 8) as u8, *b as u8];
            Ok(f64::from(f32::from_be_bytes(bytes)))
        }
        [a, b, c, d] => {
            let bytes = [
                (a >> 8) as u8,
                *a as u8,
                (b >> 8) as u8,
                *b as u8,
                (c >> 8) as u8,
                *c as u8,
                (d >> 8) as u8,
                *d as u8,
            ];
            Ok(f64::from_be_bytes(bytes))
        }
        _ => Err(MeterError::invalid_data(format!(
            "register '{}': float registers must span 2 or 4 words",
            register.name
        ))),
    }
}

/// Pack big-endian words into an integer, two's-complement when signed.
fn pack_raw(words: &[u16], signed: bool) -> i128 {
    let mut raw: i128 = 0;
    for &word in words {
        raw = (raw << 16) | i128::from(word);
    }
    if signed {
        let bits = 16 * words.len() as u32;
        if raw >> (bits - 1) & 1 == 1 {
            raw -= 1 << bits;
        }
    }
    raw
}

/// Encode an integer into big-endian register words (inverse of the
/// non-float decode path). Used by tests and device simulators.
pub fn encode_raw(raw: i128, word_length: u8) -> Vec<u16> {
    let bits = 16 * u32::from(word_length);
    let masked = (raw as u128) & (u128::MAX >> (128 - bits));
    (0..word_length)
        .rev()
        .map(|i| (masked >> (16 * u32::from(i))) as u16)
        .collect()
}

/// Encode an f32 into two big-endian register words.
pub fn encode_f32_words(value: f32) -> [u16; 2] {
    let b = value.to_be_bytes();
    [
        u16::from_be_bytes([b[0], b[1]]),
        u16::from_be_bytes([b[2], b[3]]),
    ]
}

/// Encode an f64 into four big-endian register words.
pub fn encode_f64_words(value: f64) -> [u16; 4] {
    let b = value.to_be_bytes();
    [
        u16::from_be_bytes([b[0], b[1]]),
        u16::from_be_bytes([b[2], b[3]]),
        u16::from_be_bytes([b[4], b[5]]),
        u16::from_be_bytes([b[6], b[7]]),
    ]
}

/// Correction for meters that report a power factor of exactly 0 when the
/// true value is unity (observed on SMA TCP meters).
pub fn power_factor_unity_when_zero(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value
    }
}

// ============================================================================
// Tests
// ============================================================================
