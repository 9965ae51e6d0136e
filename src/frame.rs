//! # Modbus/TCP Framing
//!
//! Builds read-request frames and extracts register words from responses.
//!
//! ## Wire Format (big-endian)
//!
//! Request (12 bytes):
//!
//! | Field | Size | Value |
//! |-------|------|-------|
//! | Transaction ID | u16 | random, nonzero |
//! | Protocol code | u16 | vendor constant, typically 0 |
//! | Length | u16 | always 6 (unit id + PDU) |
//! | Unit ID | u8 | device address |
//! | Function code | u8 | typically 3 (read holding registers) |
//! | Start address | u16 | window first minus vendor register offset |
//! | Register count | u16 | window size |
//!
//! Response: a 9-byte header (transaction/protocol/length echo, unit id,
//! function code, byte count) followed by `2 × count` bytes of register
//! data. The header is discarded; the payload goes to the codec.

use bytes::{BufMut, BytesMut};
use rand::Rng;

use crate::batcher::AddressWindow;
use crate::error::{MeterError, MeterResult};
use crate::profile::MeterProfile;

/// Read Holding Registers (FC03), the only function the read engine issues.
pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;

/// Fixed MBAP length field: unit id (1) + function code (1) + start (2) + count (2).
pub const REQUEST_LENGTH_FIELD: u16 = 6;

/// Response bytes preceding the register payload.
pub const RESPONSE_HEADER_LEN: usize = 9;

/// One Modbus/TCP read request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub transaction_id: u16,
    pub protocol_code: u16,
    pub unit_id: u8,
    pub function_code: u8,
    /// Wire start address (vendor offset already applied).
    pub start: u16,
    pub count: u16,
}

impl ReadRequest {
    /// Build a request for `window` using the vendor `profile`.
    ///
    /// The transaction id is freshly randomized per request; responses are
    /// not matched against it (strictly sequential exchanges make matching
    /// redundant on a dedicated connection). Fails when the window lies
    /// below the profile's register offset and cannot be addressed on the
    /// wire.
    pub fn for_window(
        window: &AddressWindow,
        profile: &MeterProfile,
        unit_id: u8,
    ) -> MeterResult<Self> {
        let start = window
            .first
            .checked_sub(profile.register_offset)
            .ok_or_else(|| {
                MeterError::invalid_data(format!(
                    "window start {} is below register offset {}",
                    window.first, profile.register_offset
                ))
            })?;
        Ok(Self {
            transaction_id: rand::thread_rng().gen_range(1..=u16::MAX),
            protocol_code: profile.protocol_code,
            unit_id,
            function_code: profile.function_code,
            start,
            count: window.count,
        })
    }

    /// Serialize to the 12-byte wire frame.
    pub fn to_bytes(&self) -> BytesMut {
        let mut frame = BytesMut::with_capacity(12);
        frame.put_u16(self.transaction_id);
        frame.put_u16(self.protocol_code);
        frame.put_u16(REQUEST_LENGTH_FIELD);
        frame.put_u8(self.unit_id);
        frame.put_u8(self.function_code);
        frame.put_u16(self.start);
        frame.put_u16(self.count);
        frame
    }

    /// Total response size to expect: header plus two bytes per register.
    #[inline]
    pub fn expected_response_len(&self) -> usize {
        RESPONSE_HEADER_LEN + usize::from(self.count) * 2
    }
}

/// Strip the response header and convert the payload to register words.
///
/// `raw` must be a complete response for a `count`-register request.
pub fn response_words(raw: &[u8], count: u16) -> MeterResult<Vec<u16>> {
    let expected = RESPONSE_HEADER_LEN + usize::from(count) * 2;
    if raw.len() < expected {
        return Err(MeterError::protocol(format!(
            "short response: {} bytes, expected {}",
            raw.len(),
            expected
        )));
    }

    let payload = &raw[RESPONSE_HEADER_LEN..expected];
    Ok(payload
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
