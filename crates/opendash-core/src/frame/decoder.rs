//! Frame field extraction and conversion
//!
//! Pulls one integer field out of a payload, widens it to `f64` and runs the
//! spec's operation chain. No state, no side effects.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use thiserror::Error;

use super::spec::{FrameByteOrder, FrameFieldSpec, Operation, SUPPORTED_WIDTHS};

/// Errors produced while decoding a field from a frame payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload ends before the field does. Never silently wraps.
    #[error("payload of {len} bytes is too short for a {width}-byte field at offset {offset}")]
    TruncatedPayload {
        /// Byte offset the spec asked for.
        offset: usize,
        /// Field width the spec asked for.
        width: usize,
        /// Actual payload length.
        len: usize,
    },
    /// The spec names a width outside {1, 2, 4, 8}. Construction-time
    /// validation should prevent this; the check here is defensive.
    #[error("unsupported field width of {0} bytes")]
    UnsupportedWidth(usize),
    /// The operation chain divides by an exactly-zero operand.
    #[error("operation chain divides by zero")]
    DivisionByZero,
}

/// Decode one engineering-unit value from a raw frame payload.
pub fn decode(spec: &FrameFieldSpec, payload: &[u8]) -> Result<f64, DecodeError> {
    if !SUPPORTED_WIDTHS.contains(&spec.byte_width) {
        return Err(DecodeError::UnsupportedWidth(spec.byte_width));
    }

    let truncated = DecodeError::TruncatedPayload {
        offset: spec.byte_offset,
        width: spec.byte_width,
        len: payload.len(),
    };
    let end = spec
        .byte_offset
        .checked_add(spec.byte_width)
        .ok_or_else(|| truncated.clone())?;
    if end > payload.len() {
        return Err(truncated);
    }

    let field = &payload[spec.byte_offset..end];
    let mut value = match (spec.byte_order, spec.signed) {
        (FrameByteOrder::Little, false) => LittleEndian::read_uint(field, spec.byte_width) as f64,
        (FrameByteOrder::Little, true) => LittleEndian::read_int(field, spec.byte_width) as f64,
        (FrameByteOrder::Big, false) => BigEndian::read_uint(field, spec.byte_width) as f64,
        (FrameByteOrder::Big, true) => BigEndian::read_int(field, spec.byte_width) as f64,
    };

    for operation in &spec.operations {
        value = match *operation {
            Operation::Multiply { operand } => value * operand,
            Operation::Divide { operand } => {
                if operand == 0.0 {
                    return Err(DecodeError::DivisionByZero);
                }
                value / operand
            }
            Operation::Add { operand } => value + operand,
        };
    }

    Ok(value)
}
