//! Frame field descriptors
//!
//! Specs are built once from static configuration at startup and are
//! immutable afterwards; each CAN-backed sensor owns one.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Field widths the decoder supports, in bytes.
pub const SUPPORTED_WIDTHS: [usize; 4] = [1, 2, 4, 8];

/// Byte order of a field as it arrives on the bus.
///
/// This is a property of the wire format, carried in the spec, not something
/// the decoder decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameByteOrder {
    /// Intel byte order (least significant byte first).
    #[default]
    Little,
    /// Motorola byte order (most significant byte first).
    Big,
}

/// One step of the unit-conversion chain.
///
/// Operations apply in list order, left to right. Order is part of the
/// contract: divide-then-add and add-then-divide are different conversions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Multiply the running value by the operand.
    Multiply {
        /// Right-hand factor.
        operand: f64,
    },
    /// Divide the running value by the operand.
    Divide {
        /// Divisor; an exactly-zero divisor fails decoding.
        operand: f64,
    },
    /// Add the operand to the running value.
    Add {
        /// Addend.
        operand: f64,
    },
}

/// Immutable descriptor of one numeric field within a CAN frame payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameFieldSpec {
    /// Identifier of the frame carrying this field.
    pub frame_id: u32,
    /// 0-based byte offset of the field within the payload.
    pub byte_offset: usize,
    /// Field width in bytes; must be one of [`SUPPORTED_WIDTHS`].
    pub byte_width: usize,
    /// Whether the field is a two's-complement signed integer.
    pub signed: bool,
    /// Byte order of the field on the wire.
    #[serde(default)]
    pub byte_order: FrameByteOrder,
    /// Engineering unit label of the converted value.
    pub unit: String,
    /// Unit-conversion chain, applied in order after extraction.
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl FrameFieldSpec {
    /// Create a validated spec with an empty operation chain.
    pub fn new(
        frame_id: u32,
        byte_offset: usize,
        byte_width: usize,
        signed: bool,
        unit: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let spec = Self {
            frame_id,
            byte_offset,
            byte_width,
            signed,
            byte_order: FrameByteOrder::default(),
            unit: unit.into(),
            operations: Vec::new(),
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Set the wire byte order.
    pub fn with_byte_order(mut self, byte_order: FrameByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Append one conversion operation to the chain.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Check the spec against static constraints.
    ///
    /// A bad width here is a misconfiguration and fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_WIDTHS.contains(&self.byte_width) {
            return Err(ConfigError::InvalidFieldWidth(self.byte_width));
        }
        Ok(())
    }
}
