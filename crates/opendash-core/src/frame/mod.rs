//! CAN frame field decoding
//!
//! A [`FrameFieldSpec`] describes where one numeric field lives inside a raw
//! frame payload and how to turn it into an engineering-unit value. The
//! [`decode`] function is pure: same spec and payload, same result.

mod decoder;
mod spec;

pub use decoder::{decode, DecodeError};
pub use spec::{FrameByteOrder, FrameFieldSpec, Operation, SUPPORTED_WIDTHS};
