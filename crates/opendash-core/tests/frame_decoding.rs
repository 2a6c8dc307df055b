//! Tests for CAN frame field extraction and unit conversion

#[cfg(test)]
mod tests {
    use opendash_core::frame::{decode, DecodeError, FrameByteOrder, FrameFieldSpec, Operation};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coolant_field_from_obd_style_response() {
        // 0x03E8 little-endian at offset 2, quarter-degree resolution.
        let spec = FrameFieldSpec::new(0x7E8, 2, 2, true, "°F")
            .unwrap()
            .with_operation(Operation::Divide { operand: 4.0 });
        let payload = [0x00, 0x00, 0xE8, 0x03, 0x00, 0x00];

        assert_eq!(decode(&spec, &payload).unwrap(), 250.0);
    }

    #[test]
    fn test_operation_order_is_part_of_the_conversion() {
        let multiply_then_add = FrameFieldSpec::new(0x100, 0, 1, false, "raw")
            .unwrap()
            .with_operation(Operation::Multiply { operand: 2.0 })
            .with_operation(Operation::Add { operand: 3.0 });
        let add_then_multiply = FrameFieldSpec::new(0x100, 0, 1, false, "raw")
            .unwrap()
            .with_operation(Operation::Add { operand: 3.0 })
            .with_operation(Operation::Multiply { operand: 2.0 });

        assert_eq!(decode(&multiply_then_add, &[10]).unwrap(), 23.0);
        assert_eq!(decode(&add_then_multiply, &[10]).unwrap(), 26.0);
    }

    #[test]
    fn test_empty_operation_chain_yields_raw_integer() {
        let spec = FrameFieldSpec::new(0x200, 0, 4, false, "count").unwrap();
        let payload = 123_456u32.to_le_bytes();

        assert_eq!(decode(&spec, &payload).unwrap(), 123_456.0);
    }

    #[test]
    fn test_signed_fields_sign_extend_at_every_width() {
        for (width, payload) in [
            (1usize, vec![0xFFu8]),
            (2, (-1i16).to_le_bytes().to_vec()),
            (4, (-1i32).to_le_bytes().to_vec()),
            (8, (-1i64).to_le_bytes().to_vec()),
        ] {
            let spec = FrameFieldSpec::new(0x300, 0, width, true, "raw").unwrap();
            assert_eq!(decode(&spec, &payload).unwrap(), -1.0, "width {width}");
        }
    }

    #[test]
    fn test_unsigned_round_trip_at_every_width_and_offset() {
        for (width, value, bytes) in [
            (1usize, 0xA5u64, vec![0xA5u8]),
            (2, 0xBEEF, 0xBEEFu16.to_le_bytes().to_vec()),
            (4, 0xDEAD_BEEF, 0xDEAD_BEEFu32.to_le_bytes().to_vec()),
            (8, 1 << 52, (1u64 << 52).to_le_bytes().to_vec()),
        ] {
            // Shift the field behind a junk prefix; payload ends exactly
            // where the field does.
            let mut payload = vec![0x55, 0x55];
            payload.extend_from_slice(&bytes);
            let spec = FrameFieldSpec::new(0x321, 2, width, false, "raw").unwrap();
            assert_eq!(
                decode(&spec, &payload).unwrap(),
                value as f64,
                "width {width}"
            );
        }
    }

    #[test]
    fn test_big_endian_field() {
        let spec = FrameFieldSpec::new(0x400, 1, 2, false, "rpm")
            .unwrap()
            .with_byte_order(FrameByteOrder::Big);
        let payload = [0xAA, 0x03, 0xE8, 0xBB];

        assert_eq!(decode(&spec, &payload).unwrap(), 1000.0);
    }

    #[test]
    fn test_truncated_payload_reports_shape() {
        let spec = FrameFieldSpec::new(0x500, 6, 4, false, "raw").unwrap();
        let payload = [0u8; 8];

        assert_eq!(
            decode(&spec, &payload),
            Err(DecodeError::TruncatedPayload {
                offset: 6,
                width: 4,
                len: 8,
            })
        );
    }

    #[test]
    fn test_divide_by_zero_fails_instead_of_propagating_infinity() {
        let spec = FrameFieldSpec::new(0x600, 0, 1, false, "raw")
            .unwrap()
            .with_operation(Operation::Divide { operand: 0.0 });

        assert_eq!(decode(&spec, &[42]), Err(DecodeError::DivisionByZero));
    }

    #[test]
    fn test_spec_deserializes_from_json_with_operation_chain() {
        let json = r#"{
            "frame_id": 2024,
            "byte_offset": 2,
            "byte_width": 2,
            "signed": true,
            "unit": "°F",
            "operations": [
                { "op": "divide", "operand": 4.0 },
                { "op": "add", "operand": 32.0 }
            ]
        }"#;
        let spec: FrameFieldSpec = serde_json::from_str(json).unwrap();

        assert_eq!(spec.frame_id, 2024);
        assert_eq!(spec.byte_order, FrameByteOrder::Little);
        assert_eq!(
            decode(&spec, &[0x00, 0x00, 0xE8, 0x03]).unwrap(),
            250.0 + 32.0
        );
    }
}
