//! Round-trip properties over randomized inputs.

use proptest::prelude::*;

use abiwire::bin::InputBuffer;
use abiwire::varint::{read_varint32, read_varuint32, write_varint32, write_varuint32};
use abiwire::{bin_to_json, json_to_bin, name_to_string, string_to_name, Contract, RawAbi};

fn builtin_contract() -> Contract {
    Contract::from_abi(&RawAbi::default()).unwrap()
}

proptest! {
    #[test]
    fn varuint32_round_trips_canonically(v: u32) {
        let mut out = Vec::new();
        write_varuint32(&mut out, v);

        // canonical LEB128 uses the fewest possible groups
        let expected_len = (((32 - v.leading_zeros()).max(1) + 6) / 7) as usize;
        prop_assert_eq!(out.len(), expected_len);
        prop_assert_eq!(out.last().unwrap() & 0x80, 0);

        let mut buf = InputBuffer::new(&out);
        prop_assert_eq!(read_varuint32(&mut buf).unwrap(), v);
        prop_assert!(buf.is_empty());
    }

    #[test]
    fn varint32_round_trips(v: i32) {
        let mut out = Vec::new();
        write_varint32(&mut out, v);
        let mut buf = InputBuffer::new(&out);
        prop_assert_eq!(read_varint32(&mut buf).unwrap(), v);
    }

    #[test]
    fn names_round_trip_modulo_trailing_dots(s in "[a-z1-5.]{0,12}[a-j1-5.]?") {
        let rendered = name_to_string(string_to_name(&s));
        let trimmed = s.trim_end_matches('.');
        if trimmed.is_empty() {
            // with no symbol to anchor the trim, the raw 13-dot form survives
            prop_assert_eq!(rendered, ".............");
        } else {
            prop_assert_eq!(rendered, trimmed);
        }
    }

    #[test]
    fn integer_arrays_round_trip(values: Vec<u16>) {
        let c = builtin_contract();
        let json = serde_json::to_string(&values).unwrap();
        let bin = json_to_bin(&c, "uint16[]", &json).unwrap();
        prop_assert_eq!(bin_to_json(&c, "uint16[]", &bin).unwrap(), json);
    }

    #[test]
    fn strings_round_trip(s in "\\PC*") {
        let c = builtin_contract();
        let json = serde_json::to_string(&s).unwrap();
        let bin = json_to_bin(&c, "string", &json).unwrap();
        prop_assert_eq!(bin_to_json(&c, "string", &bin).unwrap(), json);
    }

    #[test]
    fn signed_64_bit_values_survive_as_strings(v: i64) {
        let c = builtin_contract();
        let json = format!("\"{v}\"");
        let bin = json_to_bin(&c, "int64", &json).unwrap();
        prop_assert_eq!(bin, v.to_le_bytes());
        prop_assert_eq!(bin_to_json(&c, "int64", &v.to_le_bytes()).unwrap(), json);
    }

    #[test]
    fn bytes_round_trip(raw: Vec<u8>) {
        let c = builtin_contract();
        let json = format!("\"{}\"", hex::encode(&raw));
        let bin = json_to_bin(&c, "bytes", &json).unwrap();
        prop_assert_eq!(bin_to_json(&c, "bytes", &bin).unwrap(), json);
    }

    #[test]
    fn optional_structs_round_trip(a: u32, b in proptest::option::of("[a-z]{0,8}")) {
        let abi = RawAbi::from_json(br#"{
            "structs": [{
                "name": "s",
                "base": "",
                "fields": [
                    {"name": "a", "type": "uint32"},
                    {"name": "b", "type": "string?"}
                ]
            }]
        }"#).unwrap();
        let c = Contract::from_abi(&abi).unwrap();
        let json = serde_json::to_string(&serde_json::json!({"a": a, "b": b})).unwrap();
        let bin = json_to_bin(&c, "s", &json).unwrap();
        prop_assert_eq!(bin_to_json(&c, "s", &bin).unwrap(), json);
    }
}
