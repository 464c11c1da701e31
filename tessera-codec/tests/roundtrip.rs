use proptest::prelude::*;
use tessera_codec::utils::Bytes;
use tessera_codec::{from_slice, to_vec, Decoder, Encoder};

proptest! {
    #[test]
    fn varint(value in 0u64..=u64::MAX >> 1) {
        let encoded = to_vec(&value);
        prop_assert!(encoded.len() <= 9);
        let decoded: u64 = from_slice(&encoded).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn byte_string(payload: Vec<u8>) {
        let value = Bytes::from(payload);
        let decoded: Bytes = from_slice(&to_vec(&value)).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn list_of_varints(values in proptest::collection::vec(0u64..=u64::MAX >> 1, 0..32)) {
        let decoded: Vec<u64> = from_slice(&to_vec(&values)).unwrap();
        prop_assert_eq!(decoded, values);
    }
}

#[test]
fn varint_wire_form() {
    let vectors: &[(u64, &str)] = &[
        (0, "00"),
        (1, "01"),
        (127, "7f"),
        (128, "8001"),
        (300, "ac02"),
        (u64::MAX >> 1, "ffffffffffffffff7f"),
    ];
    for (value, wire) in vectors {
        assert_eq!(hex::encode(to_vec(value)), *wire);
    }
}

#[test]
fn list_wraps_elements_in_one_string() {
    // two elements of two octets each, behind a single length prefix
    let values: Vec<u64> = vec![300, 300];
    assert_eq!(hex::encode(to_vec(&values)), "04ac02ac02");
}

#[test]
fn nested_lists() {
    let values: Vec<Vec<u64>> = vec![vec![1], vec![2, 3]];
    let decoded: Vec<Vec<u64>> = from_slice(&to_vec(&values)).unwrap();
    assert_eq!(decoded, values);
}

#[test]
fn decoder_reports_trailing_input() {
    let mut encoder = Encoder::new(Vec::new());
    encoder.varint(7).unwrap().byte(0xaa).unwrap();
    let buf = encoder.into_writer();

    let mut decoder = Decoder::new(&buf);
    assert_eq!(decoder.varint().unwrap(), 7);
    assert_eq!(decoder.remaining(), 1);
    assert!(!decoder.is_empty());
}
