#[cfg(test)]
use super::*;

fn header(number: &str) -> FinalizedHeader {
    serde_json::from_value(serde_json::json!({
        "parentHash": "0x00",
        "number": number,
        "stateRoot": "0x00",
        "extrinsicsRoot": "0x00",
        "digest": { "logs": [] }
    }))
    .expect("header deserializes")
}

#[test]
fn header_number_is_parsed_from_hex() {
    assert_eq!(header("0x0").block_number().unwrap(), 0);
    assert_eq!(header("0x1a4").block_number().unwrap(), 420);
}

#[test]
fn malformed_header_number_is_an_error() {
    assert!(header("0xzz").block_number().is_err());
}

#[test]
fn garbage_metadata_is_rejected() {
    assert!(decode_metadata(&[0x6d, 0x65, 0x74]).is_err());
}
