#[cfg(test)]
use super::*;
use hex_literal::hex;
use jsonrpc_core::Error as RpcError;

const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcc5e2a6d0a0d3f04d";

fn server_error(message: &str) -> RpcError {
    RpcError { code: ErrorCode::ServerError(-32000), message: message.to_string(), data: None }
}

#[test]
fn secret_key_maps_to_its_well_known_address() {
    let key = parse_secret_key(ANVIL_KEY).unwrap();
    assert_eq!(
        secret_key_address(&key),
        Address::from(hex!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"))
    );
}

#[test]
fn secret_key_is_accepted_without_prefix() {
    let prefixed = parse_secret_key(ANVIL_KEY).unwrap();
    let bare = parse_secret_key(ANVIL_KEY.trim_start_matches("0x")).unwrap();
    assert_eq!(prefixed, bare);
}

#[test]
fn malformed_secret_keys_are_rejected() {
    assert!(parse_secret_key("0x1234").is_err());
    assert!(parse_secret_key("not-hex").is_err());
    assert!(parse_secret_key(&format!("0x{}", "00".repeat(32))).is_err());
}

#[test]
fn low_nonce_is_detected_from_server_errors() {
    assert!(error_due_to_low_nonce(&server_error("nonce too low")));
    assert!(error_due_to_low_nonce(&server_error("the tx doesn't have the correct nonce")));
    assert!(!error_due_to_low_nonce(&server_error("insufficient funds for gas")));

    let other_code = RpcError { code: ErrorCode::InternalError, ..server_error("nonce too low") };
    assert!(!error_due_to_low_nonce(&other_code));
}

#[test]
fn low_nonce_is_detected_through_context() {
    let error = anyhow::Error::from(web3::Error::Rpc(server_error("nonce too low")))
        .context("Error while sending raw transaction to Ethereum");
    assert!(is_low_nonce_error(&error));

    let unrelated = anyhow::anyhow!("nonce too low");
    assert!(!is_low_nonce_error(&unrelated));
}

#[test]
fn nonce_cache_increments_and_clears() {
    let mut web3_data = Web3Data::new();
    assert!(web3_data.increment_nonce().is_err());
    assert!(web3_data.get_web3_instance().is_err());

    web3_data.nonce = Some(4);
    web3_data.increment_nonce().unwrap();
    assert_eq!(web3_data.nonce, Some(5));

    web3_data.clear_nonce();
    assert_eq!(web3_data.nonce, None);
}
