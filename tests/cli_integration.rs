use serde_json::Value;
use std::process::{Command, Output};

const KEY: &str = "0x0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20";
const TO: &str = "0x1234567890abcdef1234567890abcdef12345678";

fn run_cli(args: &[&str]) -> (Output, Value) {
    let binary_path = assert_cmd::cargo::cargo_bin!("bcos-signer");
    let output = Command::new(binary_path)
        .args(args)
        .env_remove("BCOS_SIGNER_SM_CRYPTO")
        .env_remove("BCOS_SIGNER_CHAIN_ID")
        .env_remove("BCOS_SIGNER_GROUP_ID")
        .env_remove("BCOS_SIGNER_WASM")
        .env_remove("BCOS_SIGNER_BLOCK_LIMIT")
        .output()
        .expect("cli run succeeds");

    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout is utf8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("stdout is valid json");
    (output, json)
}

fn sign(extra: &[&str]) -> (Output, Value) {
    let mut args = vec!["sign", "--private-key", KEY, "--to", TO, "--data", "0xabc", "--block-limit", "1000"];
    args.extend_from_slice(extra);
    run_cli(&args)
}

#[test]
fn cli_sign_is_deterministic() {
    let (output, first) = sign(&[]);
    assert!(output.status.success(), "cli exited unsuccessfully: {:?}", output);
    assert_eq!(first["success"], true);

    let hash = first["data"]["tx_hash"].as_str().expect("tx_hash");
    assert_eq!(hash.trim_start_matches("0x").len(), 64);
    assert!(first["data"]["signed_tx"].as_str().expect("signed_tx").len() > 2);

    let (_, second) = sign(&[]);
    assert_eq!(first, second, "same inputs give the same output");
}

#[test]
fn cli_sign_then_verify() {
    let (_, signed) = sign(&["--extra-data", "memo"]);
    let signed_tx = signed["data"]["signed_tx"].as_str().expect("signed_tx").to_string();

    let (output, verified) = run_cli(&["verify", "--signed-tx", &signed_tx]);
    assert!(output.status.success());
    assert_eq!(verified["data"]["sender"], signed["data"]["sender"]);
    assert_eq!(verified["data"]["fields"]["block_limit"], 1000);
    assert_eq!(verified["data"]["fields"]["group_id"], "group0");
}

#[test]
fn cli_sm_mode() {
    let (output, ecdsa) = sign(&[]);
    assert!(output.status.success());
    let (output, sm) = run_cli(&[
        "--sm", "sign", "--private-key", KEY, "--to", TO, "--data", "0xabc", "--block-limit", "1000",
    ]);
    assert!(output.status.success());
    assert_eq!(sm["data"]["signature_mode"], "sm");
    assert_ne!(sm["data"]["tx_hash"], ecdsa["data"]["tx_hash"]);
}

#[test]
fn cli_short_key_exit_code() {
    let (output, json) = run_cli(&["sign", "--private-key", "0x00112233445566778899aabbccddeeff", "--data", "0x"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "invalid_key_length");
}

#[test]
fn cli_key_missing_a_digit_exit_code() {
    let truncated = &KEY[..KEY.len() - 1];
    let (output, json) = run_cli(&["sign", "--private-key", truncated, "--to", TO, "--data", "0xabc"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "invalid_key_length");
}

#[test]
fn cli_bad_recipient_exit_code() {
    let (output, json) = run_cli(&["sign", "--private-key", KEY, "--to", "0x1234"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(json["error"]["code"], "encoding_error");
}

#[test]
fn cli_keygen() {
    let (output, json) = run_cli(&["keygen"]);
    assert!(output.status.success());
    let key = json["data"]["private_key"].as_str().expect("private_key");
    assert_eq!(key.len(), 66);
    assert_eq!(json["data"]["address"].as_str().expect("address").len(), 42);
}

#[test]
fn cli_verify_rejects_garbage() {
    let (output, json) = run_cli(&["verify", "--signed-tx", "0xdeadbeef"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json["error"]["code"], "invalid_input");
}

#[test]
fn cli_verify_rejects_deep_nesting() {
    // 4096 empty-list wrappers: each level is one more 0xf8..0xfb header
    let mut payload_len = 0usize;
    let mut headers = Vec::new();
    for _ in 0..4096 {
        let header = if payload_len < 56 {
            format!("{:02x}", 0xc0 + payload_len)
        } else {
            let len_hex = format!("{:x}", payload_len);
            let len_hex = if len_hex.len() % 2 == 1 { format!("0{}", len_hex) } else { len_hex };
            format!("{:02x}{}", 0xf7 + len_hex.len() / 2, len_hex)
        };
        payload_len += header.len() / 2;
        headers.push(header);
    }
    let signed_tx: String = headers.into_iter().rev().collect();

    let (output, json) = run_cli(&["verify", "--signed-tx", &signed_tx]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json["error"]["code"], "invalid_input");
}
