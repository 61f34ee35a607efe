// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;

use crate::crypto::{Base58Error, PrivateKey, PublicKey};

const ZKAPP_ADDRESS: &str = "B62qrDdA1K8w3xNwk7snEEetAKKtZB5ywaesg89dQopVCqdX79n3Axy";

#[test]
fn public_key_keeps_its_text() {
    let key: PublicKey = ZKAPP_ADDRESS.parse().unwrap();
    assert_eq!(key.as_base58(), ZKAPP_ADDRESS);
    assert_eq!(key.to_string(), ZKAPP_ADDRESS);
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let key: PublicKey = format!("  {ZKAPP_ADDRESS}\n").parse().unwrap();
    assert_eq!(key.as_base58(), ZKAPP_ADDRESS);
}

#[test]
fn invalid_keys_are_rejected() {
    assert_matches!("".parse::<PublicKey>(), Err(Base58Error::Empty));
    // `0`, `O`, `I` and `l` are not in the base58 alphabet.
    assert_matches!("B62q0OIl".parse::<PublicKey>(), Err(Base58Error::Decode(_)));
    assert_matches!("EKF0".parse::<PrivateKey>(), Err(Base58Error::Decode(_)));
}

#[test]
fn public_key_serializes_as_a_string() {
    let key: PublicKey = ZKAPP_ADDRESS.parse().unwrap();
    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(json, format!("\"{ZKAPP_ADDRESS}\""));
    let back: PublicKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, key);
    assert!(serde_json::from_str::<PublicKey>("\"not-base58!\"").is_err());
}

#[test]
fn private_key_debug_is_redacted() {
    let key: PrivateKey = "EKFAdBGSSXrBbaCVqy4YjwWHoGEnsqYRQTqz227Eb5bzMx2bWu3F"
        .parse()
        .unwrap();
    assert_eq!(format!("{key:?}"), "PrivateKey(<redacted>)");
}
