// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Base58-encoded account keys.
//!
//! Keys are opaque to this code base: the contract SDK derives, signs and verifies with
//! them. We only check that a key is well-formed base58 before it crosses a component
//! boundary, and we keep the original text around so that it round-trips unchanged.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Errors when parsing a base58-encoded key.
#[derive(Debug, thiserror::Error)]
pub enum Base58Error {
    #[error("empty base58 string")]
    Empty,
    #[error("invalid base58 string: {0}")]
    Decode(#[from] bs58::decode::Error),
}

fn validate(encoded: &str) -> Result<(), Base58Error> {
    if encoded.is_empty() {
        return Err(Base58Error::Empty);
    }
    let bytes = bs58::decode(encoded).into_vec()?;
    if bytes.is_empty() {
        return Err(Base58Error::Empty);
    }
    Ok(())
}

/// The base58 address of an account, e.g. a fee payer or a deployed zkApp.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey(String);

impl PublicKey {
    /// Returns the base58 text of this key.
    pub fn as_base58(&self) -> &str {
        &self.0
    }
}

impl FromStr for PublicKey {
    type Err = Base58Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        validate(s)?;
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for PublicKey {
    type Error = Base58Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.0)
    }
}

/// The base58 private key of a freshly generated contract account.
///
/// The `Debug` output never contains the key material.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct PrivateKey(String);

impl PrivateKey {
    /// Returns the base58 text of this key.
    pub fn as_base58(&self) -> &str {
        &self.0
    }
}

impl FromStr for PrivateKey {
    type Err = Base58Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        validate(s)?;
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for PrivateKey {
    type Error = Base58Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}
