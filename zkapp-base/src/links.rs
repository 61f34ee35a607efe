// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Links shown to the user after submitting a transaction or when an account needs funds.
//!
//! These are plain string interpolations: neither the hash nor the address is validated.

use crate::crypto::PublicKey;

/// The default block explorer prefix for devnet transactions.
pub const DEFAULT_EXPLORER_BASE: &str = "https://minascan.io/devnet/tx/";

/// The default faucet prefix for funding a devnet account.
pub const DEFAULT_FAUCET_BASE: &str = "https://faucet.minaprotocol.com/?address=";

/// Returns the block explorer URL of the transaction with the given hash.
pub fn transaction_link(explorer_base: &str, hash: &str) -> String {
    format!("{explorer_base}{hash}")
}

/// Returns the faucet URL for funding the given account.
pub fn faucet_link(faucet_base: &str, address: &PublicKey) -> String {
    format!("{faucet_base}{address}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_plain_concatenations() {
        assert_eq!(
            transaction_link(DEFAULT_EXPLORER_BASE, "5Jabc"),
            "https://minascan.io/devnet/tx/5Jabc"
        );
        let address: PublicKey = "B62qrDdA1K8w3xNwk7snEEetAKKtZB5ywaesg89dQopVCqdX79n3Axy"
            .parse()
            .unwrap();
        assert_eq!(
            faucet_link(DEFAULT_FAUCET_BASE, &address),
            "https://faucet.minaprotocol.com/?address=B62qrDdA1K8w3xNwk7snEEetAKKtZB5ywaesg89dQopVCqdX79n3Axy"
        );
    }
}
