use anyhow::{anyhow, Result};
use ethers_core::utils::to_checksum;
use ethers_signers::{LocalWallet, Signer};

use crate::config;

/// Load the operator wallet from the `PRIVATE_KEY` environment variable,
/// bound to the session's chain id so every signature carries EIP-155
/// replay protection.
pub fn load(chain_id: u64) -> Result<LocalWallet> {
	let key = config::private_key()?;
	from_key(&key, chain_id)
}

/// Parse a hex private key (with or without 0x prefix) into a wallet.
pub fn from_key(key: &str, chain_id: u64) -> Result<LocalWallet> {
	let wallet: LocalWallet = key
		.parse()
		.map_err(|e| anyhow!("PRIVATE_KEY is not a valid secp256k1 key: {e}"))?;
	Ok(wallet.with_chain_id(chain_id))
}

/// EIP-55 checksum rendering of the wallet address.
pub fn checksum_address(wallet: &LocalWallet) -> String {
	to_checksum(&wallet.address(), None)
}
