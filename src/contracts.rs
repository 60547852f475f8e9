/// A deployed instance of the Contrepartie risk contract.
pub struct Deployment {
	/// EIP-155 chain id the deployment lives on.
	pub chain_id: u64,
	/// Contract account address (0x-prefixed, 42 chars).
	pub address: &'static str,
}

/// All known deployments, keyed by network.
pub struct Contracts {
	mumbai: Deployment,
}

impl Contracts {
	pub fn for_network(&self, network: &str) -> &Deployment {
		match network {
			// No mainnet deployment exists.
			"polygon" => unimplemented!("the risk contract is not deployed on Polygon mainnet"),
			_ => &self.mumbai,
		}
	}
}

/// Global registry of deployed contract addresses.
pub static CONTRACTS: Contracts = Contracts {
	mumbai: Deployment {
		chain_id: 80001,
		address: "0xb010b596575ec0bb4ef47a5aee07f37c86a99411",
	},
};

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mumbai_address_is_valid_hex() {
		let d = CONTRACTS.for_network("mumbai");
		let hex_part = d.address.strip_prefix("0x").unwrap();
		assert_eq!(hex_part.len(), 40, "address should be 20 bytes");
		assert!(hex::decode(hex_part).is_ok(), "address should be valid hex");
	}

	#[test]
	fn mumbai_chain_id() {
		assert_eq!(CONTRACTS.for_network("mumbai").chain_id, 80001);
	}

	#[test]
	fn unknown_network_falls_back_to_mumbai() {
		let d = CONTRACTS.for_network("devnet");
		assert_eq!(d.chain_id, 80001);
	}

	#[test]
	#[should_panic]
	fn polygon_is_not_deployed() {
		CONTRACTS.for_network("polygon");
	}
}
