//! Integration tests that hit a public Polygon Mumbai RPC.
//!
//! These are marked `#[ignore]` by default because they require network
//! access. Run them explicitly with:
//!
//!   cargo test --test integration -- --ignored

use contrepartie_cli::abi;
use contrepartie_cli::contracts::CONTRACTS;
use contrepartie_cli::rpc::RpcClient;
use contrepartie_cli::tx;

use ethers_core::types::Address;
use serde_json::json;

const MUMBAI_RPC: &str = "https://polygon-mumbai-bor-rpc.publicnode.com";

#[tokio::test]
#[ignore]
async fn chain_id_is_mumbai() {
	let rpc = RpcClient::new(MUMBAI_RPC);
	let chain_id = rpc.chain_id().await.expect("failed to fetch chain id");
	assert_eq!(chain_id, CONTRACTS.for_network("mumbai").chain_id);
}

#[tokio::test]
#[ignore]
async fn tip_block_number_is_positive() {
	let rpc = RpcClient::new(MUMBAI_RPC);
	let tip = rpc.block_number().await.expect("failed to fetch tip");
	assert!(tip > 0, "tip block number should be positive, got {tip}");
}

#[tokio::test]
#[ignore]
async fn risk_contract_has_code() {
	let rpc = RpcClient::new(MUMBAI_RPC);
	let deployment = CONTRACTS.for_network("mumbai");
	let address: Address = deployment.address.parse().unwrap();

	let code = rpc
		.get_code(address, "latest")
		.await
		.expect("eth_getCode failed");

	assert!(
		!code.is_empty(),
		"no code at {}, is the deployment address stale?",
		deployment.address
	);
}

#[tokio::test]
#[ignore]
async fn unknown_address_reads_as_missing() {
	let rpc = RpcClient::new(MUMBAI_RPC);
	let deployment = CONTRACTS.for_network("mumbai");
	let contract: Address = deployment.address.parse().unwrap();

	// Nobody has registered this address as a counterparty.
	let probe = Address::from([0x99; 20]);
	let calldata = abi::counterparty_record(probe).unwrap();
	let object = tx::call_object(None, contract, &calldata, None);

	let output = rpc
		.call(object, json!("latest"))
		.await
		.expect("eth_call failed");

	let record = abi::decode_counterparty(&output).expect("bad record shape");
	assert!(record.is_missing());
}
