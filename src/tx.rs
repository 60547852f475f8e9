use std::time::Duration;

use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, TransactionReceipt, TransactionRequest, H256, U256};
use ethers_core::utils::keccak256;
use ethers_signers::{LocalWallet, Signer};
use serde_json::{json, Value};
use thiserror::Error;

use crate::abi;
use crate::config::TxConfig;
use crate::rpc::{RpcClient, RpcError};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum TxError {
	/// The contract rejected the state change and we recovered the
	/// reason string.
	#[error("transaction {tx_hash:?} reverted: {reason}")]
	Reverted { tx_hash: H256, reason: String },

	/// The transaction failed on-chain but no reason could be recovered
	/// by replaying the call.
	#[error("transaction {tx_hash:?} reverted (no reason recoverable)")]
	RevertedSilently { tx_hash: H256 },

	#[error("no receipt for {tx_hash:?} after {waited_secs}s; check it manually")]
	ConfirmTimeout { tx_hash: H256, waited_secs: u64 },

	#[error("failed to sign transaction: {0}")]
	Sign(String),

	#[error(transparent)]
	Rpc(#[from] RpcError),
}

/// Result of a state-changing call.
#[derive(Debug)]
pub enum TxOutcome {
	/// Baseline mode: the receipt was observed and reports success.
	Confirmed {
		tx_hash: H256,
		block_number: u64,
		gas_used: Option<U256>,
	},
	/// Fire-and-forget mode: the node accepted the raw transaction and
	/// nothing more is known.
	Submitted { tx_hash: H256 },
}

/// Build, sign, and submit one contract write, then (in the baseline
/// configuration) block until its receipt is observed.
///
/// Single best-effort attempt: no retry, no fee bumping.  A failed
/// transaction is replayed as an `eth_call` at the failing block to
/// recover the contract's revert reason.
pub async fn send_write(
	rpc: &RpcClient,
	wallet: &LocalWallet,
	to: Address,
	calldata: Vec<u8>,
	settings: &TxConfig,
) -> Result<TxOutcome, TxError> {
	let from = wallet.address();
	let nonce = rpc.transaction_count(from, "latest").await?;

	let request = build_request(from, to, nonce, calldata.clone(), wallet.chain_id(), settings);
	let typed = TypedTransaction::Legacy(request);
	let sig = wallet
		.sign_transaction(&typed)
		.await
		.map_err(|e| TxError::Sign(e.to_string()))?;
	let raw = typed.rlp_signed(&sig);
	let tx_hash = H256::from(keccak256(&raw));

	if let Err(e) = rpc.send_raw_transaction(&raw).await {
		// Some nodes simulate before accepting and refuse a doomed
		// transaction outright, with the revert payload in the error.
		if let RpcError::Node { ref message, ref data, .. } = e {
			if let Some(reason) = reason_from_node_error(message, data.as_ref()) {
				return Err(TxError::Reverted { tx_hash, reason });
			}
		}
		return Err(e.into());
	}

	if !settings.wait_for_receipt {
		return Ok(TxOutcome::Submitted { tx_hash });
	}

	let receipt = await_receipt(rpc, tx_hash, settings.confirm_timeout_secs).await?;
	if receipt.status.map(|s| s.as_u64()) == Some(1) {
		return Ok(TxOutcome::Confirmed {
			tx_hash,
			block_number: receipt.block_number.map(|b| b.as_u64()).unwrap_or_default(),
			gas_used: receipt.gas_used,
		});
	}

	Err(recover_revert_reason(rpc, from, to, &calldata, settings, &receipt, tx_hash).await)
}

/// Poll for the receipt until it appears or the timeout elapses.
async fn await_receipt(
	rpc: &RpcClient,
	tx_hash: H256,
	timeout_secs: u64,
) -> Result<TransactionReceipt, TxError> {
	let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);
	loop {
		if let Some(receipt) = rpc.transaction_receipt(tx_hash).await? {
			return Ok(receipt);
		}
		if tokio::time::Instant::now() >= deadline {
			return Err(TxError::ConfirmTimeout {
				tx_hash,
				waited_secs: timeout_secs,
			});
		}
		tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
	}
}

/// Replay the failed call at the block that mined it.  The node rejects
/// the replay with the same revert payload the transaction hit, which is
/// the only way to get a reason out of a receipt-status-0 transaction.
async fn recover_revert_reason(
	rpc: &RpcClient,
	from: Address,
	to: Address,
	calldata: &[u8],
	settings: &TxConfig,
	receipt: &TransactionReceipt,
	tx_hash: H256,
) -> TxError {
	let block = match receipt.block_number {
		Some(n) => json!(format!("0x{:x}", n.as_u64())),
		None => json!("latest"),
	};
	let object = call_object(Some(from), to, calldata, Some(settings));

	match rpc.call(object, block).await {
		Err(RpcError::Node { message, data, .. }) => {
			match reason_from_node_error(&message, data.as_ref()) {
				Some(reason) => TxError::Reverted { tx_hash, reason },
				None => TxError::RevertedSilently { tx_hash },
			}
		}
		// The replay did not reproduce the failure; nothing better to
		// report than the generic outcome.
		_ => TxError::RevertedSilently { tx_hash },
	}
}

// -- Request building --

fn build_request(
	from: Address,
	to: Address,
	nonce: u64,
	calldata: Vec<u8>,
	chain_id: u64,
	settings: &TxConfig,
) -> TransactionRequest {
	TransactionRequest::new()
		.from(from)
		.to(to)
		.nonce(nonce)
		.gas(settings.gas_limit)
		.gas_price(gwei_to_wei(settings.gas_price_gwei))
		.data(calldata)
		.chain_id(chain_id)
}

/// Standard call object for `eth_call`.  `from` and gas fields matter
/// when replaying a failed write; plain reads pass only `to` and `data`.
pub fn call_object(
	from: Option<Address>,
	to: Address,
	calldata: &[u8],
	settings: Option<&TxConfig>,
) -> Value {
	let mut object = json!({
		"to": to,
		"data": format!("0x{}", hex::encode(calldata)),
	});
	if let Some(from) = from {
		object["from"] = json!(from);
	}
	if let Some(s) = settings {
		object["gas"] = json!(format!("0x{:x}", s.gas_limit));
		object["gasPrice"] = json!(format!("0x{:x}", gwei_to_wei(s.gas_price_gwei)));
	}
	object
}

fn gwei_to_wei(gwei: u64) -> U256 {
	U256::from(gwei) * U256::exp10(9)
}

/// Pull a revert reason out of a node error: either ABI-encoded revert
/// data, or a geth-style "execution reverted: ..." message.
fn reason_from_node_error(message: &str, data: Option<&Value>) -> Option<String> {
	if let Some(hex_str) = data.and_then(Value::as_str) {
		let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
		if let Ok(bytes) = hex::decode(digits) {
			if let Some(reason) = abi::decode_revert_reason(&bytes) {
				return Some(reason);
			}
		}
	}
	message
		.strip_prefix("execution reverted: ")
		.filter(|rest| !rest.is_empty())
		.map(str::to_owned)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn settings() -> TxConfig {
		TxConfig {
			gas_limit: 300_000,
			gas_price_gwei: 30,
			wait_for_receipt: true,
			confirm_timeout_secs: 120,
		}
	}

	fn encoded_error_string(msg: &[u8]) -> String {
		let mut data = vec![0x08, 0xc3, 0x79, 0xa0];
		let mut offset = [0u8; 32];
		offset[31] = 0x20;
		data.extend_from_slice(&offset);
		let mut len = [0u8; 32];
		len[31] = msg.len() as u8;
		data.extend_from_slice(&len);
		data.extend_from_slice(msg);
		data.extend_from_slice(&vec![0u8; 32 - msg.len()]);
		format!("0x{}", hex::encode(data))
	}

	#[test]
	fn gwei_conversion() {
		assert_eq!(gwei_to_wei(30), U256::from(30_000_000_000u64));
		assert_eq!(gwei_to_wei(0), U256::zero());
	}

	#[test]
	fn request_pins_gas_nonce_and_chain() {
		let from = Address::from([0x11; 20]);
		let to = Address::from([0x22; 20]);
		let req = build_request(from, to, 7, vec![0xab, 0xcd], 80001, &settings());

		assert_eq!(req.nonce, Some(U256::from(7u64)));
		assert_eq!(req.gas, Some(U256::from(300_000u64)));
		assert_eq!(req.gas_price, Some(U256::from(30_000_000_000u64)));
		assert_eq!(req.chain_id.map(|c| c.as_u64()), Some(80001));
		assert_eq!(req.value, None);
	}

	#[test]
	fn call_object_for_plain_read_is_minimal() {
		let to = Address::from([0x22; 20]);
		let object = call_object(None, to, &[0xab], None);
		assert!(object.get("from").is_none());
		assert!(object.get("gas").is_none());
		assert_eq!(object["data"], "0xab");
	}

	#[test]
	fn call_object_for_replay_carries_gas_fields() {
		let from = Address::from([0x11; 20]);
		let to = Address::from([0x22; 20]);
		let object = call_object(Some(from), to, &[], Some(&settings()));
		assert_eq!(object["gas"], "0x493e0");
		assert_eq!(object["gasPrice"], "0x6fc23ac00");
		assert!(object["from"].as_str().unwrap().starts_with("0x"));
	}

	#[test]
	fn reason_from_abi_encoded_data() {
		let data = serde_json::json!(encoded_error_string(b"Contrepartie inexistante"));
		let reason = reason_from_node_error("execution reverted", Some(&data));
		assert_eq!(reason.as_deref(), Some("Contrepartie inexistante"));
	}

	#[test]
	fn reason_from_message_prefix() {
		let reason = reason_from_node_error("execution reverted: Exposition depassee", None);
		assert_eq!(reason.as_deref(), Some("Exposition depassee"));
	}

	#[test]
	fn no_reason_when_nothing_recoverable() {
		assert_eq!(reason_from_node_error("execution reverted", None), None);
		assert_eq!(reason_from_node_error("out of gas", None), None);
		let junk = serde_json::json!("0xdeadbeef");
		assert_eq!(reason_from_node_error("execution reverted", Some(&junk)), None);
	}

	#[tokio::test]
	async fn signed_transaction_recovers_to_sender() {
		let wallet = crate::wallet::from_key(
			"ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
			80001,
		)
		.unwrap();
		let from = wallet.address();
		let to = Address::from([0x22; 20]);
		let req = build_request(from, to, 0, vec![0x01, 0x02], 80001, &settings());
		let typed = TypedTransaction::Legacy(req);

		let sig = wallet.sign_transaction(&typed).await.unwrap();
		assert_eq!(sig.recover(typed.sighash()).unwrap(), from);

		let raw = typed.rlp_signed(&sig);
		assert!(!raw.is_empty());
	}
}
