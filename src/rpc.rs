use ethers_core::types::{Address, TransactionReceipt, H256};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Thin JSON-RPC 2.0 client for an Ethereum-compatible node.
///
/// All traffic goes over plain reqwest rather than a provider stack:
/// the console needs only a handful of `eth_*` methods, and building
/// the requests by hand keeps the node's error objects intact so the
/// transaction helper can dig revert data out of them.
pub struct RpcClient {
	url: String,
	http: reqwest::Client,
}

#[derive(Debug, Error)]
pub enum RpcError {
	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),

	/// An error object reported by the node itself.  `data` usually
	/// carries the raw revert payload for failed calls.
	#[error("node error {code}: {message}")]
	Node {
		code: i64,
		message: String,
		data: Option<Value>,
	},

	#[error("malformed response: {0}")]
	Malformed(String),
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
	result: Option<Value>,
	error: Option<NodeError>,
}

#[derive(Debug, Deserialize)]
struct NodeError {
	code: i64,
	message: String,
	#[serde(default)]
	data: Option<Value>,
}

impl RpcClient {
	pub fn new(url: &str) -> Self {
		Self {
			url: url.to_owned(),
			http: reqwest::Client::new(),
		}
	}

	/// Run a single JSON-RPC request and unwrap the `result` field.
	pub async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
		let body = json!({
			"id": 1,
			"jsonrpc": "2.0",
			"method": method,
			"params": params,
		});

		let resp: RpcResponse = self
			.http
			.post(&self.url)
			.json(&body)
			.send()
			.await?
			.json()
			.await?;

		if let Some(err) = resp.error {
			return Err(RpcError::Node {
				code: err.code,
				message: err.message,
				data: err.data,
			});
		}
		resp.result
			.ok_or_else(|| RpcError::Malformed("neither result nor error present".into()))
	}

	// -- eth_* helpers --

	pub async fn chain_id(&self) -> Result<u64, RpcError> {
		let v = self.request("eth_chainId", json!([])).await?;
		parse_hex_u64(&v)
	}

	pub async fn block_number(&self) -> Result<u64, RpcError> {
		let v = self.request("eth_blockNumber", json!([])).await?;
		parse_hex_u64(&v)
	}

	/// Current transaction count for an address, i.e. the next nonce.
	pub async fn transaction_count(&self, address: Address, block: &str) -> Result<u64, RpcError> {
		let v = self
			.request("eth_getTransactionCount", json!([address, block]))
			.await?;
		parse_hex_u64(&v)
	}

	pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<H256, RpcError> {
		let v = self
			.request(
				"eth_sendRawTransaction",
				json!([format!("0x{}", hex::encode(raw))]),
			)
			.await?;
		parse_h256(&v)
	}

	/// Execute a read-only call.  `object` is the standard call object
	/// ({to, data, ...}); `block` is a tag or a hex block number.
	pub async fn call(&self, object: Value, block: Value) -> Result<Vec<u8>, RpcError> {
		let v = self.request("eth_call", json!([object, block])).await?;
		decode_hex_bytes(&v)
	}

	/// None until the transaction is mined.
	pub async fn transaction_receipt(
		&self,
		tx_hash: H256,
	) -> Result<Option<TransactionReceipt>, RpcError> {
		let v = self
			.request("eth_getTransactionReceipt", json!([tx_hash]))
			.await?;
		if v.is_null() {
			return Ok(None);
		}
		serde_json::from_value(v)
			.map(Some)
			.map_err(|e| RpcError::Malformed(format!("bad receipt object: {e}")))
	}

	pub async fn get_code(&self, address: Address, block: &str) -> Result<Vec<u8>, RpcError> {
		let v = self.request("eth_getCode", json!([address, block])).await?;
		decode_hex_bytes(&v)
	}
}

// -- Hex decoding of quantities and byte strings --

fn expect_hex_str(value: &Value) -> Result<&str, RpcError> {
	value
		.as_str()
		.ok_or_else(|| RpcError::Malformed(format!("expected hex string, got {value}")))
}

fn parse_hex_u64(value: &Value) -> Result<u64, RpcError> {
	let s = expect_hex_str(value)?;
	let digits = s.strip_prefix("0x").unwrap_or(s);
	u64::from_str_radix(digits, 16)
		.map_err(|e| RpcError::Malformed(format!("bad hex quantity {s}: {e}")))
}

fn parse_h256(value: &Value) -> Result<H256, RpcError> {
	let bytes = decode_hex_bytes(value)?;
	if bytes.len() != 32 {
		return Err(RpcError::Malformed(format!(
			"expected 32-byte hash, got {} bytes",
			bytes.len()
		)));
	}
	Ok(H256::from_slice(&bytes))
}

fn decode_hex_bytes(value: &Value) -> Result<Vec<u8>, RpcError> {
	let s = expect_hex_str(value)?;
	let digits = s.strip_prefix("0x").unwrap_or(s);
	hex::decode(digits).map_err(|e| RpcError::Malformed(format!("bad hex data {s}: {e}")))
}
