use anyhow::{anyhow, Result};
use ethers_core::abi::{self, AbiParser, ParamType, Token};
use ethers_core::types::{Address, U256};
use ethers_core::utils::to_checksum;

// -- Function signatures --
//
// These names are the on-chain interface of the risk contract and must
// stay exactly as deployed (the contract itself is French-named).

const AJOUTER_CONTREPARTIE: &str =
	"ajouterContrepartie(address,uint256,uint256,uint256,uint256)";
const METTRE_A_JOUR_EXPOSITION: &str = "mettreAJourExposition(address,uint256)";
const METTRE_A_JOUR_COLLATERAL: &str = "mettreAJourCollateral(address,uint256)";
const CALCULER_RISQUE: &str = "calculerRisque(address)";
const CALCULER_RATIO_COUVERTURE: &str = "calculerRatioCouverture(address)";
const CALCULER_PERTES_ATTENDUES: &str = "calculerPertesAttendues(address)";
const CONTREPARTIES: &str = "contreparties(address)";

/// Selector of the solidity `Error(string)` revert payload.
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

// -- Calldata builders --

/// `ajouterContrepartie(wallet, creditScore, exposureLimit, pd, lgd)`.
pub fn add_counterparty(
	wallet: Address,
	credit_score: u64,
	exposure_limit: u64,
	default_probability: u64,
	loss_given_default: u64,
) -> Result<Vec<u8>> {
	encode(
		AJOUTER_CONTREPARTIE,
		&[
			Token::Address(wallet),
			Token::Uint(U256::from(credit_score)),
			Token::Uint(U256::from(exposure_limit)),
			Token::Uint(U256::from(default_probability)),
			Token::Uint(U256::from(loss_given_default)),
		],
	)
}

pub fn update_exposure(counterparty: Address, new_exposure: u64) -> Result<Vec<u8>> {
	encode(
		METTRE_A_JOUR_EXPOSITION,
		&[
			Token::Address(counterparty),
			Token::Uint(U256::from(new_exposure)),
		],
	)
}

pub fn update_collateral(counterparty: Address, new_collateral: u64) -> Result<Vec<u8>> {
	encode(
		METTRE_A_JOUR_COLLATERAL,
		&[
			Token::Address(counterparty),
			Token::Uint(U256::from(new_collateral)),
		],
	)
}

pub fn risk_score(counterparty: Address) -> Result<Vec<u8>> {
	encode(CALCULER_RISQUE, &[Token::Address(counterparty)])
}

pub fn coverage_ratio(counterparty: Address) -> Result<Vec<u8>> {
	encode(CALCULER_RATIO_COUVERTURE, &[Token::Address(counterparty)])
}

pub fn expected_loss(counterparty: Address) -> Result<Vec<u8>> {
	encode(CALCULER_PERTES_ATTENDUES, &[Token::Address(counterparty)])
}

pub fn counterparty_record(counterparty: Address) -> Result<Vec<u8>> {
	encode(CONTREPARTIES, &[Token::Address(counterparty)])
}

fn encode(signature: &str, args: &[Token]) -> Result<Vec<u8>> {
	let mut parser = AbiParser::default();
	let function = parser
		.parse_function(signature)
		.map_err(|e| anyhow!("failed to parse ABI signature {signature}: {e}"))?;
	function
		.encode_input(args)
		.map_err(|e| anyhow!("failed to encode input for {signature}: {e}"))
}

// -- Output decoding --

/// Decode the single uint256 returned by the three risk view functions.
pub fn decode_uint(output: &[u8]) -> Result<U256> {
	let tokens = abi::decode(&[ParamType::Uint(256)], output)
		.map_err(|e| anyhow!("failed to decode uint256 output: {e}"))?;
	match tokens.first() {
		Some(Token::Uint(v)) => Ok(*v),
		_ => Err(anyhow!("unexpected output shape, wanted a single uint256")),
	}
}

/// One row of the contract's `contreparties` mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Counterparty {
	pub wallet: Address,
	pub credit_score: U256,
	pub exposure_limit: U256,
	pub current_exposure: U256,
	pub collateral: U256,
	pub default_probability: U256,
	pub loss_given_default: U256,
	pub active: bool,
}

impl Counterparty {
	/// The mapping returns an all-zero row for unknown addresses; the
	/// zero wallet field is the "not found" marker.
	pub fn is_missing(&self) -> bool {
		self.wallet == Address::zero()
	}

	/// Render for the information panel.  Amounts stay decimal strings
	/// so large uint256 values survive JSON intact.
	pub fn to_json(&self) -> serde_json::Value {
		serde_json::json!({
			"wallet": to_checksum(&self.wallet, None),
			"credit_score": self.credit_score.to_string(),
			"exposure_limit": self.exposure_limit.to_string(),
			"current_exposure": self.current_exposure.to_string(),
			"collateral": self.collateral.to_string(),
			"default_probability_pct": self.default_probability.to_string(),
			"loss_given_default_pct": self.loss_given_default.to_string(),
			"active": self.active,
		})
	}
}

/// Decode the 8-field tuple returned by `contreparties(address)`.
pub fn decode_counterparty(output: &[u8]) -> Result<Counterparty> {
	let types = [
		ParamType::Address,
		ParamType::Uint(256),
		ParamType::Uint(256),
		ParamType::Uint(256),
		ParamType::Uint(256),
		ParamType::Uint(256),
		ParamType::Uint(256),
		ParamType::Bool,
	];
	let tokens = abi::decode(&types, output)
		.map_err(|e| anyhow!("failed to decode counterparty record: {e}"))?;

	let mut iter = tokens.into_iter();
	let mut next = || iter.next().ok_or_else(|| anyhow!("truncated record"));

	Ok(Counterparty {
		wallet: as_address(next()?)?,
		credit_score: as_uint(next()?)?,
		exposure_limit: as_uint(next()?)?,
		current_exposure: as_uint(next()?)?,
		collateral: as_uint(next()?)?,
		default_probability: as_uint(next()?)?,
		loss_given_default: as_uint(next()?)?,
		active: as_bool(next()?)?,
	})
}

// -- Revert reasons --

/// Extract the human-readable reason from a standard `Error(string)`
/// revert payload.  Returns None for empty data, custom errors, or
/// anything else that does not carry a string.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
	if data.len() <= 4 || data[..4] != ERROR_STRING_SELECTOR {
		return None;
	}
	let tokens = abi::decode(&[ParamType::String], &data[4..]).ok()?;
	match tokens.into_iter().next() {
		Some(Token::String(reason)) => Some(reason),
		_ => None,
	}
}

// -- Token accessors --

fn as_address(t: Token) -> Result<Address> {
	match t {
		Token::Address(a) => Ok(a),
		other => Err(anyhow!("expected address, got {other:?}")),
	}
}

fn as_uint(t: Token) -> Result<U256> {
	match t {
		Token::Uint(v) => Ok(v),
		other => Err(anyhow!("expected uint256, got {other:?}")),
	}
}

fn as_bool(t: Token) -> Result<bool> {
	match t {
		Token::Bool(b) => Ok(b),
		other => Err(anyhow!("expected bool, got {other:?}")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn addr(byte: u8) -> Address {
		Address::from([byte; 20])
	}

	#[test]
	fn add_counterparty_calldata_shape() {
		let data = add_counterparty(addr(0x11), 100, 1000, 10, 50).unwrap();
		// 4-byte selector + five 32-byte words.
		assert_eq!(data.len(), 4 + 5 * 32);
	}

	#[test]
	fn single_arg_calldata_shape() {
		for data in [
			risk_score(addr(0x22)).unwrap(),
			coverage_ratio(addr(0x22)).unwrap(),
			expected_loss(addr(0x22)).unwrap(),
			counterparty_record(addr(0x22)).unwrap(),
		] {
			assert_eq!(data.len(), 4 + 32);
		}
	}

	#[test]
	fn selectors_are_distinct() {
		let a = update_exposure(addr(0x33), 5).unwrap();
		let b = update_collateral(addr(0x33), 5).unwrap();
		assert_ne!(a[..4], b[..4], "different functions, different selectors");
		// Same function + args is deterministic.
		assert_eq!(a, update_exposure(addr(0x33), 5).unwrap());
	}

	#[test]
	fn decode_uint_big_endian_word() {
		let mut word = [0u8; 32];
		word[31] = 100;
		assert_eq!(decode_uint(&word).unwrap(), U256::from(100u64));
	}

	#[test]
	fn decode_uint_rejects_garbage() {
		assert!(decode_uint(&[]).is_err());
		assert!(decode_uint(&[0u8; 7]).is_err());
	}

	#[test]
	fn revert_reason_from_error_string_payload() {
		// Hand-built Error("Exposure limit exceeded"):
		// selector || offset(0x20) || length(23) || utf8 padded to 32.
		let msg = b"Exposure limit exceeded";
		let mut data = Vec::new();
		data.extend_from_slice(&[0x08, 0xc3, 0x79, 0xa0]);
		let mut offset = [0u8; 32];
		offset[31] = 0x20;
		data.extend_from_slice(&offset);
		let mut len = [0u8; 32];
		len[31] = msg.len() as u8;
		data.extend_from_slice(&len);
		data.extend_from_slice(msg);
		data.extend_from_slice(&vec![0u8; 32 - msg.len()]);

		assert_eq!(
			decode_revert_reason(&data).as_deref(),
			Some("Exposure limit exceeded")
		);
	}

	#[test]
	fn revert_reason_rejects_non_error_payloads() {
		assert_eq!(decode_revert_reason(&[]), None);
		// Bare selector with no payload.
		assert_eq!(decode_revert_reason(&[0x08, 0xc3, 0x79, 0xa0]), None);
		// Custom error selector.
		assert_eq!(decode_revert_reason(&[0xde, 0xad, 0xbe, 0xef, 0, 0]), None);
	}

	#[test]
	fn counterparty_record_roundtrip() {
		let tokens = vec![
			Token::Address(addr(0x44)),
			Token::Uint(U256::from(100u64)),
			Token::Uint(U256::from(1000u64)),
			Token::Uint(U256::from(250u64)),
			Token::Uint(U256::from(500u64)),
			Token::Uint(U256::from(10u64)),
			Token::Uint(U256::from(50u64)),
			Token::Bool(true),
		];
		let output = abi::encode(&tokens);

		let record = decode_counterparty(&output).unwrap();
		assert_eq!(record.wallet, addr(0x44));
		assert_eq!(record.credit_score, U256::from(100u64));
		assert_eq!(record.exposure_limit, U256::from(1000u64));
		assert_eq!(record.current_exposure, U256::from(250u64));
		assert_eq!(record.collateral, U256::from(500u64));
		assert!(record.active);
		assert!(!record.is_missing());
	}

	#[test]
	fn zero_wallet_means_missing() {
		let tokens = vec![
			Token::Address(Address::zero()),
			Token::Uint(U256::zero()),
			Token::Uint(U256::zero()),
			Token::Uint(U256::zero()),
			Token::Uint(U256::zero()),
			Token::Uint(U256::zero()),
			Token::Uint(U256::zero()),
			Token::Bool(false),
		];
		let record = decode_counterparty(&abi::encode(&tokens)).unwrap();
		assert!(record.is_missing());
	}

	#[test]
	fn counterparty_json_uses_decimal_amounts() {
		let record = Counterparty {
			wallet: addr(0x55),
			credit_score: U256::from(100u64),
			exposure_limit: U256::from(1000u64),
			current_exposure: U256::from(250u64),
			collateral: U256::from(500u64),
			default_probability: U256::from(10u64),
			loss_given_default: U256::from(50u64),
			active: true,
		};
		let json = record.to_json();
		assert_eq!(json["exposure_limit"], "1000");
		assert_eq!(json["active"], true);
		assert!(json["wallet"].as_str().unwrap().starts_with("0x"));
	}
}
