pub mod add;
pub mod info;
pub mod risk;
pub mod update;

use anyhow::Result;
use ethers_core::types::{Address, U256};
use ethers_core::utils::to_checksum;
use ethers_signers::{LocalWallet, Signer};
use serde_json::json;

use crate::cli::Cli;
use crate::config::{self, Config, TxConfig};
use crate::rpc::RpcClient;
use crate::tx::{self, TxOutcome};

/// Everything a view needs.  Built once at bootstrap, read-only for the
/// rest of the session.
pub struct Session {
	pub rpc: RpcClient,
	pub wallet: LocalWallet,
	pub contract: Address,
	pub network: String,
	pub tx: TxConfig,
}

impl Session {
	pub fn operator(&self) -> Address {
		self.wallet.address()
	}
}

/// Resolve the RPC URL from the CLI flag, or build the Infura endpoint
/// from the project id in the environment.
pub fn resolve_rpc(cli: &Cli, config: &Config) -> Result<String> {
	if let Some(url) = &cli.rpc_url {
		return Ok(url.clone());
	}
	let project_id = config::infura_project_id()?;
	Ok(format!(
		"{}{}",
		config.infura_base(cli.network.as_str()),
		project_id
	))
}

// -- Menu --

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuChoice {
	Home,
	Add,
	Update,
	Risk,
	Info,
	Quit,
}

impl MenuChoice {
	pub fn parse(input: &str) -> Option<Self> {
		match input.trim() {
			"1" => Some(Self::Home),
			"2" => Some(Self::Add),
			"3" => Some(Self::Update),
			"4" => Some(Self::Risk),
			"5" => Some(Self::Info),
			"6" | "q" | "quit" | "exit" => Some(Self::Quit),
			_ => None,
		}
	}
}

pub fn render_menu() {
	println!();
	println!("Choose an action:");
	println!("  1. Home");
	println!("  2. Add a counterparty");
	println!("  3. Update exposure / collateral");
	println!("  4. Risk calculation");
	println!("  5. Counterparty information");
	println!("  6. Quit");
}

/// The static landing view.
pub fn home(session: &Session) {
	println!();
	println!("Counterparty risk management console");
	println!("  Network:  {}", session.network);
	println!("  Chain id: {}", session.wallet.chain_id());
	println!("  Operator: {}", to_checksum(&session.operator(), None));
	println!("  Contract: {}", to_checksum(&session.contract, None));
	println!();
	println!("Use the menu to add counterparties, update their exposure or");
	println!("collateral, and query the contract's risk figures.");
	println!("Keep experiments on test networks.");
}

// -- Shared view helpers --

/// One read-only contract call at the latest block, decoded as uint256.
pub async fn read_uint(session: &Session, calldata: Vec<u8>) -> Result<U256> {
	let object = tx::call_object(None, session.contract, &calldata, None);
	let output = session.rpc.call(object, json!("latest")).await?;
	Ok(crate::abi::decode_uint(&output)?)
}

/// Render the outcome of a write the same way in every form.
pub fn report_outcome(action: &str, outcome: &TxOutcome) {
	match outcome {
		TxOutcome::Confirmed {
			tx_hash,
			block_number,
			gas_used,
		} => {
			println!("{action} confirmed in block {block_number}.");
			println!("  TX: {tx_hash:?}");
			if let Some(gas) = gas_used {
				println!("  Gas used: {gas}");
			}
		}
		TxOutcome::Submitted { tx_hash } => {
			println!("{action} submitted; not awaiting confirmation.");
			println!("  TX: {tx_hash:?}");
		}
	}
}
