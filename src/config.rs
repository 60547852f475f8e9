use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub network: NetworkConfig,
	pub tx: TxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
	pub default: String,
	/// Infura base URLs; the project id from the environment is appended.
	pub mumbai_infura_base: String,
	pub polygon_infura_base: String,
}

/// Knobs for the write path.  The contract calls here are cheap, so a
/// single fixed gas limit and gas price cover every form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxConfig {
	pub gas_limit: u64,
	pub gas_price_gwei: u64,
	/// Block until a receipt is observed (the baseline).  Turning this
	/// off degrades to fire-and-forget: the hash is returned as soon as
	/// the node accepts the raw transaction.
	pub wait_for_receipt: bool,
	pub confirm_timeout_secs: u64,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			network: NetworkConfig {
				default: "mumbai".into(),
				mumbai_infura_base: "https://polygon-mumbai.infura.io/v3/".into(),
				polygon_infura_base: "https://polygon-mainnet.infura.io/v3/".into(),
			},
			tx: TxConfig {
				gas_limit: 300_000,
				gas_price_gwei: 30,
				wait_for_receipt: true,
				confirm_timeout_secs: 120,
			},
		}
	}
}

impl Config {
	/// Directory where console state is stored (~/.contrepartie/).
	pub fn dir() -> PathBuf {
		dirs::home_dir()
			.expect("could not determine home directory")
			.join(".contrepartie")
	}

	/// Path to the config file.
	pub fn path() -> PathBuf {
		Self::dir().join("config.toml")
	}

	/// Load config from disk, falling back to defaults if no file exists.
	pub fn load() -> Result<Self> {
		let path = Self::path();
		if path.exists() {
			let content = std::fs::read_to_string(&path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}

	/// Persist the current config to disk, creating the directory if needed.
	pub fn save(&self) -> Result<()> {
		let path = Self::path();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, toml::to_string_pretty(self)?)?;
		Ok(())
	}

	/// Return the Infura base URL for the given network name.
	pub fn infura_base(&self, network: &str) -> &str {
		match network {
			"polygon" => &self.network.polygon_infura_base,
			_ => &self.network.mumbai_infura_base,
		}
	}
}

// -- Environment secrets --

pub const INFURA_PROJECT_ID_VAR: &str = "INFURA_PROJECT_ID";
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

/// Infura project id, required unless the endpoint is overridden on the
/// command line.
pub fn infura_project_id() -> Result<String> {
	read_env(INFURA_PROJECT_ID_VAR)
}

/// Hex-encoded signing key.  Always required; the session cannot start
/// without an operator identity.
pub fn private_key() -> Result<String> {
	read_env(PRIVATE_KEY_VAR)
}

fn read_env(var: &str) -> Result<String> {
	match std::env::var(var) {
		Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
		_ => Err(anyhow!(
			"{var} is not set. Add it to your environment or a .env file."
		)),
	}
}
