use clap::{Parser, ValueEnum};

/// Connection overrides only.  The five operator actions are selected
/// inside the interactive session, never as subcommands.
#[derive(Parser)]
#[command(
	name = "contrepartie",
	about = "Interactive operator console for the Contrepartie counterparty-risk contract.",
	version
)]
pub struct Cli {
	/// Network to connect to.
	#[arg(long, default_value = "mumbai")]
	pub network: Network,

	/// Override RPC endpoint URL (bypasses the Infura project id).
	#[arg(long)]
	pub rpc_url: Option<String>,
}

#[derive(Clone, ValueEnum)]
pub enum Network {
	Mumbai,
	Polygon,
}

impl Network {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Mumbai => "mumbai",
			Self::Polygon => "polygon",
		}
	}
}
