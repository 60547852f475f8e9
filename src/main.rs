use anyhow::{anyhow, bail, Result};
use clap::Parser;
use ethers_core::types::Address;
use ethers_core::utils::to_checksum;

mod abi;
mod cli;
mod commands;
mod config;
mod contracts;
mod prompt;
mod rpc;
mod tx;
mod wallet;

use cli::Cli;
use commands::{MenuChoice, Session};
use config::Config;
use contracts::CONTRACTS;
use rpc::RpcClient;

#[tokio::main]
async fn main() -> Result<()> {
	dotenvy::dotenv().ok();
	let cli = Cli::parse();

	let config = Config::load()?;
	if !Config::path().exists() {
		// Seed ~/.contrepartie/config.toml so the knobs are discoverable.
		config.save()?;
	}

	// Bootstrap failures (unreachable node, wrong chain, missing
	// credentials) are terminal; the menu is never shown.
	let session = bootstrap(&cli, &config).await?;
	run_menu(&session).await
}

async fn bootstrap(cli: &Cli, config: &Config) -> Result<Session> {
	let network = cli.network.as_str();
	let deployment = CONTRACTS.for_network(network);

	let rpc_url = commands::resolve_rpc(cli, config)?;
	let rpc = RpcClient::new(&rpc_url);

	let chain_id = rpc
		.chain_id()
		.await
		.map_err(|e| anyhow!("cannot reach the RPC endpoint: {e}"))?;
	if chain_id != deployment.chain_id {
		bail!(
			"endpoint reports chain id {chain_id}, expected {} for {network}",
			deployment.chain_id
		);
	}
	let tip = rpc.block_number().await?;

	let wallet = wallet::load(chain_id)?;
	let contract: Address = deployment
		.address
		.parse()
		.map_err(|e| anyhow!("bad contract address in registry: {e}"))?;

	println!("Connected to {network} (chain id {chain_id}, block {tip}).");
	println!("Operator wallet: {}", wallet::checksum_address(&wallet));
	println!("Risk contract:   {}", to_checksum(&contract, None));

	Ok(Session {
		rpc,
		wallet,
		contract,
		network: network.to_owned(),
		tx: config.tx.clone(),
	})
}

async fn run_menu(session: &Session) -> Result<()> {
	commands::home(session);

	loop {
		commands::render_menu();
		let Some(line) = prompt::read_line("> ")? else {
			break;
		};
		let Some(choice) = MenuChoice::parse(&line) else {
			println!("Enter a number from 1 to 6.");
			continue;
		};

		let result = match choice {
			MenuChoice::Home => {
				commands::home(session);
				Ok(())
			}
			MenuChoice::Add => commands::add::run(session).await,
			MenuChoice::Update => commands::update::run(session).await,
			MenuChoice::Risk => commands::risk::run(session).await,
			MenuChoice::Info => commands::info::run(session).await,
			MenuChoice::Quit => break,
		};

		// A failed action never ends the session.
		if let Err(e) = result {
			println!("Error: {e:#}");
		}
	}

	println!("Goodbye.");
	Ok(())
}
