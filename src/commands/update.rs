use anyhow::Result;
use ethers_core::types::Address;

use crate::abi;
use crate::commands::{report_outcome, Session};
use crate::prompt;
use crate::tx;

/// Two independent forms, one write call each.
pub async fn run(session: &Session) -> Result<()> {
	println!();
	println!("== Update counterparty data ==");
	println!("  1. Update exposure");
	println!("  2. Update collateral");
	println!("  3. Back");

	let Some(choice) = prompt::read_line("> ")? else {
		return Ok(());
	};
	match choice.trim() {
		"1" => update_exposure(session).await,
		"2" => update_collateral(session).await,
		_ => Ok(()),
	}
}

async fn update_exposure(session: &Session) -> Result<()> {
	let Some((counterparty, value)) = collect(session, "New exposure")? else {
		return Ok(());
	};
	let calldata = abi::update_exposure(counterparty, value)?;

	println!("Submitting mettreAJourExposition...");
	submit(session, calldata, "Exposure updated").await
}

async fn update_collateral(session: &Session) -> Result<()> {
	let Some((counterparty, value)) = collect(session, "New collateral")? else {
		return Ok(());
	};
	let calldata = abi::update_collateral(counterparty, value)?;

	println!("Submitting mettreAJourCollateral...");
	submit(session, calldata, "Collateral updated").await
}

fn collect(session: &Session, value_label: &str) -> Result<Option<(Address, u64)>> {
	let Some(counterparty) = prompt::prompt_address("Counterparty address", session.operator())?
	else {
		return Ok(None);
	};
	let Some(value) = prompt::prompt_u64(value_label, 0, 0, u64::MAX)? else {
		return Ok(None);
	};
	Ok(Some((counterparty, value)))
}

async fn submit(session: &Session, calldata: Vec<u8>, action: &str) -> Result<()> {
	match tx::send_write(
		&session.rpc,
		&session.wallet,
		session.contract,
		calldata,
		&session.tx,
	)
	.await
	{
		Ok(outcome) => report_outcome(action, &outcome),
		Err(e) => println!("Error: {e}"),
	}
	Ok(())
}
