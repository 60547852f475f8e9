use anyhow::Result;

use crate::abi;
use crate::commands::{report_outcome, Session};
use crate::prompt;
use crate::tx;

/// Register a new counterparty on the contract.
pub async fn run(session: &Session) -> Result<()> {
	println!();
	println!("== Add a counterparty ==");

	let Some(counterparty) = prompt::prompt_address("Counterparty address", session.operator())?
	else {
		return Ok(());
	};
	let Some(credit_score) = prompt::prompt_u64("Credit score", 100, 1, u64::MAX)? else {
		return Ok(());
	};
	let Some(exposure_limit) = prompt::prompt_u64("Exposure limit", 1000, 1, u64::MAX)? else {
		return Ok(());
	};
	let Some(default_probability) = prompt::prompt_u64("Default probability (%)", 10, 0, 100)?
	else {
		return Ok(());
	};
	let Some(loss_given_default) = prompt::prompt_u64("Loss given default (%)", 50, 0, 100)?
	else {
		return Ok(());
	};

	let calldata = abi::add_counterparty(
		counterparty,
		credit_score,
		exposure_limit,
		default_probability,
		loss_given_default,
	)?;

	println!("Submitting ajouterContrepartie...");
	match tx::send_write(
		&session.rpc,
		&session.wallet,
		session.contract,
		calldata,
		&session.tx,
	)
	.await
	{
		Ok(outcome) => report_outcome("Counterparty added", &outcome),
		Err(e) => println!("Error: {e}"),
	}

	Ok(())
}
