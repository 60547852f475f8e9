use anyhow::Result;
use ethers_core::types::{Address, U256};

use crate::abi;
use crate::commands::{read_uint, Session};
use crate::prompt;

/// Run the three read-only risk views and render them as metrics.
pub async fn run(session: &Session) -> Result<()> {
	println!();
	println!("== Risk calculation ==");

	let Some(counterparty) = prompt::prompt_address("Counterparty address", session.operator())?
	else {
		return Ok(());
	};

	match compute(session, counterparty).await {
		Ok((risk, ratio, loss)) => {
			println!("Risk score:     {risk}");
			println!("Coverage ratio: {ratio}%");
			println!("Expected loss:  {loss}");
		}
		Err(e) => println!("Error computing risk figures: {e}"),
	}

	Ok(())
}

async fn compute(session: &Session, counterparty: Address) -> Result<(U256, U256, U256)> {
	let risk = read_uint(session, abi::risk_score(counterparty)?).await?;
	let ratio = read_uint(session, abi::coverage_ratio(counterparty)?).await?;
	let loss = read_uint(session, abi::expected_loss(counterparty)?).await?;
	Ok((risk, ratio, loss))
}
