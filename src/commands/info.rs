use anyhow::Result;
use ethers_core::utils::to_checksum;
use serde_json::json;

use crate::abi;
use crate::commands::Session;
use crate::prompt;
use crate::tx;

/// Look up the raw record behind one counterparty address.
pub async fn run(session: &Session) -> Result<()> {
	println!();
	println!("== Counterparty information ==");

	let Some(counterparty) = prompt::prompt_address("Counterparty address", session.operator())?
	else {
		return Ok(());
	};

	let calldata = abi::counterparty_record(counterparty)?;
	let object = tx::call_object(None, session.contract, &calldata, None);

	let output = match session.rpc.call(object, json!("latest")).await {
		Ok(o) => o,
		Err(e) => {
			println!("Error: {e}");
			return Ok(());
		}
	};

	match abi::decode_counterparty(&output) {
		Ok(record) if record.is_missing() => {
			println!(
				"No counterparty found for {}.",
				to_checksum(&counterparty, None)
			);
		}
		Ok(record) => println!("{}", serde_json::to_string_pretty(&record.to_json())?),
		Err(e) => println!("Error: {e}"),
	}

	Ok(())
}
