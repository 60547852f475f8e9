use std::io::{self, Write};

use anyhow::Result;
use ethers_core::types::Address;
use ethers_core::utils::to_checksum;

/// Print a label and read one trimmed line.  Returns None on EOF
/// (Ctrl-D), which callers treat as "back out of this form".
pub fn read_line(label: &str) -> Result<Option<String>> {
	print!("{label}");
	io::stdout().flush()?;

	let mut buf = String::new();
	if io::stdin().read_line(&mut buf)? == 0 {
		println!();
		return Ok(None);
	}
	Ok(Some(buf.trim().to_owned()))
}

/// Prompt for a bounded whole number, re-prompting until the input is
/// valid.  Empty input takes the default.
pub fn prompt_u64(label: &str, default: u64, min: u64, max: u64) -> Result<Option<u64>> {
	loop {
		let line = match read_line(&format!("{label} [{default}]: "))? {
			Some(l) => l,
			None => return Ok(None),
		};
		if line.is_empty() {
			return Ok(Some(default));
		}
		match parse_bounded(&line, min, max) {
			Ok(v) => return Ok(Some(v)),
			Err(msg) => println!("  {msg}"),
		}
	}
}

/// Prompt for an address, defaulting to the operator's own wallet.
pub fn prompt_address(label: &str, default: Address) -> Result<Option<Address>> {
	loop {
		let line = match read_line(&format!("{label} [{}]: ", to_checksum(&default, None)))? {
			Some(l) => l,
			None => return Ok(None),
		};
		if line.is_empty() {
			return Ok(Some(default));
		}
		match line.parse::<Address>() {
			Ok(a) => return Ok(Some(a)),
			Err(e) => println!("  invalid address: {e}"),
		}
	}
}

fn parse_bounded(input: &str, min: u64, max: u64) -> Result<u64, String> {
	let v: u64 = input
		.parse()
		.map_err(|_| "enter a whole number".to_owned())?;
	if v < min || v > max {
		if max == u64::MAX {
			return Err(format!("value must be at least {min}"));
		}
		return Err(format!("value must be between {min} and {max}"));
	}
	Ok(v)
}
