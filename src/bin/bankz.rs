use std::fs::File;

use anyhow::{Context, Result};
use bankz::services::LedgerError;
use bankz::teller::{Teller, TellerError};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let filename = std::env::args()
        .nth(1)
        .context("Expected an operations file as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let teller = Teller {
        input: file,
        output: &mut std::io::stdout(),
        error_printer: Box::new(|line, err| {
            match err {
                TellerError::Ledger(LedgerError::InsufficientFunds(_)) => {
                    // a refused withdrawal is not a script error; the
                    // statement shows the unchanged balance
                }
                err => eprintln!("Error at line {line}: {err}"),
            }
        }),
    };
    teller.run()
}
