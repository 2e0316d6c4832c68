use std::io::Write;

use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

/// Closing state of one scripted account, keyed by its script alias.
#[derive(Debug, Serialize)]
pub struct StatementRow {
    pub alias: String,
    pub owner: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub balance: Decimal,
    pub status: &'static str,
}

pub fn print_statements<W>(
    output: &mut W,
    rows: impl Iterator<Item = StatementRow>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for row in rows {
        if let Err(err) = writer.serialize(row) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // push everything through to the underlying writer
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
