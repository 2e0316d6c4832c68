use std::io::Read;

use csv::{StringRecord, StringRecordsIntoIter, Trim};
use rust_decimal::Decimal;

use super::TellerError;

/// Reads a teller operation script in CSV format. The first row is a
/// header and is skipped; every other row is yielded together with the
/// file line it starts on.
///
/// # Panics
///
/// If a row cannot be read
pub struct OpsReader<R> {
    iter: StringRecordsIntoIter<R>,
}

impl<R> OpsReader<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        // consume the header eagerly so reported line numbers match the file
        let _ = reader.headers();

        Self {
            iter: reader.into_records(),
        }
    }
}

impl<R> Iterator for OpsReader<R>
where
    R: Read,
{
    type Item = (u64, StringRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row.unwrap()))
    }
}

/// One scripted operation. Accounts are referred to by script-local
/// aliases bound at `open`, since real account numbers are generated.
#[derive(Debug, Clone, PartialEq)]
pub enum TellerOp {
    Register {
        first_name: String,
        last_name: String,
        username: String,
        password: String,
    },
    Open {
        username: String,
        account_type: String,
        alias: String,
    },
    Deposit {
        alias: String,
        amount: Decimal,
        description: String,
    },
    Withdraw {
        alias: String,
        amount: Decimal,
        description: String,
    },
    Transfer {
        from: String,
        to: String,
        amount: Decimal,
        description: String,
    },
    Freeze {
        alias: String,
    },
    Close {
        alias: String,
    },
}

impl TellerOp {
    pub fn parse(record: &StringRecord) -> Result<Self, TellerError> {
        let op = record.get(0).unwrap_or_default();
        match op {
            "register" => Ok(Self::Register {
                first_name: required(record, "register", 1, "first name")?.to_string(),
                last_name: required(record, "register", 2, "last name")?.to_string(),
                username: required(record, "register", 3, "username")?.to_string(),
                password: required(record, "register", 4, "password")?.to_string(),
            }),
            "open" => Ok(Self::Open {
                username: required(record, "open", 1, "username")?.to_string(),
                account_type: required(record, "open", 2, "account type")?.to_string(),
                alias: required(record, "open", 3, "alias")?.to_string(),
            }),
            "deposit" => Ok(Self::Deposit {
                alias: required(record, "deposit", 1, "alias")?.to_string(),
                amount: amount(record, "deposit", 2)?,
                description: optional(record, 3),
            }),
            "withdraw" => Ok(Self::Withdraw {
                alias: required(record, "withdraw", 1, "alias")?.to_string(),
                amount: amount(record, "withdraw", 2)?,
                description: optional(record, 3),
            }),
            "transfer" => Ok(Self::Transfer {
                from: required(record, "transfer", 1, "source alias")?.to_string(),
                to: required(record, "transfer", 2, "destination alias")?.to_string(),
                amount: amount(record, "transfer", 3)?,
                description: optional(record, 4),
            }),
            "freeze" => Ok(Self::Freeze {
                alias: required(record, "freeze", 1, "alias")?.to_string(),
            }),
            "close" => Ok(Self::Close {
                alias: required(record, "close", 1, "alias")?.to_string(),
            }),
            other => Err(TellerError::UnknownOp(other.to_string())),
        }
    }
}

fn required<'a>(
    record: &'a StringRecord,
    op: &'static str,
    index: usize,
    field: &'static str,
) -> Result<&'a str, TellerError> {
    match record.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(TellerError::MissingField { op, field }),
    }
}

fn amount(record: &StringRecord, op: &'static str, index: usize) -> Result<Decimal, TellerError> {
    let raw = required(record, op, index, "amount")?;
    let Ok(amount) = raw.parse::<Decimal>() else {
        return Err(TellerError::InvalidAmount(raw.to_string()));
    };
    Ok(amount)
}

fn optional(record: &StringRecord, index: usize) -> String {
    record.get(index).unwrap_or_default().to_string()
}
