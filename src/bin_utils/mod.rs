//! This module could be a separate crate on its own, front-ends bootstrapping
//! [`twos_ledger`](crate) within the binary, but it is kept here so the
//! integration tests can drive it.

use std::io::{Read, Write};

use crate::{
    command::LedgerCommand,
    ledger::{AccountRegistry, ExecuteError, in_memory_ledger::InMemoryLedger},
};
use anyhow::Result;
use csv_parser::{CommandRow, CsvCommandParser};
use csv_printer::{AccountRow, print_accounts};
use thiserror::Error;

pub mod config;
pub mod console;
pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Malformed row: {0}")]
    Row(#[from] csv::Error),
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

/// Replays a CSV command script against `ledger` and prints the resulting
/// balances as CSV.
pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub ledger: InMemoryLedger,
    pub error_printer: Box<dyn FnMut(u64, ScriptError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvCommandParser::new(self.input);

        for (line, row) in parser {
            if let Err(err) = execute_row(&mut self.ledger, row) {
                (self.error_printer)(line, err);
            }
        }

        print_accounts(
            self.output,
            self.ledger.accounts().map(|acc| AccountRow {
                user: acc.username(),
                balance: acc.balance(),
                encoded: acc.encoded_balance(),
                failed_attempts: acc.failed_attempts(),
            }),
        )
    }
}

fn execute_row(
    ledger: &mut InMemoryLedger,
    row: Result<CommandRow, csv::Error>,
) -> Result<(), ScriptError> {
    let row = row?;
    let command = LedgerCommand::parse_command(row.kind, row.raw()).map_err(ExecuteError::from)?;
    ledger.execute(command)?;
    Ok(())
}
