use std::io::Read;

use crate::command::{LedgerCommandKind, RawCommand};
use csv::{DeserializeRecordsIntoIter, Trim};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CommandRow {
    #[serde(rename = "type")]
    pub kind: LedgerCommandKind,
    pub user: String,
    pub amount: Option<String>,
    pub target: Option<String>,
    pub password: Option<String>,
    pub contact: Option<String>,
}

impl CommandRow {
    pub fn raw(&self) -> RawCommand<'_> {
        RawCommand {
            username: &self.user,
            amount: self.amount.as_deref(),
            target: self.target.as_deref(),
            password: self.password.as_deref(),
            contact: self.contact.as_deref(),
        }
    }
}

/// Parses a command script in CSV format with the header
/// `type,user,amount,target,password,contact`.
///
/// Each item carries the line it was read from; malformed rows are returned
/// as errors so the caller can report them and carry on.
pub struct CsvCommandParser<R> {
    iter: DeserializeRecordsIntoIter<R, CommandRow>,
}

impl<R> CsvCommandParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvCommandParser<R>
where
    R: Read,
{
    type Item = (u64, Result<CommandRow, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}
