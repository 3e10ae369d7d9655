use std::io::Write;

use crate::account::Amount;
use anyhow::Context;
use csv::Writer;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AccountRow<'a> {
    pub user: &'a str,
    pub balance: Amount,
    pub encoded: u16,
    pub failed_attempts: u32,
}

pub fn print_accounts<'a, W>(
    output: &mut W,
    accounts: impl Iterator<Item = AccountRow<'a>>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for acc in accounts {
        let user = acc.user;
        writer
            .serialize(acc)
            .with_context(|| format!("Failed to write the balance of `{user}`"))?;
    }
    writer.flush().context("Failed to flush the balance report")?;
    Ok(())
}
