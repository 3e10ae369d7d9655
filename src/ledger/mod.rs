use std::ops::RangeInclusive;

use thiserror::Error;

use crate::{
    account::{Account, AccountError, Amount, TransactionRecord},
    command::{CommandError, LedgerCommand},
    credential::CredentialError,
};

pub mod in_memory_ledger;

/// Password attempts allowed per [`AccountRegistry::authenticate`] call.
pub const LOGIN_ATTEMPTS: usize = 3;

/// Allowed password length, in characters.
pub const PASSWORD_LEN: RangeInclusive<usize> = 8..=16;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Username `{username}` already exists")]
    DuplicateUsername { username: String },
    #[error("Password must be between 8 and 16 characters, got {len}")]
    InvalidPasswordLength { len: usize },
    #[error("`{raw}` is not a whole number")]
    InvalidAmount { raw: String },
    #[error("Account `{username}` not found")]
    AccountNotFound { username: String },
    #[error("Too many failed attempts, `{username}` is locked out")]
    LockedOut { username: String },
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    LedgerErr(#[from] LedgerError),
}

/// Validates a user-typed amount as a whole number.
pub fn parse_amount(raw: &str) -> Result<Amount, LedgerError> {
    raw.trim().parse().map_err(|_| LedgerError::InvalidAmount {
        raw: raw.to_string(),
    })
}

/// Owns all accounts, keyed by username.
///
/// Every mutation takes `&mut self`, so one caller drives the registry at a time.
pub trait AccountRegistry {
    fn create_account(
        &mut self,
        username: &str,
        password: &str,
        initial_deposit: Amount,
        contact_info: &str,
    ) -> Result<&Account, LedgerError>;

    /// Asks `password_provider` for up to [`LOGIN_ATTEMPTS`] passwords; it
    /// receives the zero-based attempt number.
    fn authenticate(
        &mut self,
        username: &str,
        password_provider: &mut dyn FnMut(usize) -> String,
    ) -> Result<&Account, LedgerError>;

    fn lookup(&self, username: &str) -> Option<&Account>;

    fn deposit(&mut self, username: &str, amount: Amount) -> Result<Amount, LedgerError>;

    fn withdraw(&mut self, username: &str, amount: Amount) -> Result<Amount, LedgerError>;

    fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<Amount, LedgerError>;

    fn recent_transactions(&self, username: &str) -> Result<&[TransactionRecord], LedgerError> {
        self.lookup(username)
            .map(Account::recent_transactions)
            .ok_or_else(|| LedgerError::AccountNotFound {
                username: username.to_string(),
            })
    }

    fn execute(&mut self, command: LedgerCommand) -> Result<(), ExecuteError> {
        match command {
            LedgerCommand::Open {
                username,
                password,
                initial_deposit,
                contact_info,
            } => {
                self.create_account(&username, &password, initial_deposit, &contact_info)?;
            }
            LedgerCommand::Login { username, password } => {
                self.authenticate(&username, &mut |_: usize| password.clone())?;
            }
            LedgerCommand::Deposit { username, amount } => {
                self.deposit(&username, amount)?;
            }
            LedgerCommand::Withdraw { username, amount } => {
                self.withdraw(&username, amount)?;
            }
            LedgerCommand::Transfer { from, to, amount } => {
                self.transfer(&from, &to, amount)?;
            }
        };
        Ok(())
    }
}
