use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use tracing::{debug, info, warn};

use crate::{
    account::{Account, AccountError, Amount},
    credential::{Argon2Hasher, Credential, SecretHasher},
    encoding::EncodedBalance,
    notify::{Notifier, TracingNotifier},
};

use super::{AccountRegistry, LOGIN_ATTEMPTS, LedgerError, PASSWORD_LEN};

pub struct InMemoryLedger {
    accounts: HashMap<String, Account>,
    hasher: Arc<dyn SecretHasher>,
    notifier: Box<dyn Notifier>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(Arc::new(Argon2Hasher::default()), Box::new(TracingNotifier))
    }
}

impl InMemoryLedger {
    pub fn new(hasher: Arc<dyn SecretHasher>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            accounts: HashMap::new(),
            hasher,
            notifier,
        }
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    fn account_mut<'a>(
        accounts: &'a mut HashMap<String, Account>,
        username: &str,
    ) -> Result<&'a mut Account, LedgerError> {
        accounts.get_mut(username).ok_or_else(|| not_found(username))
    }
}

fn not_found(username: &str) -> LedgerError {
    LedgerError::AccountNotFound {
        username: username.to_string(),
    }
}

fn log_refusal(username: &str, amount: Amount, err: &AccountError) {
    debug!(user = username, amount, %err, "operation refused");
}

impl AccountRegistry for InMemoryLedger {
    fn create_account(
        &mut self,
        username: &str,
        password: &str,
        initial_deposit: Amount,
        contact_info: &str,
    ) -> Result<&Account, LedgerError> {
        if username.is_empty() {
            return Err(LedgerError::EmptyUsername);
        }
        let Entry::Vacant(entry) = self.accounts.entry(username.to_string()) else {
            return Err(LedgerError::DuplicateUsername {
                username: username.to_string(),
            });
        };
        let len = password.chars().count();
        if !PASSWORD_LEN.contains(&len) {
            return Err(LedgerError::InvalidPasswordLength { len });
        }
        // reject before paying for the hash
        EncodedBalance::new(initial_deposit).map_err(AccountError::from)?;

        let credential = Credential::new(password, self.hasher.clone())?;
        let account = Account::new(username, credential, initial_deposit, contact_info)?;
        info!(user = username, balance = initial_deposit, "account created");
        Ok(&*entry.insert(account))
    }

    fn authenticate(
        &mut self,
        username: &str,
        password_provider: &mut dyn FnMut(usize) -> String,
    ) -> Result<&Account, LedgerError> {
        let account = Self::account_mut(&mut self.accounts, username)?;
        for attempt in 0..LOGIN_ATTEMPTS {
            let candidate = password_provider(attempt);
            if account.check_password(&candidate) {
                info!(user = username, "login succeeded");
                return Ok(&*account);
            }
            warn!(
                user = username,
                failed_attempts = account.failed_attempts(),
                "password rejected"
            );
        }
        warn!(user = username, "locked out");
        Err(LedgerError::LockedOut {
            username: username.to_string(),
        })
    }

    fn lookup(&self, username: &str) -> Option<&Account> {
        self.accounts.get(username)
    }

    fn deposit(&mut self, username: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let account = Self::account_mut(&mut self.accounts, username)?;
        account
            .deposit(amount, self.notifier.as_ref())
            .inspect_err(|err| log_refusal(username, amount, err))
            .map_err(LedgerError::from)
    }

    fn withdraw(&mut self, username: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let account = Self::account_mut(&mut self.accounts, username)?;
        account
            .withdraw(amount, self.notifier.as_ref())
            .inspect_err(|err| log_refusal(username, amount, err))
            .map_err(LedgerError::from)
    }

    fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<Amount, LedgerError> {
        if from == to {
            let account = Self::account_mut(&mut self.accounts, from)?;
            return account
                .transfer_to_self(amount, self.notifier.as_ref())
                .inspect_err(|err| log_refusal(from, amount, err))
                .map_err(LedgerError::from);
        }

        // the source leaves the map so both accounts can be borrowed mutably
        let mut source = self.accounts.remove(from).ok_or_else(|| not_found(from))?;
        let outcome = match self.accounts.get_mut(to) {
            Some(target) => source
                .transfer(amount, target, self.notifier.as_ref())
                .inspect_err(|err| log_refusal(from, amount, err))
                .map_err(LedgerError::from),
            None => Err(not_found(to)),
        };
        self.accounts.insert(from.to_string(), source);
        let balance = outcome?;

        info!(from, to, amount, "transfer applied");
        Ok(balance)
    }
}
