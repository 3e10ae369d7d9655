use std::fmt;

use thiserror::Error;

use crate::{
    credential::Credential,
    encoding::{EncodedBalance, EncodingOverflow},
    notify::{Notification, NotificationKind, Notifier},
};

pub type Amount = i64;

/// Lowest balance a withdrawal or outgoing transfer may leave behind.
pub const OVERDRAFT_FLOOR: Amount = -1500;

/// Number of history entries shown in a mini statement.
pub const MINI_STATEMENT_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrawn,
    TransferredOut { to: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEvent {
    amount: Amount,
    kind: AccountEventKind,
}

impl AccountEvent {
    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> &AccountEventKind {
        &self.kind
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Insufficient funds: withdrawing {amount} from {balance} would exceed the overdraft limit")]
    InsufficientFunds { balance: Amount, amount: Amount },
    #[error(transparent)]
    EncodingOverflow(#[from] EncodingOverflow),
}

/// One line of an account's statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionRecord {
    Deposited(Amount),
    Withdrew(Amount),
    Transferred { amount: Amount, to: String },
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposited(amount) => write!(f, "Deposited {amount}"),
            Self::Withdrew(amount) => write!(f, "Withdraw {amount}"),
            Self::Transferred { amount, to } => write!(f, "Transferred {amount} to {to}"),
        }
    }
}

#[derive(Debug)]
pub struct Account {
    username: String,
    credential: Credential,
    failed_attempts: u32,
    contact_info: String,
    balance: EncodedBalance,
    history: Vec<TransactionRecord>,
}

impl Account {
    pub fn new(
        username: impl Into<String>,
        credential: Credential,
        opening_balance: Amount,
        contact_info: impl Into<String>,
    ) -> Result<Self, AccountError> {
        Ok(Self {
            username: username.into(),
            credential,
            failed_attempts: 0,
            contact_info: contact_info.into(),
            balance: EncodedBalance::new(opening_balance)?,
            history: Vec::new(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn contact_info(&self) -> &str {
        &self.contact_info
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn balance(&self) -> Amount {
        self.balance.logical()
    }

    pub fn encoded_balance(&self) -> u16 {
        self.balance.raw()
    }

    pub fn history(&self) -> &[TransactionRecord] {
        &self.history
    }

    /// The last [`MINI_STATEMENT_LEN`] entries, oldest first.
    pub fn recent_transactions(&self) -> &[TransactionRecord] {
        let start = self.history.len().saturating_sub(MINI_STATEMENT_LEN);
        &self.history[start..]
    }

    pub fn check_password(&mut self, input: &str) -> bool {
        if self.credential.matches(input) {
            self.failed_attempts = 0;
            true
        } else {
            self.failed_attempts += 1;
            false
        }
    }

    pub fn deposit(&mut self, amount: Amount, notifier: &dyn Notifier) -> Result<Amount, AccountError> {
        let evt = self.handle_deposit(amount)?;
        self.apply(&evt);
        self.announce(&evt, notifier);
        Ok(self.balance())
    }

    pub fn withdraw(&mut self, amount: Amount, notifier: &dyn Notifier) -> Result<Amount, AccountError> {
        let evt = self.handle_withdrawal(amount)?;
        self.apply(&evt);
        self.announce(&evt, notifier);
        Ok(self.balance())
    }

    /// Moves `amount` to `other`. Both sides are validated before either is
    /// touched, so a failure leaves both accounts as they were.
    pub fn transfer(
        &mut self,
        amount: Amount,
        other: &mut Account,
        notifier: &dyn Notifier,
    ) -> Result<Amount, AccountError> {
        let (debit, credit) = self.plan_transfer(amount, other)?;
        self.settle_transfer(&debit, Some(other), &credit, notifier);
        Ok(self.balance())
    }

    /// Transfer where source and target are the same account. Only the debit
    /// is checked: the credit restores the balance the debit started from.
    pub fn transfer_to_self(
        &mut self,
        amount: Amount,
        notifier: &dyn Notifier,
    ) -> Result<Amount, AccountError> {
        let debit = self.handle_transfer_out(amount, &self.username)?;
        let credit = AccountEvent {
            amount,
            kind: AccountEventKind::Deposited,
        };
        self.settle_transfer(&debit, None, &credit, notifier);
        Ok(self.balance())
    }

    /// Debit, then credit (`other`, or `self` when `None`), then the transfer
    /// record and its alert.
    fn settle_transfer(
        &mut self,
        debit: &AccountEvent,
        other: Option<&mut Account>,
        credit: &AccountEvent,
        notifier: &dyn Notifier,
    ) {
        self.apply(debit);
        self.announce(debit, notifier);
        let target: &mut Account = match other {
            Some(other) => other,
            None => &mut *self,
        };
        target.apply(credit);
        target.announce(credit, notifier);
        self.record_transfer(debit, notifier);
    }

    pub fn plan_transfer(
        &self,
        amount: Amount,
        target: &Account,
    ) -> Result<(AccountEvent, AccountEvent), AccountError> {
        let debit = self.handle_transfer_out(amount, &target.username)?;
        let credit = target.handle_deposit(amount)?;
        Ok((debit, credit))
    }

    pub fn handle_deposit(&self, amount: Amount) -> Result<AccountEvent, AccountError> {
        self.balance.checked_add(amount)?;
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::Deposited,
        })
    }

    pub fn handle_withdrawal(&self, amount: Amount) -> Result<AccountEvent, AccountError> {
        self.check_debit(amount)?;
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::Withdrawn,
        })
    }

    pub fn handle_transfer_out(&self, amount: Amount, to: &str) -> Result<AccountEvent, AccountError> {
        self.check_debit(amount)?;
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::TransferredOut { to: to.to_string() },
        })
    }

    fn check_debit(&self, amount: Amount) -> Result<(), AccountError> {
        let balance = self.balance();
        let next = i128::from(balance) - i128::from(amount);
        if next < i128::from(OVERDRAFT_FLOOR) {
            return Err(AccountError::InsufficientFunds { balance, amount });
        }
        let next = Amount::try_from(next).map_err(|_| EncodingOverflow { value: next })?;
        EncodedBalance::new(next)?;
        Ok(())
    }

    /// Applies an already validated event. Arithmetic wraps like the encoding
    /// itself, no validation happens here.
    pub fn apply(&mut self, event: &AccountEvent) {
        match &event.kind {
            AccountEventKind::Deposited => {
                self.balance = self.balance.wrapping_add(event.amount);
                self.history.push(TransactionRecord::Deposited(event.amount));
            }
            AccountEventKind::Withdrawn => {
                self.balance = self.balance.wrapping_add(event.amount.wrapping_neg());
                self.history.push(TransactionRecord::Withdrew(event.amount));
            }
            AccountEventKind::TransferredOut { .. } => {
                self.balance = self.balance.wrapping_add(event.amount.wrapping_neg());
                self.history.push(TransactionRecord::Withdrew(event.amount));
            }
        }
    }

    /// Closes an applied transfer-out: the statement line and the sender's
    /// alert, written once the credit side has landed.
    fn record_transfer(&mut self, event: &AccountEvent, notifier: &dyn Notifier) {
        if let AccountEventKind::TransferredOut { to } = &event.kind {
            self.history.push(TransactionRecord::Transferred {
                amount: event.amount,
                to: to.clone(),
            });
            notifier.notify(self.notification(
                NotificationKind::TransferSent { to: to.clone() },
                event.amount,
            ));
        }
    }

    /// Sends the alerts belonging to an applied event.
    pub fn announce(&self, event: &AccountEvent, notifier: &dyn Notifier) {
        match &event.kind {
            AccountEventKind::Deposited => {
                notifier.notify(self.notification(NotificationKind::Credited, event.amount))
            }
            AccountEventKind::Withdrawn | AccountEventKind::TransferredOut { .. } => {
                notifier.notify(self.notification(NotificationKind::Debited, event.amount))
            }
        }
    }

    fn notification(&self, kind: NotificationKind, amount: Amount) -> Notification {
        Notification {
            username: self.username.clone(),
            contact: self.contact_info.clone(),
            kind,
            amount,
            balance: self.balance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use crate::{credential::Argon2Hasher, notify::RecordingNotifier};

    use super::*;

    fn account(username: &str, balance: Amount) -> Account {
        let hasher = Arc::new(Argon2Hasher::with_params(64, 1).unwrap());
        let credential = Credential::new("securePass", hasher).unwrap();
        Account::new(username, credential, balance, format!("{username}@example.com")).unwrap()
    }

    fn statement(acc: &Account) -> Vec<String> {
        acc.recent_transactions()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn opening_balance_must_fit() {
        let hasher = Arc::new(Argon2Hasher::with_params(64, 1).unwrap());
        let credential = Credential::new("securePass", hasher).unwrap();
        let err = Account::new("big", credential, 40_000, "").unwrap_err();
        assert_eq!(err, AccountError::EncodingOverflow(EncodingOverflow { value: 40_000 }));
    }

    #[test]
    fn negative_opening_balance_is_encoded() {
        let acc = account("user1", -200);
        assert_eq!(acc.balance(), -200);
        assert_eq!(acc.encoded_balance(), 65336);
    }

    #[test]
    fn check_password_tracks_failures() {
        let mut acc = account("user1", 0);
        assert!(!acc.check_password("wrongPass"));
        assert!(!acc.check_password("SECUREPASS"));
        assert_eq!(acc.failed_attempts(), 2);
        assert!(acc.check_password("securePass"));
        assert_eq!(acc.failed_attempts(), 0);
    }

    #[test]
    fn deposit_logs_and_notifies() {
        let notifier = RecordingNotifier::default();
        let mut acc = account("user1", 500);
        assert_eq!(acc.deposit(100, &notifier).unwrap(), 600);
        assert_eq!(statement(&acc), vec!["Deposited 100"]);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::Credited);
        assert_eq!(sent[0].balance, 600);
        assert_eq!(sent[0].contact, "user1@example.com");
    }

    #[test]
    fn negative_deposit_skips_overdraft_floor() {
        let notifier = RecordingNotifier::default();
        let mut acc = account("user1", 0);
        assert_eq!(acc.deposit(-2000, &notifier).unwrap(), -2000);
    }

    #[test]
    fn deposit_overflow_leaves_account_untouched() {
        let notifier = RecordingNotifier::default();
        let mut acc = account("user1", 32_000);
        let err = acc.deposit(1000, &notifier).unwrap_err();
        assert_eq!(err, AccountError::EncodingOverflow(EncodingOverflow { value: 33_000 }));
        assert_eq!(acc.balance(), 32_000);
        assert!(acc.history().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[rstest]
    #[case(100, 1600, true)]
    #[case(100, 1601, false)]
    #[case(-1500, 0, true)]
    #[case(-1500, 1, false)]
    #[case(-1000, 500, true)]
    #[case(500, 700, true)]
    #[case(0, Amount::MAX, false)]
    fn withdraw_respects_overdraft_floor(
        #[case] balance: Amount,
        #[case] amount: Amount,
        #[case] succeeds: bool,
    ) {
        let notifier = RecordingNotifier::default();
        let mut acc = account("user1", balance);
        let res = acc.withdraw(amount, &notifier);
        if succeeds {
            assert_eq!(res.unwrap(), balance - amount);
            assert_eq!(acc.balance(), balance - amount);
            assert_eq!(statement(&acc), vec![format!("Withdraw {amount}")]);
        } else {
            assert_eq!(
                res.unwrap_err(),
                AccountError::InsufficientFunds { balance, amount }
            );
            assert_eq!(acc.balance(), balance);
            assert!(acc.history().is_empty());
            assert!(notifier.sent().is_empty());
        }
    }

    #[test]
    fn huge_debit_reports_the_unrepresentable_result() {
        let notifier = RecordingNotifier::default();
        let mut acc = account("user1", 100);
        let err = acc.withdraw(Amount::MIN, &notifier).unwrap_err();
        assert_eq!(
            err,
            AccountError::EncodingOverflow(EncodingOverflow {
                value: 100 - i128::from(Amount::MIN)
            })
        );
    }

    #[test]
    fn negative_withdrawal_can_overflow() {
        let notifier = RecordingNotifier::default();
        let mut acc = account("user1", 32_000);
        let err = acc.withdraw(-1000, &notifier).unwrap_err();
        assert!(matches!(err, AccountError::EncodingOverflow(_)));
        assert_eq!(acc.balance(), 32_000);
    }

    #[test]
    fn transfer_moves_funds() {
        let notifier = RecordingNotifier::default();
        let mut a = account("a", 500);
        let mut b = account("b", 1000);
        assert_eq!(a.transfer(200, &mut b, &notifier).unwrap(), 300);
        assert_eq!(a.balance(), 300);
        assert_eq!(b.balance(), 1200);
        assert_eq!(statement(&a), vec!["Withdraw 200", "Transferred 200 to b"]);
        assert_eq!(statement(&b), vec!["Deposited 200"]);

        let kinds: Vec<_> = notifier
            .sent()
            .into_iter()
            .map(|n| (n.username, n.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("a".to_string(), NotificationKind::Debited),
                ("b".to_string(), NotificationKind::Credited),
                (
                    "a".to_string(),
                    NotificationKind::TransferSent { to: "b".to_string() }
                ),
            ]
        );
    }

    #[test]
    fn failed_transfer_changes_nothing() {
        let notifier = RecordingNotifier::default();
        let mut a = account("a", 100);
        let mut b = account("b", 1000);
        let err = a.transfer(2000, &mut b, &notifier).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                balance: 100,
                amount: 2000
            }
        );
        assert_eq!(a.balance(), 100);
        assert_eq!(b.balance(), 1000);
        assert!(a.history().is_empty());
        assert!(b.history().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn transfer_rejected_when_target_would_overflow() {
        let notifier = RecordingNotifier::default();
        let mut a = account("a", 1000);
        let mut b = account("b", 32_000);
        let err = a.transfer(1000, &mut b, &notifier).unwrap_err();
        assert!(matches!(err, AccountError::EncodingOverflow(_)));
        assert_eq!(a.balance(), 1000);
        assert_eq!(b.balance(), 32_000);
        assert!(a.history().is_empty());
    }

    #[test]
    fn transfer_to_self_is_net_zero() {
        let notifier = RecordingNotifier::default();
        let mut a = account("a", 100);
        assert_eq!(a.transfer_to_self(1000, &notifier).unwrap(), 100);
        assert_eq!(
            statement(&a),
            vec!["Withdraw 1000", "Deposited 1000", "Transferred 1000 to a"]
        );
        let kinds: Vec<_> = notifier.sent().into_iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Debited,
                NotificationKind::Credited,
                NotificationKind::TransferSent { to: "a".to_string() },
            ]
        );
        assert!(a.transfer_to_self(1601, &notifier).is_err());
    }

    #[test]
    fn mini_statement_keeps_last_five() {
        let notifier = RecordingNotifier::default();
        let mut acc = account("user1", 0);
        for amount in 1..=4 {
            acc.deposit(amount, &notifier).unwrap();
        }
        for amount in 5..=7 {
            acc.withdraw(amount, &notifier).unwrap();
        }
        assert_eq!(acc.history().len(), 7);
        assert_eq!(
            statement(&acc),
            vec![
                "Deposited 3",
                "Deposited 4",
                "Withdraw 5",
                "Withdraw 6",
                "Withdraw 7"
            ]
        );
    }

    #[test]
    fn apply_events_wraps() {
        let mut acc = account("user1", 32_767);
        // event is the source of truth, there's no more validation happening
        acc.apply(&AccountEvent {
            amount: 1,
            kind: AccountEventKind::Deposited,
        });
        assert_eq!(acc.balance(), -32_768);
        assert_eq!(acc.encoded_balance(), 0x8000);
        acc.apply(&AccountEvent {
            amount: 1,
            kind: AccountEventKind::Withdrawn,
        });
        assert_eq!(acc.balance(), 32_767);
    }

    #[test]
    fn plan_transfer_is_read_only() {
        let a = account("a", 500);
        let b = account("b", 1000);
        let (debit, credit) = a.plan_transfer(200, &b).unwrap();
        assert_eq!(
            debit.kind(),
            &AccountEventKind::TransferredOut { to: "b".to_string() }
        );
        assert_eq!(credit.kind(), &AccountEventKind::Deposited);
        assert_eq!(credit.amount(), 200);
        assert_eq!(a.balance(), 500);
        assert_eq!(b.balance(), 1000);
    }
}
