use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::{
    account::{AccountError, Amount},
    ledger::{AccountRegistry, LOGIN_ATTEMPTS, LedgerError, PASSWORD_LEN, parse_amount},
    notify::RecordingNotifier,
};

/// Interactive banking menu over any line-based input and output.
///
/// Raw text is turned into amounts here; a bad number is reported and the
/// menu carries on, it never reaches the ledger.
///
/// Alerts the ledger records into the outbox given to
/// [`with_alerts`](Console::with_alerts) are written to the console's own
/// output after each operation.
pub struct Console<'l, L, R, W> {
    ledger: &'l mut L,
    input: R,
    output: W,
    currency: String,
    alerts: Option<RecordingNotifier>,
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> io::Result<Option<String>> {
    write!(output, "{message}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn ask_password<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    attempt: usize,
) -> io::Result<Option<String>> {
    if attempt > 0 {
        writeln!(
            output,
            "Incorrect password. Attempts remaining: {}",
            LOGIN_ATTEMPTS - attempt
        )?;
    }
    prompt(input, output, "Enter your password:")
}

impl<'l, L, R, W> Console<'l, L, R, W>
where
    L: AccountRegistry,
    R: BufRead,
    W: Write,
{
    pub fn new(ledger: &'l mut L, input: R, output: W, currency: impl Into<String>) -> Self {
        Self {
            ledger,
            input,
            output,
            currency: currency.into(),
            alerts: None,
        }
    }

    pub fn with_alerts(mut self, alerts: RecordingNotifier) -> Self {
        self.alerts = Some(alerts);
        self
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "==== Welcome to Twos Ledger Bank ====")?;
            writeln!(self.output, "1. Open New Account")?;
            writeln!(self.output, "2. Log In to Existing Account")?;
            writeln!(self.output, "3. Exit")?;
            let Some(choice) = self.prompt("Enter your choice (1-3): ")? else {
                return Ok(());
            };
            match choice.trim() {
                "1" => self.open_account()?,
                "2" => self.login()?,
                "3" => {
                    writeln!(self.output, "Thank you for using Twos Ledger Bank. Goodbye!")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid choice. Please try again.\n")?,
            }
        }
    }

    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        prompt(&mut self.input, &mut self.output, message)
    }

    fn flush_alerts(&mut self) -> io::Result<()> {
        let Some(alerts) = &self.alerts else {
            return Ok(());
        };
        for alert in alerts.take() {
            writeln!(self.output, "{}", alert.render(&self.currency))?;
        }
        Ok(())
    }

    fn open_account(&mut self) -> Result<()> {
        let Some(username) = self.prompt("Choose a username: ")? else {
            return Ok(());
        };
        if self.ledger.lookup(&username).is_some() {
            writeln!(self.output, "Error: username already exists.")?;
            return Ok(());
        }

        let Some(password) = self.prompt("Choose a password (8-16 characters): ")? else {
            return Ok(());
        };
        if !PASSWORD_LEN.contains(&password.chars().count()) {
            writeln!(self.output, "Error: Password must be between 8 and 16 characters.")?;
            return Ok(());
        }

        let Some(raw) = self.prompt("Enter your initial deposit amount: ")? else {
            return Ok(());
        };
        let Ok(deposit) = parse_amount(&raw) else {
            writeln!(self.output, "Error: Deposit must be a number.")?;
            return Ok(());
        };

        let Some(contact) = self.prompt("Enter your email or phone number for alerts: ")? else {
            return Ok(());
        };
        match self
            .ledger
            .create_account(&username, &password, deposit, &contact)
        {
            Ok(_) => writeln!(self.output, "Account for '{username}' created successfully!")?,
            Err(err) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(())
    }

    fn login(&mut self) -> Result<()> {
        let Some(username) = self.prompt("Enter your username:")? else {
            return Ok(());
        };
        if self.ledger.lookup(&username).is_none() {
            writeln!(self.output, "Error: Account not found.")?;
            return Ok(());
        }

        let input = &mut self.input;
        let output = &mut self.output;
        let mut io_error = None;
        let mut provider = |attempt: usize| -> String {
            match ask_password(&mut *input, &mut *output, attempt) {
                // a closed input counts as a wrong password
                Ok(password) => password.unwrap_or_default(),
                Err(err) => {
                    io_error.get_or_insert(err);
                    String::new()
                }
            }
        };
        let outcome = self
            .ledger
            .authenticate(&username, &mut provider)
            .map(|_| ());
        if let Some(err) = io_error {
            return Err(err.into());
        }

        match outcome {
            Ok(()) => {
                writeln!(self.output, "Login successful. Welcome, {username}!\n")?;
                self.session(&username)
            }
            Err(LedgerError::LockedOut { .. }) => {
                writeln!(self.output, "Incorrect password. Attempts remaining: 0")?;
                writeln!(self.output, "Too many failed attempts. You are now locked out.\n")?;
                Ok(())
            }
            Err(err) => {
                writeln!(self.output, "Error: {err}")?;
                Ok(())
            }
        }
    }

    fn session(&mut self, username: &str) -> Result<()> {
        loop {
            writeln!(self.output, "\n===== Banking Menu =====")?;
            writeln!(self.output, "1. Check Balance")?;
            writeln!(self.output, "2. Deposit Money")?;
            writeln!(self.output, "3. Withdraw Money")?;
            writeln!(self.output, "4. Transfer Money")?;
            writeln!(self.output, "5. View Mini Statement")?;
            writeln!(self.output, "6. Exit")?;
            let Some(choice) = self.prompt("Enter your choice (1-6): ")? else {
                return Ok(());
            };
            match choice.trim() {
                "1" => self.show_balance(username)?,
                "2" => self.deposit(username)?,
                "3" => self.withdraw(username)?,
                "4" => self.transfer(username)?,
                "5" => self.mini_statement(username)?,
                "6" => {
                    writeln!(self.output, "Logging out. Thank you for banking with us.")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid selection. Please try again.")?,
            }
        }
    }

    /// Reads an amount; `None` when input ended or the text was not a number
    /// (already reported).
    fn read_amount(&mut self, message: &str) -> Result<Option<Amount>> {
        let Some(raw) = self.prompt(message)? else {
            return Ok(None);
        };
        match parse_amount(&raw) {
            Ok(amount) => Ok(Some(amount)),
            Err(_) => {
                writeln!(self.output, "Invalid input. Please enter a number.")?;
                Ok(None)
            }
        }
    }

    fn show_balance(&mut self, username: &str) -> Result<()> {
        if let Some(acc) = self.ledger.lookup(username) {
            let balance = acc.balance();
            writeln!(self.output, "Your balance is: {}{balance}", self.currency)?;
        }
        Ok(())
    }

    fn deposit(&mut self, username: &str) -> Result<()> {
        let Some(amount) = self.read_amount("Enter amount to deposit: ")? else {
            return Ok(());
        };
        if amount <= 0 {
            writeln!(self.output, "Amount must be greater than 0.")?;
            return Ok(());
        }
        let outcome = self.ledger.deposit(username, amount);
        self.flush_alerts()?;
        match outcome {
            Ok(_) => writeln!(self.output, "{}{amount} deposited successfully.", self.currency)?,
            Err(err) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(())
    }

    fn withdraw(&mut self, username: &str) -> Result<()> {
        let Some(amount) = self.read_amount("Enter amount to withdraw: ")? else {
            return Ok(());
        };
        let outcome = self.ledger.withdraw(username, amount);
        self.flush_alerts()?;
        match outcome {
            Ok(_) => writeln!(self.output, "{}{amount} withdrawn successfully.", self.currency)?,
            Err(LedgerError::Account(AccountError::InsufficientFunds { .. })) => {
                writeln!(self.output, "Insufficient funds or overdraft limit reached.")?
            }
            Err(err) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(())
    }

    fn transfer(&mut self, username: &str) -> Result<()> {
        let Some(target) = self.prompt("Enter the recipient's username: ")? else {
            return Ok(());
        };
        if self.ledger.lookup(&target).is_none() {
            writeln!(self.output, "Recipient's account does not exist.")?;
            return Ok(());
        }
        let Some(amount) = self.read_amount("Enter amount to transfer: ")? else {
            return Ok(());
        };
        let outcome = self.ledger.transfer(username, &target, amount);
        self.flush_alerts()?;
        match outcome {
            Ok(_) => writeln!(self.output, "Transferred {}{amount} to {target}.", self.currency)?,
            Err(LedgerError::Account(AccountError::InsufficientFunds { .. })) => {
                writeln!(self.output, "Transfer failed. Check your balance.")?
            }
            Err(err) => writeln!(self.output, "Error: {err}")?,
        }
        Ok(())
    }

    fn mini_statement(&mut self, username: &str) -> Result<()> {
        writeln!(self.output, "===== MINI STATEMENT =====")?;
        for record in self.ledger.recent_transactions(username)? {
            writeln!(self.output, "{record}")?;
        }
        Ok(())
    }
}
