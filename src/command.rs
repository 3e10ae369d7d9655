use serde::Deserialize;
use thiserror::Error;

use crate::{account::Amount, ledger::parse_amount};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LedgerCommandKind {
    Open,
    Login,
    Deposit,
    Withdraw,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    Open {
        username: String,
        password: String,
        initial_deposit: Amount,
        contact_info: String,
    },
    Login {
        username: String,
        password: String,
    },
    Deposit {
        username: String,
        amount: Amount,
    },
    Withdraw {
        username: String,
        amount: Amount,
    },
    Transfer {
        from: String,
        to: String,
        amount: Amount,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: LedgerCommandKind },
    #[error("Amount `{raw}` is not a whole number for {kind:?}")]
    InvalidAmount {
        kind: LedgerCommandKind,
        raw: String,
    },
    #[error("Password is required for {kind:?}")]
    PasswordRequired { kind: LedgerCommandKind },
    #[error("Target account is required for {kind:?}")]
    TargetRequired { kind: LedgerCommandKind },
}

/// Raw fields of a command, as a front-end collected them.
#[derive(Debug, Clone, Default)]
pub struct RawCommand<'a> {
    pub username: &'a str,
    pub amount: Option<&'a str>,
    pub target: Option<&'a str>,
    pub password: Option<&'a str>,
    pub contact: Option<&'a str>,
}

impl LedgerCommand {
    pub fn parse_command(kind: LedgerCommandKind, raw: RawCommand<'_>) -> Result<Self, CommandError> {
        let username = raw.username.to_string();
        match kind {
            LedgerCommandKind::Open => Ok(Self::Open {
                username,
                password: Self::required_password(kind, raw.password)?,
                initial_deposit: Self::required_amount(kind, raw.amount)?,
                contact_info: raw.contact.unwrap_or_default().to_string(),
            }),
            LedgerCommandKind::Login => Ok(Self::Login {
                username,
                password: Self::required_password(kind, raw.password)?,
            }),
            LedgerCommandKind::Deposit => Ok(Self::Deposit {
                username,
                amount: Self::required_amount(kind, raw.amount)?,
            }),
            LedgerCommandKind::Withdraw => Ok(Self::Withdraw {
                username,
                amount: Self::required_amount(kind, raw.amount)?,
            }),
            LedgerCommandKind::Transfer => {
                let Some(to) = raw.target else {
                    return Err(CommandError::TargetRequired { kind });
                };
                Ok(Self::Transfer {
                    from: username,
                    to: to.to_string(),
                    amount: Self::required_amount(kind, raw.amount)?,
                })
            }
        }
    }

    fn required_amount(kind: LedgerCommandKind, amount: Option<&str>) -> Result<Amount, CommandError> {
        let Some(raw) = amount else {
            return Err(CommandError::AmountRequired { kind });
        };
        parse_amount(raw).map_err(|_| CommandError::InvalidAmount {
            kind,
            raw: raw.to_string(),
        })
    }

    fn required_password(
        kind: LedgerCommandKind,
        password: Option<&str>,
    ) -> Result<String, CommandError> {
        password
            .map(ToOwned::to_owned)
            .ok_or(CommandError::PasswordRequired { kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_open_command() {
        let cmd = LedgerCommand::parse_command(
            LedgerCommandKind::Open,
            RawCommand {
                username: "user1",
                amount: Some("500"),
                password: Some("securePass"),
                contact: Some("user1@example.com"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            cmd,
            LedgerCommand::Open {
                username: "user1".to_string(),
                password: "securePass".to_string(),
                initial_deposit: 500,
                contact_info: "user1@example.com".to_string(),
            }
        );
    }

    #[test]
    fn open_without_contact_uses_empty_contact() {
        let cmd = LedgerCommand::parse_command(
            LedgerCommandKind::Open,
            RawCommand {
                username: "user1",
                amount: Some("-20"),
                password: Some("securePass"),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(matches!(
            cmd,
            LedgerCommand::Open { initial_deposit: -20, ref contact_info, .. } if contact_info.is_empty()
        ));
    }

    #[test]
    fn parse_transfer_command() {
        let cmd = LedgerCommand::parse_command(
            LedgerCommandKind::Transfer,
            RawCommand {
                username: "user1",
                amount: Some("200"),
                target: Some("user2"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            cmd,
            LedgerCommand::Transfer {
                from: "user1".to_string(),
                to: "user2".to_string(),
                amount: 200,
            }
        );
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = LedgerCommand::parse_command(
            LedgerCommandKind::Deposit,
            RawCommand {
                username: "user1",
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CommandError::AmountRequired {
                kind: LedgerCommandKind::Deposit
            }
        ));

        let err = LedgerCommand::parse_command(
            LedgerCommandKind::Transfer,
            RawCommand {
                username: "user1",
                amount: Some("10"),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::TargetRequired { .. }));

        let err = LedgerCommand::parse_command(
            LedgerCommandKind::Login,
            RawCommand {
                username: "user1",
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::PasswordRequired { .. }));
    }

    #[test]
    fn invalid_amount_is_reported() {
        let err = LedgerCommand::parse_command(
            LedgerCommandKind::Withdraw,
            RawCommand {
                username: "user1",
                amount: Some("12.50"),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Amount `12.50` is not a whole number for Withdraw"
        );
    }
}
