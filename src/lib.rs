/// 16-bit two's-complement encoding of balances.
pub mod encoding;

/// Account holder state and money movement.
/// State is modified using events, which are created by handling operations
/// and applied only once every check passed.
pub mod account;

/// Salted password digests behind the [`credential::SecretHasher`] interface.
pub mod credential;

/// Alerts sent to an account holder's contact channel.
pub mod notify;

/// Commands a front-end builds from raw text before handing them to a [`ledger`].
pub mod command;

/// Account registry interface, plus "in memory" implementation.
/// Coordinates account creation, login and transfers between accounts.
pub mod ledger;

/// Front-ends (batch script runner and interactive console). Ideally this
/// would be its own crate, but the integration tests drive it from here.
pub mod bin_utils;
