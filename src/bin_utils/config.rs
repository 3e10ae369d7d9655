use std::path::PathBuf;

use clap::Parser;

use crate::credential::{Argon2Hasher, CredentialError};

/// In-memory ledger with 16-bit two's-complement balances.
#[derive(Debug, Parser)]
#[command(name = "twos-ledger", version)]
pub struct Config {
    /// Replay a CSV command script instead of starting the interactive console
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Prefix used when rendering amounts
    #[arg(long, default_value = "£")]
    pub currency: String,

    /// Argon2 memory cost in KiB
    #[arg(long, default_value_t = 19 * 1024)]
    pub hash_memory_kib: u32,

    /// Argon2 iteration count
    #[arg(long, default_value_t = 2)]
    pub hash_iterations: u32,
}

impl Config {
    pub fn hasher(&self) -> Result<Argon2Hasher, CredentialError> {
        Argon2Hasher::with_params(self.hash_memory_kib, self.hash_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["twos-ledger"]).unwrap();
        assert!(config.script.is_none());
        assert_eq!(config.currency, "£");
        assert_eq!(config.hash_memory_kib, 19 * 1024);
        assert!(config.hasher().is_ok());
    }

    #[test]
    fn script_mode() {
        let config = Config::try_parse_from([
            "twos-ledger",
            "--script",
            "ops.csv",
            "--currency",
            "$",
            "--hash-memory-kib",
            "64",
            "--hash-iterations",
            "1",
        ])
        .unwrap();
        assert_eq!(config.script, Some(PathBuf::from("ops.csv")));
        assert_eq!(config.currency, "$");
        assert!(config.hasher().is_ok());
    }

    #[test]
    fn bad_hash_params_are_rejected() {
        let config = Config::try_parse_from(["twos-ledger", "--hash-iterations", "0"]).unwrap();
        assert!(config.hasher().is_err());
    }
}
