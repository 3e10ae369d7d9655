use thiserror::Error;

use crate::account::Amount;

const WIDTH: u32 = 16;
const MODULUS: i64 = 1 << WIDTH;
const SIGN_BIT: u16 = 1 << (WIDTH - 1);

/// Smallest logical balance a 16-bit encoding can hold.
pub const MIN_BALANCE: Amount = -(1 << (WIDTH - 1));
/// Largest logical balance a 16-bit encoding can hold.
pub const MAX_BALANCE: Amount = (1 << (WIDTH - 1)) - 1;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{value} does not fit in a 16-bit balance (-32768..=32767)")]
pub struct EncodingOverflow {
    /// The result that could not be stored, widened so it is always exact.
    pub value: i128,
}

/// Encodes `value` as 16-bit two's complement.
///
/// Values outside [`MIN_BALANCE`]..=[`MAX_BALANCE`] wrap modulo 2^16, so decoding
/// them gives back a different number. Use [`EncodedBalance::new`] when that
/// must be detected.
pub fn encode_twos_complement(value: Amount) -> u16 {
    value.rem_euclid(MODULUS) as u16
}

pub fn decode_twos_complement(encoded: u16) -> Amount {
    if encoded & SIGN_BIT != 0 {
        Amount::from(encoded) - MODULUS
    } else {
        Amount::from(encoded)
    }
}

/// A balance kept in its encoded form. Construction and arithmetic are checked,
/// so the stored value always decodes to what was asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodedBalance(u16);

impl EncodedBalance {
    pub fn new(value: Amount) -> Result<Self, EncodingOverflow> {
        if (MIN_BALANCE..=MAX_BALANCE).contains(&value) {
            Ok(Self(encode_twos_complement(value)))
        } else {
            Err(EncodingOverflow {
                value: value.into(),
            })
        }
    }

    pub fn logical(self) -> Amount {
        decode_twos_complement(self.0)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn checked_add(self, amount: Amount) -> Result<Self, EncodingOverflow> {
        match self.logical().checked_add(amount) {
            Some(value) => Self::new(value),
            None => Err(EncodingOverflow {
                value: i128::from(self.logical()) + i128::from(amount),
            }),
        }
    }

    /// Adds modulo 2^16, the way the raw encoding behaves.
    pub fn wrapping_add(self, amount: Amount) -> Self {
        Self(encode_twos_complement(self.logical().wrapping_add(amount)))
    }
}
