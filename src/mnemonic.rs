use std::borrow::Cow;
use std::fmt;

use bip39::Mnemonic;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// BIP-39 seed stretching rounds.
const PBKDF2_ROUNDS: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MnemonicStrength {
    #[default]
    #[serde(rename = "12")]
    Words12,
    #[serde(rename = "15")]
    Words15,
    #[serde(rename = "18")]
    Words18,
    #[serde(rename = "21")]
    Words21,
    #[serde(rename = "24")]
    Words24,
}

impl MnemonicStrength {
    pub fn entropy_bits(&self) -> usize {
        match self {
            MnemonicStrength::Words12 => 128,
            MnemonicStrength::Words15 => 160,
            MnemonicStrength::Words18 => 192,
            MnemonicStrength::Words21 => 224,
            MnemonicStrength::Words24 => 256,
        }
    }

    pub fn word_count(&self) -> usize {
        // 11 bits per word, one checksum bit per 32 bits of entropy
        (self.entropy_bits() + self.entropy_bits() / 32) / 11
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("invalid word count {0}, expected 12, 15, 18, 21 or 24")]
    BadWordCount(usize),

    #[error("word at position {0} is not in the BIP-39 wordlist")]
    UnknownWord(usize),

    #[error("mnemonic checksum mismatch")]
    InvalidChecksum,

    #[error("mnemonic rejected: {0}")]
    Other(String),
}

impl From<bip39::Error> for MnemonicError {
    fn from(err: bip39::Error) -> Self {
        match err {
            bip39::Error::BadWordCount(count) => MnemonicError::BadWordCount(count),
            bip39::Error::UnknownWord(position) => MnemonicError::UnknownWord(position),
            bip39::Error::InvalidChecksum => MnemonicError::InvalidChecksum,
            other => MnemonicError::Other(other.to_string()),
        }
    }
}

/// A checksum-valid BIP-39 phrase. The phrase is wiped on drop and never
/// shows up in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureMnemonic {
    phrase: String,
}

impl fmt::Debug for SecureMnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureMnemonic")
            .field("word_count", &self.word_count())
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

impl SecureMnemonic {
    /// Generates a fresh phrase from the operating system's CSPRNG.
    pub fn generate(strength: MnemonicStrength) -> Result<Self, MnemonicError> {
        Self::generate_with_rng(&mut OsRng, strength)
    }

    pub fn generate_with_rng<R>(rng: &mut R, strength: MnemonicStrength) -> Result<Self, MnemonicError>
    where
        R: RngCore + CryptoRng,
    {
        let entropy_bytes = strength.entropy_bits() / 8;

        let mut entropy = Zeroizing::new([0u8; 32]);
        rng.try_fill_bytes(&mut entropy[..entropy_bytes])
            .map_err(|e| MnemonicError::EntropyUnavailable(e.to_string()))?;

        let mnemonic = Mnemonic::from_entropy(&entropy[..entropy_bytes])?;
        tracing::debug!(words = strength.word_count(), "generated mnemonic");

        Ok(Self {
            phrase: mnemonic.to_string(),
        })
    }

    /// Parses and checksum-validates a phrase. Surrounding and repeated
    /// whitespace is collapsed.
    pub fn from_phrase(phrase: &str) -> Result<Self, MnemonicError> {
        let normalized = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));
        let mnemonic = Mnemonic::parse(normalized.as_str())?;

        Ok(Self {
            phrase: mnemonic.to_string(),
        })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }

    /// BIP-39 seed for this phrase and the given passphrase.
    pub fn to_seed(&self, passphrase: &str) -> Zeroizing<[u8; 64]> {
        seed_from_phrase(&self.phrase, passphrase)
    }
}

/// Full BIP-39 check: word count, wordlist membership and checksum.
pub fn validate(phrase: &str) -> Result<(), MnemonicError> {
    SecureMnemonic::from_phrase(phrase).map(|_| ())
}

pub fn is_valid(phrase: &str) -> bool {
    validate(phrase).is_ok()
}

/// BIP-39 seed derivation without any wordlist or checksum check.
///
/// PBKDF2-HMAC-SHA512 over the NFKD form of `phrase`, salted with
/// `"mnemonic"` followed by the NFKD form of `passphrase`.
pub fn seed_from_phrase(phrase: &str, passphrase: &str) -> Zeroizing<[u8; 64]> {
    let mut password = Cow::Borrowed(phrase);
    Mnemonic::normalize_utf8_cow(&mut password);

    let mut salt_suffix = Cow::Borrowed(passphrase);
    Mnemonic::normalize_utf8_cow(&mut salt_suffix);

    let mut salt = Zeroizing::new(String::with_capacity(8 + salt_suffix.len()));
    salt.push_str("mnemonic");
    salt.push_str(&salt_suffix);

    let mut seed = Zeroizing::new([0u8; 64]);
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut *seed);

    if let Cow::Owned(mut owned) = password {
        owned.zeroize();
    }
    if let Cow::Owned(mut owned) = salt_suffix {
        owned.zeroize();
    }

    seed
}
