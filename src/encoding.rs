//! Textual forms of derived keys: base58 for Solana, `0x` hex for Ethereum.

use sha3::{Digest, Keccak256};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::keys::RawKeyMaterial;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("invalid base58: {0}")]
    Base58(String),

    #[error("invalid hex: {0}")]
    Hex(String),

    #[error("missing 0x prefix")]
    MissingPrefix,

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("EIP-55 checksum mismatch")]
    Checksum,
}

/// Rendered key pair. `private_key` is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedKeys {
    pub public_key: String,
    pub private_key: Zeroizing<String>,
}

impl std::fmt::Debug for EncodedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedKeys")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

pub fn encode(material: &RawKeyMaterial) -> EncodedKeys {
    match material {
        RawKeyMaterial::Solana(keypair) => EncodedKeys {
            public_key: bs58::encode(keypair.public_key()).into_string(),
            private_key: Zeroizing::new(bs58::encode(&keypair.keypair_bytes()[..]).into_string()),
        },
        RawKeyMaterial::Ethereum(keypair) => EncodedKeys {
            public_key: to_checksum_address(&keypair.address()),
            private_key: Zeroizing::new(format!("0x{}", hex::encode(&keypair.private_key()[..]))),
        },
    }
}

/// EIP-55 mixed-case rendering of a 20-byte address.
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> if i % 2 == 0 { 4 } else { 0 }) & 0x0f;
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn decode_base58<const N: usize>(text: &str) -> Result<[u8; N], EncodingError> {
    let bytes = Zeroizing::new(
        bs58::decode(text)
            .into_vec()
            .map_err(|e| EncodingError::Base58(e.to_string()))?,
    );
    fixed(&bytes)
}

fn decode_prefixed_hex<const N: usize>(text: &str) -> Result<[u8; N], EncodingError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or(EncodingError::MissingPrefix)?;
    let bytes = Zeroizing::new(hex::decode(digits).map_err(|e| EncodingError::Hex(e.to_string()))?);
    fixed(&bytes)
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], EncodingError> {
    bytes.try_into().map_err(|_| EncodingError::Length {
        expected: N,
        actual: bytes.len(),
    })
}

pub fn decode_solana_public_key(text: &str) -> Result<[u8; 32], EncodingError> {
    decode_base58(text)
}

pub fn decode_solana_secret_key(text: &str) -> Result<Zeroizing<[u8; 64]>, EncodingError> {
    decode_base58(text).map(Zeroizing::new)
}

/// Accepts all-lowercase, all-uppercase or EIP-55 checksummed input;
/// mixed case must carry a valid checksum.
pub fn decode_ethereum_address(text: &str) -> Result<[u8; 20], EncodingError> {
    let address: [u8; 20] = decode_prefixed_hex(text)?;

    let digits = &text[2..];
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum_address(&address)[2..] != *digits {
        return Err(EncodingError::Checksum);
    }

    Ok(address)
}

pub fn decode_ethereum_private_key(text: &str) -> Result<Zeroizing<[u8; 32]>, EncodingError> {
    decode_prefixed_hex(text).map(Zeroizing::new)
}

pub fn is_ethereum_address(text: &str) -> bool {
    decode_ethereum_address(text).is_ok()
}

/// A Solana address is any base58 string carrying exactly 32 bytes.
pub fn is_solana_address(text: &str) -> bool {
    decode_solana_public_key(text).is_ok()
}
