use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::Sha512;
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha512 = Hmac<Sha512>;

pub const HARDENED_BIT: u32 = 0x8000_0000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("invalid derivation path '{0}'")]
    InvalidPath(String),

    #[error("invalid child number '{0}'")]
    InvalidChildNumber(String),

    #[error("non-hardened component {component} in '{path}' is not derivable on ed25519")]
    NonHardenedEd25519 { path: String, component: u32 },

    #[error("seed must be between 16 and 64 bytes, got {0}")]
    InvalidSeedLength(usize),

    #[error("HMAC operation failed")]
    HmacError,

    #[error("secp256k1 operation failed: {0}")]
    Secp256k1Error(String),
}

impl From<secp256k1::Error> for DerivationError {
    fn from(err: secp256k1::Error) -> Self {
        DerivationError::Secp256k1Error(err.to_string())
    }
}

/// One level of a BIP-32 path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildIndex(u32);

impl ChildIndex {
    pub fn normal(index: u32) -> Result<Self, DerivationError> {
        if index & HARDENED_BIT != 0 {
            return Err(DerivationError::InvalidChildNumber(index.to_string()));
        }
        Ok(ChildIndex(index))
    }

    pub fn hardened(index: u32) -> Result<Self, DerivationError> {
        if index & HARDENED_BIT != 0 {
            return Err(DerivationError::InvalidChildNumber(format!("{}'", index)));
        }
        Ok(ChildIndex(index | HARDENED_BIT))
    }

    pub fn is_hardened(&self) -> bool {
        self.0 & HARDENED_BIT != 0
    }

    /// Index without the hardened bit.
    pub fn value(&self) -> u32 {
        self.0 & !HARDENED_BIT
    }

    /// Index as serialized into the HMAC input.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.value())
        } else {
            write!(f, "{}", self.value())
        }
    }
}

/// Represents a BIP32 derivation path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    indices: Vec<ChildIndex>,
}

impl DerivationPath {
    pub fn new(indices: Vec<ChildIndex>) -> Self {
        DerivationPath { indices }
    }

    pub fn indices(&self) -> &[ChildIndex] {
        &self.indices
    }

    pub fn is_fully_hardened(&self) -> bool {
        self.indices.iter().all(ChildIndex::is_hardened)
    }
}

impl FromStr for DerivationPath {
    type Err = DerivationError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let mut components = path.trim().split('/');
        if components.next() != Some("m") {
            return Err(DerivationError::InvalidPath(path.to_string()));
        }

        let indices = components
            .map(|component| {
                let hardened = component.ends_with('\'') || component.ends_with('h');
                let digits = if hardened {
                    &component[..component.len() - 1]
                } else {
                    component
                };

                // u32::parse accepts a leading '+', BIP-32 paths do not
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DerivationError::InvalidChildNumber(component.to_string()));
                }
                let index = digits
                    .parse::<u32>()
                    .map_err(|_| DerivationError::InvalidChildNumber(component.to_string()))?;

                if hardened {
                    ChildIndex::hardened(index)
                } else {
                    ChildIndex::normal(index)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DerivationPath { indices })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for index in &self.indices {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

/// Splits an HMAC-SHA512 output into key material and chain code.
pub(crate) fn split_hmac(mac: HmacSha512) -> (Zeroizing<[u8; 32]>, [u8; 32]) {
    let mut result = Zeroizing::new([0u8; 64]);
    result.copy_from_slice(&mac.finalize().into_bytes());

    let mut left = Zeroizing::new([0u8; 32]);
    let mut chain_code = [0u8; 32];
    left.copy_from_slice(&result[..32]);
    chain_code.copy_from_slice(&result[32..]);

    (left, chain_code)
}

pub(crate) fn check_seed(seed: &[u8]) -> Result<(), DerivationError> {
    if !(16..=64).contains(&seed.len()) {
        return Err(DerivationError::InvalidSeedLength(seed.len()));
    }
    Ok(())
}

/// A BIP-32 extended private key on secp256k1.
#[derive(Clone)]
pub struct ExtendedKey {
    pub private_key: SecretKey,
    pub public_key: PublicKey,
    pub chain_code: [u8; 32],
    pub depth: u8,
    pub child_number: u32,
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("public_key", &self.public_key)
            .field("depth", &self.depth)
            .field("child_number", &self.child_number)
            .finish_non_exhaustive()
    }
}

impl ExtendedKey {
    /// Creates a new master key from a seed
    pub fn from_seed(seed: &[u8]) -> Result<Self, DerivationError> {
        check_seed(seed)?;
        let secp = Secp256k1::new();

        let mut hmac =
            HmacSha512::new_from_slice(b"Bitcoin seed").map_err(|_| DerivationError::HmacError)?;
        hmac.update(seed);
        let (left, chain_code) = split_hmac(hmac);

        let private_key = SecretKey::from_slice(&left[..])?;
        let public_key = PublicKey::from_secret_key(&secp, &private_key);

        Ok(ExtendedKey {
            private_key,
            public_key,
            chain_code,
            depth: 0,
            child_number: 0,
        })
    }

    /// Derives a child key based on the provided index
    pub fn derive_child(&self, index: ChildIndex) -> Result<Self, DerivationError> {
        let secp = Secp256k1::new();

        let mut hmac =
            HmacSha512::new_from_slice(&self.chain_code).map_err(|_| DerivationError::HmacError)?;

        if index.is_hardened() {
            let parent = Zeroizing::new(self.private_key.secret_bytes());
            hmac.update(&[0]);
            hmac.update(&parent[..]);
        } else {
            hmac.update(&self.public_key.serialize());
        }
        hmac.update(&index.raw().to_be_bytes());

        let (left, chain_code) = split_hmac(hmac);

        // IL >= n or a zero child key invalidates this index (BIP-32)
        let tweak = SecretKey::from_slice(&left[..])?;
        let private_key = self.private_key.add_tweak(&Scalar::from(tweak))?;
        let public_key = PublicKey::from_secret_key(&secp, &private_key);

        Ok(ExtendedKey {
            private_key,
            public_key,
            chain_code,
            depth: self.depth.saturating_add(1),
            child_number: index.raw(),
        })
    }

    /// Derives a key following this path
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, DerivationError> {
        path.indices()
            .iter()
            .try_fold(self.clone(), |key, &index| key.derive_child(index))
    }

    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.private_key.secret_bytes())
    }
}

/// BIP-44 path builders for the supported chains
pub mod paths {
    use super::{ChildIndex, DerivationError, DerivationPath};

    /// SLIP-44 coin type for Solana
    pub const SOLANA: u32 = 501;

    /// SLIP-44 coin type for Ethereum
    pub const ETHEREUM: u32 = 60;

    /// `m/44'/501'/0'/{account}'`, hardened at every level for SLIP-0010.
    pub fn solana(account: u32) -> Result<DerivationPath, DerivationError> {
        Ok(DerivationPath::new(vec![
            ChildIndex::hardened(44)?,
            ChildIndex::hardened(SOLANA)?,
            ChildIndex::hardened(0)?,
            ChildIndex::hardened(account)?,
        ]))
    }

    /// `m/44'/60'/0'/0/{index}`, the external chain of the first account.
    pub fn ethereum(index: u32) -> Result<DerivationPath, DerivationError> {
        Ok(DerivationPath::new(vec![
            ChildIndex::hardened(44)?,
            ChildIndex::hardened(ETHEREUM)?,
            ChildIndex::hardened(0)?,
            ChildIndex::normal(0)?,
            ChildIndex::normal(index)?,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR_1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    #[test]
    fn parses_and_renders_paths() {
        let path: DerivationPath = "m/44'/60'/0'/0/7".parse().unwrap();
        assert_eq!(path.indices().len(), 5);
        assert!(path.indices()[2].is_hardened());
        assert!(!path.indices()[4].is_hardened());
        assert_eq!(path.indices()[4].value(), 7);
        assert_eq!(path.to_string(), "m/44'/60'/0'/0/7");

        let h_marked: DerivationPath = "m/44h/501h/0h/0h".parse().unwrap();
        assert_eq!(h_marked.to_string(), "m/44'/501'/0'/0'");
        assert!(h_marked.is_fully_hardened());

        let root: DerivationPath = "m".parse().unwrap();
        assert!(root.indices().is_empty());
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "44'/60'", "n/0", "m/", "m/x", "m/1//2", "m/+1", "m/2147483648", "m/2147483648'"] {
            assert!(bad.parse::<DerivationPath>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn bip32_vector_1() {
        let seed = hex::decode(VECTOR_1_SEED).unwrap();
        let master = ExtendedKey::from_seed(&seed).unwrap();
        assert_eq!(
            hex::encode(*master.secret_bytes()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(master.chain_code),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );

        let child = master.derive_path(&"m/0'".parse().unwrap()).unwrap();
        assert_eq!(
            hex::encode(*child.secret_bytes()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(child.depth, 1);
        assert_eq!(child.child_number, HARDENED_BIT);
    }

    #[test]
    fn normal_and_hardened_children_differ() {
        let seed = hex::decode(VECTOR_1_SEED).unwrap();
        let master = ExtendedKey::from_seed(&seed).unwrap();
        let normal = master.derive_child(ChildIndex::normal(0).unwrap()).unwrap();
        let hardened = master.derive_child(ChildIndex::hardened(0).unwrap()).unwrap();
        assert_ne!(*normal.secret_bytes(), *hardened.secret_bytes());
    }

    #[test]
    fn rejects_short_seed() {
        assert_eq!(
            ExtendedKey::from_seed(&[0u8; 8]).unwrap_err(),
            DerivationError::InvalidSeedLength(8)
        );
    }

    #[test]
    fn chain_paths() {
        assert_eq!(paths::solana(3).unwrap().to_string(), "m/44'/501'/0'/3'");
        assert_eq!(paths::ethereum(3).unwrap().to_string(), "m/44'/60'/0'/0/3");
        assert!(paths::solana(HARDENED_BIT).is_err());
        assert!(paths::ethereum(HARDENED_BIT).is_err());
    }
}
