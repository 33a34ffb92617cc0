//! SLIP-0010 hierarchical derivation for ed25519.
//!
//! Same HMAC-SHA512 construction as BIP-32 but keyed with "ed25519 seed",
//! and only hardened children exist: there is no public parent derivation
//! on this curve, so a normal path component is an error, never silently
//! hardened.

use std::fmt;

use hmac::Mac;
use zeroize::Zeroizing;

use crate::derivation::{check_seed, split_hmac, ChildIndex, DerivationError, DerivationPath};

type HmacSha512 = hmac::Hmac<sha2::Sha512>;

const MASTER_SECRET: &[u8] = b"ed25519 seed";

#[derive(Clone)]
pub struct Ed25519ExtendedKey {
    key: Zeroizing<[u8; 32]>,
    chain_code: [u8; 32],
    depth: u8,
}

impl fmt::Debug for Ed25519ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519ExtendedKey")
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl Ed25519ExtendedKey {
    pub fn from_seed(seed: &[u8]) -> Result<Self, DerivationError> {
        check_seed(seed)?;

        let mut mac = HmacSha512::new_from_slice(MASTER_SECRET).map_err(|_| DerivationError::HmacError)?;
        mac.update(seed);
        let (key, chain_code) = split_hmac(mac);

        Ok(Self {
            key,
            chain_code,
            depth: 0,
        })
    }

    /// Data = 0x00 || parent key || ser32(index), keyed by the parent chain code.
    ///
    /// A non-hardened index is rejected. The ancestors are unknown here, so
    /// the reported path elides them: `m/1` from a master key, `m/.../1` below.
    pub fn derive_child(&self, index: ChildIndex) -> Result<Self, DerivationError> {
        if !index.is_hardened() {
            let path = if self.depth == 0 {
                format!("m/{}", index)
            } else {
                format!("m/.../{}", index)
            };
            return Err(DerivationError::NonHardenedEd25519 {
                path,
                component: index.value(),
            });
        }

        let mut mac =
            HmacSha512::new_from_slice(&self.chain_code).map_err(|_| DerivationError::HmacError)?;
        mac.update(&[0x00]);
        mac.update(&self.key[..]);
        mac.update(&index.raw().to_be_bytes());
        let (key, chain_code) = split_hmac(mac);

        Ok(Self {
            key,
            chain_code,
            depth: self.depth.saturating_add(1),
        })
    }

    /// Walks `path` from this key. The whole path is checked up front so a
    /// bad component is reported against the full path string.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, DerivationError> {
        if let Some(index) = path.indices().iter().find(|index| !index.is_hardened()) {
            return Err(DerivationError::NonHardenedEd25519 {
                path: path.to_string(),
                component: index.value(),
            });
        }

        path.indices()
            .iter()
            .try_fold(self.clone(), |key, &index| key.derive_child(index))
    }

    /// The 32-byte private key, used as an ed25519 signing key seed.
    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }
}
