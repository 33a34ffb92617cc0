use std::fmt;

use ed25519_dalek::SigningKey;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroizing;

use crate::derivation::{DerivationError, DerivationPath, ExtendedKey};
use crate::slip10::Ed25519ExtendedKey;

/// Solana account keypair: an ed25519 signing key expanded from a
/// SLIP-0010 child key.
pub struct SolanaKeypair {
    signing_key: SigningKey,
}

impl SolanaKeypair {
    pub fn from_seed(seed: &[u8], path: &DerivationPath) -> Result<Self, DerivationError> {
        let child = Ed25519ExtendedKey::from_seed(seed)?.derive_path(path)?;
        Ok(Self::from_secret(child.key()))
    }

    pub fn from_secret(secret: &[u8; 32]) -> Self {
        SolanaKeypair {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// secret || public, the 64-byte keypair layout Solana tooling expects.
    pub fn keypair_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }
}

impl fmt::Debug for SolanaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaKeypair")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

/// Ethereum account keypair derived with BIP-32 on secp256k1.
pub struct EthereumKeypair {
    private_key: SecretKey,
    public_key: PublicKey,
}

impl EthereumKeypair {
    pub fn from_seed(seed: &[u8], path: &DerivationPath) -> Result<Self, DerivationError> {
        let child = ExtendedKey::from_seed(seed)?.derive_path(path)?;
        Ok(EthereumKeypair {
            private_key: child.private_key,
            public_key: child.public_key,
        })
    }

    pub fn from_secret(secret: &[u8; 32]) -> Result<Self, DerivationError> {
        let secp = Secp256k1::new();
        let private_key = SecretKey::from_slice(secret)?;
        let public_key = PublicKey::from_secret_key(&secp, &private_key);
        Ok(EthereumKeypair {
            private_key,
            public_key,
        })
    }

    pub fn private_key(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.private_key.secret_bytes())
    }

    /// 0x04 || X || Y
    pub fn uncompressed_public_key(&self) -> [u8; 65] {
        self.public_key.serialize_uncompressed()
    }

    /// Last 20 bytes of Keccak-256 over the public key without its prefix.
    pub fn address(&self) -> [u8; 20] {
        let key_bytes = self.uncompressed_public_key();
        let hash = Keccak256::digest(&key_bytes[1..]);

        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        address
    }
}

impl fmt::Debug for EthereumKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthereumKeypair")
            .field("address", &hex::encode(self.address()))
            .finish_non_exhaustive()
    }
}

/// Chain-native key material produced by a derivation.
#[derive(Debug)]
pub enum RawKeyMaterial {
    Solana(SolanaKeypair),
    Ethereum(EthereumKeypair),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::paths;
    use crate::mnemonic::seed_from_phrase;

    const ABANDON_ABOUT: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn ethereum_known_account() {
        let seed = seed_from_phrase(ABANDON_ABOUT, "");
        let keypair = EthereumKeypair::from_seed(&seed[..], &paths::ethereum(0).unwrap()).unwrap();
        assert_eq!(
            hex::encode(*keypair.private_key()),
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
        assert_eq!(
            hex::encode(keypair.address()),
            "9858effd232b4033e47d90003d41ec34ecaeda94"
        );
        assert_eq!(keypair.uncompressed_public_key()[0], 0x04);
    }

    #[test]
    fn ethereum_from_secret_matches_derived() {
        let seed = seed_from_phrase(ABANDON_ABOUT, "");
        let derived = EthereumKeypair::from_seed(&seed[..], &paths::ethereum(1).unwrap()).unwrap();
        let rebuilt = EthereumKeypair::from_secret(&derived.private_key()).unwrap();
        assert_eq!(derived.address(), rebuilt.address());
    }

    #[test]
    fn ethereum_rejects_zero_scalar() {
        assert!(EthereumKeypair::from_secret(&[0u8; 32]).is_err());
    }

    #[test]
    fn solana_keypair_layout() {
        let seed = seed_from_phrase(ABANDON_ABOUT, "");
        let keypair = SolanaKeypair::from_seed(&seed[..], &paths::solana(0).unwrap()).unwrap();
        let bytes = keypair.keypair_bytes();
        assert_eq!(&bytes[32..], &keypair.public_key()[..]);

        let mut secret = [0u8; 32];
        secret.copy_from_slice(&bytes[..32]);
        assert_eq!(SolanaKeypair::from_secret(&secret).public_key(), keypair.public_key());
    }

    #[test]
    fn solana_rejects_ethereum_style_path() {
        let seed = seed_from_phrase(ABANDON_ABOUT, "");
        let err = SolanaKeypair::from_seed(&seed[..], &paths::ethereum(0).unwrap()).unwrap_err();
        assert!(matches!(err, DerivationError::NonHardenedEd25519 { .. }));
    }

    #[test]
    fn debug_hides_secrets() {
        let seed = seed_from_phrase(ABANDON_ABOUT, "");
        let keypair = EthereumKeypair::from_seed(&seed[..], &paths::ethereum(0).unwrap()).unwrap();
        let debug = format!("{:?}", keypair);
        assert!(!debug.contains("1ab42cc4"));
    }
}
