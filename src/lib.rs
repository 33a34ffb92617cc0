//! Deterministic Solana and Ethereum keypairs from one BIP-39 mnemonic.
//!
//! mnemonic → seed → per-chain BIP-44 path → SLIP-0010 (ed25519) or
//! BIP-32 (secp256k1) child key → chain keypair → base58 / `0x` hex.

pub mod chain;
pub mod config;
pub mod derivation;
pub mod encoding;
pub mod error;
pub mod keys;
pub mod mnemonic;
pub mod slip10;
pub mod wallet;

pub use chain::Chain;
pub use config::SessionConfig;
pub use derivation::{ChildIndex, DerivationError, DerivationPath, ExtendedKey};
pub use encoding::{EncodedKeys, EncodingError};
pub use error::{Result, WalletError};
pub use keys::{EthereumKeypair, RawKeyMaterial, SolanaKeypair};
pub use mnemonic::{MnemonicError, MnemonicStrength, SecureMnemonic};
pub use slip10::Ed25519ExtendedKey;
pub use wallet::{derive_wallet, SharedSession, WalletRecord, WalletSession};

/// Fresh 12-word mnemonic from the operating system's CSPRNG.
pub fn generate_mnemonic() -> Result<SecureMnemonic> {
    Ok(SecureMnemonic::generate(MnemonicStrength::Words12)?)
}
