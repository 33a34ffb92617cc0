use thiserror::Error;

use crate::derivation::DerivationError;
use crate::mnemonic::MnemonicError;

pub type Result<T> = std::result::Result<T, WalletError>;

/// Every failure the derivation core reports to its caller. None of them
/// leave a session modified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("secure random source unavailable: {0}")]
    EntropySourceUnavailable(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(MnemonicError),

    #[error("no mnemonic set")]
    NoMnemonic,

    #[error("no chain selected")]
    NoChainSelected,

    #[error("unsupported chain '{0}'")]
    UnsupportedChain(String),

    #[error("unsupported derivation path {0}: ed25519 requires hardened components")]
    UnsupportedDerivation(String),

    #[error("derivation failed: {0}")]
    DerivationFailed(#[source] DerivationError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<MnemonicError> for WalletError {
    fn from(err: MnemonicError) -> Self {
        match err {
            MnemonicError::EntropyUnavailable(reason) => WalletError::EntropySourceUnavailable(reason),
            other => WalletError::InvalidMnemonic(other),
        }
    }
}

impl From<DerivationError> for WalletError {
    fn from(err: DerivationError) -> Self {
        match err {
            DerivationError::NonHardenedEd25519 { path, .. } => WalletError::UnsupportedDerivation(path),
            other => WalletError::DerivationFailed(other),
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Config(err.to_string())
    }
}
