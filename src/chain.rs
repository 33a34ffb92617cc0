use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::derivation::{paths, DerivationError, DerivationPath};
use crate::error::WalletError;
use crate::keys::{EthereumKeypair, RawKeyMaterial, SolanaKeypair};

/// Supported chains. Each variant fixes its curve, derivation scheme and
/// path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Solana,
    Ethereum,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::Solana, Chain::Ethereum];

    pub fn coin_type(&self) -> u32 {
        match self {
            Chain::Solana => paths::SOLANA,
            Chain::Ethereum => paths::ETHEREUM,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Chain::Solana => "solana",
            Chain::Ethereum => "ethereum",
        }
    }

    /// Solana: `m/44'/501'/0'/{i}'`. Ethereum: `m/44'/60'/0'/0/{i}`.
    pub fn build_path(&self, account_index: u32) -> Result<DerivationPath, DerivationError> {
        match self {
            Chain::Solana => paths::solana(account_index),
            Chain::Ethereum => paths::ethereum(account_index),
        }
    }

    /// Derives chain-native key material; pure in (seed, path).
    pub fn derive(&self, seed: &[u8], path: &DerivationPath) -> Result<RawKeyMaterial, DerivationError> {
        tracing::debug!(chain = self.name(), %path, "deriving keypair");
        match self {
            Chain::Solana => SolanaKeypair::from_seed(seed, path).map(RawKeyMaterial::Solana),
            Chain::Ethereum => EthereumKeypair::from_seed(seed, path).map(RawKeyMaterial::Ethereum),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chain {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solana" | "sol" => Ok(Chain::Solana),
            "ethereum" | "eth" => Ok(Chain::Ethereum),
            _ => Err(WalletError::UnsupportedChain(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_standard_paths() {
        assert_eq!(Chain::Solana.build_path(3).unwrap().to_string(), "m/44'/501'/0'/3'");
        assert_eq!(Chain::Ethereum.build_path(3).unwrap().to_string(), "m/44'/60'/0'/0/3");
        assert_eq!(Chain::Solana.build_path(0).unwrap().to_string(), "m/44'/501'/0'/0'");
        assert_eq!(Chain::Ethereum.build_path(0).unwrap().to_string(), "m/44'/60'/0'/0/0");
    }

    #[test]
    fn coin_types() {
        assert_eq!(Chain::Solana.coin_type(), 501);
        assert_eq!(Chain::Ethereum.coin_type(), 60);
    }

    #[test]
    fn parses_names() {
        assert_eq!("Solana".parse::<Chain>().unwrap(), Chain::Solana);
        assert_eq!(" ETH ".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert_eq!(
            "bitcoin".parse::<Chain>().unwrap_err(),
            WalletError::UnsupportedChain("bitcoin".to_string())
        );
        for chain in Chain::ALL {
            assert_eq!(chain.to_string().parse::<Chain>().unwrap(), chain);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Chain::Ethereum).unwrap(), "\"ethereum\"");
        assert_eq!(serde_json::from_str::<Chain>("\"solana\"").unwrap(), Chain::Solana);
    }
}
