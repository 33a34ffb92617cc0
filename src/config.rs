use serde::Deserialize;

use crate::error::Result;
use crate::mnemonic::MnemonicStrength;

/// Per-session settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Size of freshly generated mnemonics.
    pub word_count: MnemonicStrength,
    /// Optional BIP-39 passphrase ("25th word").
    pub passphrase: String,
    /// Reject phrases that fail the BIP-39 wordlist/checksum check. When
    /// off, any non-empty phrase is stretched into a seed as-is.
    pub strict_mnemonic: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            word_count: MnemonicStrength::Words12,
            passphrase: String::new(),
            strict_mnemonic: true,
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("word_count", &self.word_count)
            .field("passphrase", &if self.passphrase.is_empty() { "" } else { "[REDACTED]" })
            .field("strict_mnemonic", &self.strict_mnemonic)
            .finish()
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
