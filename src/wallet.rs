use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bip39::Mnemonic;
use serde::Serialize;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::chain::Chain;
use crate::config::SessionConfig;
use crate::encoding::encode;
use crate::error::{Result, WalletError};
use crate::mnemonic::{seed_from_phrase, SecureMnemonic};

/// One derived account. Never modified after creation; secrets are wiped
/// on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    public_key: String,
    private_key: String,
    mnemonic: String,
    path: String,
    #[zeroize(skip)]
    chain: Chain,
    account_index: u32,
}

impl WalletRecord {
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn account_index(&self) -> u32 {
        self.account_index
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("chain", &self.chain)
            .field("path", &self.path)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .field("mnemonic", &"[REDACTED]")
            .finish()
    }
}

/// Derives the wallet at `account_index` for `chain` from `mnemonic`.
///
/// Pure: identical inputs always give identical keys, and nothing outside
/// the returned record is touched.
pub fn derive_wallet(
    mnemonic: &str,
    chain: Option<Chain>,
    account_index: u32,
    config: &SessionConfig,
) -> Result<WalletRecord> {
    if mnemonic.trim().is_empty() {
        return Err(WalletError::NoMnemonic);
    }
    let chain = chain.ok_or(WalletError::NoChainSelected)?;

    let (phrase, seed) = if config.strict_mnemonic {
        let parsed = SecureMnemonic::from_phrase(mnemonic)?;
        let seed = parsed.to_seed(&config.passphrase);
        (Zeroizing::new(parsed.phrase().to_string()), seed)
    } else {
        let seed = seed_from_phrase(mnemonic, &config.passphrase);
        (Zeroizing::new(mnemonic.to_string()), seed)
    };

    let path = chain.build_path(account_index)?;
    let material = chain.derive(&seed[..], &path)?;
    let encoded = encode(&material);

    Ok(WalletRecord {
        public_key: encoded.public_key.clone(),
        private_key: encoded.private_key.to_string(),
        mnemonic: phrase.to_string(),
        path: path.to_string(),
        chain,
        account_index,
    })
}

/// State of one generation session: the current mnemonic, the selected
/// chain, the next account index and every wallet produced so far.
///
/// The account index counts derivations from the current mnemonic across
/// all chains, so (chain, index) pairs never repeat for a mnemonic. Each
/// mnemonic keeps its own counter for the life of the session, so
/// switching away from a phrase and back resumes where it left off.
pub struct WalletSession {
    config: SessionConfig,
    mnemonic: Option<Zeroizing<String>>,
    chain: Option<Chain>,
    account_index: u32,
    // next index per mnemonic, keyed by SHA-256 of the NFKD phrase
    next_index: HashMap<[u8; 32], u32>,
    wallets: Vec<WalletRecord>,
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("config", &self.config)
            .field("has_mnemonic", &self.mnemonic.is_some())
            .field("chain", &self.chain)
            .field("account_index", &self.account_index)
            .field("known_mnemonics", &self.next_index.len())
            .field("wallets", &self.wallets.len())
            .finish()
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl WalletSession {
    pub fn new(config: SessionConfig) -> Self {
        WalletSession {
            config,
            mnemonic: None,
            chain: None,
            account_index: 0,
            next_index: HashMap::new(),
            wallets: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replaces the current mnemonic with a fresh one; its account index
    /// starts at 0. Previously derived wallets are kept.
    pub fn generate_mnemonic(&mut self) -> Result<&str> {
        let generated = SecureMnemonic::generate(self.config.word_count)?;
        self.replace_mnemonic(Zeroizing::new(generated.phrase().to_string()));
        Ok(self.mnemonic().unwrap_or_default())
    }

    /// Uses an existing phrase. The account index becomes the next unused
    /// index for that phrase: 0 the first time it is seen in this session.
    pub fn set_mnemonic(&mut self, phrase: &str) -> Result<()> {
        if phrase.trim().is_empty() {
            return Err(WalletError::NoMnemonic);
        }

        let phrase = if self.config.strict_mnemonic {
            let parsed = SecureMnemonic::from_phrase(phrase).map_err(|e| {
                tracing::warn!(error = %e, "rejected mnemonic");
                WalletError::from(e)
            })?;
            Zeroizing::new(parsed.phrase().to_string())
        } else {
            Zeroizing::new(phrase.to_string())
        };

        self.replace_mnemonic(phrase);
        Ok(())
    }

    fn replace_mnemonic(&mut self, phrase: Zeroizing<String>) {
        if let Some(current) = self.mnemonic() {
            let key = phrase_key(current);
            self.next_index.insert(key, self.account_index);
        }
        self.account_index = self.next_index.get(&phrase_key(&phrase)).copied().unwrap_or(0);
        self.mnemonic = Some(phrase);
    }

    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref().map(String::as_str)
    }

    /// Changes the target chain; mnemonic and account index are untouched.
    pub fn select_chain(&mut self, chain: Chain) {
        self.chain = Some(chain);
    }

    pub fn select_chain_by_name(&mut self, name: &str) -> Result<Chain> {
        let chain = name.parse::<Chain>()?;
        self.select_chain(chain);
        Ok(chain)
    }

    pub fn selected_chain(&self) -> Option<Chain> {
        self.chain
    }

    /// The index the next derivation will use.
    pub fn account_index(&self) -> u32 {
        self.account_index
    }

    pub fn wallets(&self) -> &[WalletRecord] {
        &self.wallets
    }

    /// Derives the next wallet on the selected chain.
    pub fn derive_next(&mut self) -> Result<&WalletRecord> {
        self.derive_with(self.chain)
    }

    /// Derives the next wallet on the named chain without changing the
    /// selection.
    pub fn derive_next_for(&mut self, chain_name: &str) -> Result<&WalletRecord> {
        let chain = chain_name.parse::<Chain>().map_err(|e| {
            tracing::warn!(chain = chain_name, "unsupported chain requested");
            e
        })?;
        self.derive_with(Some(chain))
    }

    // Either both the append and the increment happen or neither does.
    fn derive_with(&mut self, chain: Option<Chain>) -> Result<&WalletRecord> {
        let phrase = self.mnemonic.as_deref().map(String::as_str).unwrap_or_default();

        let record = derive_wallet(phrase, chain, self.account_index, &self.config).map_err(|e| {
            tracing::warn!(error = %e, account_index = self.account_index, "wallet derivation failed");
            e
        })?;

        tracing::info!(
            chain = %record.chain(),
            path = record.path(),
            account_index = record.account_index(),
            "derived wallet"
        );

        self.wallets.push(record);
        self.account_index += 1;
        Ok(&self.wallets[self.wallets.len() - 1])
    }

    /// The wallet list as the JSON array handed to the presentation layer.
    /// Contains private keys.
    pub fn wallets_to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.wallets)?)
    }
}

// Phrases that stretch to the same seed share a counter.
fn phrase_key(phrase: &str) -> [u8; 32] {
    let mut normalized = Cow::Borrowed(phrase);
    Mnemonic::normalize_utf8_cow(&mut normalized);
    let mut key = [0u8; 32];
    key.copy_from_slice(&Sha256::digest(normalized.as_bytes()));
    if let Cow::Owned(text) = &mut normalized {
        text.zeroize();
    }
    key
}

/// A [`WalletSession`] that can be driven from several threads. Each call
/// holds the lock across derive, append and increment.
#[derive(Debug, Default)]
pub struct SharedSession {
    inner: Mutex<WalletSession>,
}

impl SharedSession {
    pub fn new(config: SessionConfig) -> Self {
        SharedSession {
            inner: Mutex::new(WalletSession::new(config)),
        }
    }

    // A panicking holder can only have panicked before the append, so the
    // state behind a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, WalletSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn generate_mnemonic(&self) -> Result<Zeroizing<String>> {
        let mut session = self.lock();
        session.generate_mnemonic().map(|phrase| Zeroizing::new(phrase.to_string()))
    }

    pub fn set_mnemonic(&self, phrase: &str) -> Result<()> {
        self.lock().set_mnemonic(phrase)
    }

    pub fn select_chain(&self, chain: Chain) {
        self.lock().select_chain(chain)
    }

    pub fn derive_next(&self) -> Result<WalletRecord> {
        self.lock().derive_next().cloned()
    }

    pub fn derive_next_for(&self, chain_name: &str) -> Result<WalletRecord> {
        self.lock().derive_next_for(chain_name).cloned()
    }

    pub fn account_index(&self) -> u32 {
        self.lock().account_index()
    }

    pub fn wallets(&self) -> Vec<WalletRecord> {
        self.lock().wallets().to_vec()
    }
}
