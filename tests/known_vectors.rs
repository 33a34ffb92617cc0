use multichain_keygen::encoding::{decode_ethereum_address, decode_ethereum_private_key, decode_solana_public_key, decode_solana_secret_key};
use multichain_keygen::{derive_wallet, Chain, SessionConfig, WalletError};

const ABANDON_ABOUT: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

#[test]
fn ethereum_account_zero() {
    let wallet = derive_wallet(ABANDON_ABOUT, Some(Chain::Ethereum), 0, &SessionConfig::default()).unwrap();

    assert_eq!(wallet.path(), "m/44'/60'/0'/0/0");
    assert_eq!(wallet.public_key(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    assert_eq!(
        wallet.private_key(),
        "0x1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
    );
    assert_eq!(wallet.mnemonic(), ABANDON_ABOUT);
}

#[test]
fn solana_account_zero() {
    let wallet = derive_wallet(ABANDON_ABOUT, Some(Chain::Solana), 0, &SessionConfig::default()).unwrap();

    assert_eq!(wallet.path(), "m/44'/501'/0'/0'");
    assert_eq!(wallet.public_key(), "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk");

    let secret = decode_solana_secret_key(wallet.private_key()).unwrap();
    let public = decode_solana_public_key(wallet.public_key()).unwrap();
    assert_eq!(&secret[32..], &public[..]);
}

#[test]
fn derivation_is_deterministic() {
    let config = SessionConfig::default();
    for chain in Chain::ALL {
        for index in [0, 1, 7, 1000] {
            let a = derive_wallet(ABANDON_ABOUT, Some(chain), index, &config).unwrap();
            let b = derive_wallet(ABANDON_ABOUT, Some(chain), index, &config).unwrap();
            assert_eq!(a, b);
        }
    }
}

#[test]
fn indices_and_passphrases_separate_accounts() {
    let config = SessionConfig::default();
    let with_passphrase = SessionConfig {
        passphrase: "TREZOR".into(),
        ..SessionConfig::default()
    };

    for chain in Chain::ALL {
        let zero = derive_wallet(ABANDON_ABOUT, Some(chain), 0, &config).unwrap();
        let one = derive_wallet(ABANDON_ABOUT, Some(chain), 1, &config).unwrap();
        let salted = derive_wallet(ABANDON_ABOUT, Some(chain), 0, &with_passphrase).unwrap();
        assert_ne!(zero.public_key(), one.public_key());
        assert_ne!(zero.public_key(), salted.public_key());
    }
}

#[test]
fn encodings_round_trip_to_raw_lengths() {
    let config = SessionConfig::default();

    let eth = derive_wallet(ABANDON_ABOUT, Some(Chain::Ethereum), 5, &config).unwrap();
    let address = decode_ethereum_address(eth.public_key()).unwrap();
    assert_eq!(format!("0x{}", hex::encode(address)), eth.public_key().to_lowercase());
    assert_eq!(eth.public_key().len(), 42);
    assert_eq!(eth.private_key().len(), 66);
    let private = decode_ethereum_private_key(eth.private_key()).unwrap();
    assert_eq!(format!("0x{}", hex::encode(&private[..])), eth.private_key());

    let sol = derive_wallet(ABANDON_ABOUT, Some(Chain::Solana), 5, &config).unwrap();
    let public = decode_solana_public_key(sol.public_key()).unwrap();
    assert_eq!(bs58::encode(public).into_string(), sol.public_key());
    let secret = decode_solana_secret_key(sol.private_key()).unwrap();
    assert_eq!(bs58::encode(&secret[..]).into_string(), sol.private_key());
}

#[test]
fn chain_outputs_are_not_interchangeable() {
    use multichain_keygen::encoding::{is_ethereum_address, is_solana_address};

    let config = SessionConfig::default();
    for index in 0..5 {
        let sol = derive_wallet(ABANDON_ABOUT, Some(Chain::Solana), index, &config).unwrap();
        let eth = derive_wallet(ABANDON_ABOUT, Some(Chain::Ethereum), index, &config).unwrap();

        assert!(is_solana_address(sol.public_key()));
        assert!(!is_ethereum_address(sol.public_key()));
        assert!(is_ethereum_address(eth.public_key()));
        assert!(!is_solana_address(eth.public_key()));
    }
}

#[test]
fn bad_checksum_is_rejected_in_strict_mode() {
    let bad = ABANDON_ABOUT.replace("about", "abandon");
    let err = derive_wallet(&bad, Some(Chain::Ethereum), 0, &SessionConfig::default()).unwrap_err();
    assert!(matches!(err, WalletError::InvalidMnemonic(_)));
}
