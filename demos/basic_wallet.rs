use multichain_keygen::{Chain, SessionConfig, WalletSession};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Multi-chain Wallet Generator Demo");
    println!("=================================");

    let config = match std::env::args().nth(1) {
        Some(path) => SessionConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SessionConfig::default(),
    };
    let mut session = WalletSession::new(config);

    let phrase = session.generate_mnemonic()?.to_string();
    println!("\n⚠️  IMPORTANT: Write down your mnemonic phrase and store it securely!");
    println!("Mnemonic: {}", phrase);

    for chain in [Chain::Solana, Chain::Ethereum, Chain::Solana] {
        session.select_chain(chain);
        let wallet = session.derive_next()?;

        println!("\n{} Account #{}", chain, wallet.account_index());
        println!("Path:        {}", wallet.path());
        println!("Public Key:  {}", wallet.public_key());
        println!("Private Key: {}", wallet.private_key());
    }

    println!("\nNext account index: {}", session.account_index());
    Ok(())
}
