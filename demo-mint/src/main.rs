use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passkey_mint::{
    MintSettings, PasskeyStore, SoftwareAuthenticator, create_passkey, get_mint_receipt, mint_nft,
};

mod keystore;

/// Mint NFTs from a passkey-owned Safe
#[derive(Parser)]
#[command(name = "demo-mint")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// File holding the software authenticator's private keys
    #[arg(long, env = "DEMO_KEYSTORE", default_value = "keystore.json", global = true)]
    keystore: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a passkey and store it
    Create,

    /// List stored passkeys
    List,

    /// Show a stored passkey as JSON
    Show {
        /// Credential raw id (hex)
        raw_id: String,
    },

    /// Mint an NFT to a Safe, signed with a stored passkey
    Mint {
        /// Credential raw id (hex)
        raw_id: String,
        /// Address that receives the NFT
        safe_address: Address,
    },

    /// Look up the receipt of a submitted user operation
    Receipt {
        /// User operation hash
        user_operation_hash: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,passkey_mint=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    passkey_mint::init().await?;

    match cli.command {
        Commands::Create => {
            let authenticator = SoftwareAuthenticator::from_env();
            keystore::load(&authenticator, &cli.keystore).await?;

            let passkey = create_passkey(&authenticator).await?;
            PasskeyStore::store_passkey(passkey.clone()).await?;
            keystore::save(&authenticator, &cli.keystore).await?;

            tracing::info!("Created passkey {}", passkey.raw_id);
            println!("{}", serde_json::to_string_pretty(&passkey)?);
        }
        Commands::List => {
            let passkeys = PasskeyStore::load_passkeys().await?;
            if passkeys.is_empty() {
                println!("No passkeys stored");
            }
            for passkey in passkeys {
                println!(
                    "{}  x={} y={}",
                    passkey.raw_id, passkey.coordinates.x, passkey.coordinates.y
                );
            }
        }
        Commands::Show { raw_id } => {
            let passkey = PasskeyStore::get_passkey_from_raw_id(&raw_id).await?;
            println!("{}", serde_json::to_string_pretty(&passkey)?);
        }
        Commands::Mint {
            raw_id,
            safe_address,
        } => {
            let authenticator = Arc::new(SoftwareAuthenticator::from_env());
            keystore::load(&authenticator, &cli.keystore).await?;

            let passkey = PasskeyStore::get_passkey_from_raw_id(&raw_id).await?;
            let user_operation_hash = mint_nft(authenticator.clone(), passkey, safe_address).await?;

            // The signature counter moved on
            keystore::save(&authenticator, &cli.keystore).await?;
            println!("{user_operation_hash}");
        }
        Commands::Receipt {
            user_operation_hash,
        } => {
            let settings = MintSettings::from_env();
            match get_mint_receipt(&settings, &user_operation_hash).await? {
                Some(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
                None => println!("User operation {user_operation_hash} is still pending"),
            }
        }
    }

    Ok(())
}
