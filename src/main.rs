use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use bcos_signer::signing::verify_signed_transaction;
use bcos_signer::utils::{decode_hex_payload, logging, SignerConfig};
use bcos_signer::wallet::{KeyMaterial, PrivateKey};
use bcos_signer::{crypto, log_debug, ApiResponse, SignerError, SigningContext};

#[derive(Parser)]
#[command(name = "bcos-signer")]
#[command(about = "Build and sign FISCO BCOS transactions offline", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the SM2/SM3 suite
    #[arg(long)]
    sm: bool,

    /// Target WASM (Liquid) contracts
    #[arg(long)]
    wasm: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a transaction and print its hash and envelope
    Sign {
        /// Hex private key (0x optional)
        #[arg(long)]
        private_key: String,
        /// Recipient address or WASM path; omit to deploy
        #[arg(long, default_value = "")]
        to: String,
        /// Hex call data or bytecode
        #[arg(long, default_value = "")]
        data: String,
        /// Extra data, carried as text
        #[arg(long, default_value = "")]
        extra_data: String,
        #[arg(long)]
        block_limit: Option<i64>,
        #[arg(long)]
        group_id: Option<String>,
        #[arg(long)]
        chain_id: Option<String>,
        #[arg(long, default_value = "")]
        nonce: String,
        /// Contract ABI for WASM deployments
        #[arg(long, default_value = "")]
        abi: String,
    },
    /// Generate a fresh private key
    Keygen,
    /// Verify a signed transaction and recover its sender
    Verify {
        /// Hex signed transaction
        #[arg(long)]
        signed_tx: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(data) => {
            println!("{}", ApiResponse::ok(data).to_json());
            ExitCode::SUCCESS
        }
        Err(err) => {
            let error = match err.downcast_ref::<SignerError>() {
                Some(e) => e.clone(),
                None => SignerError::internal(format!("{:#}", err)),
            };
            let code = error.code.exit_code();
            println!("{}", ApiResponse::<()>::err(error).to_json());
            ExitCode::from(code as u8)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<SignerConfig> {
    let base = match &cli.config {
        Some(path) => SignerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SignerConfig::default(),
    };

    let mut config = base.apply_env()?;
    if cli.sm {
        config.signature_mode = bcos_signer::SignatureMode::Sm;
    }
    if cli.wasm {
        config.wasm = true;
    }
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<Value> {
    let config = load_config(&cli)?;
    if cli.verbose || config.debug_logging {
        logging::enable_debug();
    }
    crypto::init();
    log_debug!("cli", "Configuration loaded", group_id = config.group_id, mode = config.signature_mode);

    match cli.command {
        Commands::Sign {
            private_key,
            to,
            data,
            extra_data,
            block_limit,
            group_id,
            chain_id,
            nonce,
            abi,
        } => {
            let private_key = PrivateKey::from_hex(&private_key)?;
            let context = SigningContext::new(config);

            let mut fields = context.transaction(to, decode_hex_payload(&data).map_err(SignerError::from)?);
            fields.extra_data = extra_data.into_bytes();
            fields.nonce = nonce;
            fields.abi = abi;
            if let Some(limit) = block_limit {
                fields.block_limit = limit;
            }
            if let Some(group_id) = group_id {
                fields.group_id = group_id;
            }
            if let Some(chain_id) = chain_id {
                fields.chain_id = chain_id;
            }

            let signed = context.create_signed_transaction(&fields, private_key.as_bytes())?;
            Ok(json!({
                "tx_hash": signed.hash_hex(),
                "signed_tx": signed.signed_tx_hex(),
                "sender": signed.sender_hex(),
                "signature_mode": signed.signature_mode,
            }))
        }
        Commands::Keygen => {
            let (private_key, pair) = KeyMaterial::for_mode(config.signature_mode).generate()?;
            Ok(json!({
                "private_key": format!("0x{}", private_key.to_hex().as_str()),
                "public_key": pair.public_key_hex(),
                "address": pair.address_hex(),
                "signature_mode": pair.mode(),
            }))
        }
        Commands::Verify { signed_tx } => {
            let bytes = decode_hex_payload(&signed_tx).map_err(SignerError::from)?;
            let backend = crypto::backend_for(config.signature_mode);
            let verified = verify_signed_transaction(&bytes, backend.as_ref())?;
            Ok(serde_json::to_value(verified).map_err(SignerError::from)?)
        }
    }
}
