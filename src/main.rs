use std::path::PathBuf;

use clap::Parser;
use ed25519_dalek::Signature;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use utxo_transfer::amounts::{plan_transfer, FlatFee, SEND_AMOUNT};
use utxo_transfer::chain::{submit_from_scratch, BlockfrostClient};
use utxo_transfer::config::Config;
use utxo_transfer::keys::OperatorKeys;
use utxo_transfer::selection::select_largest;
use utxo_transfer::signer::ExternalSigner;
use utxo_transfer::tx::{
    submit_action, SubmitAction, Transaction, TransactionBody, TransactionInput,
    TransactionOutput, VkeyWitness,
};

#[derive(Parser, Debug)]
#[clap(version)]
pub struct Cli {
    /// path to config file
    #[clap(long, value_parser)]
    config_path: PathBuf,
    /// submit the transaction to the network (default: only create and sign)
    #[clap(long)]
    submit: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = _main().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn _main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_test_writer();

    tracing_subscriber::registry().with(fmt_layer).init();

    let Cli {
        config_path,
        submit,
    } = Cli::parse();

    tracing::info!("Config file {:?}", config_path);
    let config = Config::load(&config_path)?;
    tracing::info!("Mode: {}", if submit { "SUBMIT" } else { "CREATE ONLY" });

    let keys = OperatorKeys::load(&config.key_dir)?;
    let client = BlockfrostClient::new(config.endpoint.clone(), &config.key)?;

    tracing::info!("Fetching UTXOs for address: {}", keys.address_bech32);
    let utxos = client.address_utxos(&keys.address_bech32).await?;
    let selected = match select_largest(&utxos) {
        Some(utxo) => utxo,
        None => {
            anyhow::bail!("No UTXOs found for this address. Please send some test ADA first.");
        }
    };
    tracing::info!("Found {} UTXOs", utxos.len());
    tracing::info!("Using UTXO: {}", selected.pointer());
    tracing::info!("Amount: {} ADA", as_ada(selected.lovelace));

    let plan = plan_transfer(selected.lovelace, SEND_AMOUNT, &FlatFee::default())?;
    tracing::info!("Total input: {} ADA", as_ada(selected.lovelace));
    tracing::info!("Sending: {} ADA", as_ada(plan.send));
    tracing::info!("Fee: {} ADA", as_ada(plan.fee));
    tracing::info!("Change: {} ADA", as_ada(plan.change));

    // send first, change second; both back to the operator's own address
    let body = TransactionBody {
        inputs: vec![TransactionInput {
            transaction_id: selected.tx_hash,
            index: selected.output_index,
        }],
        outputs: vec![
            TransactionOutput {
                address: keys.address.clone(),
                lovelace: plan.send,
            },
            TransactionOutput {
                address: keys.address.clone(),
                lovelace: plan.change,
            },
        ],
        fee: plan.fee,
    };
    let body_hash = body.hash();

    tracing::info!(
        "Verification key hex: {}",
        hex::encode(keys.verification_key.to_bytes())
    );
    tracing::info!("Transaction body hash: {}", hex::encode(body_hash));

    tracing::info!("Signing with {}...", config.signer_path.display());
    let signer = ExternalSigner::new(config.signer_path.clone());
    let signature = signer.sign(&body_hash).and_then(|signature| {
        let parsed = Signature::from_bytes(&signature);
        match keys
            .verification_key
            .verify_strict(&body_hash, &parsed)
        {
            Ok(()) => {
                tracing::info!("Signer signature: {}", hex::encode(signature));
                Some(signature)
            }
            Err(err) => {
                tracing::warn!("signer signature does not verify against the key: {err}");
                None
            }
        }
    });

    let tx = Transaction {
        body,
        witnesses: vec![VkeyWitness {
            vkey: keys.verification_key.to_bytes(),
            signature,
        }],
    };

    let tx_cbor = tx.to_cbor();
    tracing::info!("Transaction CBOR length: {} bytes", tx_cbor.len());
    tracing::info!("Transaction CBOR hex: {}", hex::encode(&tx_cbor));

    // from here on failures are reported but do not fail the run
    match submit_action(submit, &tx) {
        SubmitAction::DryRun => {
            tracing::info!("Transaction created and signed, not submitted");
            tracing::info!("To submit to the network, rerun with --submit");
            return Ok(());
        }
        SubmitAction::RefuseUnderSigned => {
            tracing::error!("Refusing to submit an under-signed transaction; the signer produced no usable signature");
            return Ok(());
        }
        SubmitAction::Broadcast => {}
    }

    tracing::info!("Submitting transaction to the preview network...");
    let scratch = std::env::temp_dir().join(format!("tx-{}.cbor", std::process::id()));
    match submit_from_scratch(&client, &scratch, &tx_cbor).await {
        Ok(tx_hash) => {
            tracing::info!("Transaction successful!");
            tracing::info!("Transaction hash: {tx_hash}");
            tracing::info!("View on CardanoScan: https://preview.cardanoscan.io/transaction/{tx_hash}");
        }
        Err(err) => {
            tracing::error!("Transaction failed: {err:#}");
            tracing::error!(
                "This might be due to insufficient funds, an incorrect fee, or other validation errors."
            );
        }
    }

    Ok(())
}

fn as_ada(lovelace: u64) -> f64 {
    lovelace as f64 / 1_000_000.0
}
