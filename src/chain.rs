//! Blockfrost client: `GET /api/v0/addresses/{address}/utxos` and
//! `POST /api/v0/tx/submit`, nothing else. No retries, no timeouts.

use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

use crate::selection::Utxo;

/// Error body Blockfrost returns on non-2xx responses.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockFrostError {
    pub status_code: usize,
    pub error: String,
    pub message: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AddressUtxo {
    pub tx_hash: String,
    pub output_index: u64,
    pub amount: Vec<AssetAmount>,
}

/// A `{unit, quantity}` pair; quantities arrive as decimal strings.
#[derive(Clone, Debug, Deserialize)]
pub struct AssetAmount {
    pub unit: String,
    pub quantity: String,
}

pub struct BlockfrostClient {
    client: Client,
    endpoint: String,
}

impl BlockfrostClient {
    pub fn new(endpoint: String, key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.append(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/cbor"),
        );
        headers.append(
            "project_id",
            HeaderValue::from_str(key)
                .context("The project_id (authentication key) is not in a valid format")?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP Client")?;

        Ok(BlockfrostClient { client, endpoint })
    }

    /// Fetch every UTXO currently indexed for `address`.
    ///
    /// Multi-asset UTXOs are filtered out: this tool moves lovelace only and
    /// must not consume outputs that carry native tokens.
    pub async fn address_utxos(&self, address: &str) -> Result<Vec<Utxo>> {
        let req = self
            .client
            .get(url(
                &self.endpoint,
                format!("api/v0/addresses/{address}/utxos"),
            ))
            .send()
            .await
            .context("Failed to get UTXOs from blockfrost endpoint")?;

        match req.status() {
            StatusCode::OK => {
                let entries: Vec<AddressUtxo> = req
                    .json()
                    .await
                    .context("Expect the endpoint to return UTXO data")?;
                utxos_from_entries(entries)
            }
            // blockfrost answers 404 for addresses the chain has never seen
            StatusCode::NOT_FOUND => Ok(vec![]),
            code => Err(api_error(code, req.bytes().await.ok().as_deref())),
        }
    }

    /// Submit the serialized transaction stored at `cbor_path`.
    ///
    /// The API takes the raw CBOR bytes; the file location mirrors the
    /// scratch-file contract of the submitter (see `main`).
    pub async fn submit_tx(&self, cbor_path: &Path) -> Result<String> {
        let tx_bytes = std::fs::read(cbor_path).with_context(|| {
            format!(
                "Cannot read serialized transaction {path}",
                path = cbor_path.display()
            )
        })?;

        let req = self
            .client
            .post(url(&self.endpoint, "api/v0/tx/submit"))
            .body(tx_bytes)
            .send()
            .await
            .context("Failed to reach the blockfrost submit endpoint")?;

        match req.status() {
            StatusCode::OK => req
                .json::<String>()
                .await
                .context("Expect the endpoint to return the transaction hash"),
            code => Err(api_error(code, req.bytes().await.ok().as_deref())),
        }
    }
}

/// Write `tx_bytes` to the scratch location, submit from there, and remove
/// the file again whatever the outcome.
///
/// Any error (including a failed scratch write) comes back as the submission
/// result; the caller reports it without failing the run.
pub async fn submit_from_scratch(
    client: &BlockfrostClient,
    scratch: &Path,
    tx_bytes: &[u8],
) -> Result<String> {
    std::fs::write(scratch, tx_bytes).with_context(|| {
        format!(
            "Cannot write serialized transaction to {path}",
            path = scratch.display()
        )
    })?;
    let submitted = client.submit_tx(scratch).await;
    let _ = std::fs::remove_file(scratch);
    submitted
}

fn url(endpoint: &str, api: impl fmt::Display) -> String {
    format!("{endpoint}/{api}")
}

fn api_error(code: StatusCode, body: Option<&[u8]>) -> anyhow::Error {
    if let Some(err) = body.and_then(|body| serde_json::from_slice::<BlockFrostError>(body).ok()) {
        return anyhow!(
            "Blockfrost API error {status}: {error}: {message}",
            status = err.status_code,
            error = err.error,
            message = err.message
        );
    }
    anyhow!("error: {:?}", code)
}

fn utxos_from_entries(entries: Vec<AddressUtxo>) -> Result<Vec<Utxo>> {
    let mut utxos = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.amount.iter().any(|amount| amount.unit != "lovelace") {
            tracing::debug!(
                "skipping multi-asset UTXO {}#{}",
                entry.tx_hash,
                entry.output_index
            );
            continue;
        }
        let lovelace = entry
            .amount
            .iter()
            .find(|amount| amount.unit == "lovelace")
            .with_context(|| {
                format!(
                    "UTXO {}#{} has no lovelace amount",
                    entry.tx_hash, entry.output_index
                )
            })?;
        let lovelace: u64 = lovelace.quantity.parse().with_context(|| {
            format!(
                "UTXO {}#{} has a malformed quantity {:?}",
                entry.tx_hash, entry.output_index, lovelace.quantity
            )
        })?;
        utxos.push(Utxo {
            tx_hash: entry.tx_hash.parse().with_context(|| {
                format!("UTXO hash {:?} is not a 32-byte hex hash", entry.tx_hash)
            })?,
            output_index: entry.output_index,
            lovelace,
        });
    }
    Ok(utxos)
}
