//! Pre-generated operator key material: `addr_test.txt` (funded testnet
//! address, bech32) and `ed25519_pub.hex` (payment verification key, hex),
//! each read once. The signing key itself never touches this process.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ed25519_dalek::VerifyingKey;
use pallas_addresses::Address;

pub const ADDRESS_FILE: &str = "addr_test.txt";
pub const VERIFICATION_KEY_FILE: &str = "ed25519_pub.hex";

#[derive(Debug)]
pub struct OperatorKeys {
    /// The address as the operator wrote it, for display and API calls.
    pub address_bech32: String,
    /// Raw address payload, the form transaction outputs carry.
    pub address: Vec<u8>,
    pub verification_key: VerifyingKey,
}

impl OperatorKeys {
    pub fn load(key_dir: &Path) -> Result<Self> {
        let address_path = key_dir.join(ADDRESS_FILE);
        let address_bech32 = fs::read_to_string(&address_path)
            .with_context(|| format!("cannot read address file {}", address_path.display()))?
            .trim()
            .to_string();
        let address = Address::from_bech32(&address_bech32)
            .map_err(|err| {
                anyhow!(
                    "invalid bech32 address in {path}: {err}",
                    path = address_path.display()
                )
            })?
            .to_vec();

        let vkey_path = key_dir.join(VERIFICATION_KEY_FILE);
        let vkey_hex = fs::read_to_string(&vkey_path).with_context(|| {
            format!("cannot read verification key file {}", vkey_path.display())
        })?;
        let vkey_bytes = hex::decode(vkey_hex.trim())
            .with_context(|| format!("verification key in {} is not hex", vkey_path.display()))?;
        let vkey_bytes: [u8; 32] = vkey_bytes.try_into().map_err(|bytes: Vec<u8>| {
            anyhow!(
                "verification key must be 32 bytes, {path} holds {len}",
                path = vkey_path.display(),
                len = bytes.len()
            )
        })?;
        let verification_key = VerifyingKey::from_bytes(&vkey_bytes)
            .map_err(|err| anyhow!("verification key is not a valid Ed25519 point: {err}"))?;

        Ok(OperatorKeys {
            address_bech32,
            address,
            verification_key,
        })
    }
}
