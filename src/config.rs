//! Run configuration, one YAML file; no embedded endpoints or keys, so test
//! doubles can stand in for the indexing service and the signer.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Blockfrost base URL, e.g. `https://cardano-preview.blockfrost.io`.
    pub endpoint: String,
    /// Blockfrost project key for the preview network.
    pub key: String,
    /// Directory holding `addr_test.txt` and `ed25519_pub.hex`.
    pub key_dir: PathBuf,
    /// Executable invoked with the hex body hash to produce the signature.
    pub signer_path: PathBuf,
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let file = File::open(config_path).with_context(|| {
            format!(
                "Cannot read config file {path}",
                path = config_path.display()
            )
        })?;
        serde_yaml::from_reader(file).with_context(|| {
            format!(
                "Cannot read config file {path}",
                path = config_path.display()
            )
        })
    }
}
