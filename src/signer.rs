//! External hardware-signing helper: an opaque executable (a YubiKey wrapper
//! script in practice) that takes the hex body hash as its only argument and
//! prints a hex Ed25519 signature on stdout.

use std::path::PathBuf;
use std::process::Command;

pub struct ExternalSigner {
    program: PathBuf,
}

impl ExternalSigner {
    pub fn new(program: PathBuf) -> Self {
        ExternalSigner { program }
    }

    /// Ask the helper to sign `body_hash`.
    ///
    /// Returns `None` when the helper cannot be spawned, exits non-zero, or
    /// prints something that is not a 64-byte hex signature; each case is
    /// logged as a warning.
    pub fn sign(&self, body_hash: &[u8; 32]) -> Option<[u8; 64]> {
        let output = match Command::new(&self.program)
            .arg(hex::encode(body_hash))
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(
                    "failed to run signer {program}: {err}",
                    program = self.program.display()
                );
                return None;
            }
        };

        if !output.status.success() {
            tracing::warn!(
                "signer {program} exited with {status}, stderr: {stderr}",
                program = self.program.display(),
                status = output.status,
                stderr = String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let signature = match hex::decode(stdout.trim()) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!("signer printed invalid hex: {err}");
                return None;
            }
        };
        match <[u8; 64]>::try_from(signature) {
            Ok(signature) => Some(signature),
            Err(bytes) => {
                tracing::warn!(
                    "signer printed a {}-byte signature, expected 64",
                    bytes.len()
                );
                None
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn fake_signer(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("signer.sh");
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn reads_signature_from_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let sig = "ab".repeat(64);
        let signer = ExternalSigner::new(fake_signer(dir.path(), &format!("echo {sig}")));

        let signature = signer.sign(&[0x42; 32]).unwrap();
        assert_eq!(signature, [0xab; 64]);
    }

    #[test]
    fn passes_the_hex_hash_as_argument() {
        let dir = tempfile::tempdir().unwrap();
        let echo_file = dir.path().join("arg.txt");
        let signer = ExternalSigner::new(fake_signer(
            dir.path(),
            &format!("printf %s \"$1\" > {}\necho {}", echo_file.display(), "cd".repeat(64)),
        ));

        signer.sign(&[0x42; 32]).unwrap();
        assert_eq!(fs::read_to_string(echo_file).unwrap(), "42".repeat(32));
    }

    #[test]
    fn non_zero_exit_degrades_to_absent() {
        let dir = tempfile::tempdir().unwrap();
        let signer = ExternalSigner::new(fake_signer(dir.path(), "exit 1"));
        assert_eq!(signer.sign(&[0x42; 32]), None);
    }

    #[test]
    fn malformed_output_degrades_to_absent() {
        let dir = tempfile::tempdir().unwrap();
        let signer = ExternalSigner::new(fake_signer(dir.path(), "echo not-hex"));
        assert_eq!(signer.sign(&[0x42; 32]), None);

        let short = ExternalSigner::new(fake_signer(dir.path(), "echo abcd"));
        assert_eq!(short.sign(&[0x42; 32]), None);
    }

    #[test]
    fn missing_program_degrades_to_absent() {
        let signer = ExternalSigner::new(PathBuf::from("/nonexistent/signer.sh"));
        assert_eq!(signer.sign(&[0x42; 32]), None);
    }
}
