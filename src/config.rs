//! Configuration store.
//!
//! Settings live in a single-section flat key/value file, `~/.nimbusrc` by
//! default (override with `NIMBUS_CONFIG`):
//!
//! ```ini
//! ; Sample Nimbus config file
//! [nimbus]
//! public_key=...
//! private_key=...
//! base_url=https://api.nimbus.example.com
//! region=hk-01
//! ```
//!
//! Recognized keys are `public_key`, `private_key`, `base_url`, `region`,
//! `signature_method` (sha1/sha256) and `timeout` (seconds). Unrecognized
//! keys in the section survive a save. Missing keys read as empty strings;
//! only a missing *file* is an error, handled fatally in `main` before any
//! command runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::error::CliError;
use crate::signer::SignatureMethod;

const SECTION: &str = "nimbus";

/// Template printed when the config file is absent.
pub const TEMPLATE: &str = "\
; Sample Nimbus config file

[nimbus]
public_key=
private_key=
base_url=https://api.nimbus.example.com
";

/// Identity and endpoint material loaded once at start-up. The private key
/// never goes on the wire; it is signing material only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub public_key: String,
    pub private_key: String,
    pub base_url: String,
}

/// Flat key/value settings backed by the `[nimbus]` section of the config
/// file. Loaded once; `save` rewrites the file in place.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl ConfigStore {
    /// `NIMBUS_CONFIG` or `~/.nimbusrc`.
    pub fn default_path() -> PathBuf {
        env::var("NIMBUS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let mut p = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
                p.push(".nimbusrc");
                p
            })
    }

    pub fn load() -> Result<Self, CliError> {
        Self::load_from(Self::default_path())
    }

    pub fn load_from(path: PathBuf) -> Result<Self, CliError> {
        if !path.exists() {
            return Err(CliError::ConfigMissing { path });
        }
        let text = fs::read_to_string(&path)?;
        Ok(ConfigStore {
            path,
            values: parse(&text),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value for `key`, or the empty string when unset.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            public_key: self.get("public_key").to_string(),
            private_key: self.get("private_key").to_string(),
            base_url: self.get("base_url").to_string(),
        }
    }

    pub fn region(&self) -> Option<String> {
        let region = self.get("region");
        (!region.is_empty()).then(|| region.to_string())
    }

    pub fn signature_method(&self) -> anyhow::Result<SignatureMethod> {
        let method = self.get("signature_method");
        if method.is_empty() {
            return Ok(SignatureMethod::default());
        }
        method.parse()
    }

    /// Optional request timeout; unset or unparseable means the transport
    /// default applies.
    pub fn timeout(&self) -> Option<Duration> {
        self.get("timeout").parse().ok().map(Duration::from_secs)
    }

    /// Merge `updates` into the section and rewrite the file.
    pub fn save(&mut self, updates: &[(&str, &str)]) -> Result<(), CliError> {
        for (key, value) in updates {
            self.values.insert(key.to_string(), value.to_string());
        }
        fs::write(&self.path, self.render())?;
        Ok(())
    }

    fn render(&self) -> String {
        let mut out = format!("[{SECTION}]\n");
        for (key, value) in &self.values {
            out.push_str(&format!("{key}={value}\n"));
        }
        out
    }
}

/// Parse the `[nimbus]` section of a flat config file. Lines outside the
/// section, comment lines (`;`/`#`) and lines without `=` are skipped.
fn parse(text: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    let mut in_section = false;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == SECTION;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    values
}
