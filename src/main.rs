//! # Nimbus CLI
//!
//! An interactive command-line client for the Nimbus cloud API.
//!
//! Every operation the provider documents becomes a shell command: the
//! operation catalog (scraped from the online docs into `doc.json`) is
//! loaded at start-up, arguments are collected as `key=value` pairs with
//! tab-completion, each request is signed with the account's private key,
//! and the JSON reply is pretty-printed.
//!
//! ## Quick Start
//!
//! ```bash
//! # interactive shell
//! nimbus
//!
//! # one-shot scripting form
//! nimbus DescribeFoo Id=42
//! ```
//!
//! ## Configuration
//!
//! Credentials and the endpoint live in `~/.nimbusrc`; a fill-in template
//! is printed on first run. The operation catalog is read from
//! `<config_dir>/nimbus/doc.json` (override with `NIMBUS_DOC_PATH`).

use anyhow::Result;
use clap::Parser;
use nimbus_cli::catalog::Catalog;
use nimbus_cli::client::ApiClient;
use nimbus_cli::config::{self, ConfigStore};
use nimbus_cli::error::CliError;
use nimbus_cli::shell::Shell;
use nimbus_cli::{session, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = match ConfigStore::load() {
        Ok(store) => store,
        Err(CliError::ConfigMissing { path }) => {
            println!(
                "Sorry but I can't find the config file. Please fill the \
                 following template and save it to {}",
                path.display()
            );
            println!();
            println!("{}", config::TEMPLATE);
            std::process::exit(2);
        }
        Err(err) => return Err(err.into()),
    };

    let catalog = Catalog::load(&Catalog::default_path(), session::REGIONS)?;
    let client = ApiClient::new(
        store.credentials(),
        store.signature_method()?,
        store.timeout(),
    )?;
    let mut shell = Shell::new(catalog, client, store);

    if cli.line.is_empty() {
        shell.banner();
        shell.run().await;
    } else {
        shell.run_once(&cli.line.join(" ")).await;
    }
    Ok(())
}
