//! Interactive command shell.
//!
//! The catalog is the dispatch table: every operation name becomes a shell
//! command that parses `key=value` arguments, injects the active region
//! when the operation takes one, calls the API client and pretty-prints the
//! reply. Built-ins (`region`, `help`, `quit`/`exit`) sit alongside the
//! generated commands. Line editing comes from dialoguer; this module only
//! supplies the completion candidates.
//!
//! Any error raised by a command is printed as a single line and the loop
//! keeps going; only quit, interrupt or end-of-input leave the shell.

use std::collections::BTreeMap;

use dialoguer::{BasicHistory, Completion, Input};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::catalog::Catalog;
use crate::client::ApiClient;
use crate::config::ConfigStore;
use crate::error::CliError;
use crate::session::{Session, REGIONS};

const BUILTINS: &[&str] = &["exit", "help", "quit", "region"];

const BANNER: &str = r#"
 _   _ ___ __  __ ____  _   _ ____
| \ | |_ _|  \/  | __ )| | | / ___|
|  \| || || |\/| |  _ \| | | \___ \
| |\  || || |  | | |_) | |_| |___) |
|_| \_|___|_|  |_|____/ \___/|____/
"#;

/// What the loop should do after a dispatched command.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellAction {
    Continue,
    Quit,
}

pub struct Shell {
    catalog: Catalog,
    client: ApiClient,
    session: Session,
    store: ConfigStore,
}

impl Shell {
    pub fn new(catalog: Catalog, client: ApiClient, store: ConfigStore) -> Self {
        let session = Session::new(store.region());
        Shell {
            catalog,
            client,
            session,
            store,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn banner(&self) {
        println!("{BANNER}");
    }

    /// Read-eval-print loop. Returns on quit, interrupt or end-of-input.
    pub async fn run(&mut self) {
        let mut history = BasicHistory::new().max_entries(100).no_duplicates(true);
        loop {
            let completer = LineCompleter {
                catalog: &self.catalog,
            };
            let input = Input::<String>::new()
                .with_prompt(self.session.prompt())
                .allow_empty(true)
                .history_with(&mut history)
                .completion_with(&completer)
                .interact_text();
            let line = match input {
                Ok(line) => line,
                // interrupt / end-of-input: same farewell as quit
                Err(_) => {
                    println!();
                    return;
                }
            };
            if self.dispatch(&line).await == ShellAction::Quit {
                return;
            }
        }
    }

    /// Execute exactly one command line (the scripting entry point).
    pub async fn run_once(&mut self, line: &str) {
        self.dispatch(line).await;
    }

    pub async fn dispatch(&mut self, line: &str) -> ShellAction {
        let line = line.trim();
        if line.is_empty() {
            return ShellAction::Continue;
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match command {
            "quit" | "exit" => {
                println!();
                return ShellAction::Quit;
            }
            "region" => {
                if let Err(err) = self.set_region(rest) {
                    println!("{err}");
                }
            }
            "help" => self.help(rest),
            _ if self.catalog.contains(command) => {
                if let Err(err) = self.invoke(command, rest).await {
                    println!("{err}");
                }
            }
            _ => self.unknown(command),
        }
        ShellAction::Continue
    }

    fn set_region(&mut self, region: &str) -> Result<(), CliError> {
        self.session.set_region(region)?;
        self.store.save(&[("region", region)])
    }

    async fn invoke(&self, action: &str, rest: &str) -> Result<(), CliError> {
        let mut args = parse_args(rest);
        if let Some(region) = self.session.region() {
            let takes_region = self
                .catalog
                .get(action)
                .and_then(|schema| schema.get("Region"))
                .is_some();
            // an explicitly typed Region= wins over the session value
            if takes_region {
                args.entry("Region".to_string())
                    .or_insert_with(|| region.to_string());
            }
        }
        let value = self.client.call(action, args).await?;
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        );
        Ok(())
    }

    fn help(&self, topic: &str) {
        if topic.is_empty() {
            println!("Built-in commands:");
            println!("  help [command]    show this list or an operation's parameters");
            println!("  region <name>     select the active region");
            println!("  quit              leave the shell (also: exit, Ctrl-D)");
            println!();
            println!("API operations:");
            let names: Vec<&str> = self.catalog.operation_names().collect();
            let width = names.iter().map(|n| n.len()).max().unwrap_or(0) + 2;
            for row in names.chunks(3) {
                let line: String = row.iter().map(|n| format!("{n:<width$}")).collect();
                println!("  {}", line.trim_end());
            }
        } else if let Some(schema) = self.catalog.get(topic) {
            print!("{}", schema.usage());
        } else if BUILTINS.contains(&topic) {
            self.help("");
        } else {
            self.unknown(topic);
        }
    }

    fn unknown(&self, command: &str) {
        println!("Unknown command: {command}");
        let matcher = SkimMatcherV2::default();
        let best = command_names(&self.catalog)
            .into_iter()
            .filter_map(|name| {
                matcher
                    .fuzzy_match(&name, command)
                    .map(|score| (score, name))
            })
            .max_by_key(|(score, _)| *score);
        if let Some((_, name)) = best {
            println!("Did you mean '{name}'?");
        }
    }
}

/// Build RequestParameters from a `key=value ...` argument line. Tokens
/// without `=` are dropped; quoting keeps embedded whitespace in values.
pub fn parse_args(line: &str) -> BTreeMap<String, String> {
    shlex::split(line)
        .unwrap_or_default()
        .iter()
        .filter_map(|token| token.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn command_names(catalog: &Catalog) -> Vec<String> {
    let mut names: Vec<String> = BUILTINS
        .iter()
        .map(|name| name.to_string())
        .chain(catalog.operation_names().map(String::from))
        .collect();
    names.sort();
    names
}

/// Byte offset where the last (possibly empty) input token starts.
fn last_token_start(input: &str) -> usize {
    input
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0)
}

/// Completion candidates for the tail of `input`, plus the byte offset the
/// candidates replace from. `None` means nothing to offer — including the
/// case of a single candidate identical to what is already typed.
pub fn complete_line(catalog: &Catalog, input: &str) -> Option<(usize, Vec<String>)> {
    let Some(ws) = input.find(char::is_whitespace) else {
        // still typing the command word itself
        let candidates = command_names(catalog)
            .into_iter()
            .filter(|name| name.starts_with(input))
            .collect();
        return offer(0, input, candidates);
    };
    let command = &input[..ws];
    let start = last_token_start(input);
    let partial = &input[start..];

    if command == "region" {
        let candidates = REGIONS
            .iter()
            .filter(|region| region.starts_with(partial))
            .map(|region| region.to_string())
            .collect();
        return offer(start, partial, candidates);
    }
    if command == "help" {
        let candidates = command_names(catalog)
            .into_iter()
            .filter(|name| name.starts_with(partial))
            .collect();
        return offer(start, partial, candidates);
    }

    let schema = catalog.get(command)?;
    if let Some((name, value)) = partial.split_once('=') {
        if value.is_empty() {
            return None;
        }
        let candidates = schema
            .get(name)
            .and_then(|param| param.enums.as_ref())
            .map(|enums| {
                enums
                    .iter()
                    .filter(|e| e.starts_with(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        return offer(start + name.len() + 1, value, candidates);
    }

    let supplied = parse_args(&input[ws..]);
    let candidates = schema
        .param_names()
        .filter(|name| !supplied.contains_key(*name) && name.starts_with(partial))
        .map(String::from)
        .collect();
    offer(start, partial, candidates)
}

fn offer(offset: usize, typed: &str, candidates: Vec<String>) -> Option<(usize, Vec<String>)> {
    if candidates.is_empty() {
        return None;
    }
    // a lone candidate the user already typed in full signals "done"
    if candidates.len() == 1 && candidates[0] == typed {
        return None;
    }
    Some((offset, candidates))
}

fn common_prefix(candidates: &[String]) -> String {
    let mut prefix = candidates[0].clone();
    for candidate in &candidates[1..] {
        while !candidate.starts_with(&prefix) {
            prefix.pop();
        }
    }
    prefix
}

/// Bridges the candidate functions into dialoguer: Tab replaces the tail of
/// the line with the longest common prefix of the candidates.
pub struct LineCompleter<'a> {
    pub catalog: &'a Catalog,
}

impl Completion for LineCompleter<'_> {
    fn get(&self, input: &str) -> Option<String> {
        let (offset, candidates) = complete_line(self.catalog, input)?;
        let completed = format!("{}{}", &input[..offset], common_prefix(&candidates));
        (completed != input).then_some(completed)
    }
}
