//! Minimal command-line parsing.
//!
//! Arguments are split into positionals and `--name value` options.
//! `--name=value` is accepted too. Flags listed in [`SWITCHES`] take no
//! value.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

/// Options that never take a value
const SWITCHES: &[&str] = &["help", "stdin"];

#[derive(Debug, Default)]
pub struct Args {
    positionals: Vec<String>,
    options: HashMap<String, String>,
    switches: Vec<String>,
}

impl Args {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut parsed = Args::default();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            if arg == "-h" {
                parsed.switches.push("help".to_string());
                continue;
            }
            if !arg.starts_with("--") {
                parsed.positionals.push(arg);
                continue;
            }
            let name = &arg[2..];
            if let Some((name, value)) = name.split_once('=') {
                parsed.options.insert(name.to_string(), value.to_string());
            } else if SWITCHES.contains(&name) {
                parsed.switches.push(name.to_string());
            } else {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("Option --{} needs a value", name))?;
                parsed.options.insert(name.to_string(), value);
            }
        }

        Ok(parsed)
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }

    /// Positionals from `index` on, joined with spaces
    pub fn rest(&self, index: usize) -> Option<String> {
        let rest = self.positionals.get(index..)?;
        if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        }
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }

    pub fn required(&self, index: usize, what: &str) -> Result<&str> {
        self.positional(index)
            .ok_or_else(|| anyhow!("Missing {}", what))
    }

    pub fn id(&self, index: usize) -> Result<i64> {
        let raw = self.required(index, "id")?;
        raw.parse()
            .map_err(|_| anyhow!("Not a valid id: {}", raw))
    }

    pub fn number(&self, name: &str, default: u32) -> Result<u32> {
        match self.option(name) {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow!("--{} expects a number, got {}", name, raw)),
            None => Ok(default),
        }
    }
}
