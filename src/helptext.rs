//! Method documentation: the introspection help-text parser and the help
//! renderer.
//!
//! The upstream client only documents its methods through a pydoc-style
//! text dump: a `Methods defined here:` marker opens the method region,
//! every line carries a `" |  "` prefix, unindented lines are method
//! signatures, indented lines are docstring text, and a long dash line
//! closes the region. Sessions that expose structured metadata skip the
//! parser entirely (`Introspection::Structured`); the state machine below
//! is the fallback for raw text.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::api::{self, Introspection};

const METHODS_MARKER: &str = "Methods defined here:";
const SECTION_SEPARATOR: &str = " |  -------------------------";
const LINE_PREFIX: &str = " |  ";

/// Documentation for one method: its signature line and docstring body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub name: String,
    pub title: String,
    pub description: Vec<String>,
}

/// Per-instance method documentation, fully rebuilt on each authentication.
#[derive(Debug, Clone, Default)]
pub struct HelpStore {
    entries: BTreeMap<String, HelpEntry>,
}

impl HelpStore {
    pub fn from_introspection(intro: Introspection) -> Self {
        match intro {
            Introspection::Structured(entries) => {
                let mut store = HelpStore::default();
                for entry in entries {
                    store.insert(entry);
                }
                store
            }
            Introspection::Text(text) => parse_help_text(&text),
        }
    }

    fn insert(&mut self, mut entry: HelpEntry) {
        // The constructor entry documents building the client itself.
        if entry.name == "__init__" {
            entry.name = "API".to_string();
        }
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&HelpEntry> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reconstruct method documentation from a pydoc-style text block.
///
/// Line state machine: idle until a line containing the methods marker;
/// a dash separator flushes the accumulating entry and returns to idle;
/// within the region the `" |  "` prefix is stripped, an unindented line
/// starts a new entry (name = text before the first `(`), indented lines
/// append to the current description, and a bare `|` is spacing. An entry
/// still accumulating when the text ends is flushed.
pub fn parse_help_text(text: &str) -> HelpStore {
    let mut store = HelpStore::default();
    let mut scanning = false;
    let mut current: Option<HelpEntry> = None;

    for line in text.lines() {
        if line.starts_with(SECTION_SEPARATOR) {
            if let Some(entry) = current.take() {
                store.insert(entry);
            }
            scanning = false;
        }

        if scanning && line.trim() != "|" {
            let stripped = line.strip_prefix(LINE_PREFIX).unwrap_or(line);
            match stripped.chars().next() {
                Some(c) if !c.is_whitespace() => {
                    if let Some(entry) = current.take() {
                        store.insert(entry);
                    }
                    let name = stripped
                        .split('(')
                        .next()
                        .unwrap_or(stripped)
                        .to_string();
                    current = Some(HelpEntry {
                        name,
                        title: stripped.to_string(),
                        description: Vec::new(),
                    });
                }
                Some(_) => {
                    if let Some(entry) = current.as_mut() {
                        entry.description.push(stripped.to_string());
                    }
                }
                // post-strip empty line, spacing
                None => {}
            }
        }

        if line.contains(METHODS_MARKER) {
            scanning = true;
        }
    }

    if let Some(entry) = current.take() {
        store.insert(entry);
    }

    store
}

/// Format help output for the three request shapes: absent (endpoint
/// availability listing), `all` (every documented method), or one method
/// name (stored title and description verbatim).
pub fn render_help(
    request: Option<&str>,
    store: &HelpStore,
    available: &BTreeSet<String>,
) -> String {
    let mut out = String::new();
    match request.map(str::trim).filter(|r| !r.is_empty()) {
        None => {
            let _ = writeln!(out, "{:<25}{:<10}", "Available API", "Transform");
            let _ = writeln!(out, "----------------------------------------");
            let _ = writeln!(out, "{:<25}{:<10}", "all", "NA");
            for endpoint in available {
                let _ = writeln!(
                    out,
                    "{:<25}{:<10}",
                    endpoint,
                    api::is_registered(endpoint)
                );
            }
        }
        Some("all") => {
            let _ = writeln!(out, "All Help Methods");
            let _ = writeln!(out);
            let _ = writeln!(out, "{:<50}{:<10}{:<10}", "Method", "Available", "Transform");
            let _ = writeln!(
                out,
                "--------------------------------------------------------------------"
            );
            for name in store.names() {
                let _ = writeln!(
                    out,
                    "{:<50}{:<10}{:<10}",
                    name,
                    available.contains(name),
                    api::is_registered(name)
                );
            }
        }
        Some(name) => match store.get(name) {
            None => {
                let _ = writeln!(out, "Provided help {name} not in help dictionary");
            }
            Some(entry) => {
                let _ = writeln!(out, "************");
                let _ = writeln!(out, "Domain Tools Help");
                let _ = writeln!(out);
                let _ = writeln!(out, "{:<12}{}", "Method: ", entry.name);
                let _ = writeln!(out, "{:<12}{}", "Example: ", entry.title);
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", entry.description.join("\n"));
            }
        },
    }
    out
}
