//! Text format of a leaderboard snapshot.
//!
//! ```text
//! ===TITLE
//! SUBTITLE
//! 1 <name> <amount> [km]
//! 2 <name> <amount> [km]
//! ```
//!
//! Entries are ordered by amount, highest first. Entries whose amount is not
//! positive are never written.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Every valid snapshot starts with this marker.
pub const SNAPSHOT_SENTINEL: &str = "===";

/// Ways a snapshot can fail to decode. The messages are sent to users verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Please set title and subtitle in the following format\n===TITLE \n SUBTITLE")]
    MissingHeader,

    #[error("Parse distance error, distance format is incorrect.")]
    InvalidDistance { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub amount: Decimal,
    /// Fields after the amount, usually just `km`
    trailing: Vec<String>,
}

impl Entry {
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
            trailing: vec!["km".to_string()],
        }
    }

    /// Decode `<rank> <name> <amount> [rest...]`. Fields are separated by single spaces.
    fn parse(line: &str, line_number: usize) -> Result<Self, CodecError> {
        let fields: Vec<&str> = line.trim().split(' ').collect();
        if fields.len() < 3 {
            return Err(CodecError::InvalidDistance { line: line_number });
        }

        let amount = parse_decimal(fields[2]).ok_or(CodecError::InvalidDistance { line: line_number })?;

        Ok(Self {
            name: fields[1].trim().to_string(),
            amount,
            trailing: fields[3..].iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Entry text without the rank prefix
    pub fn text(&self) -> String {
        let mut text = format!("{} {}", self.name, self.amount);
        for field in &self.trailing {
            text.push(' ');
            text.push_str(field);
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub title: String,
    pub subtitle: String,
    /// Entries in the order they were read or added
    pub entries: Vec<Entry>,
}

impl Snapshot {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            entries: Vec::new(),
        }
    }

    /// Decode snapshot lines. Any malformed entry line rejects the whole snapshot.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self, CodecError> {
        if lines.len() < 2 {
            return Err(CodecError::MissingHeader);
        }

        let entries = lines[2..]
            .iter()
            .enumerate()
            .map(|(idx, line)| Entry::parse(line.as_ref(), idx + 2))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title: lines[0].as_ref().to_string(),
            subtitle: lines[1].as_ref().to_string(),
            entries,
        })
    }

    /// Add `delta` to every entry named exactly `user`.
    ///
    /// A user without an entry is appended only when `delta` is positive. An
    /// amount pushed outside the decimal range rejects the whole update and
    /// leaves the snapshot untouched.
    pub fn apply(&mut self, user: &str, delta: Decimal) -> Result<(), CodecError> {
        let mut updated = Vec::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.name == user {
                let amount = entry
                    .amount
                    .checked_add(delta)
                    .ok_or(CodecError::InvalidDistance { line: idx + 2 })?;
                updated.push((idx, amount));
            }
        }

        if updated.is_empty() {
            if delta > Decimal::ZERO {
                self.entries.push(Entry::new(user, delta));
            }
            return Ok(());
        }

        for (idx, amount) in updated {
            self.entries[idx].amount = amount;
        }
        Ok(())
    }

    /// Positive entries, highest amount first; ties keep their current order.
    pub fn standings(&self) -> Vec<&Entry> {
        let mut standings: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.amount > Decimal::ZERO)
            .collect();
        standings.sort_by(|a, b| b.amount.cmp(&a.amount));
        standings
    }

    pub fn encode(&self) -> String {
        let mut text = format!("{}\n{}\n", self.title, self.subtitle);
        for (idx, entry) in self.standings().into_iter().enumerate() {
            text.push_str(&format!("{} {}\n", idx + 1, entry.text()));
        }
        text.trim().to_string()
    }
}

/// Decode `lines`, credit `delta` to `user`, and encode the result.
///
/// Decoding failures come back as their user-facing message; check
/// [`is_snapshot`] before persisting the output.
pub fn render<S: AsRef<str>>(lines: &[S], user: Option<&str>, delta: Decimal) -> String {
    match Snapshot::parse(lines) {
        Ok(mut snapshot) => {
            if let Some(user) = user
                && let Err(e) = snapshot.apply(user, delta)
            {
                return e.to_string();
            }
            snapshot.encode()
        }
        Err(e) => e.to_string(),
    }
}

pub fn is_snapshot(text: &str) -> bool {
    text.starts_with(SNAPSHOT_SENTINEL)
}

pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text.trim()).ok()
}
