//! Distance commands such as `John+5`, `John + 3 + 1.5` or `John-2`.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::codec::parse_decimal;

pub const MAX_NAME_LENGTH: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Plus,
    Minus,
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }
}

/// Rejections of a distance command. The messages are sent to users verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Name contains space or has invalid format")]
    InvalidName,

    #[error("Error parsing distance")]
    InvalidDistance,
}

/// Whether `text` looks like a distance command for `symbol`.
///
/// It must be a single line and the part after the first `symbol` must start
/// like a number. Anything else is chatter and gets no reply.
pub fn is_update_message(text: &str, symbol: Symbol) -> bool {
    if text.contains('\n') {
        return false;
    }

    text.split_once(symbol.as_char())
        .and_then(|(_, rest)| rest.trim_start().chars().next())
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
}

/// Symbol of the command carried by `text`, `+` taking precedence over `-`.
pub fn detect_symbol(text: &str) -> Option<Symbol> {
    [Symbol::Plus, Symbol::Minus]
        .into_iter()
        .find(|symbol| text.contains(symbol.as_char()) && is_update_message(text, *symbol))
}

/// Split `message` at the first `symbol` into the trimmed name and the raw remainder.
pub fn extract(message: &str, symbol: Symbol) -> Option<(String, String)> {
    let (name, rest) = message.split_once(symbol.as_char())?;
    let name = name.trim();

    if !is_valid_name(name) {
        return None;
    }

    Some((name.to_string(), rest.to_string()))
}

pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_NAME_LENGTH
        && !name.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Sum the `symbol`-separated amounts of `rest`.
///
/// With `-` every amount is subtracted, so `3-1` means minus four. A sum
/// outside the decimal range is rejected like an unparsable token.
pub fn sum_delta(rest: &str, symbol: Symbol) -> Result<Decimal, CommandError> {
    let mut total = Decimal::ZERO;
    for token in rest.split(symbol.as_char()) {
        let amount = parse_decimal(token).ok_or(CommandError::InvalidDistance)?;
        total = total
            .checked_add(amount)
            .ok_or(CommandError::InvalidDistance)?;
    }

    Ok(match symbol {
        Symbol::Plus => total,
        Symbol::Minus => -total,
    })
}
