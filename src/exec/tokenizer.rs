//! Command line tokenizer
//!
//! Splits a command line into an argument vector the way boot scripts and
//! configuration files write them: space or tab separated, with a single or
//! double quoted token kept whole so that
//! `su -c "dbus-daemon --system" messagebus` yields four arguments.

use crate::error::{Error, Result};
use std::ffi::CString;

/// Argument vector capacity, including the terminator exec appends
pub const ARGV_CAPACITY: usize = 16;

/// Maximum number of tokens a command line may hold
pub const MAX_TOKENS: usize = ARGV_CAPACITY - 1;

/// Ordered tokens of one command line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgumentVector {
    tokens: Vec<String>,
}

impl ArgumentVector {
    /// Build a vector from already separated tokens
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.len() > MAX_TOKENS {
            return Err(Error::ArgumentOverflow {
                command: tokens.join(" "),
                limit: MAX_TOKENS,
            });
        }
        Ok(Self { tokens })
    }

    /// Program name, the first token
    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Convert to C strings for exec; the null terminator is added by exec
    pub fn to_exec_argv(&self) -> Result<Vec<CString>> {
        self.tokens
            .iter()
            .map(|token| {
                CString::new(token.as_bytes()).map_err(|e| Error::InvalidArgument {
                    argument: token.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Split `command` into an [`ArgumentVector`]
///
/// Empty or blank input yields an empty vector; callers decide whether that
/// is an error. More than [`MAX_TOKENS`] tokens fail with
/// [`Error::ArgumentOverflow`] and no vector is produced.
pub fn tokenize(command: &str) -> Result<ArgumentVector> {
    let mut tokens = Vec::new();
    let mut rest = command;

    loop {
        rest = rest.trim_start_matches(is_separator);
        let Some(first) = rest.chars().next() else {
            break;
        };

        let token = if first == '\'' || first == '"' {
            let body = &rest[1..];
            match body.find(first) {
                Some(end) => {
                    rest = &body[end + 1..];
                    &body[..end]
                }
                None => {
                    // Unterminated quote takes the rest of the line
                    rest = "";
                    body
                }
            }
        } else {
            let end = rest.find(is_separator).unwrap_or(rest.len());
            let token = &rest[..end];
            rest = &rest[end..];
            token
        };

        if tokens.len() == MAX_TOKENS {
            return Err(Error::ArgumentOverflow {
                command: command.to_string(),
                limit: MAX_TOKENS,
            });
        }
        tokens.push(token.to_string());
    }

    Ok(ArgumentVector { tokens })
}
