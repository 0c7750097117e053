//! Key bindings and their configuration-file labels.
//!
//! A [`KeyBinding`] is one main key with an optional modifier held before it
//! ("hold Left Control, press P").  In configuration files a binding is stored
//! as a short label built from [`ScanCode`] labels:
//!
//! | Binding                    | Label          |
//! |----------------------------|----------------|
//! | P                          | `SC 25`        |
//! | Left Control + P           | `SC 29+SC 25`  |
//!
//! The numbers are the decimal ScanCode bytes, so a binding saved on one
//! platform loads unchanged on every other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keymap::scancode::{ScanCode, ScanCodeParseError};

/// Errors produced while parsing a binding label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingParseError {
    #[error("binding label is empty")]
    Empty,

    #[error("binding label {0:?} has more than one '+'")]
    TooManyKeys(String),

    #[error(transparent)]
    ScanCode(#[from] ScanCodeParseError),

    #[error("binding label {0:?} uses the unset scan code")]
    Unset(String),
}

/// A main key plus an optional modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyBinding {
    pub modifier: Option<ScanCode>,
    pub key: ScanCode,
}

impl KeyBinding {
    /// A binding triggered by `key` alone.
    pub const fn single(key: ScanCode) -> Self {
        Self {
            modifier: None,
            key,
        }
    }

    /// A binding triggered by `key` while `modifier` is held.
    pub const fn with_modifier(modifier: ScanCode, key: ScanCode) -> Self {
        Self {
            modifier: Some(modifier),
            key,
        }
    }

    /// Returns the serialization label (`SC 25` or `SC 29+SC 25`).
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            Some(modifier) => write!(f, "{modifier}+{}", self.key),
            None => write!(f, "{}", self.key),
        }
    }
}

impl FromStr for KeyBinding {
    type Err = BindingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BindingParseError::Empty);
        }

        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let binding = match parts.as_slice() {
            [key] => KeyBinding::single(key.parse()?),
            [modifier, key] => KeyBinding::with_modifier(modifier.parse()?, key.parse()?),
            _ => return Err(BindingParseError::TooManyKeys(s.to_string())),
        };

        let unset = binding.key.is_unset() || binding.modifier.is_some_and(ScanCode::is_unset);
        if unset {
            return Err(BindingParseError::Unset(s.to_string()));
        }
        Ok(binding)
    }
}

impl TryFrom<String> for KeyBinding {
    type Error = BindingParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyBinding> for String {
    fn from(binding: KeyBinding) -> Self {
        binding.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
