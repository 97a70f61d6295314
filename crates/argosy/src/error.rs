//! Error taxonomy for parsing, tree configuration, and action exits.
//!
//! All [`ParseError`] variants are produced inside the resolver and never
//! reach an action. The application boundary prints them (with contextual
//! usage where it helps) and maps them to a sysexits-style code via
//! [`ParseError::exit_code`]. [`ExitRequest`] is the one non-fatal exit
//! signal an action can record; anything else an action returns as `Err`
//! propagates to the `App` caller unconverted.

use thiserror::Error;

use crate::flag::FlagKind;

/// Successful termination.
pub const EX_OK: i32 = 0;
/// Command line usage error (sysexits.h).
pub const EX_USAGE: i32 = 64;
/// Service unavailable; used for unknown flags and help topics (sysexits.h).
pub const EX_UNAVAILABLE: i32 = 69;
/// Configuration error (sysexits.h).
pub const EX_CONFIG: i32 = 78;

/// Errors detected while resolving raw tokens against the command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A help topic path named a command that does not exist.
    #[error("No help topic for: {path}")]
    UnknownCommand { path: String },

    /// A dash-prefixed token matched no flag alias in scope.
    #[error("Command: {command}, Invalid Flag: {flag}")]
    UnknownFlag { command: String, flag: String },

    /// The same logical flag was supplied under two aliases in one invocation.
    #[error("flag {flag:?} supplied as both {first:?} and {second:?}")]
    ConflictingAlias {
        flag: String,
        first: String,
        second: String,
    },

    /// A value-taking flag was the last token of the input.
    #[error("flag {flag:?} no value specified")]
    MissingFlagValue { flag: String },

    /// A raw value could not be coerced into the flag's declared kind.
    #[error("flag {flag:?} decode fail: {value:?} is not a valid {kind}")]
    TypeCoercion {
        flag: String,
        kind: FlagKind,
        value: String,
    },

    /// A required flag was still unresolved after env fallback and defaults.
    #[error("flag {flag:?} is required")]
    MissingRequiredFlag { flag: String },
}

impl ParseError {
    /// Exit code the application boundary maps this error to.
    pub fn exit_code(&self) -> i32 {
        match self {
            ParseError::UnknownCommand { .. } | ParseError::UnknownFlag { .. } => EX_UNAVAILABLE,
            _ => EX_USAGE,
        }
    }
}

/// Errors in the declared command/flag tree itself, detected when the
/// tree is built and before any token is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A flag was declared with no usable name.
    #[error("command {command:?}: flag declared with no name")]
    EmptyFlagName { command: String },

    /// Two flags in one command's combined namespace share an alias.
    #[error("command {command:?}: flag {flag:?} name overlaps {other:?}")]
    DuplicateFlag {
        command: String,
        flag: String,
        other: String,
    },

    /// Two sibling commands share a name or alias.
    #[error("command {command:?}: subcommand {child:?} name overlaps {other:?}")]
    DuplicateCommand {
        command: String,
        child: String,
        other: String,
    },

    /// A flag's declared default does not match its kind.
    #[error("command {command:?}: flag {flag:?} default is {found} but flag is {expected}")]
    DefaultKind {
        command: String,
        flag: String,
        expected: FlagKind,
        found: FlagKind,
    },
}

impl ConfigError {
    /// Exit code for a misdeclared tree, per sysexits.
    pub fn exit_code(&self) -> i32 {
        EX_CONFIG
    }
}

/// Explicit, non-fatal exit recorded by an action through
/// [`Context::exit_with_error`](crate::Context::exit_with_error).
///
/// Recording one does not transfer control; the dispatcher halts further
/// work after the action returns, routes the message to the error writer,
/// and surfaces the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitRequest {
    pub message: String,
    pub code: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::UnknownFlag {
            command: "pcap".into(),
            flag: "-asdf".into(),
        };
        assert_eq!(err.to_string(), "Command: pcap, Invalid Flag: -asdf");

        let err = ParseError::UnknownCommand {
            path: "netd->pcap->run".into(),
        };
        assert_eq!(err.to_string(), "No help topic for: netd->pcap->run");
    }

    #[test]
    fn test_exit_codes() {
        let unknown = ParseError::UnknownFlag {
            command: "netd".into(),
            flag: "-x".into(),
        };
        assert_eq!(unknown.exit_code(), EX_UNAVAILABLE);

        let missing = ParseError::MissingRequiredFlag {
            flag: "--iface, -i".into(),
        };
        assert_eq!(missing.exit_code(), EX_USAGE);
    }
}
