//! Flag declarations and value coercion.
//!
//! A [`Flag`] is pure data: an ordered set of aliases (the first is the
//! canonical name), a [`FlagKind`] that fixes arity and coercion, and the
//! optional default / env-fallback / required attributes. Coercion itself
//! lives in [`Flag::coerce`] and is pure and deterministic: coercing the
//! stringified form of any coerced value yields the value back.

use std::fmt;

use crate::error::ParseError;

/// Value kind a flag coerces its raw token into.
///
/// The kind determines arity: booleans consume no value token (unless an
/// explicit `=value` is attached), string lists consume one token per
/// occurrence and accumulate, everything else consumes exactly one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Bool,
    Int,
    Float,
    StringList,
}

impl FlagKind {
    /// True if an occurrence consumes a value token (plain booleans do not).
    pub fn has_value(self) -> bool {
        !matches!(self, FlagKind::Bool)
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagKind::String => "string",
            FlagKind::Bool => "bool",
            FlagKind::Int => "int",
            FlagKind::Float => "float",
            FlagKind::StringList => "string list",
        };
        f.write_str(name)
    }
}

/// A coerced flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<String>),
}

impl FlagValue {
    /// The kind this value belongs to.
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::Str(_) => FlagKind::String,
            FlagValue::Bool(_) => FlagKind::Bool,
            FlagValue::Int(_) => FlagKind::Int,
            FlagValue::Float(_) => FlagKind::Float,
            FlagValue::List(_) => FlagKind::StringList,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Str(s) => f.write_str(s),
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Int(i) => write!(f, "{}", i),
            FlagValue::Float(x) => write!(f, "{}", x),
            FlagValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for FlagValue {
    fn from(s: &str) -> Self {
        FlagValue::Str(s.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(s: String) -> Self {
        FlagValue::Str(s)
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> Self {
        FlagValue::Bool(b)
    }
}

impl From<i64> for FlagValue {
    fn from(i: i64) -> Self {
        FlagValue::Int(i)
    }
}

impl From<i32> for FlagValue {
    fn from(i: i32) -> Self {
        FlagValue::Int(i64::from(i))
    }
}

impl From<f64> for FlagValue {
    fn from(x: f64) -> Self {
        FlagValue::Float(x)
    }
}

impl From<Vec<String>> for FlagValue {
    fn from(items: Vec<String>) -> Self {
        FlagValue::List(items)
    }
}

/// Declarative description of one named option.
///
/// Aliases are given as a comma list in the constructor, e.g.
/// `Flag::string("lang, l")`; the first name is the canonical lookup key.
#[derive(Debug, Clone)]
pub struct Flag {
    names: Vec<String>,
    kind: FlagKind,
    usage: String,
    default: Option<FlagValue>,
    required: bool,
    hidden: bool,
    env_fallback: Option<String>,
    /// Set only on the reserved `--help` flag the tree injects.
    pub(crate) implicit: bool,
}

impl Flag {
    fn new(name: &str, kind: FlagKind) -> Self {
        let names = name
            .split(',')
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        Flag {
            names,
            kind,
            usage: String::new(),
            default: None,
            required: false,
            hidden: false,
            env_fallback: None,
            implicit: false,
        }
    }

    /// A flag holding one string value.
    pub fn string(name: &str) -> Self {
        Flag::new(name, FlagKind::String)
    }

    /// A zero-arity boolean flag (presence means `true`).
    pub fn boolean(name: &str) -> Self {
        Flag::new(name, FlagKind::Bool).default_value(false)
    }

    /// A flag holding one integer value.
    pub fn int(name: &str) -> Self {
        Flag::new(name, FlagKind::Int)
    }

    /// A flag holding one float value.
    pub fn float(name: &str) -> Self {
        Flag::new(name, FlagKind::Float)
    }

    /// A flag accumulating one string per occurrence, in order.
    pub fn string_list(name: &str) -> Self {
        Flag::new(name, FlagKind::StringList)
    }

    /// Sets the usage description (display only).
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Sets the typed default, used when the flag is absent from input
    /// and the env fallback (if any) is unset.
    pub fn default_value(mut self, value: impl Into<FlagValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the flag required: resolution fails if it is still
    /// unresolved after env fallback and defaults.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Hides the flag from help output. It stays fully resolvable.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Names an environment variable consulted when the flag is absent
    /// from input. Lower priority than an explicit value, higher than
    /// the default.
    pub fn env_fallback(mut self, var: impl Into<String>) -> Self {
        self.env_fallback = Some(var.into());
        self
    }

    /// All declared aliases, canonical first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The canonical (first-declared) name, the stable lookup key.
    pub fn canonical(&self) -> &str {
        &self.names[0]
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    pub fn default(&self) -> Option<&FlagValue> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn env_var(&self) -> Option<&str> {
        self.env_fallback.as_deref()
    }

    /// True for any declared alias, case-sensitively.
    pub fn matches(&self, alias: &str) -> bool {
        self.names.iter().any(|n| n == alias)
    }

    /// Dash-prefixed alias list for help and error output, e.g. `--lang, -l`.
    pub fn display(&self) -> String {
        self.names
            .iter()
            .map(|n| {
                if n.chars().count() == 1 {
                    format!("-{}", n)
                } else {
                    format!("--{}", n)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Coerces a raw token according to the declared kind.
    ///
    /// List flags coerce one element per call; the resolver accumulates
    /// occurrences.
    pub fn coerce(&self, raw: &str) -> Result<FlagValue, ParseError> {
        match self.kind {
            FlagKind::String => Ok(FlagValue::Str(raw.to_string())),
            FlagKind::StringList => Ok(FlagValue::List(vec![raw.to_string()])),
            FlagKind::Bool => parse_bool(raw)
                .map(FlagValue::Bool)
                .ok_or_else(|| self.coercion_error(raw)),
            FlagKind::Int => raw
                .parse::<i64>()
                .map(FlagValue::Int)
                .map_err(|_| self.coercion_error(raw)),
            FlagKind::Float => raw
                .parse::<f64>()
                .map(FlagValue::Float)
                .map_err(|_| self.coercion_error(raw)),
        }
    }

    fn coercion_error(&self, raw: &str) -> ParseError {
        ParseError::TypeCoercion {
            flag: self.display(),
            kind: self.kind,
            value: raw.to_string(),
        }
    }
}

/// Parses an explicit boolean value: `true`/`1` and `false`/`0`,
/// case-insensitively.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
