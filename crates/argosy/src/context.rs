//! Resolved invocation context handed to command actions.
//!
//! A [`Context`] is constructed once per `run` by the resolver and is
//! read-only to the action except for the exit request. Flag values are
//! stored per scope; inheritance is a lookup-time fallback walking the
//! ancestor chain innermost-first, not a copy.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ExitRequest;
use crate::flag::FlagValue;
use crate::tree::{CommandId, CommandTree};

/// Positional arguments left over after flag matching and subcommand
/// descent, in original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(Vec<String>);

impl Args {
    pub(crate) fn new(values: Vec<String>) -> Self {
        Args(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if there are any arguments.
    pub fn present(&self) -> bool {
        !self.0.is_empty()
    }

    /// Bounds-safe indexed lookup.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// First argument, if any.
    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    /// Everything but the first argument.
    pub fn tail(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Flag values resolved for one command scope in the chain.
#[derive(Debug)]
pub(crate) struct Scope {
    pub id: CommandId,
    /// Canonical flag name to coerced value.
    pub values: HashMap<String, FlagValue>,
}

/// The resolved, read-only-to-the-action view of one invocation.
#[derive(Debug)]
pub struct Context {
    tree: Arc<CommandTree>,
    /// Root-first; the last scope is the invoked command.
    scopes: Vec<Scope>,
    args: Args,
    exit_request: Option<ExitRequest>,
}

impl Context {
    pub(crate) fn new(tree: Arc<CommandTree>, scopes: Vec<Scope>, args: Args) -> Self {
        Context {
            tree,
            scopes,
            args,
            exit_request: None,
        }
    }

    /// Id of the invoked (terminal) command.
    pub(crate) fn terminal(&self) -> CommandId {
        self.scopes.last().expect("context has at least the root scope").id
    }

    /// Names of the resolved command chain, root first, ending at the
    /// invoked command.
    pub fn command_chain(&self) -> Vec<&str> {
        self.scopes
            .iter()
            .map(|s| self.tree.command(s.id).name())
            .collect()
    }

    /// Name of the invoked command.
    pub fn command(&self) -> &str {
        self.tree.command(self.terminal()).name()
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Looks up a resolved flag value by any of its aliases, walking the
    /// scope chain innermost-first. Absence yields `None`; defaults were
    /// already applied at resolution time and are never re-applied here.
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        for scope in self.scopes.iter().rev() {
            let command = self.tree.command(scope.id);
            let key = command
                .flags()
                .iter()
                .find(|f| f.matches(name))
                .map(|f| f.canonical())
                .unwrap_or(name);
            if let Some(value) = scope.values.get(key) {
                return Some(value);
            }
        }
        None
    }

    /// String value of a flag, or `""` when absent or of another kind.
    pub fn string(&self, name: &str) -> String {
        match self.get(name) {
            Some(FlagValue::Str(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Boolean value of a flag, or `false` when absent.
    pub fn boolean(&self, name: &str) -> bool {
        matches!(self.get(name), Some(FlagValue::Bool(true)))
    }

    /// Integer value of a flag, or `0` when absent.
    pub fn int(&self, name: &str) -> i64 {
        match self.get(name) {
            Some(FlagValue::Int(i)) => *i,
            _ => 0,
        }
    }

    /// Float value of a flag, or `0.0` when absent.
    pub fn float(&self, name: &str) -> f64 {
        match self.get(name) {
            Some(FlagValue::Float(x)) => *x,
            _ => 0.0,
        }
    }

    /// Accumulated list value of a flag, or empty when absent.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(FlagValue::List(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Records an abnormal-termination request. Control is not
    /// transferred; the dispatcher halts further work once the action
    /// returns and surfaces the code, routing the message to the error
    /// writer.
    pub fn exit_with_error(&mut self, message: impl Into<String>, code: i32) {
        self.exit_request = Some(ExitRequest {
            message: message.into(),
            code,
        });
    }

    pub fn exit_request(&self) -> Option<&ExitRequest> {
        self.exit_request.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::flag::Flag;

    fn context_for(tokens: &[&str]) -> Context {
        let root = Command::new("app")
            .flag(Flag::string("log, l").default_value("info"))
            .command(
                Command::new("run")
                    .flag(Flag::string("lang").default_value("en"))
                    .action(|_| Ok(())),
            );
        let tree = Arc::new(CommandTree::build(root).unwrap());
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        match crate::resolver::resolve(&tree, &tokens).unwrap() {
            crate::resolver::Resolution::Run(ctx) => ctx,
            _ => panic!("expected a runnable context"),
        }
    }

    #[test]
    fn test_get_prefers_innermost_scope() {
        let ctx = context_for(&["--log", "warn", "run", "--lang", "fi"]);
        assert_eq!(ctx.string("lang"), "fi");
        assert_eq!(ctx.string("log"), "warn");
        // Alias spelling resolves to the same value.
        assert_eq!(ctx.string("l"), "warn");
    }

    #[test]
    fn test_typed_zero_values() {
        let ctx = context_for(&["run"]);
        assert_eq!(ctx.string("nope"), "");
        assert!(!ctx.boolean("nope"));
        assert_eq!(ctx.int("nope"), 0);
        assert_eq!(ctx.float("nope"), 0.0);
        assert!(ctx.list("nope").is_empty());
    }

    #[test]
    fn test_args_accessors() {
        let ctx = context_for(&["run", "a", "b", "c"]);
        assert_eq!(ctx.args().len(), 3);
        assert_eq!(ctx.args().first(), Some("a"));
        assert_eq!(ctx.args().get(2), Some("c"));
        assert_eq!(ctx.args().get(3), None);
        assert_eq!(ctx.args().tail(), &["b".to_string(), "c".to_string()]);
        assert!(ctx.args().present());
    }

    #[test]
    fn test_exit_request_recorded_not_raised() {
        let mut ctx = context_for(&["run"]);
        assert!(ctx.exit_request().is_none());
        ctx.exit_with_error("boom", 3);
        let request = ctx.exit_request().unwrap();
        assert_eq!(request.message, "boom");
        assert_eq!(request.code, 3);
    }

    #[test]
    fn test_command_chain() {
        let ctx = context_for(&["run"]);
        assert_eq!(ctx.command_chain(), vec!["app", "run"]);
        assert_eq!(ctx.command(), "run");
    }
}
