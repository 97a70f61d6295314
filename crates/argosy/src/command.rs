//! Command declarations and the sync/async action variants.
//!
//! A [`Command`] is a declarative node: name, aliases, own flags, ordered
//! children, and an optional [`Action`]. Sync and async callables are a
//! tagged variant dispatched through a single invocation path, so a
//! command neither knows nor cares how its caller schedules it.

use std::fmt;

use futures::future::BoxFuture;

use crate::context::Context;
use crate::flag::Flag;

/// Outcome of a command action.
///
/// `Err` is a fatal, unrecovered fault and propagates unmodified to the
/// `App` caller. To exit with a code and message instead, record it via
/// [`Context::exit_with_error`] and return `Ok(())`.
pub type ActionResult = anyhow::Result<()>;

/// Boxed synchronous action.
pub type SyncFn = Box<dyn Fn(&mut Context) -> ActionResult + Send + Sync>;

/// Boxed asynchronous action.
pub type AsyncFn =
    Box<dyn for<'a> Fn(&'a mut Context) -> BoxFuture<'a, ActionResult> + Send + Sync>;

/// Tagged sync/async action callable.
pub enum Action {
    Sync(SyncFn),
    Async(AsyncFn),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Sync(_) => f.write_str("Action::Sync(..)"),
            Action::Async(_) => f.write_str("Action::Async(..)"),
        }
    }
}

/// Declarative command node; forms a tree rooted at the `App`.
///
/// Children keep insertion order (help rendering relies on it), but
/// resolution matches by name and alias, never by position.
///
/// ```
/// use argosy::{Command, Flag};
///
/// let cmd = Command::new("template")
///     .usage("manage templates")
///     .command(
///         Command::new("new")
///             .usage("create a template")
///             .flag(Flag::string("lang, l").usage("template language"))
///             .action(|ctx| {
///                 println!("new template in {}", ctx.string("lang"));
///                 Ok(())
///             }),
///     );
/// assert!(cmd.has_name("template"));
/// ```
#[derive(Debug, Default)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) usage: String,
    pub(crate) argsusage: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) flags: Vec<Flag>,
    pub(crate) children: Vec<Command>,
    pub(crate) action: Option<Action>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            ..Command::default()
        }
    }

    /// Adds an alias. Aliases must stay unique among siblings.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Sets the one-line usage description.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Sets the positional-argument usage string, e.g. `"[file...]"`.
    pub fn argsusage(mut self, argsusage: impl Into<String>) -> Self {
        self.argsusage = Some(argsusage.into());
        self
    }

    /// Sets the help grouping label (display only).
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Hides the command from help output. It stays fully resolvable.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Declares an own flag, scoped to this command and its descendants.
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Appends a child command. Insertion order is preserved for help.
    pub fn command(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    /// Sets a synchronous action.
    pub fn action<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context) -> ActionResult + Send + Sync + 'static,
    {
        self.action = Some(Action::Sync(Box::new(f)));
        self
    }

    /// Sets an asynchronous action. The callable returns a boxed future
    /// borrowing the context:
    ///
    /// ```
    /// use argosy::Command;
    ///
    /// let cmd = Command::new("fetch").action_async(|ctx| {
    ///     Box::pin(async move {
    ///         println!("fetching {}", ctx.args().first().unwrap_or("-"));
    ///         Ok(())
    ///     })
    /// });
    /// ```
    pub fn action_async<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, ActionResult> + Send + Sync + 'static,
    {
        self.action = Some(Action::Async(Box::new(f)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub(crate) fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub(crate) fn action_ref(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    /// True if `name` matches the command name or any alias (case-sensitive).
    pub fn has_name(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Comma-joined name and aliases for help formatting, e.g. `help, h`.
    pub fn display(&self) -> String {
        let mut parts = vec![self.name.clone()];
        parts.extend(self.aliases.iter().cloned());
        parts.join(", ")
    }

    /// Own flags not hidden from help.
    pub fn visible_flags(&self) -> Vec<&Flag> {
        self.flags.iter().filter(|f| !f.is_hidden()).collect()
    }
}
