//! Application entry point: metadata, writers, and the run lifecycle.
//!
//! [`App`] owns the validated command tree, the help configuration, and
//! the output writers. Each `run` parses one token vector, dispatches,
//! and returns the process exit code; parse failures are reported here
//! with the same wording and codes on both entry points.

use std::io::{self, Write};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::command::{ActionResult, Command};
use crate::context::Context;
use crate::dispatch::Dispatcher;
use crate::error::{ConfigError, ParseError};
use crate::flag::Flag;
use crate::help::{render_help, HelpConfig};
use crate::resolver::resolve;
use crate::tree::CommandTree;

/// Application metadata surfaced on the root help page.
#[derive(Debug, Clone)]
pub struct AppMeta {
    pub version: String,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub email: Option<String>,
    pub copyright: Option<String>,
}

impl Default for AppMeta {
    fn default() -> Self {
        AppMeta {
            version: "0.0.1".to_string(),
            description: None,
            authors: Vec::new(),
            email: None,
            copyright: None,
        }
    }
}

/// The assembled application: a validated command tree plus metadata,
/// help templates, and writers.
///
/// ```
/// use argosy::{App, Command, Flag};
///
/// let mut app = App::builder("greet")
///     .version("1.0.0")
///     .flag(Flag::string("lang, l").default_value("en"))
///     .command(Command::new("hello").action(|ctx| {
///         println!("hello ({})", ctx.string("lang"));
///         Ok(())
///     }))
///     .build()
///     .unwrap();
///
/// let code = app.run(["hello"]).unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct App {
    tree: Arc<CommandTree>,
    meta: AppMeta,
    help: HelpConfig,
    writer: Box<dyn Write + Send>,
    err_writer: Box<dyn Write + Send>,
}

impl App {
    pub fn builder(name: impl Into<String>) -> AppBuilder {
        AppBuilder {
            root: Command::new(name),
            meta: AppMeta::default(),
            help: HelpConfig::default(),
            writer: None,
            err_writer: None,
        }
    }

    pub fn tree(&self) -> &Arc<CommandTree> {
        &self.tree
    }

    pub fn meta(&self) -> &AppMeta {
        &self.meta
    }

    /// Blocking entry point. `args` excludes the program name. Async
    /// actions are driven on a dedicated single-shot runtime, so call
    /// [`App::run_async`] instead when already inside a runtime.
    pub fn run<I, S>(&mut self, args: I) -> anyhow::Result<i32>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        match resolve(&self.tree, &tokens) {
            Ok(resolution) => self.dispatcher().dispatch(resolution),
            Err(err) => self.report(err),
        }
    }

    /// Async entry point; identical observable behavior to [`App::run`].
    pub async fn run_async<I, S>(&mut self, args: I) -> anyhow::Result<i32>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        match resolve(&self.tree, &tokens) {
            Ok(resolution) => self.dispatcher().dispatch_async(resolution).await,
            Err(err) => self.report(err),
        }
    }

    fn dispatcher(&mut self) -> Dispatcher<'_> {
        Dispatcher::new(
            &self.tree,
            &self.meta,
            &self.help,
            &mut *self.writer,
            &mut *self.err_writer,
        )
    }

    /// Reports a parse failure on the error writer and maps it to an
    /// exit code. Bad-reference errors print as-is; usage errors add the
    /// root help page for orientation.
    fn report(&mut self, err: ParseError) -> anyhow::Result<i32> {
        let code = err.exit_code();
        match err {
            ParseError::UnknownFlag { .. } | ParseError::UnknownCommand { .. } => {
                writeln!(self.err_writer, "{}", err)?;
            }
            _ => {
                writeln!(self.err_writer, "Incorrect Usage: {}", err)?;
                writeln!(self.err_writer)?;
                let page = render_help(&self.tree, CommandTree::ROOT, &self.meta, &self.help)?;
                writeln!(self.err_writer, "{}", page)?;
            }
        }
        Ok(code)
    }
}

/// Builder for [`App`]; `build` flattens and validates the tree.
pub struct AppBuilder {
    root: Command,
    meta: AppMeta,
    help: HelpConfig,
    writer: Option<Box<dyn Write + Send>>,
    err_writer: Option<Box<dyn Write + Send>>,
}

impl AppBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.meta.version = version.into();
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.root = self.root.usage(usage);
        self
    }

    pub fn argsusage(mut self, argsusage: impl Into<String>) -> Self {
        self.root = self.root.argsusage(argsusage);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    /// Adds an author line; repeatable.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.meta.authors.push(author.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.meta.email = Some(email.into());
        self
    }

    pub fn copyright(mut self, copyright: impl Into<String>) -> Self {
        self.meta.copyright = Some(copyright.into());
        self
    }

    /// Declares a global (root-scoped) flag.
    pub fn flag(mut self, flag: Flag) -> Self {
        self.root = self.root.flag(flag);
        self
    }

    /// Appends a top-level command.
    pub fn command(mut self, command: Command) -> Self {
        self.root = self.root.command(command);
        self
    }

    /// Sets the root action, run when no subcommand is named.
    pub fn action<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context) -> ActionResult + Send + Sync + 'static,
    {
        self.root = self.root.action(f);
        self
    }

    /// Async variant of [`AppBuilder::action`].
    pub fn action_async<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, ActionResult> + Send + Sync + 'static,
    {
        self.root = self.root.action_async(f);
        self
    }

    /// Overrides the application (root) help template.
    pub fn help_app_template(mut self, template: impl Into<String>) -> Self {
        self.help.app_template = Some(template.into());
        self
    }

    /// Overrides the command help template.
    pub fn help_cmd_template(mut self, template: impl Into<String>) -> Self {
        self.help.cmd_template = Some(template.into());
        self
    }

    /// Redirects normal output; defaults to stdout.
    pub fn writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Redirects error output; defaults to stderr.
    pub fn err_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.err_writer = Some(Box::new(writer));
        self
    }

    pub fn build(self) -> Result<App, ConfigError> {
        Ok(App {
            tree: Arc::new(CommandTree::build(self.root)?),
            meta: self.meta,
            help: self.help,
            writer: self.writer.unwrap_or_else(|| Box::new(io::stdout())),
            err_writer: self.err_writer.unwrap_or_else(|| Box::new(io::stderr())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let app = App::builder("netd").build().unwrap();
        assert_eq!(app.meta().version, "0.0.1");
        assert!(app.meta().authors.is_empty());
        assert_eq!(app.tree().command(CommandTree::ROOT).name(), "netd");
    }

    #[test]
    fn test_build_rejects_invalid_tree() {
        let result = App::builder("netd")
            .command(Command::new("run"))
            .command(Command::new("run"))
            .build();
        assert!(matches!(result, Err(ConfigError::DuplicateCommand { .. })));
    }
}
