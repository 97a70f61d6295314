//! Uniform sync/async action invocation.
//!
//! The dispatcher is the single place that understands both [`Action`]
//! variants and both outcomes of a run. The blocking entry drives an
//! async action to completion on a dedicated single-shot runtime; the
//! async entry awaits it in the caller's runtime. Sync actions are
//! invoked inline either way, so a given context produces the same
//! observable behavior regardless of entry point.

use std::io::Write;
use std::sync::Arc;

use crate::app::AppMeta;
use crate::command::Action;
use crate::context::Context;
use crate::error::EX_OK;
use crate::help::{render_help, HelpConfig};
use crate::resolver::Resolution;
use crate::tree::{CommandId, CommandTree};

/// Per-invocation dispatcher borrowing the app's tree, metadata, and
/// writers.
pub struct Dispatcher<'a> {
    tree: &'a Arc<CommandTree>,
    meta: &'a AppMeta,
    help: &'a HelpConfig,
    out: &'a mut (dyn Write + Send),
    err: &'a mut (dyn Write + Send),
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        tree: &'a Arc<CommandTree>,
        meta: &'a AppMeta,
        help: &'a HelpConfig,
        out: &'a mut (dyn Write + Send),
        err: &'a mut (dyn Write + Send),
    ) -> Self {
        Dispatcher {
            tree,
            meta,
            help,
            out,
            err,
        }
    }

    /// Blocking dispatch. An async action is run to completion on a
    /// fresh current-thread runtime, so this must not be called from
    /// within an async context; use [`Dispatcher::dispatch_async`] there.
    pub fn dispatch(&mut self, resolution: Resolution) -> anyhow::Result<i32> {
        let tree = self.tree;
        match resolution {
            Resolution::Help(request) => self.render(request.target),
            Resolution::Run(mut ctx) => {
                let terminal = ctx.terminal();
                match tree.command(terminal).action_ref() {
                    // A container invoked directly degrades to its help page.
                    None => self.render(terminal),
                    Some(Action::Sync(action)) => {
                        action(&mut ctx)?;
                        self.finish(ctx)
                    }
                    Some(Action::Async(action)) => {
                        let runtime = tokio::runtime::Builder::new_current_thread()
                            .enable_all()
                            .build()?;
                        runtime.block_on(action(&mut ctx))?;
                        self.finish(ctx)
                    }
                }
            }
        }
    }

    /// Dispatch within an already-running runtime. Behaves identically
    /// to [`Dispatcher::dispatch`] for every resolution.
    pub async fn dispatch_async(&mut self, resolution: Resolution) -> anyhow::Result<i32> {
        let tree = self.tree;
        match resolution {
            Resolution::Help(request) => self.render(request.target),
            Resolution::Run(mut ctx) => {
                let terminal = ctx.terminal();
                match tree.command(terminal).action_ref() {
                    None => self.render(terminal),
                    Some(Action::Sync(action)) => {
                        action(&mut ctx)?;
                        self.finish(ctx)
                    }
                    Some(Action::Async(action)) => {
                        action(&mut ctx).await?;
                        self.finish(ctx)
                    }
                }
            }
        }
    }

    fn render(&mut self, target: CommandId) -> anyhow::Result<i32> {
        let page = render_help(self.tree, target, self.meta, self.help)?;
        writeln!(self.out, "{}", page)?;
        Ok(EX_OK)
    }

    /// Interprets a completed action: an exit request routes its message
    /// to the error writer and surfaces its code; otherwise success.
    fn finish(&mut self, ctx: Context) -> anyhow::Result<i32> {
        match ctx.exit_request() {
            Some(request) => {
                if !request.message.is_empty() {
                    writeln!(self.err, "{}", request.message)?;
                }
                Ok(request.code)
            }
            None => Ok(EX_OK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::flag::Flag;
    use crate::resolver::resolve;
    use std::sync::Mutex;

    fn tree() -> Arc<CommandTree> {
        let log: Arc<Mutex<Vec<String>>> = Arc::default();
        tree_with_log(&log)
    }

    fn tree_with_log(log: &Arc<Mutex<Vec<String>>>) -> Arc<CommandTree> {
        let sync_log = Arc::clone(log);
        let async_log = Arc::clone(log);
        let root = Command::new("netd")
            .flag(Flag::string("lang, l").default_value("en"))
            .command(Command::new("view").action(move |ctx| {
                sync_log.lock().unwrap().push(format!("view:{}", ctx.string("lang")));
                Ok(())
            }))
            .command(Command::new("run").action_async(move |ctx| {
                let async_log = Arc::clone(&async_log);
                Box::pin(async move {
                    async_log.lock().unwrap().push(format!("run:{}", ctx.string("lang")));
                    Ok(())
                })
            }))
            .command(Command::new("fail").action(|ctx| {
                ctx.exit_with_error("out of tape", 3);
                Ok(())
            }))
            .command(Command::new("group").command(Command::new("leaf").action(|_| Ok(()))));
        Arc::new(CommandTree::build(root).unwrap())
    }

    fn dispatch(tree: &Arc<CommandTree>, tokens: &[&str]) -> (anyhow::Result<i32>, String, String) {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        let resolution = resolve(tree, &tokens).unwrap();
        let meta = AppMeta::default();
        let help = HelpConfig::default();
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let code = Dispatcher::new(tree, &meta, &help, &mut out, &mut err).dispatch(resolution);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_sync_action_runs_with_inherited_flag() {
        let log: Arc<Mutex<Vec<String>>> = Arc::default();
        let tree = tree_with_log(&log);
        let (code, _, _) = dispatch(&tree, &["--lang", "fi", "view"]);
        assert_eq!(code.unwrap(), EX_OK);
        assert_eq!(log.lock().unwrap().as_slice(), &["view:fi".to_string()]);
    }

    #[test]
    fn test_async_action_runs_under_blocking_dispatch() {
        let log: Arc<Mutex<Vec<String>>> = Arc::default();
        let tree = tree_with_log(&log);
        let (code, _, _) = dispatch(&tree, &["run"]);
        assert_eq!(code.unwrap(), EX_OK);
        assert_eq!(log.lock().unwrap().as_slice(), &["run:en".to_string()]);
    }

    #[tokio::test]
    async fn test_async_dispatch_matches_blocking_output() {
        let log: Arc<Mutex<Vec<String>>> = Arc::default();
        let tree = tree_with_log(&log);
        let tokens = vec!["--lang".to_string(), "sv".to_string(), "run".to_string()];
        let resolution = resolve(&tree, &tokens).unwrap();
        let meta = AppMeta::default();
        let help = HelpConfig::default();
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let code = Dispatcher::new(&tree, &meta, &help, &mut out, &mut err)
            .dispatch_async(resolution)
            .await
            .unwrap();
        assert_eq!(code, EX_OK);
        assert_eq!(log.lock().unwrap().as_slice(), &["run:sv".to_string()]);
    }

    #[test]
    fn test_exit_request_routes_message_and_code() {
        let tree = tree();
        let (code, out, err) = dispatch(&tree, &["fail"]);
        assert_eq!(code.unwrap(), 3);
        assert_eq!(err, "out of tape\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_help_request_renders_to_out() {
        let tree = tree();
        let (code, out, err) = dispatch(&tree, &["help"]);
        assert_eq!(code.unwrap(), EX_OK);
        assert!(out.contains("NAME:"));
        assert!(out.contains("netd"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_container_without_action_degrades_to_help() {
        let tree = tree();
        let (code, out, _) = dispatch(&tree, &["group"]);
        assert_eq!(code.unwrap(), EX_OK);
        assert!(out.contains("group"));
        assert!(out.contains("leaf"));
    }

    #[test]
    fn test_action_error_propagates() {
        let root = Command::new("app")
            .command(Command::new("boom").action(|_| Err(anyhow::anyhow!("broken pipe"))));
        let tree = Arc::new(CommandTree::build(root).unwrap());
        let (code, _, _) = dispatch(&tree, &["boom"]);
        assert_eq!(code.unwrap_err().to_string(), "broken pipe");
    }
}
