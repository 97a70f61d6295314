//! Declarative command-tree framework for command-line applications.
//!
//! An application is declared as a tree of [`Command`]s with typed
//! [`Flag`]s at every level. A single resolver pass turns an argument
//! vector into either a runnable [`Context`] or a help request; the
//! dispatcher then invokes the action, sync or async, through one
//! uniform path. Flags are inherited downward: a flag declared on a
//! command is readable from every descendant, innermost declaration
//! winning.
//!
//! # Quick start
//!
//! ```
//! use argosy::{App, Command, Flag};
//!
//! let mut app = App::builder("netd")
//!     .version("1.0.0")
//!     .usage("network daemon control")
//!     .flag(Flag::boolean("debug, d").usage("verbose diagnostics"))
//!     .command(
//!         Command::new("pcap").usage("packet capture").command(
//!             Command::new("run")
//!                 .flag(Flag::string("iface, i").required())
//!                 .action(|ctx| {
//!                     println!("capturing on {}", ctx.string("iface"));
//!                     Ok(())
//!                 }),
//!         ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let code = app.run(["pcap", "run", "--iface", "eth0"]).unwrap();
//! assert_eq!(code, 0);
//! ```
//!
//! Help is implicit: `--help`/`-h` anywhere and a `help` subcommand at
//! every level short-circuit resolution and render a template-driven
//! page, before required-flag enforcement. Exit codes follow the
//! sysexits convention ([`EX_USAGE`], [`EX_UNAVAILABLE`], [`EX_CONFIG`]).

mod app;
mod command;
mod context;
mod dispatch;
mod error;
mod flag;
mod help;
mod resolver;
mod tree;

pub use app::{App, AppBuilder, AppMeta};
pub use command::{Action, ActionResult, AsyncFn, Command, SyncFn};
pub use context::{Args, Context};
pub use dispatch::Dispatcher;
pub use error::{
    ConfigError, ExitRequest, ParseError, EX_CONFIG, EX_OK, EX_UNAVAILABLE, EX_USAGE,
};
pub use flag::{Flag, FlagKind, FlagValue};
pub use help::{render_help, HelpConfig, RenderError};
pub use resolver::{resolve, HelpRequest, Resolution};
pub use tree::{CommandId, CommandTree};
