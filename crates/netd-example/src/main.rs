//! Example CLI: a small network-daemon control tool built on argosy.
//!
//! Shows the full surface: global flags with env fallback, nested
//! commands with categories, a required flag, an async action, and an
//! explicit exit request.

use std::process;
use std::time::Duration;

use argosy::{App, Command, ConfigError, Context, Flag, EX_CONFIG};

fn main() -> anyhow::Result<()> {
    let mut app = match build_app() {
        Ok(app) => app,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(err.exit_code());
        }
    };
    let code = app.run(std::env::args().skip(1))?;
    process::exit(code);
}

fn build_app() -> Result<App, ConfigError> {
    App::builder("netd")
        .version("0.3.0")
        .usage("network daemon control")
        .description("starts, stops, and inspects the example network daemon")
        .author("argosy developers")
        .flag(
            Flag::string("user, u")
                .usage("account to operate as")
                .env_fallback("NETD_USER"),
        )
        .flag(Flag::string("log").usage("logging level").default_value("info"))
        .flag(Flag::boolean("debug, d").usage("verbose diagnostics"))
        .command(
            Command::new("pcap")
                .usage("packet capture")
                .category("inspection")
                .command(
                    Command::new("run")
                        .usage("captures packets on an interface")
                        .flag(Flag::string("iface, i").usage("interface to tap").required())
                        .flag(
                            Flag::int("count, c")
                                .usage("packets to capture")
                                .default_value(16),
                        )
                        .action_async(|ctx| {
                            Box::pin(async move {
                                let iface = ctx.string("iface");
                                let count = ctx.int("count");
                                if ctx.boolean("debug") {
                                    eprintln!("capture starting (log={})", ctx.string("log"));
                                }
                                for n in 1..=count {
                                    tokio::time::sleep(Duration::from_millis(10)).await;
                                    println!("{}: packet {}/{}", iface, n, count);
                                }
                                Ok(())
                            })
                        }),
                )
                .command(
                    Command::new("view")
                        .usage("prints a capture file")
                        .argsusage("[file]")
                        .action(|ctx| match ctx.args().first() {
                            Some(file) => {
                                println!("viewing {}", file);
                                Ok(())
                            }
                            None => {
                                ctx.exit_with_error("no capture file given", EX_CONFIG);
                                Ok(())
                            }
                        }),
                ),
        )
        .command(
            Command::new("service")
                .usage("daemon lifecycle")
                .category("control")
                .command(Command::new("start").usage("starts the daemon").action(|ctx| {
                    println!("daemon started by {}", operator(ctx));
                    Ok(())
                }))
                .command(Command::new("stop").usage("stops the daemon").action(|ctx| {
                    println!("daemon stopped by {}", operator(ctx));
                    Ok(())
                })),
        )
        .build()
}

fn operator(ctx: &Context) -> String {
    let user = ctx.string("user");
    if user.is_empty() {
        "anonymous".to_string()
    } else {
        user
    }
}
