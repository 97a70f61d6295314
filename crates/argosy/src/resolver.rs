//! Token resolution: walks raw arguments against the command tree.
//!
//! A single left-to-right pass over the tokens, recursive per tree depth.
//! Dash-prefixed tokens go down the flag path (innermost-first alias
//! lookup, arity from the flag kind, immediate coercion). Bare tokens
//! descend into a matching child command while descent is still open, and
//! become positionals otherwise; capturing the first positional closes
//! descent for the rest of the input. The dash prefix is the only flag
//! discriminator, so a bare token that happens to spell a flag alias is a
//! positional.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::{Args, Context, Scope};
use crate::error::ParseError;
use crate::flag::FlagValue;
use crate::tree::{CommandId, CommandTree};

/// Terminal outcome of resolution. Help is a distinct outcome, not an
/// error: the dispatcher renders it and exits 0.
#[derive(Debug)]
pub enum Resolution {
    /// A command was selected; dispatch its action with this context.
    Run(Context),
    /// Help was requested via the help command, a help topic path, or
    /// the `--help` flag.
    Help(HelpRequest),
}

/// A request to render the help page of `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpRequest {
    pub target: CommandId,
}

struct Frame {
    id: CommandId,
    values: HashMap<String, FlagValue>,
    /// Canonical name to the alias it was first supplied under.
    seen: HashMap<String, String>,
}

impl Frame {
    fn new(id: CommandId) -> Self {
        Frame {
            id,
            values: HashMap::new(),
            seen: HashMap::new(),
        }
    }
}

/// Resolves `tokens` against the tree into a dispatchable outcome.
///
/// Tokens are consumed strictly left-to-right, so resolution is
/// deterministic for a given token list and tree. All parse errors are
/// detected here; none reach an action.
pub fn resolve(tree: &Arc<CommandTree>, tokens: &[String]) -> Result<Resolution, ParseError> {
    let mut frames = vec![Frame::new(CommandTree::ROOT)];
    let mut positionals: Vec<String> = Vec::new();
    let mut descent_open = true;
    let mut help_flag = false;

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;

        if let Some(stripped) = strip_dashes(token) {
            let (alias, inline) = match stripped.split_once('=') {
                Some((alias, value)) => (alias, Some(value)),
                None => (stripped, None),
            };
            let current = frames.last().expect("root frame").id;
            let Some((owner, flag)) = tree.lookup_flag(current, alias) else {
                return Err(ParseError::UnknownFlag {
                    command: tree.command(current).name().to_string(),
                    flag: token.clone(),
                });
            };

            if flag.implicit {
                help_flag = true;
                continue;
            }

            let canonical = flag.canonical().to_string();
            let frame = frames
                .iter_mut()
                .find(|f| f.id == owner)
                .expect("flag owner is on the active chain");
            match frame.seen.get(&canonical) {
                Some(first) if first != alias => {
                    return Err(ParseError::ConflictingAlias {
                        flag: canonical,
                        first: first.clone(),
                        second: alias.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    frame.seen.insert(canonical.clone(), alias.to_string());
                }
            }

            let raw = match (flag.kind().has_value(), inline) {
                (_, Some(value)) => Some(value),
                (false, None) => None,
                (true, None) => {
                    if i < tokens.len() {
                        let value = tokens[i].as_str();
                        i += 1;
                        Some(value)
                    } else {
                        return Err(ParseError::MissingFlagValue {
                            flag: flag.display(),
                        });
                    }
                }
            };
            let value = match raw {
                Some(raw) => flag.coerce(raw)?,
                None => FlagValue::Bool(true),
            };

            // List flags accumulate across occurrences; scalars overwrite.
            match frame.values.entry(canonical) {
                Entry::Occupied(mut slot) => match (slot.get_mut(), value) {
                    (FlagValue::List(existing), FlagValue::List(new)) => existing.extend(new),
                    (slot_value, value) => *slot_value = value,
                },
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
            }
        } else {
            let current = frames.last().expect("root frame").id;
            match tree.find_child(current, token) {
                Some(child) if descent_open => {
                    frames.push(Frame::new(child));
                }
                _ => {
                    positionals.push(token.clone());
                    descent_open = false;
                }
            }
        }
    }

    let terminal = frames.last().expect("root frame").id;

    // Help short-circuits before required-flag enforcement.
    if tree.is_help(terminal) {
        let base = tree.parent(terminal).unwrap_or(CommandTree::ROOT);
        let target = resolve_topic(tree, base, &positionals)?;
        return Ok(Resolution::Help(HelpRequest { target }));
    }
    if help_flag {
        return Ok(Resolution::Help(HelpRequest { target: terminal }));
    }

    // Fill unsupplied flags at every scope: env fallback first, then the
    // declared default. Explicit input always took priority above.
    for frame in &mut frames {
        for flag in tree.command(frame.id).flags() {
            if flag.implicit || frame.values.contains_key(flag.canonical()) {
                continue;
            }
            if let Some(var) = flag.env_var() {
                if let Ok(raw) = std::env::var(var) {
                    frame.values.insert(flag.canonical().to_string(), flag.coerce(&raw)?);
                    continue;
                }
            }
            if let Some(default) = flag.default() {
                frame
                    .values
                    .insert(flag.canonical().to_string(), default.clone());
            }
        }
    }

    // Required applies to the terminal command's own flags, not ancestors'.
    for flag in tree.command(terminal).flags() {
        let resolved = frames
            .last()
            .expect("root frame")
            .values
            .contains_key(flag.canonical());
        if flag.is_required() && !resolved {
            return Err(ParseError::MissingRequiredFlag {
                flag: flag.display(),
            });
        }
    }

    let scopes = frames
        .into_iter()
        .map(|f| Scope {
            id: f.id,
            values: f.values,
        })
        .collect();
    Ok(Resolution::Run(Context::new(
        Arc::clone(tree),
        scopes,
        Args::new(positionals),
    )))
}

/// Walks a help topic path (`help a b c`) from `base` down the tree.
fn resolve_topic(
    tree: &CommandTree,
    base: CommandId,
    path: &[String],
) -> Result<CommandId, ParseError> {
    let mut current = base;
    for name in path {
        match tree.find_child(current, name) {
            Some(child) => current = child,
            None => {
                return Err(ParseError::UnknownCommand {
                    path: format!("{}->{}", tree.path(current), name),
                });
            }
        }
    }
    Ok(current)
}

fn strip_dashes(token: &str) -> Option<&str> {
    if let Some(rest) = token.strip_prefix("--") {
        Some(rest)
    } else {
        token.strip_prefix('-')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::flag::{Flag, FlagKind};

    fn tree() -> Arc<CommandTree> {
        let root = Command::new("netd")
            .flag(Flag::boolean("debug, d").usage("enable debug logging"))
            .flag(Flag::string("log").default_value("info"))
            .command(
                Command::new("template")
                    .command(
                        Command::new("new")
                            .flag(Flag::string("lang, l"))
                            .flag(Flag::string_list("tag, t"))
                            .flag(Flag::int("copies").default_value(1))
                            .action(|_| Ok(())),
                    )
                    .command(Command::new("remove").alias("rm").action(|_| Ok(()))),
            )
            .command(
                Command::new("run")
                    .flag(Flag::string("iface, i").required())
                    .flag(Flag::float("rate"))
                    .action(|_| Ok(())),
            );
        Arc::new(CommandTree::build(root).unwrap())
    }

    fn toks(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn run(tokens: &[&str]) -> Result<Resolution, ParseError> {
        resolve(&tree(), &toks(tokens))
    }

    fn ctx(tokens: &[&str]) -> Context {
        match run(tokens).unwrap() {
            Resolution::Run(ctx) => ctx,
            Resolution::Help(_) => panic!("unexpected help outcome"),
        }
    }

    #[test]
    fn test_bare_tokens_land_in_positionals_in_order() {
        let ctx = ctx(&["template", "new", "x", "y", "z"]);
        assert_eq!(ctx.command_chain(), vec!["netd", "template", "new"]);
        let args: Vec<&str> = ctx.args().iter().collect();
        assert_eq!(args, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_descent_stops_after_first_positional() {
        // "rm" names a sibling command, but a positional was already
        // captured at this depth, so it stays a positional.
        let ctx = ctx(&["template", "x", "rm"]);
        assert_eq!(ctx.command(), "template");
        let args: Vec<&str> = ctx.args().iter().collect();
        assert_eq!(args, vec!["x", "rm"]);
    }

    #[test]
    fn test_alias_descent() {
        let ctx = ctx(&["template", "rm"]);
        assert_eq!(ctx.command(), "remove");
    }

    #[test]
    fn test_flag_via_either_alias_yields_same_value() {
        let long = ctx(&["template", "new", "--lang", "spanish"]);
        let short = ctx(&["template", "new", "-l", "spanish"]);
        assert_eq!(long.string("lang"), short.string("lang"));
        assert_eq!(long.string("lang"), "spanish");
    }

    #[test]
    fn test_conflicting_alias_rejected() {
        let err = run(&["template", "new", "--lang", "spanish", "-l", "english"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::ConflictingAlias {
                flag: "lang".into(),
                first: "lang".into(),
                second: "l".into(),
            }
        );
    }

    #[test]
    fn test_repeated_same_alias_overwrites_scalar() {
        let ctx = ctx(&["template", "new", "--lang", "es", "--lang", "fi"]);
        assert_eq!(ctx.string("lang"), "fi");
    }

    #[test]
    fn test_list_flag_accumulates_in_order() {
        let ctx = ctx(&["template", "new", "--tag", "a", "--tag", "b", "--tag", "c"]);
        assert_eq!(ctx.list("tag"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_inline_equals_value() {
        let ctx = ctx(&["template", "new", "--lang=fi", "--copies=3"]);
        assert_eq!(ctx.string("lang"), "fi");
        assert_eq!(ctx.int("copies"), 3);
    }

    #[test]
    fn test_bool_flag_zero_arity() {
        let ctx = ctx(&["--debug", "template", "new", "positional"]);
        assert!(ctx.boolean("debug"));
        assert_eq!(ctx.args().first(), Some("positional"));
    }

    #[test]
    fn test_bool_flag_explicit_inline_value() {
        let ctx = ctx(&["--debug=false", "template", "new"]);
        assert!(!ctx.boolean("debug"));
    }

    #[test]
    fn test_global_flag_matched_from_inner_depth() {
        // -d is declared on the root; it resolves from the leaf scope.
        let ctx = ctx(&["template", "new", "-d"]);
        assert!(ctx.boolean("debug"));
    }

    #[test]
    fn test_unknown_flag_names_current_command() {
        let err = run(&["template", "new", "-asdf"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownFlag {
                command: "new".into(),
                flag: "-asdf".into(),
            }
        );
    }

    #[test]
    fn test_missing_flag_value() {
        let err = run(&["template", "new", "--lang"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingFlagValue {
                flag: "--lang, -l".into(),
            }
        );
    }

    #[test]
    fn test_type_coercion_failure() {
        let err = run(&["template", "new", "--copies", "many"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::TypeCoercion {
                flag: "--copies".into(),
                kind: FlagKind::Int,
                value: "many".into(),
            }
        );
    }

    #[test]
    fn test_missing_required_flag() {
        let err = run(&["run"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingRequiredFlag {
                flag: "--iface, -i".into(),
            }
        );
    }

    #[test]
    fn test_required_not_enforced_on_ancestors() {
        // "run" declares the required flag; resolving its sibling does not.
        let ctx = ctx(&["template", "rm"]);
        assert_eq!(ctx.command(), "remove");
    }

    #[test]
    fn test_default_applied_when_absent() {
        let ctx = ctx(&["template", "new"]);
        assert_eq!(ctx.string("log"), "info");
        assert_eq!(ctx.int("copies"), 1);
    }

    #[test]
    fn test_help_flag_short_circuits_required_check() {
        match run(&["run", "--help"]).unwrap() {
            Resolution::Help(req) => {
                let tree = tree();
                assert_eq!(tree.command(req.target).name(), "run");
            }
            Resolution::Run(_) => panic!("expected help outcome"),
        }
    }

    #[test]
    fn test_help_command_resolves_topic_path() {
        match run(&["help", "template", "new"]).unwrap() {
            Resolution::Help(req) => {
                let tree = tree();
                assert_eq!(tree.path(req.target), "netd->template->new");
            }
            Resolution::Run(_) => panic!("expected help outcome"),
        }
    }

    #[test]
    fn test_nested_help_command_is_relative() {
        match run(&["template", "help", "new"]).unwrap() {
            Resolution::Help(req) => {
                let tree = tree();
                assert_eq!(tree.path(req.target), "netd->template->new");
            }
            Resolution::Run(_) => panic!("expected help outcome"),
        }
    }

    #[test]
    fn test_bad_help_topic_path() {
        let err = run(&["help", "template", "new", "asdf"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownCommand {
                path: "netd->template->new->asdf".into(),
            }
        );
    }

    #[test]
    fn test_help_flag_before_descent_targets_terminal() {
        match run(&["--help", "template"]).unwrap() {
            Resolution::Help(req) => {
                let tree = tree();
                assert_eq!(tree.command(req.target).name(), "template");
            }
            Resolution::Run(_) => panic!("expected help outcome"),
        }
    }

    #[test]
    fn test_bare_flag_spelling_is_positional() {
        // No dash prefix, so "lang" is a positional even though a flag
        // spells the same.
        let ctx = ctx(&["template", "new", "lang"]);
        assert_eq!(ctx.args().first(), Some("lang"));
        assert_eq!(ctx.string("lang"), "");
    }

    #[test]
    fn test_lone_dash_is_unknown_flag() {
        let err = run(&["-"]).unwrap_err();
        assert!(matches!(err, ParseError::UnknownFlag { .. }));
    }

    #[test]
    fn test_flag_value_may_look_like_a_flag() {
        // A value-taking flag consumes the next token unconditionally.
        let ctx = ctx(&["template", "new", "--lang", "-d"]);
        assert_eq!(ctx.string("lang"), "-d");
        assert!(!ctx.boolean("debug"));
    }
}
