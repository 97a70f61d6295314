//! Arena-backed command tree.
//!
//! The declarative [`Command`] tree is flattened into an arena of nodes
//! indexed by [`CommandId`]. Parent links are plain indices, so scoped
//! flag lookup and ancestor-chain construction need no cyclic references.
//!
//! Building the tree also performs the two construction-time steps the
//! resolver relies on:
//!
//! - validation: sibling command names/aliases must not overlap, and a
//!   flag alias must be unique within its command's combined (own plus
//!   inherited) namespace;
//! - implicit help injection: a reserved `help`/`h` subcommand at every
//!   level and a reserved `--help`/`-h` flag at the root, each skipped
//!   when a user declaration shadows it. The root flag reaches every
//!   depth through the ordinary inherited lookup.

use crate::command::Command;
use crate::error::ConfigError;
use crate::flag::Flag;

/// Index of a command node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(pub(crate) usize);

#[derive(Debug)]
struct CommandNode {
    command: Command,
    parent: Option<CommandId>,
    children: Vec<CommandId>,
    /// Marks the injected help command; resolving onto it short-circuits
    /// into a help render request.
    is_help: bool,
}

/// Read-only command/flag tree shared by resolver, dispatcher, and help.
#[derive(Debug)]
pub struct CommandTree {
    nodes: Vec<CommandNode>,
}

impl CommandTree {
    /// The root node, i.e. the application itself.
    pub const ROOT: CommandId = CommandId(0);

    /// Flattens `root` into an arena, validating namespaces and injecting
    /// the implicit help entries.
    pub fn build(root: Command) -> Result<Self, ConfigError> {
        let mut tree = CommandTree { nodes: Vec::new() };
        tree.insert(root, None, false)?;
        Ok(tree)
    }

    fn insert(
        &mut self,
        mut command: Command,
        parent: Option<CommandId>,
        is_help: bool,
    ) -> Result<CommandId, ConfigError> {
        validate_flags(&command, parent, self)?;
        validate_siblings(&command)?;

        if parent.is_none() && !command.flags.iter().any(|f| f.matches("help")) {
            let help = implicit_help_flag(&command);
            command.flags.push(help);
        }

        let children = std::mem::take(&mut command.children);
        let id = CommandId(self.nodes.len());
        self.nodes.push(CommandNode {
            command,
            parent,
            children: Vec::new(),
            is_help,
        });

        for child in children {
            let child_id = self.insert(child, Some(id), false)?;
            self.nodes[id.0].children.push(child_id);
        }

        if !is_help {
            if let Some(help) = implicit_help_command(self, id) {
                let help_id = self.insert(help, Some(id), true)?;
                self.nodes[id.0].children.push(help_id);
            }
        }

        Ok(id)
    }

    pub fn command(&self, id: CommandId) -> &Command {
        &self.nodes[id.0].command
    }

    pub fn parent(&self, id: CommandId) -> Option<CommandId> {
        self.nodes[id.0].parent
    }

    /// Child ids in insertion order.
    pub fn children(&self, id: CommandId) -> &[CommandId] {
        &self.nodes[id.0].children
    }

    /// True for the injected help command node.
    pub fn is_help(&self, id: CommandId) -> bool {
        self.nodes[id.0].is_help
    }

    /// Ancestor chain from the root down to `id`, inclusive.
    pub fn chain(&self, id: CommandId) -> Vec<CommandId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// `->`-joined command path from the root to `id`.
    pub fn path(&self, id: CommandId) -> String {
        self.chain(id)
            .iter()
            .map(|c| self.command(*c).name())
            .collect::<Vec<_>>()
            .join("->")
    }

    /// Finds the child of `id` matching `token` by name or alias
    /// (case-sensitive).
    pub fn find_child(&self, id: CommandId, token: &str) -> Option<CommandId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.command(*c).has_name(token))
    }

    /// Looks up a flag alias from `id` outward through its ancestors,
    /// innermost scope first. Returns the owning command and the flag.
    pub fn lookup_flag(&self, id: CommandId, alias: &str) -> Option<(CommandId, &Flag)> {
        let mut current = Some(id);
        while let Some(scope) = current {
            if let Some(flag) = self.command(scope).flags().iter().find(|f| f.matches(alias)) {
                return Some((scope, flag));
            }
            current = self.parent(scope);
        }
        None
    }
}

/// The reserved `--help` flag injected at the root. The short alias is
/// dropped when a root flag already claims `h`.
fn implicit_help_flag(root: &Command) -> Flag {
    let name = if root.flags.iter().any(|f| f.matches("h")) {
        "help"
    } else {
        "help, h"
    };
    let mut flag = Flag::boolean(name).usage("shows main help");
    flag.implicit = true;
    flag
}

/// The reserved `help` subcommand for `id`, or `None` when a user child
/// shadows the name. The short alias is dropped when `h` is taken.
fn implicit_help_command(tree: &CommandTree, id: CommandId) -> Option<Command> {
    let taken = |name: &str| {
        tree.children(id)
            .iter()
            .any(|c| tree.command(*c).has_name(name))
    };
    if taken("help") {
        return None;
    }
    let mut help = Command::new("help")
        .usage("shows help for a command")
        .argsusage("[command...]");
    if !taken("h") {
        help = help.alias("h");
    }
    Some(help)
}

/// A flag alias must be unique within the command's own set and against
/// every ancestor's. Implicit (injected) flags are exempt on either side,
/// so a user flag may shadow the reserved `--help`.
fn validate_flags(
    command: &Command,
    parent: Option<CommandId>,
    tree: &CommandTree,
) -> Result<(), ConfigError> {
    for (n, flag) in command.flags.iter().enumerate() {
        if flag.names().is_empty() {
            return Err(ConfigError::EmptyFlagName {
                command: command.name.clone(),
            });
        }
        if let Some(default) = flag.default() {
            if default.kind() != flag.kind() {
                return Err(ConfigError::DefaultKind {
                    command: command.name.clone(),
                    flag: flag.display(),
                    expected: flag.kind(),
                    found: default.kind(),
                });
            }
        }
        for other in &command.flags[..n] {
            if flag.names().iter().any(|name| other.matches(name)) {
                return Err(ConfigError::DuplicateFlag {
                    command: command.name.clone(),
                    flag: flag.display(),
                    other: other.display(),
                });
            }
        }
        if flag.implicit {
            continue;
        }
        let mut scope = parent;
        while let Some(ancestor) = scope {
            for other in tree.command(ancestor).flags() {
                if !other.implicit && flag.names().iter().any(|name| other.matches(name)) {
                    return Err(ConfigError::DuplicateFlag {
                        command: command.name.clone(),
                        flag: flag.display(),
                        other: other.display(),
                    });
                }
            }
            scope = tree.parent(ancestor);
        }
    }
    Ok(())
}

/// Sibling command names and aliases must not overlap (case-sensitive).
fn validate_siblings(command: &Command) -> Result<(), ConfigError> {
    for (n, child) in command.children.iter().enumerate() {
        for other in &command.children[..n] {
            let mut names = vec![child.name.as_str()];
            names.extend(child.aliases.iter().map(String::as_str));
            if let Some(overlap) = names.iter().find(|name| other.has_name(name)) {
                return Err(ConfigError::DuplicateCommand {
                    command: command.name.clone(),
                    child: overlap.to_string(),
                    other: other.name.clone(),
                });
            }
        }
    }
    Ok(())
}
