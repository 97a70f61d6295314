//! Help data extraction from the command tree.

use serde::Serialize;

use crate::app::AppMeta;
use crate::tree::{CommandId, CommandTree};

#[derive(Debug, Serialize)]
pub(crate) struct HelpData {
    pub name: String,
    pub usage: String,
    pub argsusage: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub copyright: Option<String>,
    pub command_groups: Vec<CommandGroupData>,
    pub options: Vec<OptionData>,
}

/// Visible subcommands sharing one category label, in insertion order.
#[derive(Debug, Serialize)]
pub(crate) struct CommandGroupData {
    pub category: Option<String>,
    pub commands: Vec<EntryData>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EntryData {
    pub display: String,
    pub padding: String,
    pub usage: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OptionData {
    pub display: String,
    pub padding: String,
    pub usage: String,
}

/// Collects the template data for the help page of `id`. App metadata is
/// passed only for the root page; command pages omit version and friends.
pub(crate) fn extract_help_data(
    tree: &CommandTree,
    id: CommandId,
    meta: Option<&AppMeta>,
) -> HelpData {
    let command = tree.command(id);

    // Group visible children by category in first-appearance order.
    let mut groups: Vec<(Option<String>, Vec<(String, String)>)> = Vec::new();
    for child_id in tree.children(id) {
        let child = tree.command(*child_id);
        if child.is_hidden() {
            continue;
        }
        let category = child.category_label().map(str::to_string);
        let entry = (child.display(), child.usage_text().to_string());
        match groups.iter_mut().find(|(label, _)| *label == category) {
            Some((_, entries)) => entries.push(entry),
            None => groups.push((category, vec![entry])),
        }
    }
    let command_groups = groups
        .into_iter()
        .map(|(category, entries)| {
            let width = entries.iter().map(|(d, _)| d.len()).max().unwrap_or(0);
            CommandGroupData {
                category,
                commands: entries
                    .into_iter()
                    .map(|(display, usage)| EntryData {
                        padding: " ".repeat(width.saturating_sub(display.len())),
                        display,
                        usage,
                    })
                    .collect(),
            }
        })
        .collect();

    let visible = command.visible_flags();
    let width = visible
        .iter()
        .map(|f| f.display().len())
        .max()
        .unwrap_or(0);
    let options = visible
        .iter()
        .map(|f| {
            let display = f.display();
            OptionData {
                padding: " ".repeat(width.saturating_sub(display.len())),
                display,
                usage: f.usage_text().to_string(),
            }
        })
        .collect();

    HelpData {
        name: command.name().to_string(),
        usage: command.usage_text().to_string(),
        argsusage: command.argsusage.clone(),
        version: meta.map(|m| m.version.clone()),
        description: meta.and_then(|m| m.description.clone()),
        authors: meta.map(author_lines).unwrap_or_default(),
        copyright: meta.and_then(|m| m.copyright.clone()),
        command_groups,
        options,
    }
}

/// The contact email, when set, is attached to the first author line.
fn author_lines(meta: &AppMeta) -> Vec<String> {
    let mut authors = meta.authors.clone();
    if let (Some(email), Some(first)) = (meta.email.as_ref(), authors.first_mut()) {
        *first = format!("{} <{}>", first, email);
    }
    authors
}
