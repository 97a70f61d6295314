//! Help page rendering via minijinja templates.

use minijinja::Environment;
use thiserror::Error;

use super::data::extract_help_data;
use crate::app::AppMeta;
use crate::tree::{CommandId, CommandTree};

/// Per-app help template overrides. `None` keeps the built-in template.
/// Templates receive the extracted help data and own the output shape
/// entirely.
#[derive(Debug, Clone, Default)]
pub struct HelpConfig {
    /// Replacement for the application (root) page template.
    pub app_template: Option<String>,
    /// Replacement for the command page template.
    pub cmd_template: Option<String>,
}

/// Help template rendering failure.
#[derive(Debug, Error)]
#[error("help template error: {0}")]
pub struct RenderError(#[from] minijinja::Error);

/// Renders the help page for `target`: the application template at the
/// root, the command template anywhere below. App metadata (version,
/// authors, copyright) is surfaced only on the root page.
pub fn render_help(
    tree: &CommandTree,
    target: CommandId,
    meta: &AppMeta,
    config: &HelpConfig,
) -> Result<String, RenderError> {
    let (template, meta) = if target == CommandTree::ROOT {
        let template = config
            .app_template
            .as_deref()
            .unwrap_or(include_str!("template_app.txt"));
        (template, Some(meta))
    } else {
        let template = config
            .cmd_template
            .as_deref()
            .unwrap_or(include_str!("template_cmd.txt"));
        (template, None)
    };
    let data = extract_help_data(tree, target, meta);
    let env = Environment::new();
    Ok(env.render_str(template, &data)?)
}
