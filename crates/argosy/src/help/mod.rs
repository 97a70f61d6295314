//! Help page collaborator: data extraction plus template rendering.
//!
//! The core supplies the resolved command chain as plain serializable
//! data; formatting is wholly owned by the (swappable) minijinja
//! templates. See [`HelpConfig`] for per-app template overrides.

mod data;
mod render;

pub use render::{render_help, HelpConfig, RenderError};
