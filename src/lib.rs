//! `libpromptweave` renders shell prompts from a unified pipeline: bash
//! `\X` escapes, zsh `%X` escapes, and a `${name}` template/segment syntax,
//! plus an optional powerline block renderer, a named theme registry, and
//! a background git-status worker so a dirty working tree never blocks a
//! prompt on a slow repository.
//!
//! Two render paths exist (see [`prompt::Prompt::render_prompt`]):
//! powerline block assembly, or the two-pass `template → escape` pipeline
//! used by plain bash/zsh-style prompt strings.

pub mod color;
pub mod context;
pub mod error;
pub mod escape;
pub mod powerline;
pub mod prompt;
pub mod segment;
pub mod shell;
pub mod subprocess;
pub mod template;
pub mod theme;
pub mod worker;

pub use error::{PromptError, Result};
pub use prompt::{Prompt, Which};
