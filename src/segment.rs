//! Segment registry.
//!
//! One trait implemented per segment type, with modules declared below. A
//! named, queryable registry, so the template engine can look segments up by
//! name (`${git}`, `${git.branch}`) rather than only assemble them in a
//! fixed configured order.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::theme::Theme;

/// Whether a segment should appear in this render. A plain `bool` would do,
/// but a named enum reads better at call sites than `if visible(...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl From<bool> for Visibility {
    fn from(value: bool) -> Self {
        if value {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// A named producer of prompt content. Implementors are stateless; all
/// per-render state comes from `Context`, all styling from `Theme`.
pub trait Segment: Send + Sync {
    /// Stable identifier used by the template engine (`${name}`) and theme
    /// configuration (`[segments.name]`).
    fn name(&self) -> &'static str;

    /// Whether this segment has anything to show for this render.
    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility;

    /// Plain-text (with inline color escapes already resolved as raw bytes,
    /// not yet capability-downgraded) rendering for the template engine's
    /// `${name}` substitution. The bool flags "nothing to render" distinctly
    /// from an empty but present string.
    fn render(&self, ctx: &Context, theme: &Theme) -> (Vec<u8>, bool);

    /// Named sub-value lookup for `${name.prop}`. `None` for an unknown
    /// property or when the segment has no value for it right now.
    fn property(&self, _prop: &str, _ctx: &Context) -> Option<String> {
        None
    }

    /// Colored blocks for the powerline renderer. Segments that don't
    /// participate in powerline layout (none currently) can leave this at
    /// the default empty vec.
    fn render_powerline(&self, _ctx: &Context, _theme: &Theme) -> Vec<PowerlineSegment> {
        Vec::new()
    }
}

pub mod aws;
pub mod cmd_duration;
pub mod container;
pub mod directory;
pub mod git;
pub mod host;
pub mod jobs;
pub mod kubernetes;
pub mod shlvl;
pub mod ssh;
pub mod status;
pub mod symbol;
pub mod time;
pub mod username;
pub mod virtualenv;

static REGISTRY: Lazy<HashMap<&'static str, Box<dyn Segment>>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Box<dyn Segment>> = HashMap::new();
    let mut add = |seg: Box<dyn Segment>| {
        m.insert(seg.name(), seg);
    };
    add(Box::new(username::Username));
    add(Box::new(host::Host));
    add(Box::new(directory::Directory));
    add(Box::new(git::Git));
    add(Box::new(time::Time));
    add(Box::new(status::Status));
    add(Box::new(jobs::Jobs));
    add(Box::new(symbol::Symbol));
    add(Box::new(shlvl::Shlvl));
    add(Box::new(ssh::Ssh));
    add(Box::new(cmd_duration::CmdDuration));
    add(Box::new(virtualenv::Virtualenv));
    add(Box::new(container::Container));
    add(Box::new(aws::Aws));
    add(Box::new(kubernetes::Kubernetes));
    m
});

/// Built-in segment names, in a fixed canonical order. User-defined
/// ordering comes from the active theme's `layout`, not this list.
pub const BUILTIN_NAMES: &[&str] = &[
    "user",
    "host",
    "directory",
    "git",
    "time",
    "status",
    "jobs",
    "symbol",
    "shlvl",
    "ssh",
    "cmd_duration",
    "virtualenv",
    "container",
    "aws",
    "kubernetes",
];

pub fn find(name: &str) -> Option<&'static dyn Segment> {
    REGISTRY.get(name).map(|b| b.as_ref())
}

pub fn all() -> impl Iterator<Item = &'static dyn Segment> {
    REGISTRY.values().map(|b| b.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_name_resolves() {
        for name in BUILTIN_NAMES {
            assert!(find(name).is_some(), "missing built-in segment: {name}");
        }
    }

    #[test]
    fn visibility_from_bool_round_trips() {
        assert!(Visibility::from(true).is_visible());
        assert!(!Visibility::from(false).is_visible());
    }
}
