//! The `directory` segment: the tilde-folded working directory, broken
//! into breadcrumb components for the powerline renderer, with distinct
//! home/last/middle coloring and an optional root-component toggle.

use std::path::Component;

use itertools::{Itertools, Position};

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct DirectoryTheme {
    pub fg: Color,
    pub bg: Color,
    pub home_fg: Color,
    pub home_bg: Color,
    pub last_fg: Color,
    pub last_bg: Color,
    pub home_glyph: String,
    pub show_root: bool,
}

impl Default for DirectoryTheme {
    fn default() -> Self {
        Self {
            fg: Color::indexed(250),
            bg: Color::indexed(237),
            home_fg: Color::basic(15),
            home_bg: Color::indexed(31),
            last_fg: Color::indexed(254),
            last_bg: Color::indexed(237),
            home_glyph: "~".into(),
            show_root: false,
        }
    }
}

pub struct Directory;

impl Segment for Directory {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn is_visible(&self, _ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(theme.segment_enabled("directory"))
    }

    fn render(&self, ctx: &Context, _theme: &Theme) -> (Vec<u8>, bool) {
        (ctx.cwd_tilde.clone().into_bytes(), ctx.cwd_tilde.is_empty())
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        match prop {
            "full" => Some(ctx.cwd_tilde.clone()),
            "basename" => Some(ctx.cwd_basename()),
            _ => None,
        }
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let t = &theme.palette.directory;
        let path = std::path::Path::new(&ctx.cwd_tilde);

        path.components()
            .with_position()
            .filter_map(|component| match component {
                Position::First(Component::RootDir) => {
                    t.show_root.then(|| PowerlineSegment { content: "/".into(), fg: t.fg, bg: t.bg })
                }
                Position::First(Component::Normal(p)) | Position::Only(Component::Normal(p)) => {
                    if p == t.home_glyph.as_str() {
                        Some(PowerlineSegment { content: t.home_glyph.clone(), fg: t.home_fg, bg: t.home_bg })
                    } else {
                        Some(PowerlineSegment { content: p.to_string_lossy().into_owned(), fg: t.fg, bg: t.bg })
                    }
                }
                Position::Middle(Component::Normal(p)) => {
                    Some(PowerlineSegment { content: p.to_string_lossy().into_owned(), fg: t.fg, bg: t.bg })
                }
                Position::Last(Component::Normal(p)) => {
                    Some(PowerlineSegment { content: p.to_string_lossy().into_owned(), fg: t.last_fg, bg: t.last_bg })
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_component_uses_home_colors() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.cwd_tilde = "~".into();
        let theme = Theme::default();
        let blocks = Directory.render_powerline(&ctx, &theme);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].fg, theme.palette.directory.home_fg);
    }

    #[test]
    fn nested_path_yields_one_block_per_component() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.cwd_tilde = "~/project/src".into();
        let theme = Theme::default();
        let blocks = Directory.render_powerline(&ctx, &theme);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].fg, theme.palette.directory.last_fg);
    }
}
