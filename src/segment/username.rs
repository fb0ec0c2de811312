//! The `user` segment: current username, styled by whether we're root.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct UsernameTheme {
    pub fg: Color,
    pub bg: Color,
    pub root_fg: Color,
    pub root_bg: Color,
}

impl Default for UsernameTheme {
    fn default() -> Self {
        Self {
            fg: Color::indexed(250),
            bg: Color::indexed(240),
            root_fg: Color::basic(15),
            root_bg: Color::indexed(124),
        }
    }
}

pub struct Username;

impl Segment for Username {
    fn name(&self) -> &'static str {
        "user"
    }

    fn is_visible(&self, _ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(theme.segment_enabled("user"))
    }

    fn render(&self, ctx: &Context, _theme: &Theme) -> (Vec<u8>, bool) {
        (ctx.username.clone().into_bytes(), ctx.username.is_empty())
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        match prop {
            "name" => Some(ctx.username.clone()),
            "is_root" => Some(ctx.is_root().to_string()),
            _ => None,
        }
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let t = &theme.palette.user;
        let (fg, bg) = if ctx.is_root() { (t.root_fg, t.root_bg) } else { (t.fg, t.bg) };
        vec![PowerlineSegment { content: ctx.username.clone(), fg, bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_gets_distinct_colors() {
        let theme = Theme::default();
        let mut ctx = crate::context::test_support::sample_context();
        ctx.euid = 0;
        let blocks = Username.render_powerline(&ctx, &theme);
        assert_eq!(blocks[0].fg, theme.palette.user.root_fg);
    }
}
