//! The `virtualenv` segment: active Python virtualenv/conda environment.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct VirtualenvTheme {
    pub fg: Color,
    pub bg: Color,
    pub glyph: String,
}

impl Default for VirtualenvTheme {
    fn default() -> Self {
        Self { fg: Color::basic(0), bg: Color::indexed(220), glyph: "\u{1f40d}".into() }
    }
}

pub struct Virtualenv;

impl Segment for Virtualenv {
    fn name(&self) -> &'static str {
        "virtualenv"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(ctx.virtualenv.is_some() && theme.segment_enabled("virtualenv"))
    }

    fn render(&self, ctx: &Context, _theme: &Theme) -> (Vec<u8>, bool) {
        match &ctx.virtualenv {
            Some(name) => (name.clone().into_bytes(), false),
            None => (Vec::new(), true),
        }
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        (prop == "name").then(|| ctx.virtualenv.clone()).flatten()
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let Some(name) = &ctx.virtualenv else { return Vec::new() };
        let t = &theme.palette.virtualenv;
        vec![PowerlineSegment { content: format!("{} {name}", t.glyph), fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_without_active_env() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        assert!(!Virtualenv.is_visible(&ctx, &theme).is_visible());
    }

    #[test]
    fn shows_env_name() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.virtualenv = Some("myenv".into());
        let theme = Theme::default();
        let blocks = Virtualenv.render_powerline(&ctx, &theme);
        assert!(blocks[0].content.contains("myenv"));
    }
}
