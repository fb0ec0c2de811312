//! The `shlvl` segment: flags nested shells (`$SHLVL` above a threshold).

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ShlvlTheme {
    pub fg: Color,
    pub bg: Color,
    pub threshold: u32,
}

impl Default for ShlvlTheme {
    fn default() -> Self {
        Self { fg: Color::basic(15), bg: Color::indexed(166), threshold: 2 }
    }
}

pub struct Shlvl;

impl Segment for Shlvl {
    fn name(&self) -> &'static str {
        "shlvl"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(ctx.shell_level >= theme.palette.shlvl.threshold && theme.segment_enabled("shlvl"))
    }

    fn render(&self, ctx: &Context, _theme: &Theme) -> (Vec<u8>, bool) {
        (ctx.shell_level.to_string().into_bytes(), false)
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        (prop == "level").then(|| ctx.shell_level.to_string())
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        if !self.is_visible(ctx, theme).is_visible() {
            return Vec::new();
        }
        let t = &theme.palette.shlvl;
        vec![PowerlineSegment { content: format!("\u{25b2}{}", ctx.shell_level), fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_below_threshold() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.shell_level = 1;
        let theme = Theme::default();
        assert!(!Shlvl.is_visible(&ctx, &theme).is_visible());
    }

    #[test]
    fn visible_at_or_above_threshold() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.shell_level = 3;
        let theme = Theme::default();
        assert!(Shlvl.is_visible(&ctx, &theme).is_visible());
    }
}
