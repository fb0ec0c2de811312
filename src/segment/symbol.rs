//! The `symbol` segment: a single glyph, colored by the last command's
//! exit status — the prompt's final, most glanceable signal.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct SymbolTheme {
    pub success_fg: Color,
    pub failure_fg: Color,
    pub bg: Color,
    pub glyph: String,
    pub root_glyph: String,
}

impl Default for SymbolTheme {
    fn default() -> Self {
        Self {
            success_fg: Color::indexed(2),
            failure_fg: Color::indexed(1),
            bg: Color::none(),
            glyph: "\u{276f}".into(),
            root_glyph: "\u{2620}".into(),
        }
    }
}

pub struct Symbol;

impl Segment for Symbol {
    fn name(&self) -> &'static str {
        "symbol"
    }

    fn is_visible(&self, _ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(theme.segment_enabled("symbol"))
    }

    fn render(&self, ctx: &Context, theme: &Theme) -> (Vec<u8>, bool) {
        let t = &theme.palette.symbol;
        let glyph = if ctx.is_root() { &t.root_glyph } else { &t.glyph };
        (glyph.clone().into_bytes(), false)
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let t = &theme.palette.symbol;
        let fg = if ctx.last_exit_status == 0 { t.success_fg } else { t.failure_fg };
        let glyph = if ctx.is_root() { &t.root_glyph } else { &t.glyph };
        vec![PowerlineSegment { content: glyph.clone(), fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_changes_color_not_glyph() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.last_exit_status = 1;
        let theme = Theme::default();
        let blocks = Symbol.render_powerline(&ctx, &theme);
        assert_eq!(blocks[0].fg, theme.palette.symbol.failure_fg);
        assert_eq!(blocks[0].content, theme.palette.symbol.glyph);
    }
}
