//! The `host` segment: short or fully-qualified hostname, selected by a
//! theme toggle.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct HostTheme {
    pub fg: Color,
    pub bg: Color,
    pub show_domain: bool,
}

impl Default for HostTheme {
    fn default() -> Self {
        Self { fg: Color::indexed(250), bg: Color::indexed(238), show_domain: false }
    }
}

pub struct Host;

impl Host {
    fn text(ctx: &Context, theme: &Theme) -> String {
        if theme.palette.host.show_domain {
            ctx.hostname_full.clone()
        } else {
            ctx.hostname_short.clone()
        }
    }
}

impl Segment for Host {
    fn name(&self) -> &'static str {
        "host"
    }

    fn is_visible(&self, _ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(theme.segment_enabled("host"))
    }

    fn render(&self, ctx: &Context, theme: &Theme) -> (Vec<u8>, bool) {
        let text = Self::text(ctx, theme);
        let empty = text.is_empty();
        (text.into_bytes(), empty)
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        match prop {
            "short" => Some(ctx.hostname_short.clone()),
            "full" => Some(ctx.hostname_full.clone()),
            _ => None,
        }
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let t = &theme.palette.host;
        vec![PowerlineSegment { content: Self::text(ctx, theme), fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_by_default() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        let (bytes, empty) = Host.render(&ctx, &theme);
        assert!(!empty);
        assert_eq!(String::from_utf8(bytes).unwrap(), "devbox");
    }

    #[test]
    fn full_when_configured() {
        let ctx = crate::context::test_support::sample_context();
        let mut theme = Theme::default();
        theme.palette.host.show_domain = true;
        let (bytes, _) = Host.render(&ctx, &theme);
        assert_eq!(String::from_utf8(bytes).unwrap(), "devbox.local");
    }
}
