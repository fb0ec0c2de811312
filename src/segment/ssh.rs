//! The `ssh` segment: flags a remote login session.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct SshTheme {
    pub fg: Color,
    pub bg: Color,
    pub glyph: String,
}

impl Default for SshTheme {
    fn default() -> Self {
        Self { fg: Color::basic(15), bg: Color::indexed(61), glyph: "\u{1f310}".into() }
    }
}

pub struct Ssh;

impl Segment for Ssh {
    fn name(&self) -> &'static str {
        "ssh"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(ctx.is_ssh_session && theme.segment_enabled("ssh"))
    }

    fn render(&self, _ctx: &Context, theme: &Theme) -> (Vec<u8>, bool) {
        (theme.palette.ssh.glyph.clone().into_bytes(), false)
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        if !ctx.is_ssh_session {
            return Vec::new();
        }
        let t = &theme.palette.ssh;
        vec![PowerlineSegment { content: t.glyph.clone(), fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_outside_ssh() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        assert!(!Ssh.is_visible(&ctx, &theme).is_visible());
    }

    #[test]
    fn visible_over_ssh() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.is_ssh_session = true;
        let theme = Theme::default();
        assert!(Ssh.is_visible(&ctx, &theme).is_visible());
    }
}
