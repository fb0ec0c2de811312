//! The `cmd_duration` segment: how long the last foreground command ran,
//! shown only above a minimum threshold so quick commands don't add noise.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CmdDurationTheme {
    pub fg: Color,
    pub bg: Color,
    pub min_ms: u64,
}

impl Default for CmdDurationTheme {
    fn default() -> Self {
        Self { fg: Color::indexed(230), bg: Color::indexed(136), min_ms: 2_000 }
    }
}

fn humanize(ms: u64) -> String {
    if ms < 1_000 {
        return format!("{ms}ms");
    }
    let secs = ms / 1_000;
    if secs < 60 {
        return format!("{secs}s");
    }
    format!("{}m{}s", secs / 60, secs % 60)
}

pub struct CmdDuration;

impl Segment for CmdDuration {
    fn name(&self) -> &'static str {
        "cmd_duration"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        let shown = ctx.last_command_duration_ms.is_some_and(|ms| ms >= theme.palette.cmd_duration.min_ms);
        Visibility::from(shown && theme.segment_enabled("cmd_duration"))
    }

    fn render(&self, ctx: &Context, _theme: &Theme) -> (Vec<u8>, bool) {
        match ctx.last_command_duration_ms {
            Some(ms) => (humanize(ms).into_bytes(), false),
            None => (Vec::new(), true),
        }
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        if !self.is_visible(ctx, theme).is_visible() {
            return Vec::new();
        }
        let t = &theme.palette.cmd_duration;
        let ms = ctx.last_command_duration_ms.unwrap_or(0);
        vec![PowerlineSegment { content: humanize(ms), fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_below_threshold() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.last_command_duration_ms = Some(50);
        let theme = Theme::default();
        assert!(!CmdDuration.is_visible(&ctx, &theme).is_visible());
    }

    #[test]
    fn humanizes_minutes() {
        assert_eq!(humanize(65_000), "1m5s");
        assert_eq!(humanize(500), "500ms");
        assert_eq!(humanize(4_000), "4s");
    }
}
