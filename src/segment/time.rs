//! The `time` segment: current wall-clock time, via `chrono` for display
//! formatting.

use chrono::Local;

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct TimeTheme {
    pub fg: Color,
    pub bg: Color,
    pub format: String,
}

impl Default for TimeTheme {
    fn default() -> Self {
        Self { fg: Color::indexed(250), bg: Color::indexed(236), format: "%H:%M:%S".into() }
    }
}

pub struct Time;

impl Segment for Time {
    fn name(&self) -> &'static str {
        "time"
    }

    fn is_visible(&self, _ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(theme.segment_enabled("time"))
    }

    fn render(&self, _ctx: &Context, theme: &Theme) -> (Vec<u8>, bool) {
        let text = Local::now().format(&theme.palette.time.format).to_string();
        (text.into_bytes(), false)
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let t = &theme.palette.time;
        let (content, _) = self.render(ctx, theme);
        vec![PowerlineSegment { content: String::from_utf8_lossy(&content).into_owned(), fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_configured_format() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        let (bytes, empty) = Time.render(&ctx, &theme);
        assert!(!empty);
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.matches(':').count(), 2);
    }
}
