//! The `jobs` segment: count of the shell's background jobs.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct JobsTheme {
    pub fg: Color,
    pub bg: Color,
}

impl Default for JobsTheme {
    fn default() -> Self {
        Self { fg: Color::basic(15), bg: Color::indexed(24) }
    }
}

pub struct Jobs;

impl Segment for Jobs {
    fn name(&self) -> &'static str {
        "jobs"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(ctx.job_count > 0 && theme.segment_enabled("jobs"))
    }

    fn render(&self, ctx: &Context, _theme: &Theme) -> (Vec<u8>, bool) {
        (ctx.job_count.to_string().into_bytes(), ctx.job_count == 0)
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        (prop == "count").then(|| ctx.job_count.to_string())
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        if ctx.job_count == 0 {
            return Vec::new();
        }
        let t = &theme.palette.jobs;
        vec![PowerlineSegment { content: format!("\u{2699}{}", ctx.job_count), fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_when_no_background_jobs() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        assert!(!Jobs.is_visible(&ctx, &theme).is_visible());
    }

    #[test]
    fn visible_with_job_count() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.job_count = 2;
        let theme = Theme::default();
        assert!(Jobs.is_visible(&ctx, &theme).is_visible());
        assert_eq!(Jobs.render_powerline(&ctx, &theme)[0].content, "\u{2699}2");
    }
}
