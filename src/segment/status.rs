//! The `status` segment: success/failure coloring for the last command's
//! exit status, plus the root/non-privileged prompt indicator.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct StatusTheme {
    pub success_fg: Color,
    pub success_bg: Color,
    pub failure_fg: Color,
    pub failure_bg: Color,
    pub root_indicator: String,
    pub user_indicator: String,
}

impl Default for StatusTheme {
    fn default() -> Self {
        Self {
            success_fg: Color::basic(15),
            success_bg: Color::indexed(236),
            failure_fg: Color::basic(15),
            failure_bg: Color::indexed(161),
            root_indicator: "#".into(),
            user_indicator: "$".into(),
        }
    }
}

pub struct Status;

impl Segment for Status {
    fn name(&self) -> &'static str {
        "status"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(ctx.last_exit_status != 0 && theme.segment_enabled("status"))
    }

    fn render(&self, ctx: &Context, theme: &Theme) -> (Vec<u8>, bool) {
        let t = &theme.palette.status;
        let indicator = if ctx.is_root() { &t.root_indicator } else { &t.user_indicator };
        (indicator.clone().into_bytes(), false)
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        match prop {
            "code" => Some(ctx.last_exit_status.to_string()),
            "success" => Some((ctx.last_exit_status == 0).to_string()),
            _ => None,
        }
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let t = &theme.palette.status;
        let (fg, bg) = if ctx.last_exit_status == 0 { (t.success_fg, t.success_bg) } else { (t.failure_fg, t.failure_bg) };
        let indicator = if ctx.is_root() { &t.root_indicator } else { &t.user_indicator };
        vec![PowerlineSegment { content: indicator.clone(), fg, bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_on_success() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        assert!(!Status.is_visible(&ctx, &theme).is_visible());
    }

    #[test]
    fn visible_on_failure() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.last_exit_status = 1;
        let theme = Theme::default();
        assert!(Status.is_visible(&ctx, &theme).is_visible());
    }

    #[test]
    fn nonzero_exit_uses_failure_colors() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.last_exit_status = 1;
        let theme = Theme::default();
        let blocks = Status.render_powerline(&ctx, &theme);
        assert_eq!(blocks[0].bg, theme.palette.status.failure_bg);
    }

    #[test]
    fn root_gets_root_indicator() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.euid = 0;
        let theme = Theme::default();
        let (bytes, _) = Status.render(&ctx, &theme);
        assert_eq!(bytes, b"#");
    }
}
