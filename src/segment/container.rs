//! The `container` segment: flags that the shell is running inside a
//! container (Docker, Podman, systemd-nspawn).

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ContainerTheme {
    pub fg: Color,
    pub bg: Color,
    pub glyph: String,
}

impl Default for ContainerTheme {
    fn default() -> Self {
        Self { fg: Color::basic(15), bg: Color::indexed(68), glyph: "\u{1f433}".into() }
    }
}

pub struct Container;

impl Segment for Container {
    fn name(&self) -> &'static str {
        "container"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(ctx.container_name.is_some() && theme.segment_enabled("container"))
    }

    fn render(&self, ctx: &Context, _theme: &Theme) -> (Vec<u8>, bool) {
        match &ctx.container_name {
            Some(name) => (name.clone().into_bytes(), false),
            None => (Vec::new(), true),
        }
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let Some(name) = &ctx.container_name else { return Vec::new() };
        let t = &theme.palette.container;
        vec![PowerlineSegment { content: format!("{} {name}", t.glyph), fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_when_container_name_set() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.container_name = Some("docker".into());
        let theme = Theme::default();
        assert!(Container.is_visible(&ctx, &theme).is_visible());
    }
}
