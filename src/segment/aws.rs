//! The `aws` segment: active AWS CLI profile and region.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AwsTheme {
    pub fg: Color,
    pub bg: Color,
    pub glyph: String,
}

impl Default for AwsTheme {
    fn default() -> Self {
        Self { fg: Color::basic(0), bg: Color::indexed(208), glyph: "\u{2601}".into() }
    }
}

pub struct Aws;

impl Segment for Aws {
    fn name(&self) -> &'static str {
        "aws"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(ctx.aws_profile.is_some() && theme.segment_enabled("aws"))
    }

    fn render(&self, ctx: &Context, _theme: &Theme) -> (Vec<u8>, bool) {
        match &ctx.aws_profile {
            Some(profile) => (profile.clone().into_bytes(), false),
            None => (Vec::new(), true),
        }
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        match prop {
            "profile" => ctx.aws_profile.clone(),
            "region" => ctx.aws_region.clone(),
            _ => None,
        }
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let Some(profile) = &ctx.aws_profile else { return Vec::new() };
        let t = &theme.palette.aws;
        let label = match &ctx.aws_region {
            Some(region) => format!("{} {profile} ({region})", t.glyph),
            None => format!("{} {profile}", t.glyph),
        };
        vec![PowerlineSegment { content: label, fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_region_when_set() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.aws_profile = Some("prod".into());
        ctx.aws_region = Some("us-east-1".into());
        let theme = Theme::default();
        let blocks = Aws.render_powerline(&ctx, &theme);
        assert!(blocks[0].content.contains("us-east-1"));
    }
}
