//! The `kubernetes` segment: active kubeconfig context and namespace.

use crate::color::Color;
use crate::context::Context;
use crate::powerline::PowerlineSegment;
use crate::segment::{Segment, Visibility};
use crate::theme::Theme;

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct KubernetesTheme {
    pub fg: Color,
    pub bg: Color,
    pub glyph: String,
}

impl Default for KubernetesTheme {
    fn default() -> Self {
        Self { fg: Color::basic(15), bg: Color::indexed(63), glyph: "\u{2388}".into() }
    }
}

pub struct Kubernetes;

impl Segment for Kubernetes {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        Visibility::from(ctx.kube_context.is_some() && theme.segment_enabled("kubernetes"))
    }

    fn render(&self, ctx: &Context, _theme: &Theme) -> (Vec<u8>, bool) {
        match &ctx.kube_context {
            Some(context) => (context.clone().into_bytes(), false),
            None => (Vec::new(), true),
        }
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        match prop {
            "context" => ctx.kube_context.clone(),
            "namespace" => ctx.kube_namespace.clone(),
            _ => None,
        }
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<PowerlineSegment> {
        let Some(context) = &ctx.kube_context else { return Vec::new() };
        let t = &theme.palette.kubernetes;
        let label = match &ctx.kube_namespace {
            Some(ns) => format!("{} {context}:{ns}", t.glyph),
            None => format!("{} {context}", t.glyph),
        };
        vec![PowerlineSegment { content: label, fg: t.fg, bg: t.bg }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_namespace_when_set() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.kube_context = Some("staging".into());
        ctx.kube_namespace = Some("default".into());
        let theme = Theme::default();
        let blocks = Kubernetes.render_powerline(&ctx, &theme);
        assert!(blocks[0].content.contains("staging:default"));
    }
}
