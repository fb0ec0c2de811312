//! Pass-1 template engine: resolves `${...}` segment and conditional
//! syntax against the segment registry and render context, leaving
//! everything else — including bash `\X` and zsh `%X` escapes — untouched
//! for [`crate::escape`] to expand in pass 2. A single left-to-right scan.

use crate::context::Context;
use crate::segment;
use crate::theme::Theme;

/// Runs the pass-1 scan over `format`, returning the pass-2 input.
pub fn expand(format: &str, ctx: &Context, theme: &Theme) -> String {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.char_indices().peekable();
    let bytes = format.as_bytes();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.peek().map(|(_, c)| *c) {
                Some('n') => {
                    out.push('\n');
                    chars.next();
                }
                Some('\\') => {
                    out.push('\\');
                    chars.next();
                }
                Some('$') => {
                    out.push('$');
                    chars.next();
                }
                _ => out.push('\\'),
            },
            '$' if bytes.get(i + 1) == Some(&b'{') => {
                let Some(close) = find_matching_brace(format, i + 1) else {
                    out.push('$');
                    continue;
                };
                let inner = &format[i + 2..close];
                out.push_str(&expand_directive(inner, ctx, theme));
                while let Some((j, _)) = chars.peek() {
                    if *j >= close {
                        break;
                    }
                    chars.next();
                }
                // consume the closing brace itself
                if let Some((j, cc)) = chars.peek() {
                    if *j == close && *cc == '}' {
                        chars.next();
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Finds the `}` matching the `{` at `open_brace_idx`, respecting nested
/// `${...}` groups so `${?git:${directory}}` parses correctly.
fn find_matching_brace(s: &str, open_brace_idx: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = open_brace_idx;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn expand_directive(inner: &str, ctx: &Context, theme: &Theme) -> String {
    if let Some(rest) = inner.strip_prefix('?') {
        return expand_conditional(rest, ctx, theme);
    }

    if let Some(colon) = top_level_colon(inner) {
        let color_name = &inner[..colon];
        let text = &inner[colon + 1..];
        if let Some(color) = theme.colors.get(color_name) {
            let color = color.downgrade(ctx.capabilities.has_truecolor, ctx.capabilities.has_256_color);
            let mut buf = String::new();
            buf.push_str(&color.to_ansi_string(true));
            buf.push_str(text);
            buf.push_str(&crate::color::Color::none().to_ansi_string(true));
            return buf;
        }
        // Not a known color name — pass the whole `${...}` through unchanged.
        return format!("${{{inner}}}");
    }

    let (name, prop) = match inner.split_once('.') {
        Some((name, prop)) => (name, Some(prop)),
        None => (inner, None),
    };

    let Some(seg) = segment::find(name) else {
        return format!("${{{inner}}}");
    };

    match prop {
        Some(prop) => seg.property(prop, ctx).unwrap_or_default(),
        None => {
            let base_visible = seg.is_visible(ctx, theme).is_visible();
            if !theme.segment_shown(name, base_visible) {
                return String::new();
            }
            if let Some(format) = theme.segment_override(name).and_then(|o| o.format.as_deref()) {
                return expand(format, ctx, theme);
            }
            let (bytes, empty) = seg.render(ctx, theme);
            if empty {
                String::new()
            } else {
                String::from_utf8_lossy(&bytes).into_owned()
            }
        }
    }
}

fn expand_conditional(rest: &str, ctx: &Context, theme: &Theme) -> String {
    let Some(colon) = rest.find(':') else {
        return String::new();
    };
    let name = &rest[..colon];
    let remainder = &rest[colon + 1..];

    let (true_text, false_text) = match top_level_colon(remainder) {
        Some(split) => (&remainder[..split], &remainder[split + 1..]),
        None => (remainder, ""),
    };

    let visible = segment::find(name)
        .map(|seg| theme.segment_shown(name, seg.is_visible(ctx, theme).is_visible()))
        .unwrap_or(false);

    if visible {
        expand(true_text, ctx, theme)
    } else if false_text.is_empty() {
        String::new()
    } else {
        expand(false_text, ctx, theme)
    }
}

/// Finds the first `:` not nested inside a `${...}` group, so
/// `${?git:${git.branch}:none}` splits on the right colon.
fn top_level_colon(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ':' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_segment_name_passes_through() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        assert_eq!(expand("${bogus}", &ctx, &theme), "${bogus}");
    }

    #[test]
    fn known_segment_substitutes_its_render() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        assert_eq!(expand("${user}", &ctx, &theme), "alice");
    }

    #[test]
    fn property_lookup_reads_a_sub_value() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        assert_eq!(expand("${directory.basename}", &ctx, &theme), "project");
    }

    #[test]
    fn conditional_with_only_true_branch() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.job_count = 1;
        let theme = Theme::default();
        assert_eq!(expand("${?jobs:busy}", &ctx, &theme), "busy");
        ctx.job_count = 0;
        assert_eq!(expand("${?jobs:busy}", &ctx, &theme), "");
    }

    #[test]
    fn conditional_with_both_branches() {
        let mut ctx = crate::context::test_support::sample_context();
        ctx.job_count = 0;
        let theme = Theme::default();
        assert_eq!(expand("${?jobs:busy:idle}", &ctx, &theme), "idle");
    }

    #[test]
    fn minimal_escapes_are_honored_and_rest_passes_through() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        assert_eq!(expand("a\\nb", &ctx, &theme), "a\nb");
        assert_eq!(expand("\\$HOME", &ctx, &theme), "$HOME");
        assert_eq!(expand("\\u{user}", &ctx, &theme), "\\u{user}");
    }

    #[test]
    fn non_template_escapes_pass_through_for_pass_two() {
        let ctx = crate::context::test_support::sample_context();
        let theme = Theme::default();
        assert_eq!(expand("\\w", &ctx, &theme), "\\w");
    }
}
