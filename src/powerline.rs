//! Powerline-style block rendering: fixed-color segments joined by arrow
//! separators. Adjacent segments sharing a background color collapse to
//! the "thin" separator instead of the full arrow, and the final segment
//! always gets a full arrow back to the terminal's own background.

use crate::color::Color;
use crate::theme::{Layout, Theme};

/// One colored block in a powerline render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerlineSegment {
    pub content: String,
    pub fg: Color,
    pub bg: Color,
}

/// Strips CSI sequences (`ESC [ ... final-byte`) a segment may have
/// embedded in its content — powerline blocks own their own coloring, so
/// any inline ANSI from a segment's `render()` would fight with it.
pub fn strip_csi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&next) {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// Renders `blocks` into a single string of SGR-colored text joined by
/// arrow separators, downgrading every color to the terminal's reported
/// capability before emission.
pub fn render(blocks: &[PowerlineSegment], theme: &Theme, has_truecolor: bool, has_256: bool) -> String {
    let layout = &theme.layout;
    let mut out = String::new();
    let n = blocks.len();

    for (i, block) in blocks.iter().enumerate() {
        let fg = block.fg.downgrade(has_truecolor, has_256);
        let bg = block.bg.downgrade(has_truecolor, has_256);

        out.push_str(&bg.to_ansi_string(false));
        out.push_str(&fg.to_ansi_string(true));
        out.push(' ');
        out.push_str(&strip_csi(&block.content));
        out.push(' ');

        if i + 1 < n {
            push_separator(&mut out, layout, block, &blocks[i + 1], has_truecolor, has_256);
        } else {
            out.push_str(&bg.to_ansi_string(true));
            out.push_str(&Color::none().to_ansi_string(false));
            out.push_str(&layout.thick_separator);
        }
    }

    out.push_str(&Color::reset_all());
    out
}

fn push_separator(
    out: &mut String,
    layout: &Layout,
    current: &PowerlineSegment,
    next: &PowerlineSegment,
    has_truecolor: bool,
    has_256: bool,
) {
    let same_bg = current.bg == next.bg;
    if same_bg && layout.collapse_matching_backgrounds {
        let fg = current.fg.downgrade(has_truecolor, has_256);
        out.push_str(&fg.to_ansi_string(true));
        out.push_str(&layout.thin_separator);
    } else {
        let cur_bg = current.bg.downgrade(has_truecolor, has_256);
        let next_bg = next.bg.downgrade(has_truecolor, has_256);
        out.push_str(&cur_bg.to_ansi_string(true));
        out.push_str(&next_bg.to_ansi_string(false));
        out.push_str(&layout.thick_separator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_csi_removes_embedded_escapes() {
        assert_eq!(strip_csi("\x1b[31mred\x1b[0m"), "red");
        assert_eq!(strip_csi("plain"), "plain");
    }

    #[test]
    fn block_count_drives_separator_count() {
        let theme = Theme::default();
        let blocks = vec![
            PowerlineSegment { content: "a".into(), fg: Color::basic(7), bg: Color::basic(1) },
            PowerlineSegment { content: "b".into(), fg: Color::basic(7), bg: Color::basic(2) },
        ];
        let rendered = render(&blocks, &theme, true, true);
        assert_eq!(rendered.matches(&theme.layout.thick_separator).count(), 2);
    }

    #[test]
    fn matching_backgrounds_collapse_to_thin_separator() {
        let theme = Theme::default();
        let bg = Color::indexed(24);
        let blocks = vec![
            PowerlineSegment { content: "a".into(), fg: Color::basic(7), bg },
            PowerlineSegment { content: "b".into(), fg: Color::basic(7), bg },
        ];
        let rendered = render(&blocks, &theme, true, true);
        assert!(rendered.contains(&theme.layout.thin_separator));
    }

    #[test]
    fn embedded_escape_in_content_is_stripped_before_render() {
        let theme = Theme::default();
        let blocks =
            vec![PowerlineSegment { content: "\x1b[1mbold\x1b[0m".into(), fg: Color::basic(7), bg: Color::basic(1) }];
        let rendered = render(&blocks, &theme, true, true);
        assert!(rendered.contains("bold"));
        assert_eq!(rendered.matches('\u{1b}').count(), rendered.matches("\x1b[").count());
    }
}
