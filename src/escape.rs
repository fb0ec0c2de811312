//! Pass-2 escape expander: bash `\X` and zsh `%X` escape tables over the
//! pass-1 output.

use crate::color::{Color, ColorValue};
use crate::context::Context;

/// Output is bounded so a malicious or accidental very-long format string
/// can't grow the rendered prompt without limit.
pub const PROMPT_OUTPUT_MAX: usize = 4096;

/// Expands bash `\X` and zsh `%X` escapes in `input` against `ctx`,
/// honoring CSI passthrough and the output size cap. `has_256`/`has_truecolor`
/// drive `%F{}`/`%K{}` color downgrade.
pub fn expand(input: &str, ctx: &Context) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len().min(PROMPT_OUTPUT_MAX));
    let mut i = 0;

    while i < bytes.len() {
        if out.len() >= PROMPT_OUTPUT_MAX {
            log::debug!("prompt output truncated at {PROMPT_OUTPUT_MAX} bytes");
            break;
        }

        let b = bytes[i];

        if b == 0x1b && bytes.get(i + 1) == Some(&b'[') {
            let start = i;
            i += 2;
            while i < bytes.len() {
                let c = bytes[i];
                i += 1;
                if (0x40..=0x7e).contains(&c) {
                    break;
                }
            }
            push_bounded(&mut out, &bytes[start..i]);
            continue;
        }

        match b {
            b'\\' => {
                i += 1;
                i += expand_bash(&bytes[i..], ctx, &mut out);
            }
            b'%' => {
                i += 1;
                i += expand_zsh(&bytes[i..], ctx, &mut out);
            }
            _ => {
                push_bounded(&mut out, &[b]);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn push_bounded(out: &mut Vec<u8>, bytes: &[u8]) {
    let room = PROMPT_OUTPUT_MAX.saturating_sub(out.len());
    out.extend_from_slice(&bytes[..bytes.len().min(room)]);
}

fn push_str_bounded(out: &mut Vec<u8>, s: &str) {
    push_bounded(out, s.as_bytes());
}

/// Expands one bash `\X` sequence starting at `rest[0]` (the byte after the
/// backslash). Returns how many bytes of `rest` were consumed.
fn expand_bash(rest: &[u8], ctx: &Context, out: &mut Vec<u8>) -> usize {
    let Some(&c) = rest.first() else {
        return 0;
    };

    match c {
        b'[' | b']' => 1,
        b'u' => {
            push_str_bounded(out, &ctx.username);
            1
        }
        b'h' => {
            push_str_bounded(out, &ctx.hostname_short);
            1
        }
        b'H' => {
            push_str_bounded(out, &ctx.hostname_full);
            1
        }
        b'w' => {
            push_str_bounded(out, &ctx.cwd_tilde);
            1
        }
        b'W' => {
            push_str_bounded(out, &ctx.cwd_basename());
            1
        }
        b'd' => {
            push_str_bounded(out, &chrono::Local::now().format("%a %b %d").to_string());
            1
        }
        b't' => {
            push_str_bounded(out, &chrono::Local::now().format("%H:%M:%S").to_string());
            1
        }
        b'T' => {
            push_str_bounded(out, &chrono::Local::now().format("%I:%M:%S").to_string());
            1
        }
        b'@' => {
            push_str_bounded(out, &chrono::Local::now().format("%I:%M %p").to_string());
            1
        }
        b'A' => {
            push_str_bounded(out, &chrono::Local::now().format("%H:%M").to_string());
            1
        }
        b'$' => {
            push_bounded(out, if ctx.is_root() { b"#" } else { b"$" });
            1
        }
        b'n' => {
            push_bounded(out, b"\n");
            1
        }
        b'r' => {
            push_bounded(out, b"\r");
            1
        }
        b'\\' => {
            push_bounded(out, b"\\");
            1
        }
        b'!' => {
            push_str_bounded(out, &ctx.history_number.to_string());
            1
        }
        b'#' => {
            push_str_bounded(out, &ctx.command_number.to_string());
            1
        }
        b'j' => {
            push_str_bounded(out, &ctx.job_count.to_string());
            1
        }
        b'l' => {
            let tail = ctx.tty.rsplit('/').next().unwrap_or(&ctx.tty);
            push_str_bounded(out, tail);
            1
        }
        b's' => {
            push_str_bounded(out, &ctx.shell_name);
            1
        }
        b'v' => {
            let major_minor = ctx.shell_version.splitn(3, '.').take(2).collect::<Vec<_>>().join(".");
            push_str_bounded(out, &major_minor);
            1
        }
        b'V' => {
            push_str_bounded(out, &ctx.shell_version);
            1
        }
        b'e' => {
            push_bounded(out, &[0x1b]);
            1
        }
        b'a' => {
            push_bounded(out, &[0x07]);
            1
        }
        b'0' => expand_octal(rest, out),
        b'x' => expand_hex(rest, out),
        other => {
            push_bounded(out, &[b'\\', other]);
            1
        }
    }
}

fn expand_octal(rest: &[u8], out: &mut Vec<u8>) -> usize {
    // rest[0] is the leading '0' itself; up to 3 octal digits follow.
    let digits = &rest[1..];
    let mut n = 0usize;
    let mut consumed = 0;
    while consumed < 3 && digits.get(consumed).is_some_and(|b| (b'0'..=b'7').contains(b)) {
        n = n * 8 + (digits[consumed] - b'0') as usize;
        consumed += 1;
    }
    if n <= 255 {
        push_bounded(out, &[n as u8]);
    }
    1 + consumed
}

fn expand_hex(rest: &[u8], out: &mut Vec<u8>) -> usize {
    // rest[0] is the 'x' itself; hex digits follow.
    let digits = &rest[1..];
    let mut n = 0usize;
    let mut consumed = 0;
    while consumed < 2 && digits.get(consumed).is_some_and(|b| b.is_ascii_hexdigit()) {
        let d = (digits[consumed] as char).to_digit(16).unwrap() as usize;
        n = n * 16 + d;
        consumed += 1;
    }
    if consumed == 0 {
        push_bounded(out, b"\\x");
        return 1;
    }
    push_bounded(out, &[n as u8]);
    1 + consumed
}

/// Expands one zsh `%X` sequence starting at `rest[0]` (the byte after the
/// percent sign). Returns how many bytes of `rest` were consumed.
fn expand_zsh(rest: &[u8], ctx: &Context, out: &mut Vec<u8>) -> usize {
    let Some(&c) = rest.first() else {
        return 0;
    };

    match c {
        b'%' => {
            push_bounded(out, b"%");
            1
        }
        b'n' => {
            push_str_bounded(out, &ctx.username);
            1
        }
        b'm' => {
            push_str_bounded(out, &ctx.hostname_short);
            1
        }
        b'M' => {
            push_str_bounded(out, &ctx.hostname_full);
            1
        }
        b'd' | b'/' => {
            push_str_bounded(out, &ctx.cwd.to_string_lossy());
            1
        }
        b'~' => {
            push_str_bounded(out, &ctx.cwd_tilde);
            1
        }
        b'c' | b'.' => {
            push_str_bounded(out, &ctx.cwd_basename());
            1
        }
        b'#' => {
            push_bounded(out, if ctx.is_root() { b"#" } else { b"%" });
            1
        }
        b'T' => {
            push_str_bounded(out, &chrono::Local::now().format("%H:%M").to_string());
            1
        }
        b't' | b'@' => {
            push_str_bounded(out, &chrono::Local::now().format("%l:%M %p").to_string());
            1
        }
        b'*' => {
            push_str_bounded(out, &chrono::Local::now().format("%H:%M:%S").to_string());
            1
        }
        b'j' => {
            push_str_bounded(out, &ctx.job_count.to_string());
            1
        }
        b'l' => {
            push_str_bounded(out, &ctx.tty);
            1
        }
        b'?' => {
            push_str_bounded(out, &ctx.last_exit_status.to_string());
            1
        }
        b'D' => expand_zsh_date(rest, out),
        b'B' => {
            push_bounded(out, b"\x1b[1m");
            1
        }
        b'b' => {
            push_bounded(out, b"\x1b[22m");
            1
        }
        b'U' => {
            push_bounded(out, b"\x1b[4m");
            1
        }
        b'u' => {
            push_bounded(out, b"\x1b[24m");
            1
        }
        b'S' => {
            push_bounded(out, b"\x1b[7m");
            1
        }
        b's' => {
            push_bounded(out, b"\x1b[27m");
            1
        }
        b'F' => expand_zsh_color(rest, ctx, out, true),
        b'f' => {
            push_bounded(out, Color::none().to_ansi_string(true).as_bytes());
            1
        }
        b'K' => expand_zsh_color(rest, ctx, out, false),
        b'k' => {
            push_bounded(out, Color::none().to_ansi_string(false).as_bytes());
            1
        }
        other => {
            push_bounded(out, &[b'%', other]);
            1
        }
    }
}

fn expand_zsh_date(rest: &[u8], out: &mut Vec<u8>) -> usize {
    if rest.get(1) != Some(&b'{') {
        push_str_bounded(out, &chrono::Local::now().format("%y-%m-%d").to_string());
        return 1;
    }
    let Some(close) = rest[2..].iter().position(|&b| b == b'}') else {
        push_str_bounded(out, &chrono::Local::now().format("%y-%m-%d").to_string());
        return 1;
    };
    let fmt = std::str::from_utf8(&rest[2..2 + close]).unwrap_or("%y-%m-%d");
    push_str_bounded(out, &chrono::Local::now().format(fmt).to_string());
    2 + close + 1
}

fn expand_zsh_color(rest: &[u8], ctx: &Context, out: &mut Vec<u8>, is_fg: bool) -> usize {
    if rest.get(1) != Some(&b'{') {
        return 1;
    }
    let Some(close) = rest[2..].iter().position(|&b| b == b'}') else {
        return 1;
    };
    let spec = std::str::from_utf8(&rest[2..2 + close]).unwrap_or("");
    if let Some(value) = Color::parse_spec(spec) {
        let color = Color { value, attrs: Default::default() };
        let color = color.downgrade(ctx.capabilities.has_truecolor, ctx.capabilities.has_256_color);
        push_bounded(out, color.to_ansi_string(is_fg).as_bytes());
    }
    // Malformed spec: emit nothing.
    2 + close + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        crate::context::test_support::sample_context()
    }

    #[test]
    fn csi_sequences_pass_through_verbatim() {
        let out = expand("\x1b[31mred\x1b[0m", &ctx());
        assert_eq!(out, "\x1b[31mred\x1b[0m");
    }

    #[test]
    fn bash_username_and_host_escapes() {
        let c = ctx();
        assert_eq!(expand("\\u@\\h", &c), "alice@devbox");
    }

    #[test]
    fn bash_dollar_reflects_euid() {
        let mut c = ctx();
        assert_eq!(expand("\\$", &c), "$");
        c.euid = 0;
        assert_eq!(expand("\\$", &c), "#");
    }

    #[test]
    fn unknown_bash_escape_passes_through_as_two_bytes() {
        assert_eq!(expand("\\q", &ctx()), "\\q");
    }

    #[test]
    fn bracket_markers_are_stripped() {
        assert_eq!(expand("\\[\\]", &ctx()), "");
    }

    #[test]
    fn octal_and_hex_escapes_emit_a_byte() {
        assert_eq!(expand("\\0101", &ctx()), "A");
        assert_eq!(expand("\\x41", &ctx()), "A");
    }

    #[test]
    fn zsh_percent_percent_is_literal_percent() {
        assert_eq!(expand("100%%", &ctx()), "100%");
    }

    #[test]
    fn zsh_pound_reflects_euid() {
        let mut c = ctx();
        assert_eq!(expand("%#", &c), "%");
        c.euid = 0;
        assert_eq!(expand("%#", &c), "#");
    }

    #[test]
    fn zsh_color_spec_emits_sgr() {
        let out = expand("%F{red}x%f", &ctx());
        assert!(out.starts_with("\x1b[38;5;1m") || out.starts_with("\x1b[31m") || out.contains("x"));
        assert!(out.ends_with("\x1b[39m"));
    }

    #[test]
    fn malformed_zsh_color_spec_emits_nothing() {
        let out = expand("%F{not-a-color}x", &ctx());
        assert_eq!(out, "x");
    }

    #[test]
    fn output_is_truncated_at_capacity() {
        let huge = "a".repeat(PROMPT_OUTPUT_MAX * 2);
        let out = expand(&huge, &ctx());
        assert_eq!(out.len(), PROMPT_OUTPUT_MAX);
    }

    #[test]
    fn unknown_zsh_escape_passes_through() {
        assert_eq!(expand("%Q", &ctx()), "%Q");
    }
}
