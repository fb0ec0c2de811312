//! Color representation, SGR emission, and capability-aware downgrade.
//!
//! A four-way color model: no color, basic (16-color), indexed (256-color),
//! and truecolor, each carrying its own text attributes.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text attributes carried alongside a color. Emitted as additional SGR
/// parameters in the same escape sequence as the color itself.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub reverse: bool,
}

impl Attributes {
    fn sgr_params(&self) -> Vec<u8> {
        let mut params = Vec::new();
        if self.bold {
            params.push(1);
        }
        if self.dim {
            params.push(2);
        }
        if self.italic {
            params.push(3);
        }
        if self.underline {
            params.push(4);
        }
        if self.reverse {
            params.push(7);
        }
        params
    }
}

/// The color itself, independent of attributes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorValue {
    /// No color requested — emits the "reset this half" SGR code.
    None,
    /// One of the 16 basic ANSI colors, `0..=15` (`8..=15` are the bright variants).
    Basic(u8),
    /// One of the 256-color palette.
    Indexed(u8),
    /// 24-bit truecolor.
    Rgb(u8, u8, u8),
}

/// A color plus the attributes to emit alongside it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    pub value: ColorValue,
    pub attrs: Attributes,
}

impl Default for Color {
    fn default() -> Self {
        Color { value: ColorValue::None, attrs: Attributes::default() }
    }
}

impl Color {
    pub fn none() -> Self {
        Color::default()
    }

    pub fn basic(n: u8) -> Self {
        Color { value: ColorValue::Basic(n), attrs: Attributes::default() }
    }

    pub fn indexed(n: u8) -> Self {
        Color { value: ColorValue::Indexed(n), attrs: Attributes::default() }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { value: ColorValue::Rgb(r, g, b), attrs: Attributes::default() }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.attrs.bold = bold;
        self
    }

    /// Named basic colors and `default`, as used in zsh `%F{}`/`%K{}` specs
    /// and theme palette entries.
    pub fn named(name: &str) -> Option<ColorValue> {
        Some(match name {
            "black" => ColorValue::Basic(0),
            "red" => ColorValue::Basic(1),
            "green" => ColorValue::Basic(2),
            "yellow" => ColorValue::Basic(3),
            "blue" => ColorValue::Basic(4),
            "magenta" => ColorValue::Basic(5),
            "cyan" => ColorValue::Basic(6),
            "white" => ColorValue::Basic(7),
            "default" => ColorValue::None,
            _ => return None,
        })
    }

    /// Parses a color spec: `#RRGGBB`, a decimal `0..=255` index, or a named
    /// basic color (see [`Color::named`]). Returns `None` on anything
    /// malformed — callers silently skip emitting a malformed spec.
    pub fn parse_spec(spec: &str) -> Option<ColorValue> {
        if let Some(hex) = spec.strip_prefix('#') {
            if hex.len() == 6 {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                return Some(ColorValue::Rgb(r, g, b));
            }
            return None;
        }
        if let Ok(n) = spec.parse::<u16>() {
            if n <= 255 {
                return Some(ColorValue::Indexed(n as u8));
            }
            return None;
        }
        Color::named(spec)
    }

    /// Emits the SGR escape sequence bytes for this color (`ESC [ params m`)
    /// into `out`, returning the number of bytes written. `is_fg` selects
    /// the foreground (`38`/`39`/`30-37`/`90-97`) or background
    /// (`48`/`49`/`40-47`/`100-107`) command family.
    pub fn to_ansi(&self, is_fg: bool, out: &mut Vec<u8>) -> usize {
        let start = out.len();
        let mut params: Vec<String> = self.attrs.sgr_params().iter().map(u8::to_string).collect();

        match self.value {
            ColorValue::None => params.push(if is_fg { "39".into() } else { "49".into() }),
            ColorValue::Basic(n) => {
                let n = n.min(15);
                let code = if n < 8 {
                    (if is_fg { 30 } else { 40 }) + n
                } else {
                    (if is_fg { 90 } else { 100 }) + (n - 8)
                };
                params.push(code.to_string());
            }
            ColorValue::Indexed(n) => {
                params.push(format!("{};5;{}", if is_fg { 38 } else { 48 }, n));
            }
            ColorValue::Rgb(r, g, b) => {
                params.push(format!("{};2;{};{};{}", if is_fg { 38 } else { 48 }, r, g, b));
            }
        }

        out.extend_from_slice(b"\x1b[");
        out.extend_from_slice(params.join(";").as_bytes());
        out.push(b'm');
        out.len() - start
    }

    pub fn to_ansi_string(&self, is_fg: bool) -> String {
        let mut buf = Vec::new();
        self.to_ansi(is_fg, &mut buf);
        String::from_utf8(buf).expect("SGR sequences are always ASCII")
    }

    /// Resets both halves to the terminal default, clearing attributes too.
    pub fn reset_all() -> String {
        "\x1b[0m".to_string()
    }

    /// Monotonic capability downgrade: truecolor never survives
    /// `has_truecolor = false`, and indexed colors never survive
    /// `has_256 = false` (they collapse further to basic).
    pub fn downgrade(&self, has_truecolor: bool, has_256: bool) -> Color {
        let mut value = self.value;
        if !has_truecolor {
            if let ColorValue::Rgb(r, g, b) = value {
                value = ColorValue::Indexed(rgb_to_indexed(r, g, b));
            }
        }
        if !has_256 {
            if let ColorValue::Indexed(n) = value {
                value = ColorValue::Basic(n % 8);
            }
        }
        Color { value, attrs: self.attrs }
    }
}

/// Approximates an RGB truecolor as one of the 256-palette's 6×6×6 color
/// cube entries.
fn rgb_to_indexed(r: u8, g: u8, b: u8) -> u8 {
    fn level(v: u8) -> u16 {
        if v > 47 {
            ((v as u16) - 35) / 40
        } else {
            0
        }
    }
    let (lr, lg, lb) = (level(r), level(g), level(b));
    (16 + 36 * lr + 6 * lg + lb) as u8
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::None => write!(f, "default"),
            ColorValue::Basic(n) => write!(f, "{n}"),
            ColorValue::Indexed(n) => write!(f, "{n}"),
            ColorValue::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

// Color values persist in theme TOML files either as a bare `0..=255`
// integer, a `"#RRGGBB"`/named string, or an `{ r, g, b }` table.
impl<'de> Deserialize<'de> for ColorValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ColorVisitor;

        impl<'de> Visitor<'de> for ColorVisitor {
            type Value = ColorValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a color: 0-255, \"#RRGGBB\", a named color, or {r,g,b}")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                if v <= 255 {
                    Ok(ColorValue::Indexed(v as u8))
                } else {
                    Err(de::Error::custom("color index out of range"))
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                self.visit_u64(v as u64)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Color::parse_spec(v).ok_or_else(|| de::Error::custom(format!("invalid color spec: {v}")))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut r = None;
                let mut g = None;
                let mut b = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "r" => r = Some(map.next_value::<u8>()?),
                        "g" => g = Some(map.next_value::<u8>()?),
                        "b" => b = Some(map.next_value::<u8>()?),
                        _ => {
                            let _: toml::Value = map.next_value()?;
                        }
                    }
                }
                match (r, g, b) {
                    (Some(r), Some(g), Some(b)) => Ok(ColorValue::Rgb(r, g, b)),
                    _ => Err(de::Error::custom("rgb color table requires r, g, and b")),
                }
            }
        }

        deserializer.deserialize_any(ColorVisitor)
    }
}

impl Serialize for ColorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColorValue::Indexed(n) => serializer.serialize_u8(*n),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Color { value: ColorValue::deserialize(deserializer)?, attrs: Attributes::default() })
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downgrade_truecolor_is_monotonic() {
        let c = Color::rgb(255, 128, 0);
        let d = c.downgrade(false, true);
        assert!(matches!(d.value, ColorValue::Indexed(_)));
        let d2 = c.downgrade(false, false);
        assert!(matches!(d2.value, ColorValue::Basic(_)));
    }

    #[test]
    fn downgrade_never_reintroduces_higher_fidelity() {
        let c = Color::indexed(200);
        let d = c.downgrade(true, false);
        assert!(matches!(d.value, ColorValue::Basic(_)));
    }

    #[test]
    fn truecolor_emission_has_no_38_2_when_downgraded() {
        let c = Color::rgb(10, 200, 30).downgrade(false, true);
        let s = c.to_ansi_string(true);
        assert!(!s.contains(";2;"));
        assert!(!s.contains("38;2"));
    }

    #[test]
    fn fg_and_bg_use_distinct_commands() {
        let c = Color::indexed(196);
        assert_eq!(c.to_ansi_string(true), "\x1b[38;5;196m");
        assert_eq!(c.to_ansi_string(false), "\x1b[48;5;196m");
    }

    #[test]
    fn none_resets_the_matching_half() {
        assert_eq!(Color::none().to_ansi_string(true), "\x1b[39m");
        assert_eq!(Color::none().to_ansi_string(false), "\x1b[49m");
    }

    #[test]
    fn parse_spec_handles_hex_decimal_and_named() {
        assert_eq!(Color::parse_spec("#ff8000"), Some(ColorValue::Rgb(255, 128, 0)));
        assert_eq!(Color::parse_spec("200"), Some(ColorValue::Indexed(200)));
        assert_eq!(Color::parse_spec("red"), Some(ColorValue::Basic(1)));
        assert_eq!(Color::parse_spec("default"), Some(ColorValue::None));
        assert_eq!(Color::parse_spec("not-a-color"), None);
    }

    #[test]
    fn bold_attribute_is_an_additional_param() {
        let c = Color::basic(1).with_bold(true);
        assert_eq!(c.to_ansi_string(true), "\x1b[1;31m");
    }
}
