//! Theme model and registry.
//!
//! A `#[serde(default)]` struct aggregating one theme-struct per segment, so
//! a user override only needs to name the fields it changes. A named
//! registry — built-ins plus user themes loaded from TOML files — supports
//! hot reload via an atomic pointer swap, so switching themes never
//! requires restarting the shell.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::color::Color;
use crate::error::{PromptError, Result};
use crate::segment::aws::AwsTheme;
use crate::segment::cmd_duration::CmdDurationTheme;
use crate::segment::container::ContainerTheme;
use crate::segment::directory::DirectoryTheme;
use crate::segment::git::GitTheme;
use crate::segment::host::HostTheme;
use crate::segment::jobs::JobsTheme;
use crate::segment::kubernetes::KubernetesTheme;
use crate::segment::shlvl::ShlvlTheme;
use crate::segment::ssh::SshTheme;
use crate::segment::status::StatusTheme;
use crate::segment::symbol::SymbolTheme;
use crate::segment::time::TimeTheme;
use crate::segment::username::UsernameTheme;
use crate::segment::virtualenv::VirtualenvTheme;

/// One theme-struct per segment. All fields implement `Default` so a user
/// theme file only needs to specify what it overrides.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Palette {
    pub user: UsernameTheme,
    pub host: HostTheme,
    pub directory: DirectoryTheme,
    pub git: GitTheme,
    pub time: TimeTheme,
    pub status: StatusTheme,
    pub jobs: JobsTheme,
    pub symbol: SymbolTheme,
    pub shlvl: ShlvlTheme,
    pub ssh: SshTheme,
    pub cmd_duration: CmdDurationTheme,
    pub virtualenv: VirtualenvTheme,
    pub container: ContainerTheme,
    pub aws: AwsTheme,
    pub kubernetes: KubernetesTheme,
}

/// Which rendering path `render_prompt` dispatches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Powerline,
    Template,
}

/// Powerline block-assembly options, plus the template-path `ps1`/`ps2`/
/// `rprompt_format` formats used when `style == Template`.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Layout {
    pub style: Style,
    pub left_to_right: bool,
    pub thick_separator: String,
    pub thin_separator: String,
    pub collapse_matching_backgrounds: bool,
    /// Used only when `style == Template`: format strings fed to the
    /// two-pass `template → escape` pipeline. May mix `${...}` template
    /// syntax with raw bash `\X`/zsh `%X` escapes.
    pub ps1: String,
    pub ps2: String,
    /// Format for the right-hand prompt, rendered independently of `ps1`.
    pub rprompt_format: String,
    pub enable_transient: bool,
    /// Shown in place of `ps1` once a command has been accepted, when
    /// `enable_transient` is set.
    pub transient_format: String,
    pub newline_before_prompt: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            style: Style::Powerline,
            left_to_right: true,
            thick_separator: "\u{e0b0}".into(),
            thin_separator: "\u{e0b1}".into(),
            collapse_matching_backgrounds: true,
            ps1: "${user}@${host}:${directory} ${status} ".into(),
            ps2: "> ".into(),
            rprompt_format: String::new(),
            enable_transient: false,
            transient_format: "${status} ".into(),
            newline_before_prompt: false,
        }
    }
}

/// `[theme]` section: identifying metadata, no bearing on rendering.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ThemeMeta {
    pub name: String,
    pub description: String,
    pub category: String,
}

/// Per-segment override, from a `[segments.<name>]` table. Every field is
/// optional: unset fields fall back to the segment's own palette entry and
/// gating logic.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct SegmentOverride {
    pub fg_color: Option<Color>,
    pub bg_color: Option<Color>,
    pub show: Option<bool>,
    pub truncation_length: Option<usize>,
    pub format: Option<String>,
}

/// `[segments]` section: `enabled` lists membership and render order; any
/// other key is a subtable naming a segment, captured into `overrides`.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Segments {
    pub enabled: Vec<String>,
    #[serde(flatten)]
    pub overrides: HashMap<String, SegmentOverride>,
}

/// A named, fully-resolved theme: palette, layout, and which segments (and
/// in what order) participate in a render.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Theme {
    #[serde(rename = "theme")]
    pub meta: ThemeMeta,
    pub palette: Palette,
    pub layout: Layout,
    /// `[colors]` section: named colors usable from a template's
    /// `${COLOR:TEXT}` form, independent of any segment's own palette.
    pub colors: HashMap<String, Color>,
    /// `[symbols]` section: free-form glyph overrides, looked up by name
    /// from template text (e.g. a custom `${?git:${symbols.branch}}`).
    pub symbols: HashMap<String, String>,
    /// `[syntax]` section: reserved for future syntax-highlighting rules,
    /// carried through as opaque key/value pairs today.
    pub syntax: HashMap<String, String>,
    pub segments: Segments,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            meta: ThemeMeta {
                name: "default".into(),
                description: "All built-in segments, powerline layout.".into(),
                category: String::new(),
            },
            palette: Palette::default(),
            layout: Layout::default(),
            colors: HashMap::new(),
            symbols: HashMap::new(),
            syntax: HashMap::new(),
            segments: Segments {
                enabled: crate::segment::BUILTIN_NAMES.iter().map(|s| s.to_string()).collect(),
                overrides: HashMap::new(),
            },
        }
    }
}

impl Theme {
    pub fn segment_enabled(&self, name: &str) -> bool {
        self.segments.enabled.iter().any(|s| s == name)
    }

    pub fn segment_override(&self, name: &str) -> Option<&SegmentOverride> {
        self.segments.overrides.get(name)
    }

    /// A segment's base visibility, overridden by `[segments.<name>] show`
    /// when present.
    pub fn segment_shown(&self, name: &str, base_visible: bool) -> bool {
        self.segment_override(name).and_then(|o| o.show).unwrap_or(base_visible)
    }

    fn minimal() -> Theme {
        Theme {
            meta: ThemeMeta {
                name: "minimal".into(),
                description: "Directory and status only, no powerline glyphs.".into(),
                category: String::new(),
            },
            palette: Palette::default(),
            layout: Layout {
                style: Style::Template,
                left_to_right: true,
                thick_separator: String::new(),
                thin_separator: String::new(),
                collapse_matching_backgrounds: false,
                ps1: "${directory} ${?git:(${git.branch}) }${status} ".into(),
                ps2: "> ".into(),
                rprompt_format: String::new(),
                enable_transient: false,
                transient_format: "${status} ".into(),
                newline_before_prompt: false,
            },
            colors: HashMap::new(),
            symbols: HashMap::new(),
            syntax: HashMap::new(),
            segments: Segments {
                enabled: vec!["directory".into(), "git".into(), "status".into()],
                overrides: HashMap::new(),
            },
        }
    }

    fn powerline() -> Theme {
        let mut t = Theme::default();
        t.meta.name = "powerline".into();
        t.meta.description = "Full powerline with every built-in segment.".into();
        t
    }

    /// Parses a theme from TOML text (a user theme file's contents).
    pub fn from_toml(text: &str) -> Result<Theme> {
        toml::from_str(text).map_err(PromptError::from)
    }
}

static BUILTIN_THEMES: Lazy<HashMap<&'static str, Theme>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("default", Theme::default());
    m.insert("minimal", Theme::minimal());
    m.insert("powerline", Theme::powerline());
    m
});

/// Loads user theme files from `dir` (typically
/// `$XDG_CONFIG_HOME/<app>/themes/`), one theme per `*.toml` file, named by
/// file stem. Missing directories are not an error — just no user themes.
pub fn load_user_themes(dir: &Path) -> Result<HashMap<String, Theme>> {
    let mut themes = HashMap::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(themes),
        Err(e) => return Err(PromptError::SystemCall(e)),
    };
    for entry in entries {
        let entry = entry.map_err(PromptError::SystemCall)?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string();
        let text = std::fs::read_to_string(&path).map_err(PromptError::SystemCall)?;
        let theme = Theme::from_toml(&text)?;
        themes.insert(stem, theme);
    }
    Ok(themes)
}

/// Named theme registry. Built-ins are always present; user themes (from
/// `$XDG_CONFIG_HOME`) override a built-in of the same name. The active
/// theme is swapped atomically via [`Registry::activate`], so an in-flight
/// render always sees a complete, consistent `Theme`.
pub struct Registry {
    themes: RwLock<HashMap<String, Arc<Theme>>>,
    active: RwLock<Arc<Theme>>,
}

impl Registry {
    pub fn new() -> Self {
        let mut themes: HashMap<String, Arc<Theme>> =
            BUILTIN_THEMES.iter().map(|(k, v)| (k.to_string(), Arc::new(v.clone()))).collect();
        let active = Arc::clone(themes.get("default").expect("default theme always registered"));
        themes.entry("default".into()).or_insert_with(|| Arc::clone(&active));
        Registry { themes: RwLock::new(themes), active: RwLock::new(active) }
    }

    /// Loads user themes from `dir`, inserting/overriding by name.
    pub fn load_user_dir(&self, dir: &Path) -> Result<usize> {
        let loaded = load_user_themes(dir)?;
        let count = loaded.len();
        let mut themes = self.themes.write().unwrap();
        for (name, theme) in loaded {
            themes.insert(name, Arc::new(theme));
        }
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Theme>> {
        self.themes.read().unwrap().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.themes.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Switches the active theme by name. Returns `InvalidParameter` if no
    /// theme with that name is registered.
    pub fn activate(&self, name: &str) -> Result<()> {
        let theme = self.get(name).ok_or_else(|| PromptError::InvalidParameter(format!("unknown theme: {name}")))?;
        *self.active.write().unwrap() = theme;
        Ok(())
    }

    pub fn current(&self) -> Arc<Theme> {
        Arc::clone(&self.active.read().unwrap())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

/// The conventional location for user theme files:
/// `$XDG_CONFIG_HOME/<app>/themes/`, falling back to `~/.config/<app>/themes`.
pub fn default_theme_dir(project_dirs: &directories::ProjectDirs) -> PathBuf {
    project_dirs.config_dir().join("themes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_enables_every_builtin() {
        let theme = Theme::default();
        for name in crate::segment::BUILTIN_NAMES {
            assert!(theme.segment_enabled(name));
        }
    }

    #[test]
    fn minimal_theme_enables_only_three_segments() {
        let theme = Theme::minimal();
        assert_eq!(theme.segments.enabled.len(), 3);
        assert!(!theme.segment_enabled("aws"));
    }

    #[test]
    fn registry_starts_with_three_builtins() {
        let registry = Registry::new();
        let names = registry.names();
        assert!(names.contains(&"default".to_string()));
        assert!(names.contains(&"minimal".to_string()));
        assert!(names.contains(&"powerline".to_string()));
    }

    #[test]
    fn activate_unknown_theme_is_an_error() {
        let registry = Registry::new();
        assert!(registry.activate("does-not-exist").is_err());
    }

    #[test]
    fn loading_user_themes_from_missing_dir_is_not_an_error() {
        let dir = PathBuf::from("/nonexistent/promptweave/themes");
        let themes = load_user_themes(&dir).unwrap();
        assert!(themes.is_empty());
    }

    #[test]
    fn user_theme_overrides_a_builtin_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[theme]\nname = \"default\"\ndescription = \"custom\"\n",
        )
        .unwrap();
        let registry = Registry::new();
        registry.load_user_dir(dir.path()).unwrap();
        let theme = registry.get("default").unwrap();
        assert_eq!(theme.meta.description, "custom");
    }

    #[test]
    fn segments_section_parses_enabled_list_and_overrides() {
        let toml = indoc::indoc! {r#"
            [segments]
            enabled = ["user", "status"]

            [segments.status]
            fg_color = "#ff0000"
            show = true
            truncation_length = 2
            format = "custom"
        "#};
        let theme = Theme::from_toml(toml).unwrap();
        assert!(theme.segment_enabled("user"));
        assert!(theme.segment_enabled("status"));
        assert!(!theme.segment_enabled("git"));
        let ov = theme.segment_override("status").unwrap();
        assert_eq!(ov.show, Some(true));
        assert_eq!(ov.truncation_length, Some(2));
        assert_eq!(ov.format.as_deref(), Some("custom"));
    }

    #[test]
    fn segment_shown_honors_override() {
        let theme = Theme::from_toml("[segments.status]\nshow = false\n").unwrap();
        assert!(!theme.segment_shown("status", true));
        assert!(theme.segment_shown("git", true));
    }
}
