//! The prompt façade: the single entry point the rest of the shell calls
//! into. Ties together the theme registry, the async git worker, and the
//! two rendering paths (powerline, template+escape), plus PS1/PS2
//! ownership tracking and a symbol-table mirror.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::context::Context;
use crate::error::{PromptError, Result};
use crate::segment::git::{self, GitStatus};
use crate::theme::{Registry, Style};
use crate::worker::{AsyncWorker, RequestKind, ResponseData};

/// Which prompt string a caller is asking `render_prompt` for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Which {
    Ps1,
    Ps2,
    RPrompt,
}

/// Symbol table the shell exposes for reading/writing prompt variables.
/// `None` on `get` distinguishes "unset" from "set to empty string".
pub trait SymbolTable: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str);
}

/// In-memory symbol table, useful standalone and in tests; a real shell
/// integration would back this with its own variable store.
#[derive(Default)]
pub struct MemorySymbolTable {
    vars: Mutex<HashMap<String, String>>,
}

impl SymbolTable for MemorySymbolTable {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.lock().unwrap().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.vars.lock().unwrap().insert(name.to_string(), value.to_string());
    }
}

/// `ThemeManaged ⇄ UserManaged` per variable. Theme activation only
/// writes a variable while it's still `ThemeManaged`.
struct Ownership {
    user_managed: HashMap<String, bool>,
}

impl Ownership {
    fn new() -> Self {
        Ownership { user_managed: HashMap::new() }
    }

    fn is_user_managed(&self, var: &str) -> bool {
        *self.user_managed.get(var).unwrap_or(&false)
    }

    fn mark_user_managed(&mut self, var: &str) {
        self.user_managed.insert(var.to_string(), true);
    }

    fn reset(&mut self, var: &str) {
        self.user_managed.insert(var.to_string(), false);
    }
}

pub struct Prompt {
    themes: Registry,
    worker: AsyncWorker,
    git_snapshot: Arc<Mutex<Option<Arc<GitStatus>>>>,
    ownership: Mutex<Ownership>,
}

impl Prompt {
    pub fn new() -> Self {
        let git_snapshot = Arc::new(Mutex::new(None));
        let completion_snapshot = Arc::clone(&git_snapshot);

        let handler = |request: &crate::worker::AsyncRequest| -> (ResponseData, bool) {
            match &request.kind {
                RequestKind::GitStatus => {
                    let (status, timed_out) = git::query(&request.cwd, request.timeout);
                    (ResponseData::GitStatus(status), timed_out)
                }
                RequestKind::Custom(cmd) => match crate::subprocess::run(cmd, request.timeout) {
                    Ok(output) => {
                        let timed_out = output.timed_out;
                        (ResponseData::Custom(output), timed_out)
                    }
                    Err(_) => (
                        ResponseData::Custom(crate::subprocess::SubprocessOutput {
                            exit_status: None,
                            timed_out: false,
                            stdout: String::new(),
                        }),
                        false,
                    ),
                },
            }
        };

        let on_complete = move |response: crate::worker::AsyncResponse| {
            if let ResponseData::GitStatus(status) = response.data {
                *completion_snapshot.lock().unwrap() = Some(Arc::new(status));
            }
        };

        Prompt {
            themes: Registry::new(),
            worker: AsyncWorker::start(handler, on_complete),
            git_snapshot,
            ownership: Mutex::new(Ownership::new()),
        }
    }

    pub fn themes(&self) -> &Registry {
        &self.themes
    }

    pub fn async_submit_git_status(&self, cwd: PathBuf, timeout: Duration) -> Result<u64> {
        self.worker.submit(RequestKind::GitStatus, cwd, timeout)
    }

    pub fn latest_git_status(&self) -> Option<Arc<GitStatus>> {
        self.git_snapshot.lock().unwrap().clone()
    }

    /// Switches the active theme by name. An explicit switch clears PS1/PS2
    /// back to theme-managed, so the newly-activated theme's formats take
    /// over even if the previous theme's formats had been user-edited.
    pub fn theme_set_active(&self, name: &str) -> Result<()> {
        self.themes.activate(name)?;
        let mut ownership = self.ownership.lock().unwrap();
        ownership.reset("PS1");
        ownership.reset("PS2");
        Ok(())
    }

    pub fn theme_list(&self) -> Vec<(String, &'static str)> {
        self.themes.names().into_iter().map(|n| (n, "builtin-or-user")).collect()
    }

    pub fn theme_reload(&self, user_theme_dir: &std::path::Path) -> Result<usize> {
        self.themes.load_user_dir(user_theme_dir)
    }

    /// Renders the requested prompt string against `ctx`, dispatching to
    /// powerline or template+escape per the active theme's layout style.
    pub fn render_prompt(&self, which: Which, ctx: &Context) -> Vec<u8> {
        let theme = self.themes.current();

        let rendered = match theme.layout.style {
            Style::Powerline => {
                let direction_ltor = match which {
                    Which::Ps1 | Which::Ps2 => true,
                    Which::RPrompt => false,
                };
                let mut blocks = Vec::new();
                for name in &theme.segments.enabled {
                    let Some(seg) = crate::segment::find(name) else { continue };
                    let base_visible = seg.is_visible(ctx, &theme).is_visible();
                    if !theme.segment_shown(name, base_visible) {
                        continue;
                    }
                    let mut seg_blocks = seg.render_powerline(ctx, &theme);
                    if let Some(ov) = theme.segment_override(name) {
                        if let Some(keep) = ov.truncation_length {
                            if seg_blocks.len() > keep {
                                let drop = seg_blocks.len() - keep;
                                seg_blocks.drain(0..drop);
                            }
                        }
                        for block in &mut seg_blocks {
                            if let Some(fg) = ov.fg_color {
                                block.fg = fg;
                            }
                            if let Some(bg) = ov.bg_color {
                                block.bg = bg;
                            }
                        }
                    }
                    blocks.extend(seg_blocks);
                }
                if !direction_ltor {
                    blocks.reverse();
                }
                crate::powerline::render(&blocks, &theme, ctx.capabilities.has_truecolor, ctx.capabilities.has_256_color)
            }
            Style::Template => {
                let format = match which {
                    Which::Ps1 => &theme.layout.ps1,
                    Which::Ps2 => &theme.layout.ps2,
                    Which::RPrompt => &theme.layout.rprompt_format,
                };
                let pass1 = crate::template::expand(format, ctx, &theme);
                crate::escape::expand(&pass1, ctx)
            }
        };

        match std::str::from_utf8(rendered.as_bytes()) {
            Ok(_) => rendered.into_bytes(),
            Err(_) => fallback_prompt(ctx).into_bytes(),
        }
    }

    /// Called whenever the shell writes PS1/PS2/PROMPT from any source.
    /// Flips the affected variable to user-managed and keeps PS1/PROMPT
    /// mirrored.
    pub fn notify_prompt_var_set(&self, var: &str, value: &str, symtab: &dyn SymbolTable) {
        let mut ownership = self.ownership.lock().unwrap();
        ownership.mark_user_managed(var);

        match var {
            "PS1" => {
                ownership.mark_user_managed("PROMPT");
                symtab.set("PROMPT", value);
            }
            "PROMPT" => {
                ownership.mark_user_managed("PS1");
                symtab.set("PS1", value);
            }
            _ => {}
        }
    }

    /// Writes `PS1`/`PS2` from the active theme's format, but only for
    /// variables still theme-managed — an explicit user assignment is
    /// never silently overwritten by a theme switch.
    pub fn activate_theme_formats(&self, symtab: &dyn SymbolTable) -> Result<()> {
        let theme = self.themes.current();
        if !matches!(theme.layout.style, Style::Template) {
            return Err(PromptError::FeatureNotAvailable("active theme is not template-styled".into()));
        }
        let ownership = self.ownership.lock().unwrap();
        if !ownership.is_user_managed("PS1") {
            symtab.set("PS1", &theme.layout.ps1);
        }
        if !ownership.is_user_managed("PS2") {
            symtab.set("PS2", &theme.layout.ps2);
        }
        Ok(())
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Prompt::new()
    }
}

fn fallback_prompt(ctx: &Context) -> String {
    if ctx.is_root() {
        "# ".to_string()
    } else {
        "$ ".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_marks_variable_user_managed_and_mirrors() {
        let prompt = Prompt::new();
        let symtab = MemorySymbolTable::default();
        prompt.notify_prompt_var_set("PS1", "custom> ", &symtab);
        assert_eq!(symtab.get("PROMPT"), Some("custom> ".to_string()));
    }

    #[test]
    fn render_prompt_falls_back_on_invalid_utf8_format() {
        let ctx = crate::context::test_support::sample_context();
        let prompt = Prompt::new();
        let out = prompt.render_prompt(Which::Ps1, &ctx);
        assert!(!out.is_empty());
    }

    #[test]
    fn activate_theme_formats_respects_user_managed_ps1() {
        let prompt = Prompt::new();
        prompt.theme_set_active("minimal").unwrap();
        let symtab = MemorySymbolTable::default();
        prompt.notify_prompt_var_set("PS1", "mine> ", &symtab);
        prompt.activate_theme_formats(&symtab).unwrap();
        assert_eq!(symtab.get("PS1"), Some("mine> ".to_string()));
    }

    #[test]
    fn second_activation_does_not_clobber_a_user_managed_ps1() {
        let prompt = Prompt::new();
        prompt.theme_set_active("minimal").unwrap();
        let symtab = MemorySymbolTable::default();
        prompt.notify_prompt_var_set("PS1", "mine> ", &symtab);
        prompt.activate_theme_formats(&symtab).unwrap();
        prompt.activate_theme_formats(&symtab).unwrap();
        assert_eq!(symtab.get("PS1"), Some("mine> ".to_string()));
    }

    #[test]
    fn explicit_theme_switch_reclaims_a_user_managed_ps1() {
        let prompt = Prompt::new();
        prompt.theme_set_active("minimal").unwrap();
        let symtab = MemorySymbolTable::default();
        prompt.notify_prompt_var_set("PS1", "mine> ", &symtab);
        prompt.theme_set_active("minimal").unwrap();
        prompt.activate_theme_formats(&symtab).unwrap();
        assert_eq!(symtab.get("PS1"), Some(prompt.themes().current().layout.ps1.clone()));
    }

    #[test]
    fn theme_list_includes_builtins() {
        let prompt = Prompt::new();
        let names: Vec<String> = prompt.theme_list().into_iter().map(|(n, _)| n).collect();
        assert!(names.contains(&"default".to_string()));
    }
}
