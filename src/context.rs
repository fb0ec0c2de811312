//! The render context: everything the pipeline needs to know about the
//! shell and the terminal for a single prompt render. Immutable once built.

use std::path::PathBuf;
use std::sync::Arc;

use crate::segment::git::GitStatus;

/// Capability flags reported by an external terminal capability probe. We
/// only ever read these, never probe a terminal ourselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub has_colors: bool,
    pub has_256_color: bool,
    pub has_truecolor: bool,
}

impl Capabilities {
    /// The color depth used by the escape expander and powerline renderer:
    /// 0 = no color, 1 = basic (16), 2 = indexed (256), 3 = truecolor.
    pub fn color_depth(&self) -> u8 {
        if !self.has_colors {
            0
        } else if self.has_truecolor {
            3
        } else if self.has_256_color {
            2
        } else {
            1
        }
    }
}

/// Immutable per-render context. Built by the prompt façade from external
/// sources (symbol table, working directory source, job count, last exit
/// status, passwd/hostname lookups) and never mutated during a render.
#[derive(Clone, Debug)]
pub struct Context {
    pub username: String,
    pub hostname_short: String,
    pub hostname_full: String,
    pub cwd: PathBuf,
    pub cwd_tilde: String,
    pub last_exit_status: i32,
    pub job_count: u32,
    pub history_number: u64,
    pub command_number: u64,
    pub capabilities: Capabilities,
    pub tty: String,
    pub euid: u32,
    pub shell_name: String,
    pub shell_version: String,
    /// Latest published git snapshot, if the async worker has completed one
    /// for the current directory. `None` before the first completion, or
    /// when the cwd isn't a git repository at all.
    pub git_status: Option<Arc<GitStatus>>,
    /// `$SHLVL`, the shell nesting depth.
    pub shell_level: u32,
    /// Set when `$SSH_CONNECTION`/`$SSH_CLIENT`/`$SSH_TTY` indicate a
    /// remote login session.
    pub is_ssh_session: bool,
    /// Wall-clock duration of the last foreground command, if the shell
    /// reported one (it won't for the very first prompt of a session).
    pub last_command_duration_ms: Option<u64>,
    /// Active Python/virtualenv-style environment name, from `$VIRTUAL_ENV`
    /// or `$CONDA_DEFAULT_ENV`.
    pub virtualenv: Option<String>,
    /// Container identity, from `$container` (systemd-nspawn/podman) or the
    /// presence of `/.dockerenv`.
    pub container_name: Option<String>,
    pub aws_profile: Option<String>,
    pub aws_region: Option<String>,
    pub kube_context: Option<String>,
    pub kube_namespace: Option<String>,
}

impl Context {
    pub fn git_status(&self) -> Option<&GitStatus> {
        self.git_status.as_deref()
    }

    /// `true` when running as the superuser, the discriminator used by
    /// bash's `\$`, zsh's `%#`, and the `status`/`symbol` segments.
    pub fn is_root(&self) -> bool {
        self.euid == 0
    }

    pub fn color_depth(&self) -> u8 {
        self.capabilities.color_depth()
    }

    /// `\W` / zsh `%c`: basename of the tilde-folded cwd. `~` at home, `/`
    /// at the filesystem root.
    pub fn cwd_basename(&self) -> String {
        if self.cwd_tilde == "~" {
            return "~".to_string();
        }
        match self.cwd.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => "/".to_string(),
        }
    }

    /// Rewrites `path` so a leading `$HOME` becomes `~` (tilde-fold).
    pub fn tilde_fold(path: &str, home: &str) -> String {
        if home.is_empty() {
            return path.to_string();
        }
        if path == home {
            return "~".to_string();
        }
        if let Some(rest) = path.strip_prefix(home) {
            if rest.starts_with('/') {
                return format!("~{rest}");
            }
        }
        path.to_string()
    }
}

/// Builds sample contexts for segment unit tests elsewhere in the crate, so
/// every segment test isn't re-deriving the same dozen-field struct literal.
#[cfg(test)]
pub mod test_support {
    use super::*;

    pub fn sample_context() -> Context {
        Context {
            username: "alice".into(),
            hostname_short: "devbox".into(),
            hostname_full: "devbox.local".into(),
            cwd: PathBuf::from("/home/alice/project"),
            cwd_tilde: "~/project".into(),
            last_exit_status: 0,
            job_count: 0,
            history_number: 1,
            command_number: 1,
            capabilities: Capabilities { has_colors: true, has_256_color: true, has_truecolor: true },
            tty: "/dev/pts/0".into(),
            euid: 1000,
            shell_name: "bash".into(),
            shell_version: "5.2".into(),
            git_status: None,
            shell_level: 1,
            is_ssh_session: false,
            last_command_duration_ms: None,
            virtualenv: None,
            container_name: None,
            aws_profile: None,
            aws_region: None,
            kube_context: None,
            kube_namespace: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_fold_replaces_home_prefix() {
        assert_eq!(Context::tilde_fold("/home/alice/project", "/home/alice"), "~/project");
        assert_eq!(Context::tilde_fold("/home/alice", "/home/alice"), "~");
        assert_eq!(Context::tilde_fold("/home/alicexyz", "/home/alice"), "/home/alicexyz");
        assert_eq!(Context::tilde_fold("/var/log", "/home/alice"), "/var/log");
    }

    #[test]
    fn color_depth_follows_capability_flags() {
        let none = Capabilities { has_colors: false, has_256_color: true, has_truecolor: true };
        assert_eq!(none.color_depth(), 0);

        let basic = Capabilities { has_colors: true, has_256_color: false, has_truecolor: false };
        assert_eq!(basic.color_depth(), 1);

        let idx = Capabilities { has_colors: true, has_256_color: true, has_truecolor: false };
        assert_eq!(idx.color_depth(), 2);

        let truecolor = Capabilities { has_colors: true, has_256_color: true, has_truecolor: true };
        assert_eq!(truecolor.color_depth(), 3);
    }
}
