//! The `Git` segment and the git status provider behind it.
//!
//! Surfaces branch, ahead/behind, staged/unstaged/untracked counts, and
//! dirty/clean coloring, built on [`crate::subprocess`] rather than a
//! linked git library — a stuck NFS mount or stale index lock can hang a
//! library call indefinitely, but a subprocess can always be killed on a
//! timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::color::Color;
use crate::context::Context;
use crate::segment::{Segment, Visibility};
use crate::subprocess::run_in_dir;
use crate::theme::Theme;

/// A structured snapshot of a repository's state, as produced by
/// [`query`]. Conservative defaults (`is_git_repo = false`, zeroed
/// counts) stand in whenever a subprocess call fails or times out — a
/// non-zero git exit is "information unavailable," never a fatal error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitStatus {
    pub is_git_repo: bool,
    pub branch: Option<String>,
    pub commit_short: Option<String>,
    pub is_detached: bool,
    pub is_merging: bool,
    pub is_rebasing: bool,
    pub staged_count: usize,
    pub unstaged_count: usize,
    pub untracked_count: usize,
    pub ahead: u32,
    pub behind: u32,
}

impl GitStatus {
    pub fn is_dirty(&self) -> bool {
        self.staged_count + self.unstaged_count + self.untracked_count > 0
    }

    pub fn is_in_progress(&self) -> bool {
        self.is_merging || self.is_rebasing
    }
}

/// Runs a sequence of git plumbing/porcelain commands against `cwd`,
/// bounding every subprocess call to `timeout`. Returns the snapshot plus
/// whether any individual call timed out.
pub fn query(cwd: &Path, timeout: Duration) -> (GitStatus, bool) {
    let mut timed_out = false;
    let mut run = |args: &[&str]| match run_in_dir(cwd, args, timeout) {
        Ok(out) => {
            if out.timed_out {
                timed_out = true;
            }
            out
        }
        Err(e) => {
            log::warn!("git subprocess failed to launch: {e}");
            crate::subprocess::SubprocessOutput { exit_status: None, timed_out: false, stdout: String::new() }
        }
    };

    let git_dir_out = run(&["rev-parse", "--git-dir"]);
    if !git_dir_out.succeeded() {
        return (GitStatus::default(), timed_out);
    }
    let git_dir = resolve_git_dir(cwd, &git_dir_out.stdout);

    let mut status = GitStatus { is_git_repo: true, ..GitStatus::default() };

    let branch_out = run(&["branch", "--show-current"]);
    if branch_out.succeeded() && !branch_out.stdout.is_empty() {
        status.branch = Some(branch_out.stdout.clone());
    }

    let symbolic_ref_out = run(&["symbolic-ref", "HEAD"]);
    status.is_detached = !symbolic_ref_out.succeeded();

    if status.is_detached || status.branch.is_none() {
        let commit_out = run(&["rev-parse", "--short", "HEAD"]);
        if commit_out.succeeded() && !commit_out.stdout.is_empty() {
            status.commit_short = Some(commit_out.stdout.clone());
        }
    }

    let porcelain_out = run(&["status", "--porcelain"]);
    if porcelain_out.succeeded() {
        for line in porcelain_out.stdout.lines() {
            let mut chars = line.chars();
            let index_status = chars.next().unwrap_or(' ');
            let worktree_status = chars.next().unwrap_or(' ');
            if index_status == '?' {
                status.untracked_count += 1;
            } else {
                if index_status != ' ' {
                    status.staged_count += 1;
                }
                if worktree_status != ' ' {
                    status.unstaged_count += 1;
                }
            }
        }
    }

    let ahead_behind_out = run(&["rev-list", "--left-right", "--count", "HEAD...@{upstream}"]);
    if ahead_behind_out.succeeded() {
        let mut parts = ahead_behind_out.stdout.split_whitespace();
        if let (Some(ahead), Some(behind)) = (parts.next(), parts.next()) {
            status.ahead = ahead.parse().unwrap_or(0);
            status.behind = behind.parse().unwrap_or(0);
        }
    }

    status.is_merging = git_dir.join("MERGE_HEAD").exists();
    status.is_rebasing = git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists();

    (status, timed_out)
}

fn resolve_git_dir(cwd: &Path, reported: &str) -> PathBuf {
    let reported = Path::new(reported);
    if reported.is_absolute() {
        reported.to_path_buf()
    } else {
        cwd.join(reported)
    }
}

/// Theme colors for the `git` segment.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct GitTheme {
    pub clean_fg: Color,
    pub clean_bg: Color,
    pub dirty_fg: Color,
    pub dirty_bg: Color,
    pub ahead_fg: Color,
    pub ahead_bg: Color,
    pub behind_fg: Color,
    pub behind_bg: Color,
    pub staged_fg: Color,
    pub staged_bg: Color,
    pub unstaged_fg: Color,
    pub unstaged_bg: Color,
    pub untracked_fg: Color,
    pub untracked_bg: Color,
    pub branch_glyph: String,
    pub detached_glyph: String,
}

impl Default for GitTheme {
    fn default() -> Self {
        Self {
            clean_fg: Color::basic(0),
            clean_bg: Color::indexed(148),
            dirty_fg: Color::basic(15),
            dirty_bg: Color::indexed(161),
            ahead_fg: Color::indexed(250),
            ahead_bg: Color::indexed(240),
            behind_fg: Color::indexed(250),
            behind_bg: Color::indexed(240),
            staged_fg: Color::basic(15),
            staged_bg: Color::indexed(22),
            unstaged_fg: Color::basic(15),
            unstaged_bg: Color::indexed(130),
            untracked_fg: Color::basic(15),
            untracked_bg: Color::indexed(52),
            branch_glyph: "\u{e0a0}".into(),
            detached_glyph: "\u{2693}".into(),
        }
    }
}

pub struct Git;

impl Segment for Git {
    fn name(&self) -> &'static str {
        "git"
    }

    fn is_visible(&self, ctx: &Context, theme: &Theme) -> Visibility {
        let snapshot = ctx.git_status();
        Visibility::from(snapshot.map(|s| s.is_git_repo).unwrap_or(false) && theme.segment_enabled("git"))
    }

    fn render(&self, ctx: &Context, theme: &Theme) -> (Vec<u8>, bool) {
        let Some(status) = ctx.git_status() else {
            return (Vec::new(), true);
        };
        let t = &theme.palette.git;

        let label = match (&status.branch, &status.commit_short, status.is_detached) {
            (Some(branch), _, false) => branch.clone(),
            (_, Some(commit), _) => format!("{} {commit}", t.detached_glyph),
            _ => "HEAD".to_string(),
        };
        let glyph = if status.is_detached { &t.detached_glyph } else { &t.branch_glyph };
        let text = format!("{glyph} {label}");
        (text.into_bytes(), false)
    }

    fn property(&self, prop: &str, ctx: &Context) -> Option<String> {
        let status = ctx.git_status()?;
        match prop {
            "branch" => status.branch.clone(),
            "commit" => status.commit_short.clone(),
            "ahead" => Some(status.ahead.to_string()),
            "behind" => Some(status.behind.to_string()),
            "dirty" => Some(status.is_dirty().to_string()),
            _ => None,
        }
    }

    fn render_powerline(&self, ctx: &Context, theme: &Theme) -> Vec<crate::powerline::PowerlineSegment> {
        let Some(status) = ctx.git_status() else {
            return Vec::new();
        };
        let t = &theme.palette.git;
        let mut blocks = Vec::new();

        let (fg, bg) = if status.is_dirty() { (t.dirty_fg, t.dirty_bg) } else { (t.clean_fg, t.clean_bg) };
        let label = match (&status.branch, &status.commit_short) {
            (Some(branch), _) => branch.clone(),
            (None, Some(commit)) => commit.clone(),
            (None, None) => "HEAD".to_string(),
        };
        let glyph = if status.is_detached { &t.detached_glyph } else { &t.branch_glyph };
        blocks.push(crate::powerline::PowerlineSegment { content: format!("{glyph} {label}"), fg, bg });

        if status.ahead > 0 {
            blocks.push(crate::powerline::PowerlineSegment {
                content: format!("{}\u{2b06}", status.ahead),
                fg: t.ahead_fg,
                bg: t.ahead_bg,
            });
        }
        if status.behind > 0 {
            blocks.push(crate::powerline::PowerlineSegment {
                content: format!("{}\u{2b07}", status.behind),
                fg: t.behind_fg,
                bg: t.behind_bg,
            });
        }
        if status.staged_count > 0 {
            blocks.push(crate::powerline::PowerlineSegment {
                content: format!("{}+", status.staged_count),
                fg: t.staged_fg,
                bg: t.staged_bg,
            });
        }
        if status.unstaged_count > 0 {
            blocks.push(crate::powerline::PowerlineSegment {
                content: format!("{}\u{270e}", status.unstaged_count),
                fg: t.unstaged_fg,
                bg: t.unstaged_bg,
            });
        }
        if status.untracked_count > 0 {
            blocks.push(crate::powerline::PowerlineSegment {
                content: format!("{}?", status.untracked_count),
                fg: t.untracked_fg,
                bg: t.untracked_bg,
            });
        }

        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn init_repo() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let run = |args: &[&str]| {
            Command::new("git").arg("-C").arg(dir.path()).args(args).output().expect("git should be installed");
        };
        run(&["init", "-q", "-b", "main"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "user.name", "test"]);
        dir
    }

    #[test]
    fn non_repo_reports_is_git_repo_false() {
        let dir = tempfile::tempdir().unwrap();
        let (status, timed_out) = query(dir.path(), Duration::from_secs(2));
        assert!(!status.is_git_repo);
        assert!(!timed_out);
        assert_eq!(status, GitStatus::default());
    }

    #[test]
    fn freshly_initialized_repo_is_unborn_and_clean() {
        let dir = init_repo();
        let (status, _) = query(dir.path(), Duration::from_secs(2));
        assert!(status.is_git_repo);
        assert!(!status.is_dirty());
    }

    #[test]
    fn untracked_file_is_counted() {
        let dir = init_repo();
        std::fs::write(dir.path().join("new.txt"), "hi").unwrap();
        let (status, _) = query(dir.path(), Duration::from_secs(2));
        assert_eq!(status.untracked_count, 1);
        assert!(status.is_dirty());
    }

    #[test]
    fn staged_file_is_counted() {
        let dir = init_repo();
        std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
        Command::new("git").arg("-C").arg(dir.path()).args(["add", "a.txt"]).output().unwrap();
        let (status, _) = query(dir.path(), Duration::from_secs(2));
        assert_eq!(status.staged_count, 1);
        assert_eq!(status.untracked_count, 0);
    }
}
