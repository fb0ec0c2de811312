//! `promptweave` CLI: the executable a shell's `PROMPT_COMMAND`/`precmd`
//! hook shells out to once per prompt.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use libpromptweave::context::{Capabilities, Context};
use libpromptweave::{Prompt, Which};

#[derive(Parser)]
#[command(name = "promptweave", about = "A unified bash/zsh prompt renderer")]
struct TopLevelArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints shell init code for the current (or given) shell.
    Init {
        #[arg(long)]
        shell: Option<String>,
    },
    /// Prints the lighter-weight loader snippet.
    Load {
        #[arg(long)]
        shell: Option<String>,
    },
    /// Renders one prompt string and prints it to stdout.
    Prompt {
        #[arg(long, value_enum, default_value = "ps1")]
        which: WhichArg,
    },
    /// Prints a single segment's rendered text, for debugging theme files.
    Segment { name: String },
    /// Theme registry operations.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Prints the config directory path.
    Location,
}

#[derive(Subcommand)]
enum ThemeAction {
    List,
    Current,
    Default,
}

#[derive(Copy, Clone, clap::ValueEnum)]
enum WhichArg {
    Ps1,
    Ps2,
    Rprompt,
}

fn project_dirs() -> ProjectDirs {
    ProjectDirs::from("com", "promptweave", "promptweave").expect("could not determine a home directory")
}

fn main() {
    env_logger::init();
    let args = TopLevelArgs::parse();
    let self_exe = std::env::args().next().unwrap_or_else(|| "promptweave".into());

    match args.command {
        Commands::Init { shell } => run_with_shell(shell, |s| s.generate_init(&self_exe)),
        Commands::Load { shell } => run_with_shell(shell, |s| s.generate_loader(&self_exe)),
        Commands::Location => {
            println!("{}", project_dirs().config_dir().display());
        }
        Commands::Prompt { which } => cmd_prompt(which),
        Commands::Segment { name } => cmd_segment(&name),
        Commands::Theme { action } => cmd_theme(action),
    }
}

fn run_with_shell(shell_arg: Option<String>, f: impl FnOnce(libpromptweave::shell::Shell)) {
    let shell = match shell_arg.as_deref() {
        Some("bash") => libpromptweave::shell::Shell::Bash,
        Some("zsh") => libpromptweave::shell::Shell::Zsh,
        Some(other) => {
            eprintln!("unsupported shell: {other}");
            std::process::exit(1);
        }
        None => match libpromptweave::shell::Shell::get_current_shell() {
            Ok(shell) => shell,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
    };
    f(shell);
}

fn cmd_prompt(which: WhichArg) {
    let prompt = Prompt::new();
    let ctx = build_context(&prompt);

    let which = match which {
        WhichArg::Ps1 => Which::Ps1,
        WhichArg::Ps2 => Which::Ps2,
        WhichArg::Rprompt => Which::RPrompt,
    };

    let dirs = project_dirs();
    let theme_dir = libpromptweave::theme::default_theme_dir(&dirs);
    if let Err(e) = prompt.theme_reload(&theme_dir) {
        log::debug!("theme reload skipped: {e}");
    }

    if let Some(git_dir) = ctx.cwd.to_str() {
        let _ = prompt.async_submit_git_status(PathBuf::from(git_dir), Duration::from_millis(200));
    }

    let rendered = prompt.render_prompt(which, &ctx);
    print!("{}", String::from_utf8_lossy(&rendered));
}

fn cmd_segment(name: &str) {
    let prompt = Prompt::new();
    let ctx = build_context(&prompt);
    let theme = prompt.themes().current();

    match libpromptweave::segment::find(name) {
        Some(seg) => {
            let (bytes, empty) = seg.render(&ctx, &theme);
            if empty {
                println!("(hidden)");
            } else {
                println!("{}", String::from_utf8_lossy(&bytes));
            }
        }
        None => {
            eprintln!("unknown segment: {name}");
            std::process::exit(1);
        }
    }
}

fn cmd_theme(action: ThemeAction) {
    let prompt = Prompt::new();
    match action {
        ThemeAction::List => {
            for (name, source) in prompt.theme_list() {
                println!("{name}\t{source}");
            }
        }
        ThemeAction::Current => {
            println!("{}", prompt.themes().current().meta.name);
        }
        ThemeAction::Default => {
            println!("{}", libpromptweave::theme::Theme::default().meta.name);
        }
    }
}

/// Gathers a render [`Context`] from the environment the shell hook set up
/// (`code`, `jobs`) plus whatever the process environment and a handful of
/// cheap syscalls can tell us.
fn build_context(prompt: &Prompt) -> Context {
    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".into());
    let hostname_full = hostname();
    let hostname_short = hostname_full.split('.').next().unwrap_or(&hostname_full).to_string();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    let home = std::env::var("HOME").unwrap_or_default();
    let cwd_tilde = Context::tilde_fold(&cwd.to_string_lossy(), &home);

    let last_exit_status = std::env::var("code").ok().and_then(|v| v.parse().ok()).unwrap_or(0);
    let job_count = std::env::var("jobs").ok().and_then(|v| v.parse().ok()).unwrap_or(0);
    let shell_level = std::env::var("SHLVL").ok().and_then(|v| v.parse().ok()).unwrap_or(1);

    let is_ssh_session =
        std::env::var("SSH_CONNECTION").is_ok() || std::env::var("SSH_CLIENT").is_ok() || std::env::var("SSH_TTY").is_ok();

    let virtualenv = std::env::var("VIRTUAL_ENV")
        .ok()
        .or_else(|| std::env::var("CONDA_DEFAULT_ENV").ok())
        .map(|path| PathBuf::from(path).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());

    let container_name = std::env::var("container").ok().or_else(|| {
        std::path::Path::new("/.dockerenv").exists().then(|| "docker".to_string())
    });

    let term = std::env::var("TERM").unwrap_or_default();
    let colorterm = std::env::var("COLORTERM").unwrap_or_default();
    let capabilities = Capabilities {
        has_colors: term != "dumb",
        has_256_color: term.contains("256color") || colorterm == "truecolor",
        has_truecolor: colorterm == "truecolor" || colorterm == "24bit",
    };

    let euid = current_euid();
    let git_status = prompt.latest_git_status();

    Context {
        username,
        hostname_short,
        hostname_full,
        cwd,
        cwd_tilde,
        last_exit_status,
        job_count,
        history_number: 0,
        command_number: 0,
        capabilities,
        tty: std::env::var("SSH_TTY").unwrap_or_default(),
        euid,
        shell_name: libpromptweave::shell::Shell::get_current_shell()
            .map(|s| format!("{s:?}").to_lowercase())
            .unwrap_or_else(|_| "unknown".into()),
        shell_version: std::env::var("PROMPTWEAVE_SHELL_VERSION").unwrap_or_else(|_| "0.0".into()),
        git_status,
        shell_level,
        is_ssh_session,
        last_command_duration_ms: std::env::var("PROMPTWEAVE_CMD_DURATION_MS").ok().and_then(|v| v.parse().ok()),
        virtualenv,
        container_name,
        aws_profile: std::env::var("AWS_PROFILE").ok(),
        aws_region: std::env::var("AWS_DEFAULT_REGION").ok().or_else(|| std::env::var("AWS_REGION").ok()),
        kube_context: std::env::var("PROMPTWEAVE_KUBE_CONTEXT").ok(),
        kube_namespace: std::env::var("PROMPTWEAVE_KUBE_NAMESPACE").ok(),
    }
}

#[cfg(unix)]
fn current_euid() -> u32 {
    nix::unistd::Uid::effective().as_raw()
}

#[cfg(not(unix))]
fn current_euid() -> u32 {
    0
}

fn hostname() -> String {
    #[cfg(unix)]
    {
        nix::unistd::gethostname()
            .ok()
            .and_then(|s| s.into_string().ok())
            .unwrap_or_else(|| "localhost".into())
    }
    #[cfg(not(unix))]
    {
        std::env::var("COMPUTERNAME").unwrap_or_else(|_| "localhost".into())
    }
}
