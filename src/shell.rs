//! Shell identification and init-snippet generation: `$SHELL`-based
//! detection, `indoc!`-formatted init scripts for both bash (`PROMPT_COMMAND`)
//! and zsh (`precmd`).

use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use indoc::indoc;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
}

impl Shell {
    pub fn get_current_shell() -> Result<Self> {
        let shell: String = env::var("PROMPTWEAVE_SHELL")
            .or_else::<anyhow::Error, _>(|_| Ok(env::var("SHELL")?))
            .and_then(|shell| {
                let path = Path::new(shell.as_str());
                Ok(path.file_name().ok_or_else(|| anyhow!("couldn't determine shell"))?.to_string_lossy().into())
            })?;

        match shell.as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            other => Err(anyhow!("unsupported shell: {other}")),
        }
    }

    /// Prints the shell-specific init script: locates (and seeds, if
    /// missing) the user theme directory, then hooks prompt rendering
    /// into the shell's per-prompt callback.
    pub fn generate_init(&self, self_exe: &str) {
        match self {
            Self::Bash => println!(
                indoc!(
                    r##"
                        if [[ $- == *i* ]]; then
                            promptweave_conf_dir=$({exe} location)

                            if [ ! -d "${{promptweave_conf_dir}}/themes" ]; then
                                echo "Creating default theme directory"
                                mkdir -p "${{promptweave_conf_dir}}/themes"
                            fi

                            unset promptweave_conf_dir

                            PROMPT_COMMAND=promptweave_prompt
                            promptweave_prompt() {{
                                PS1="$(code=$? jobs=$(jobs -p | wc -l) {exe} prompt --which ps1)"
                            }}
                        else
                            echo "*** promptweave must be run from an interactive shell ***"
                        fi
                    "##
                ),
                exe = self_exe,
            ),
            Self::Zsh => println!(
                indoc!(
                    r##"
                        if [[ -o interactive ]]; then
                            promptweave_conf_dir=$({exe} location)

                            if [ ! -d "${{promptweave_conf_dir}}/themes" ]; then
                                echo "Creating default theme directory"
                                mkdir -p "${{promptweave_conf_dir}}/themes"
                            fi

                            unset promptweave_conf_dir

                            precmd() {{
                                PS1="$(code=$? jobs=$(jobs -p | wc -l) {exe} prompt --which ps1)"
                            }}
                        else
                            echo "*** promptweave must be run from an interactive shell ***"
                        fi
                    "##
                ),
                exe = self_exe,
            ),
        }
    }

    /// Lighter-weight variant for shells that already have a config
    /// directory and just need the prompt hook re-installed (e.g. after
    /// `exec`'ing into a new shell instance).
    pub fn generate_loader(&self, self_exe: &str) {
        match self {
            Self::Bash => println!(
                indoc!(
                    r##"
                        if [[ $- == *i* ]]; then
                            PROMPT_COMMAND=promptweave_prompt
                            promptweave_prompt() {{
                                PS1="$(code=$? jobs=$(jobs -p | wc -l) {exe} prompt --which ps1)"
                            }}
                        fi
                    "##
                ),
                exe = self_exe,
            ),
            Self::Zsh => println!(
                indoc!(
                    r##"
                        if [[ -o interactive ]]; then
                            precmd() {{
                                PS1="$(code=$? jobs=$(jobs -p | wc -l) {exe} prompt --which ps1)"
                            }}
                        fi
                    "##
                ),
                exe = self_exe,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_bash_and_zsh_basenames() {
        assert_eq!(Shell::Bash, Shell::Bash);
        assert_ne!(Shell::Bash, Shell::Zsh);
    }
}
