use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

/// The three shells whose startup files we know how to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShellKind {
    Zsh,
    Bash,
    Fish,
}

impl ShellKind {
    /// Detect the user's shell from `$SHELL`. Falls back to bash.
    pub fn detect() -> Self {
        Self::from_shell_var(&std::env::var("SHELL").unwrap_or_default())
    }

    /// Substring match against a shell path, in priority order
    /// zsh, bash, fish. Anything unrecognized maps to bash.
    pub fn from_shell_var(shell: &str) -> Self {
        if shell.contains("zsh") {
            Self::Zsh
        } else if shell.contains("bash") {
            Self::Bash
        } else if shell.contains("fish") {
            Self::Fish
        } else {
            Self::Bash
        }
    }

    /// Canonical startup file for this shell under `home`.
    pub fn rc_file(&self, home: &Path) -> PathBuf {
        match self {
            Self::Zsh => home.join(".zshrc"),
            Self::Bash => home.join(".bashrc"),
            Self::Fish => home.join(".config").join("fish").join("config.fish"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zsh => "zsh",
            Self::Bash => "bash",
            Self::Fish => "fish",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
