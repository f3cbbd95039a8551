//! Idempotent env-var block editing in shell startup files.
//!
//! The tool owns exactly one contiguous block in the rc file, delimited by
//! fixed marker comments. Injection replaces any previous block; removal
//! excises it. Both paths back up the file first, write via a sibling temp
//! file plus rename, and restore the backup if anything fails after the
//! backup was taken: the file is observably either fully updated or fully
//! unchanged.
//!
//! The marker literals must not change: they are what lets a newer kimicc
//! find blocks written by an older one.

use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::warn;

use crate::config::resolve::{ANTHROPIC_API_KEY_VAR, ANTHROPIC_BASE_URL_VAR, DEFAULT_BASE_URL};
use crate::prompt::Prompt;
use crate::shell::kind::ShellKind;

/// Start-of-block marker. The injected line appends a timestamp after it,
/// so matching is on this prefix.
pub const MARKER_START: &str = "# KimiCC Environment Variables - Added";
/// End-of-block marker, matched literally.
pub const MARKER_END: &str = "# End KimiCC Environment Variables";

/// Errors from inject/remove. Config-file state is guaranteed unchanged
/// when one of these is returned.
#[derive(Debug, Error)]
pub enum ShellEnvError {
    #[error("shell config '{path}' is not usable: {reason}")]
    InvalidTarget { path: PathBuf, reason: String },

    #[error("failed to back up '{path}': {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to update '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("prompt failed: {source}")]
    Prompt {
        #[source]
        source: io::Error,
    },
}

/// Which of our exported variables already appear in the file,
/// outside or inside a marker block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExistingVars {
    pub api_key: bool,
    pub base_url: bool,
}

impl ExistingVars {
    pub fn any(&self) -> bool {
        self.api_key || self.base_url
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.api_key {
            names.push(ANTHROPIC_API_KEY_VAR);
        }
        if self.base_url {
            names.push(ANTHROPIC_BASE_URL_VAR);
        }
        names
    }
}

/// Editor over one shell startup file.
pub struct ShellRcEditor<'a> {
    path: PathBuf,
    prompt: &'a dyn Prompt,
}

impl<'a> ShellRcEditor<'a> {
    /// Editor over an explicit rc file path.
    pub fn new(path: PathBuf, prompt: &'a dyn Prompt) -> Self {
        Self { path, prompt }
    }

    /// Editor over the canonical rc file of `shell` in the user's home.
    pub fn for_shell(shell: ShellKind, prompt: &'a dyn Prompt) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(shell.rc_file(&home), prompt)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check the target is editable before touching anything.
    ///
    /// An existing file must be openable for writing; a missing file needs
    /// a writable parent directory (created if absent).
    pub fn validate(&self) -> Result<(), ShellEnvError> {
        let invalid = |reason: String| ShellEnvError::InvalidTarget {
            path: self.path.clone(),
            reason,
        };

        if self.path.exists() {
            fs::OpenOptions::new()
                .append(true)
                .open(&self.path)
                .map_err(|e| invalid(e.to_string()))?;
            return Ok(());
        }

        let dir = self.path.parent().unwrap_or(Path::new("."));
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| invalid(e.to_string()))?;
        }
        let probe = dir.join(format!(".kimicc-write-check-{}", std::process::id()));
        fs::write(&probe, b"").map_err(|e| invalid(e.to_string()))?;
        let _ = fs::remove_file(&probe);
        Ok(())
    }

    /// Copy the file to `<path>.backup.<unixMillis>`. Returns the backup
    /// path, or `None` if there was nothing to back up.
    pub fn backup(&self) -> Result<Option<PathBuf>, ShellEnvError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let backup = sibling(&self.path, &format!(".backup.{millis}"));
        fs::copy(&self.path, &backup).map_err(|e| ShellEnvError::Backup {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(backup))
    }

    /// Scan for exported assignments of our variables, one line at a time.
    /// Unreadable files count as "nothing found".
    pub fn existing_env_vars(&self) -> ExistingVars {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %err, "could not read shell config");
                }
                return ExistingVars::default();
            }
        };

        let mut vars = ExistingVars::default();
        for line in content.lines() {
            vars.api_key |= line_exports(line, ANTHROPIC_API_KEY_VAR);
            vars.base_url |= line_exports(line, ANTHROPIC_BASE_URL_VAR);
        }
        vars
    }

    /// Inject (or replace) the marker-delimited export block.
    ///
    /// Returns `Ok(false)` when the user declines to overwrite existing
    /// variables, a normal no-op, not an error.
    pub fn inject(&self, api_key: &str, force: bool) -> Result<bool, ShellEnvError> {
        self.validate()?;

        let existing = self.existing_env_vars();
        if existing.any() && !force {
            println!(
                "⚠️  Environment variables already exist in {}:",
                self.path.display()
            );
            for name in existing.names() {
                println!("   - {name}");
            }
            let overwrite = self
                .prompt
                .confirm("Do you want to overwrite them?")
                .map_err(|e| ShellEnvError::Prompt { source: e })?;
            if !overwrite {
                return Ok(false);
            }
        }

        let backup = self.backup()?;
        match self.write_block(api_key) {
            Ok(()) => {
                println!(
                    "✅ Environment variables injected into {}",
                    self.path.display()
                );
                self.report_written(backup.as_deref());
                Ok(true)
            }
            Err(err) => {
                self.restore(backup.as_deref());
                Err(err)
            }
        }
    }

    /// Remove the marker-delimited block, if present.
    ///
    /// Returns `Ok(false)` when there is nothing to remove or the user
    /// declines.
    pub fn remove(&self, force: bool) -> Result<bool, ShellEnvError> {
        self.validate()?;

        if !self.path.exists() {
            println!("ℹ️  Shell config file not found: {}", self.path.display());
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| ShellEnvError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        let Some(span) = marker_span(&content) else {
            println!("ℹ️  No KimiCC environment variables found to remove.");
            return Ok(false);
        };

        if !force {
            let proceed = self
                .prompt
                .confirm("Are you sure you want to remove KimiCC environment variables?")
                .map_err(|e| ShellEnvError::Prompt { source: e })?;
            if !proceed {
                println!("Removal cancelled.");
                return Ok(false);
            }
        }

        let backup = self.backup()?;
        let cleaned = format!("{}{}", &content[..span.start], &content[span.end..]);
        match atomic_write(&self.path, &cleaned) {
            Ok(()) => {
                println!(
                    "✅ KimiCC environment variables removed from {}",
                    self.path.display()
                );
                self.report_written(backup.as_deref());
                Ok(true)
            }
            Err(err) => {
                self.restore(backup.as_deref());
                Err(ShellEnvError::Write {
                    path: self.path.clone(),
                    source: err,
                })
            }
        }
    }

    fn write_block(&self, api_key: &str) -> Result<(), ShellEnvError> {
        let write_err = |e: io::Error| ShellEnvError::Write {
            path: self.path.clone(),
            source: e,
        };

        let current = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(write_err(err)),
        };

        let cleaned = excise_block(&current);
        let timestamp = chrono::Utc::now().to_rfc3339();
        let block = format!(
            "{MARKER_START} {timestamp}\n\
             export {ANTHROPIC_BASE_URL_VAR}=\"{DEFAULT_BASE_URL}\"\n\
             export {ANTHROPIC_API_KEY_VAR}=\"{api_key}\"\n\
             {MARKER_END}\n"
        );

        let trimmed = cleaned.trim_end();
        let updated = if trimmed.is_empty() {
            block
        } else {
            format!("{trimmed}\n\n{block}")
        };

        atomic_write(&self.path, &updated).map_err(write_err)
    }

    fn report_written(&self, backup: Option<&Path>) {
        if let Some(backup) = backup {
            println!("📋 Backup created at {}", backup.display());
        }
        println!("\n💡 To apply changes, run: source {}", self.path.display());
    }

    /// Put the pre-image back after a failed write. Best-effort: the
    /// original error is what the caller sees either way.
    fn restore(&self, backup: Option<&Path>) {
        let Some(backup) = backup else { return };
        match fs::copy(backup, &self.path) {
            Ok(_) => eprintln!("❌ Update failed, restored original config from backup"),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to restore backup");
            }
        }
    }
}

/// Byte range of the marker block, inclusive of both marker lines.
///
/// First occurrence of the start marker through the first occurrence of the
/// end marker at or after it; `None` when either is missing (malformed
/// blocks are left untouched).
fn marker_span(content: &str) -> Option<Range<usize>> {
    let start = content.find(MARKER_START)?;
    let end_rel = content[start..].find(MARKER_END)?;
    Some(start..start + end_rel + MARKER_END.len())
}

/// Content with any existing marker block excised.
fn excise_block(content: &str) -> String {
    match marker_span(content) {
        Some(span) => format!("{}{}", &content[..span.start], &content[span.end..]),
        None => content.to_string(),
    }
}

/// Does this line export `var`? Tolerates leading whitespace; requires
/// `export`, whitespace, then `var=` exactly.
fn line_exports(line: &str, var: &str) -> bool {
    let Some(rest) = line.trim_start().strip_prefix("export") else {
        return false;
    };
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        // No whitespace after "export", e.g. "exportANTHROPIC_...".
        return false;
    }
    trimmed
        .strip_prefix(var)
        .is_some_and(|after| after.starts_with('='))
}

/// Write to a sibling temp file, then rename over the target. A crash
/// mid-write never leaves a half-written rc file.
fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let tmp = sibling(path, ".tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_exports_tolerates_leading_whitespace() {
        assert!(line_exports("export ANTHROPIC_API_KEY=abc", "ANTHROPIC_API_KEY"));
        assert!(line_exports("  export ANTHROPIC_API_KEY=\"abc\"", "ANTHROPIC_API_KEY"));
        assert!(line_exports("\texport\tANTHROPIC_BASE_URL=x", "ANTHROPIC_BASE_URL"));
    }

    #[test]
    fn line_exports_requires_exact_shape() {
        assert!(!line_exports("# export ANTHROPIC_API_KEY=abc", "ANTHROPIC_API_KEY"));
        assert!(!line_exports("exportANTHROPIC_API_KEY=abc", "ANTHROPIC_API_KEY"));
        assert!(!line_exports("export ANTHROPIC_API_KEY_OLD=abc", "ANTHROPIC_API_KEY"));
        assert!(!line_exports("export ANTHROPIC_API_KEY abc", "ANTHROPIC_API_KEY"));
    }

    #[test]
    fn marker_span_requires_end_after_start() {
        let good = format!("a\n{MARKER_START} ts\nx\n{MARKER_END}\nb\n");
        let span = marker_span(&good).unwrap();
        assert!(good[span.clone()].starts_with(MARKER_START));
        assert!(good[span].ends_with(MARKER_END));

        // End marker only before the start marker: malformed.
        let reversed = format!("{MARKER_END}\nmiddle\n{MARKER_START} ts\n");
        assert!(marker_span(&reversed).is_none());

        assert!(marker_span("no markers here").is_none());
        assert!(marker_span(&format!("{MARKER_START} only")).is_none());
    }

    #[test]
    fn excise_block_leaves_malformed_content_untouched() {
        let content = format!("before\n{MARKER_START} dangling\nafter\n");
        assert_eq!(excise_block(&content), content);
    }

    #[test]
    fn excise_block_removes_first_block_inclusive() {
        let content = format!("keep\n{MARKER_START} ts\nexport X=1\n{MARKER_END}\ntail\n");
        assert_eq!(excise_block(&content), "keep\n\ntail\n");
    }
}
