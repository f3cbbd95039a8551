//! Interactive prompts behind a capability trait.
//!
//! Core logic (credential resolution, shell-rc editing) never talks to the
//! terminal directly; it takes a [`Prompt`] so tests can script answers.

use std::io;

use dialoguer::{Confirm, Input, Password};

/// One blocking question to the user.
pub trait Prompt {
    /// Yes/no question. Defaults to "no" on plain Enter.
    fn confirm(&self, message: &str) -> io::Result<bool>;

    /// Ask for an API key (input hidden).
    fn api_key(&self) -> io::Result<String>;

    /// Free-form one-line input.
    fn input(&self, message: &str) -> io::Result<String>;
}

/// Terminal-backed prompt using dialoguer.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> io::Result<bool> {
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(io::Error::other)
    }

    fn api_key(&self) -> io::Result<String> {
        Password::new()
            .with_prompt("Please enter your Kimi API Key")
            .allow_empty_password(true)
            .interact()
            .map(|key| key.trim().to_string())
            .map_err(io::Error::other)
    }

    fn input(&self, message: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map(|line| line.trim().to_string())
            .map_err(io::Error::other)
    }
}
