//! Shared test helpers.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

use kimicc::prompt::Prompt;

/// Scripted prompt. Every answer must be queued up front; an unscripted
/// prompt panics, which doubles as an assertion that a code path never
/// reaches the terminal.
#[derive(Default)]
pub struct FakePrompt {
    confirms: RefCell<VecDeque<bool>>,
    api_keys: RefCell<VecDeque<String>>,
    inputs: RefCell<VecDeque<String>>,
}

impl FakePrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirm_with(self, answer: bool) -> Self {
        self.confirms.borrow_mut().push_back(answer);
        self
    }

    pub fn api_key_with(self, key: &str) -> Self {
        self.api_keys.borrow_mut().push_back(key.to_string());
        self
    }

    pub fn input_with(self, line: &str) -> Self {
        self.inputs.borrow_mut().push_back(line.to_string());
        self
    }
}

impl Prompt for FakePrompt {
    fn confirm(&self, message: &str) -> io::Result<bool> {
        Ok(self
            .confirms
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted confirm prompt: {message}")))
    }

    fn api_key(&self) -> io::Result<String> {
        Ok(self
            .api_keys
            .borrow_mut()
            .pop_front()
            .expect("unscripted api key prompt"))
    }

    fn input(&self, message: &str) -> io::Result<String> {
        Ok(self
            .inputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted input prompt: {message}")))
    }
}
