//! The command interpreter
//!
//! Takes one raw input line per turn, simulates it against the
//! environment, and returns a [`CommandResult`]. Every failure mode a
//! player can trigger — unknown command, bad arguments, missing target,
//! wrong state — is an ordinary result, never an error return.

pub mod docker;
pub mod kubectl;
pub mod linux;
pub mod services;

use crate::sim::SimEnv;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-step forced output, keyed by normalized command line. Lets a
/// level script exact narrative output where the generic simulation
/// would print something blander.
pub type OutputOverrides = BTreeMap<String, String>;

/// What one simulated command produced.
///
/// `message` is categorized with a stable prefix per failure kind so
/// that level matching and hint logic can rely on it; `output` is what
/// the player sees. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub output: String,
    pub success: bool,
    pub message: String,
}

impl CommandResult {
    /// Successful command with output and no extra commentary.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
            message: String::new(),
        }
    }

    /// Successful command with a narrative message for the session log.
    pub fn ok_with(output: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
            message: message.into(),
        }
    }

    /// Empty input line.
    pub fn noop() -> Self {
        Self {
            output: String::new(),
            success: false,
            message: String::new(),
        }
    }

    /// The command name itself is not recognized.
    pub fn unknown(cmd: &str) -> Self {
        Self {
            output: format!("bash: {}: command not found", cmd),
            success: false,
            message: format!("unknown command: {}", cmd),
        }
    }

    /// Recognized command, malformed arguments.
    pub fn usage(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: false,
            message: "invalid arguments".to_string(),
        }
    }

    /// Recognized command, but its target does not exist.
    pub fn not_found(output: impl Into<String>, target: &str) -> Self {
        Self {
            output: output.into(),
            success: false,
            message: format!("target not found: {}", target),
        }
    }

    /// The target exists but is in the wrong state for this operation,
    /// e.g. stopping an already-exited container.
    pub fn wrong_state(output: impl Into<String>, detail: &str) -> Self {
        Self {
            output: output.into(),
            success: false,
            message: format!("wrong state: {}", detail),
        }
    }
}

/// Split a line on whitespace, honoring single and double quotes.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '\'' | '"' => quote = Some(c),
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(c),
            },
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Canonical form of a command line for override lookup and pattern
/// matching: tokens re-joined with single spaces, lowercased.
pub fn normalize_line(line: &str) -> String {
    tokenize(line).join(" ").to_lowercase()
}

/// The command interpreter. Stateless; all state lives in [`SimEnv`].
#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Parse and simulate one raw input line.
    ///
    /// If the active step defines an output override for this (normalized)
    /// line, the override text replaces the generic output — the handler
    /// still runs first, so state effects land and the success flag stays
    /// honest.
    pub fn execute(
        &self,
        env: &mut SimEnv,
        raw: &str,
        overrides: Option<&OutputOverrides>,
    ) -> CommandResult {
        let tokens = tokenize(raw);
        if tokens.is_empty() {
            return CommandResult::noop();
        }

        let mut result = self.dispatch(env, &tokens);

        if let Some(forced) = overrides.and_then(|o| o.get(&normalize_line(raw))) {
            result.output = forced.clone();
        }
        result
    }

    fn dispatch(&self, env: &mut SimEnv, tokens: &[String]) -> CommandResult {
        let cmd = tokens[0].to_lowercase();
        let args = &tokens[1..];

        match cmd.as_str() {
            "ls" => linux::ls(env, args),
            "cd" => linux::cd(env, args),
            "cat" => linux::cat(env, args),
            "grep" => linux::grep(env, args),
            "ps" => linux::ps(env, args),
            "kill" => linux::kill(env, args),
            "du" => linux::du(env, args),
            "df" => linux::df(env, args),
            "rm" => linux::rm(env, args),
            "mkdir" => linux::mkdir(env, args),
            "find" => linux::find(env, args),
            "head" => linux::head(env, args),
            "tail" => linux::tail(env, args),
            "chmod" => linux::chmod(env, args),
            "mv" => linux::mv(env, args),
            "cp" => linux::cp(env, args),
            "sudo" => {
                // Unwrap and re-dispatch. No permission model here.
                if args.is_empty() {
                    CommandResult::usage("sudo: no command specified")
                } else {
                    self.dispatch(env, args)
                }
            }
            "systemctl" => services::systemctl(env, args),
            "docker" => docker::docker(env, args),
            "kubectl" => kubectl::kubectl(env, args),
            _ => CommandResult::unknown(&cmd),
        }
    }
}
