//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling
//!
//! Every prompt takes an `interactive` flag. When it is false the prompt
//! returns its default immediately and never touches stdin, which keeps CI
//! runs non-blocking.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::{FlowError, Result};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_branches, display_command_stderr, display_dry_run, display_error, display_field,
    display_status, display_success, display_warning, machine_output, set_machine_output,
};

/// Source of operator answers.
///
/// Implementors only provide [Prompt::read_line]; the question helpers are
/// shared so parsing and defaults behave the same everywhere.
pub trait Prompt {
    /// Show `prompt` and read one line of input, without the trailing newline.
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Yes/no question. Empty input picks `default`.
    fn confirm(&mut self, question: &str, default: bool, interactive: bool) -> Result<bool> {
        if !interactive {
            return Ok(default);
        }
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        let answer = self.read_line(&format!("{} {}: ", question, hint))?;
        let answer = answer.trim().to_lowercase();
        Ok(match answer.as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }

    /// Free-text question. Empty input picks `default`.
    fn input(&mut self, question: &str, default: &str, interactive: bool) -> Result<String> {
        if !interactive {
            return Ok(default.to_string());
        }
        let answer = self.read_line(&format!("{} [{}]: ", question, default))?;
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }

    /// Numbered selection; returns a 0-based index. Empty input picks the first option.
    fn select(&mut self, title: &str, options: &[String], interactive: bool) -> Result<usize> {
        if options.is_empty() {
            return Err(FlowError::prompt("nothing to select from"));
        }
        if !interactive {
            return Ok(0);
        }
        let prompt = format!(
            "{}\nSelect (1-{}) [default: 1]: ",
            formatter::numbered_menu(title, options),
            options.len()
        );
        let answer = self.read_line(&prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(0);
        }
        match answer.parse::<usize>() {
            Ok(index) if index > 0 && index <= options.len() => Ok(index - 1),
            _ => Err(FlowError::prompt(format!("invalid selection '{}'", answer))),
        }
    }
}

/// Prompts on the terminal using stdin/stdout
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        if formatter::machine_output() {
            eprint!("\n{}", prompt);
            io::stderr().flush()?;
        } else {
            print!("\n{}", prompt);
            io::stdout().flush()?;
        }

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Prompt double that replays canned answers and records what was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompt {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompt texts shown so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| FlowError::prompt("no scripted answer left"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_interactive_returns_defaults_without_reading() {
        let mut prompt = ScriptedPrompt::default();
        assert!(prompt.confirm("Continue?", true, false).unwrap());
        assert_eq!(prompt.input("Version", "1.2.3", false).unwrap(), "1.2.3");
        assert_eq!(
            prompt
                .select("Pick", &["a".to_string(), "b".to_string()], false)
                .unwrap(),
            0
        );
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn test_confirm_parsing() {
        let mut prompt = ScriptedPrompt::new(["", "YES", "n", "maybe"]);
        assert!(prompt.confirm("Q", true, true).unwrap());
        assert!(prompt.confirm("Q", false, true).unwrap());
        assert!(!prompt.confirm("Q", true, true).unwrap());
        assert!(!prompt.confirm("Q", true, true).unwrap());
    }

    #[test]
    fn test_input_default_on_empty() {
        let mut prompt = ScriptedPrompt::new(["", " 2.0.0 "]);
        assert_eq!(prompt.input("Version", "1.0.0", true).unwrap(), "1.0.0");
        assert_eq!(prompt.input("Version", "1.0.0", true).unwrap(), "2.0.0");
    }

    #[test]
    fn test_select_numbered() {
        let options = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let mut prompt = ScriptedPrompt::new(["3", "", "0", "abc"]);
        assert_eq!(prompt.select("Pick", &options, true).unwrap(), 2);
        assert_eq!(prompt.select("Pick", &options, true).unwrap(), 0);
        assert!(prompt.select("Pick", &options, true).is_err());
        assert!(prompt.select("Pick", &options, true).is_err());
        assert!(prompt.asked()[0].contains("  3. z"));
    }

    #[test]
    fn test_select_empty_options_fails() {
        let mut prompt = ScriptedPrompt::default();
        assert!(prompt.select("Pick", &[], true).is_err());
    }

    #[test]
    fn test_scripted_prompt_exhausted() {
        let mut prompt = ScriptedPrompt::default();
        assert!(prompt.confirm("Q", true, true).is_err());
    }
}
