//! Testable subprocess execution for the external synthesis and
//! transcription tools.
//!
//! The `CommandExecutor` trait lets backend engines run `piper`, `espeak-ng`,
//! `say` or `whisper-cli` without the tests needing those binaries installed.

use crate::error::{DoblajeError, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync so engines holding an executor stay shareable.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments; returns stdout on success.
    fn execute(&self, command: &str, args: &[&str]) -> Result<String>;

    /// Execute a command feeding `input` to its stdin; returns stdout.
    fn execute_with_input(&self, command: &str, args: &[&str], input: &str) -> Result<String>;

    /// Whether `command` resolves on this system.
    fn is_available(&self, command: &str) -> bool {
        self.execute(command, &["--version"]).is_ok()
    }
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }

    fn map_spawn_error(command: &str, e: std::io::Error) -> DoblajeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            DoblajeError::SynthesisToolNotFound {
                tool: command.to_string(),
            }
        } else {
            DoblajeError::Other(format!("Failed to execute {}: {}", command, e))
        }
    }

    fn check_status(command: &str, output: std::process::Output) -> Result<String> {
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DoblajeError::Other(format!(
                "{} failed with status {:?}: {}",
                command,
                output.status.code(),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(command)
            .args(args)
            .output()
            .map_err(|e| Self::map_spawn_error(command, e))?;
        Self::check_status(command, output)
    }

    fn execute_with_input(&self, command: &str, args: &[&str], input: &str) -> Result<String> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::map_spawn_error(command, e))?;

        if let Some(stdin) = child.stdin.take() {
            let mut stdin = stdin;
            stdin.write_all(input.as_bytes())?;
            // Dropping stdin closes the pipe so the child sees EOF
        }

        let output = child.wait_with_output()?;
        Self::check_status(command, output)
    }

    fn is_available(&self, command: &str) -> bool {
        // `which` probes without side effects; tools like espeak would
        // otherwise speak on a bare invocation
        Command::new("which")
            .arg(command)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Mock command executor recording calls and replaying queued responses.
#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub struct MockCommandExecutor {
        calls: Mutex<Vec<(String, Vec<String>, Option<String>)>>,
        responses: Mutex<VecDeque<Result<String>>>,
        available: Mutex<Vec<String>>,
    }

    impl MockCommandExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a successful response.
        pub fn with_response(self, response: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(response.to_string()));
            self
        }

        /// Queue an error response.
        pub fn with_error(self, error: DoblajeError) -> Self {
            self.responses.lock().unwrap().push_back(Err(error));
            self
        }

        /// Mark a command as present on the mock system.
        pub fn with_available(self, command: &str) -> Self {
            self.available.lock().unwrap().push(command.to_string());
            self
        }

        /// All recorded calls: (command, args, stdin input if any).
        pub fn calls(&self) -> Vec<(String, Vec<String>, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }

        fn record_and_reply(
            &self,
            command: &str,
            args: &[&str],
            input: Option<&str>,
        ) -> Result<String> {
            self.calls.lock().unwrap().push((
                command.to_string(),
                args.iter().map(|s| s.to_string()).collect(),
                input.map(|s| s.to_string()),
            ));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    impl CommandExecutor for MockCommandExecutor {
        fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
            self.record_and_reply(command, args, None)
        }

        fn execute_with_input(
            &self,
            command: &str,
            args: &[&str],
            input: &str,
        ) -> Result<String> {
            self.record_and_reply(command, args, Some(input))
        }

        fn is_available(&self, command: &str) -> bool {
            self.available
                .lock()
                .unwrap()
                .iter()
                .any(|c| c == command)
        }
    }
}
