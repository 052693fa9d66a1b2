//! Command/response execution over an unframed interactive shell.

use std::time::Duration;

use log::{debug, trace};
use regex::bytes::Regex;
use tokio::time::{Instant, sleep};

use super::buffer::PatternBuffer;
use super::reader::{Completion, ReadStrategy, ShellOptions};
use crate::driver::CommandResult;
use crate::error::Result;
use crate::platform::PlatformDefinition;
use crate::transport::{Session, SessionState, Transport};

/// Request/response executor on top of a [`Session`].
///
/// Owns the session for its whole lifetime; commands run strictly one at a
/// time through `&mut self`.
pub struct InteractiveShell<T: Transport> {
    session: Session<T>,
    platform: PlatformDefinition,
    prompt_pattern: Regex,
    options: ShellOptions,
    buffer: PatternBuffer,
    prompt: Option<String>,
}

impl<T: Transport> InteractiveShell<T> {
    /// Wrap a connected session.
    ///
    /// The prompt pattern comes from `options` when set, otherwise from the
    /// platform's privilege levels.
    pub fn new(session: Session<T>, platform: PlatformDefinition, options: ShellOptions) -> Self {
        let prompt_pattern = options
            .prompt_pattern
            .clone()
            .unwrap_or_else(|| platform.prompt_pattern());
        Self {
            session,
            platform,
            prompt_pattern,
            options,
            buffer: PatternBuffer::new(),
            prompt: None,
        }
    }

    /// Flush the login banner and run the platform's on-open commands.
    ///
    /// The banner is read for at most the settle delay and discarded.
    pub async fn settle(&mut self, command_wait: Duration) -> Result<()> {
        let completion = self.read_output(self.options.settle).await?;
        self.prompt = self.trailing_prompt();
        let banner = self.buffer.take();
        trace!("discarded {} banner bytes", banner.len());
        debug!(
            "shell settled ({:?}), prompt {:?}",
            completion,
            self.prompt.as_deref()
        );

        for command in self.platform.on_open_commands.clone() {
            self.execute(&command, command_wait).await?;
        }
        Ok(())
    }

    /// Send `command` and collect its output for at most `wait`.
    ///
    /// Under [`ReadStrategy::FixedWait`] the full `wait` always elapses.
    /// Under [`ReadStrategy::Adaptive`] reading stops early at the prompt;
    /// under [`ReadStrategy::Quiescence`] once output has gone idle.
    ///
    /// Bytes still arriving from an earlier command are discarded before
    /// sending.
    pub async fn execute(&mut self, command: &str, wait: Duration) -> Result<CommandResult> {
        self.buffer.clear();
        let stale = self.session.transport_mut()?.receive_available()?;
        if !stale.is_empty() {
            debug!(
                "discarding {} stale bytes before {:?}: {:?}",
                stale.len(),
                command,
                String::from_utf8_lossy(&stale)
            );
        }

        debug!("sending: {}", command);
        let start = Instant::now();
        let line = format!("{}\n", command);
        self.session.transport_mut()?.send(line.as_bytes()).await?;

        let completion = self.read_output(wait).await?;
        let elapsed = start.elapsed();

        let prompt = self.trailing_prompt();
        let raw = self.buffer.take();
        let text = String::from_utf8_lossy(&raw);
        let output = normalize_output(&text, command, prompt.as_deref());

        let privilege = prompt
            .as_deref()
            .and_then(|p| self.platform.determine_privilege(p))
            .map(|level| level.name.clone());
        if prompt.is_some() {
            self.prompt = prompt.clone();
        }

        let failure_message = self.platform.detect_failure(&output);
        debug!(
            "{:?} after {:?}: {} bytes, completion {:?}",
            command,
            elapsed,
            output.len(),
            completion
        );

        Ok(CommandResult {
            command: command.to_string(),
            output,
            prompt: prompt.map(|p| p.trim().to_string()),
            privilege,
            elapsed,
            completion,
            failure_message,
        })
    }

    /// Poll the transport until the read strategy decides output is done.
    async fn read_output(&mut self, wait: Duration) -> Result<Completion> {
        let deadline = Instant::now() + wait;
        let mut last_data: Option<Instant> = None;

        loop {
            let chunk = self.session.transport_mut()?.receive_available()?;
            let now = Instant::now();
            if !chunk.is_empty() {
                trace!(
                    "received {} bytes: {:?}",
                    chunk.len(),
                    String::from_utf8_lossy(&chunk)
                );
                self.buffer.extend(&chunk);
                last_data = Some(now);
            }

            match self.options.strategy {
                ReadStrategy::Adaptive => {
                    if self.buffer.ends_with_prompt(&self.prompt_pattern) {
                        return Ok(Completion::Prompt);
                    }
                }
                ReadStrategy::Quiescence { idle } => {
                    if last_data.is_some_and(|at| now.duration_since(at) >= idle) {
                        return Ok(Completion::Idle);
                    }
                }
                ReadStrategy::FixedWait => {}
            }

            if now >= deadline {
                return Ok(Completion::WaitElapsed);
            }
            sleep(self.options.poll_interval.min(deadline - now)).await;
        }
    }

    fn trailing_prompt(&self) -> Option<String> {
        if self.buffer.ends_with_prompt(&self.prompt_pattern) {
            Some(String::from_utf8_lossy(self.buffer.last_line()).into_owned())
        } else {
            None
        }
    }

    /// Privilege level of the most recently seen prompt.
    pub fn current_privilege(&self) -> Option<&str> {
        let prompt = self.prompt.as_deref()?;
        self.platform
            .determine_privilege(prompt)
            .map(|level| level.name.as_str())
    }

    /// Platform this shell speaks to.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// State of the underlying session.
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Close the underlying session. Idempotent.
    pub async fn close(&mut self) {
        self.session.close().await;
    }
}

/// Strip the command echo and trailing prompt, normalizing line endings.
fn normalize_output(text: &str, command: &str, prompt: Option<&str>) -> String {
    let mut body = text;
    if let Some(prompt) = prompt {
        body = body.strip_suffix(prompt).unwrap_or(body);
    }

    let body = body.replace("\r\n", "\n").replace('\r', "");
    let body = body.trim_start_matches('\n');
    let body = match body.strip_prefix(command.trim_end()) {
        Some(rest) if rest.is_empty() || rest.starts_with('\n') => rest,
        _ => body,
    };

    body.trim_matches('\n').trim_end().to_string()
}
