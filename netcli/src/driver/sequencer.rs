//! Configuration transactions.
//!
//! A configuration change is a fixed script run inside the platform's
//! configuration frame:
//!
//! ```text
//! Idle -> EnteringConfig -> Configuring -> ExitingConfig -> Saved
//!   \____________\______________\______________\________-> Aborted
//! ```
//!
//! Once the enter command has been sent, every exit path tries to leave
//! configuration mode before the session is released. The guard holds
//! `&mut InteractiveShell`, so nothing else can use the shell while a
//! transaction is open, and `commit()`/`abort()` consume it.
//!
//! A failed save is not rolled back; changes applied before the failure
//! stay in the running configuration.

use std::fmt;
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;

use super::result::CommandResult;
use crate::channel::InteractiveShell;
use crate::error::{DriverError, Error, Result};
use crate::platform::{ConfigFrame, ConfigScript};
use crate::transport::Transport;

/// Progress of a [`ConfigTransaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    Idle,
    EnteringConfig,
    Configuring,
    ExitingConfig,
    /// Changes applied and persisted.
    Saved,
    Aborted,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionState::Idle => "idle",
            TransactionState::EnteringConfig => "entering config",
            TransactionState::Configuring => "configuring",
            TransactionState::ExitingConfig => "exiting config",
            TransactionState::Saved => "saved",
            TransactionState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What a committed transaction did.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionReport {
    /// Scope command, e.g. `interface Gi0/0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Every command sent, in order, including framing.
    pub issued: Vec<String>,
    /// Device output of every command, newline-joined.
    pub output: String,
    /// Output of the save command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_output: Option<String>,
    pub state: TransactionState,
}

/// RAII guard for one configuration change.
///
/// Dropping the guard without calling [`commit`](Self::commit) or
/// [`abort`](Self::abort) logs a warning; the device may be left in
/// configuration mode.
pub struct ConfigTransaction<'a, T: Transport> {
    shell: &'a mut InteractiveShell<T>,
    frame: Option<ConfigFrame>,
    wait: Duration,
    scope: Option<String>,
    state: TransactionState,
    in_config: bool,
    issued: Vec<String>,
    output: Vec<String>,
    save_output: Option<String>,
    consumed: bool,
}

impl<'a, T: Transport> ConfigTransaction<'a, T> {
    /// Start a transaction using the platform's configuration frame.
    ///
    /// Nothing is sent until [`enter`](Self::enter).
    pub fn new(shell: &'a mut InteractiveShell<T>, wait: Duration) -> Self {
        let frame = shell.platform().dialect.config_frame();
        Self {
            shell,
            frame,
            wait,
            scope: None,
            state: TransactionState::Idle,
            in_config: false,
            issued: vec![],
            output: vec![],
            save_output: None,
            consumed: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Enter configuration mode and select `scope`, if any.
    pub async fn enter(&mut self, scope: Option<&str>) -> Result<()> {
        self.state = TransactionState::EnteringConfig;
        if let Some(frame) = self.frame.clone() {
            // Set before sending: a failed send may still have reached the device
            self.in_config = true;
            self.run(&frame.enter).await?;
        }
        if let Some(scope) = scope {
            self.scope = Some(scope.to_string());
            self.run(scope).await?;
        }
        self.state = TransactionState::Configuring;
        Ok(())
    }

    /// Send one command inside the transaction.
    pub async fn send_command(&mut self, command: &str) -> Result<CommandResult> {
        if self.state != TransactionState::Configuring {
            return Err(DriverError::InvalidConfig {
                message: format!("cannot send commands while {}", self.state),
            }
            .into());
        }
        self.run(command).await
    }

    /// Leave configuration mode, save, and return the report.
    ///
    /// If leaving or saving fails the transaction is aborted instead.
    pub async fn commit(mut self) -> Result<TransactionReport> {
        match self.finish().await {
            Ok(()) => {
                self.consumed = true;
                self.state = TransactionState::Saved;
                Ok(self.report())
            }
            Err(e) => Err(self.abort_with(e).await),
        }
    }

    /// Abandon the transaction because of `cause`.
    ///
    /// Tries to leave configuration mode, then returns the error to
    /// propagate, carrying the output gathered so far.
    pub async fn abort(mut self, cause: Error) -> Error {
        self.abort_with(cause).await
    }

    async fn finish(&mut self) -> Result<()> {
        let Some(frame) = self.frame.clone() else {
            return Ok(());
        };

        self.state = TransactionState::ExitingConfig;
        let result = self.run(&frame.exit).await?;
        self.in_config = false;
        if let Some(level) = result
            .privilege
            .as_deref()
            .and_then(|name| self.shell.platform().get_privilege(name))
            .filter(|level| level.is_configuration())
        {
            warn!("still in {} after '{}'", level.name, frame.exit);
        }

        if let Some(save) = &frame.save {
            let result = self.run(save).await?;
            self.save_output = Some(result.output);
        }
        Ok(())
    }

    async fn abort_with(&mut self, cause: Error) -> Error {
        let failed_state = self.state;
        self.consumed = true;

        if self.in_config {
            if let Some(frame) = self.frame.clone() {
                debug!("aborting while {}, sending '{}'", failed_state, frame.exit);
                self.issued.push(frame.exit.clone());
                match self.shell.execute(&frame.exit, self.wait).await {
                    Ok(result) => {
                        self.in_config = false;
                        self.output.push(result.output);
                    }
                    Err(e) => warn!("failed to leave configuration mode: {}", e),
                }
            }
        }

        self.state = TransactionState::Aborted;
        DriverError::TransactionAborted {
            state: failed_state.to_string(),
            partial_output: self.joined_output(),
            source: Box::new(cause),
        }
        .into()
    }

    async fn run(&mut self, command: &str) -> Result<CommandResult> {
        self.issued.push(command.to_string());
        let result = self.shell.execute(command, self.wait).await?;
        if let Some(failure) = &result.failure_message {
            warn!("device rejected '{}': {}", command, failure);
        }
        if !result.output.is_empty() {
            self.output.push(result.output.clone());
        }
        Ok(result)
    }

    fn joined_output(&self) -> String {
        self.output.join("\n")
    }

    fn report(&self) -> TransactionReport {
        TransactionReport {
            scope: self.scope.clone(),
            issued: self.issued.clone(),
            output: self.joined_output(),
            save_output: self.save_output.clone(),
            state: self.state,
        }
    }
}

impl<T: Transport> Drop for ConfigTransaction<'_, T> {
    fn drop(&mut self) {
        if !self.consumed {
            warn!(
                "ConfigTransaction dropped while {} without commit/abort",
                self.state
            );
        }
    }
}

/// Run `script` as one transaction: enter, scope, commands, exit, save.
///
/// Any failure after the enter command aborts the transaction, which
/// still tries to leave configuration mode before returning the error.
pub async fn run_script<T: Transport>(
    shell: &mut InteractiveShell<T>,
    script: &ConfigScript,
    wait: Duration,
) -> Result<TransactionReport> {
    let mut transaction = ConfigTransaction::new(shell, wait);

    let applied = async {
        transaction.enter(script.scope.as_deref()).await?;
        for command in &script.commands {
            transaction.send_command(command).await?;
        }
        Ok::<_, Error>(())
    }
    .await;

    match applied {
        Ok(()) => transaction.commit().await,
        Err(e) => Err(transaction.abort(e).await),
    }
}
