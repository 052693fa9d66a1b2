//! In-memory device fakes for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::channel::{ReadStrategy, ShellOptions};
use crate::error::{ChannelError, Result, TransportError};
use crate::transport::{AuthMethod, Connector, HostKeyVerification, SshConfig, Transport};

/// Everything the fake device observed.
#[derive(Debug, Clone, Default)]
pub struct FakeLog {
    /// Commands received, newline stripped, in order.
    pub sent: Vec<String>,
    /// Host of every connection attempt.
    pub hosts: Vec<String>,
    pub connects: usize,
    pub close_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Exec,
    Config,
    Interface,
}

#[derive(Debug)]
struct DeviceState {
    log: FakeLog,
    replies: HashMap<String, String>,
    paced: HashMap<String, Vec<(Duration, String)>>,
    fail_on: Option<String>,
    refuse: bool,
    mikrotik: bool,
    mode: Mode,
    banner: String,
}

impl DeviceState {
    fn prompt(&self) -> String {
        if self.mikrotik {
            return "[admin@MikroTik] > ".to_string();
        }
        match self.mode {
            Mode::Exec => "Router#".to_string(),
            Mode::Config => "Router(config)#".to_string(),
            Mode::Interface => "Router(config-if)#".to_string(),
        }
    }

    fn transition(&mut self, command: &str) {
        if self.mikrotik {
            return;
        }
        self.mode = match (self.mode, command) {
            (_, "end") => Mode::Exec,
            (Mode::Exec, "configure terminal") => Mode::Config,
            (Mode::Config | Mode::Interface, cmd) if cmd.starts_with("interface ") => {
                Mode::Interface
            }
            (Mode::Interface, "exit") => Mode::Config,
            (Mode::Config, "exit") => Mode::Exec,
            (mode, _) => mode,
        };
    }
}

/// Connector handing out [`FakeTransport`]s that share one device state.
#[derive(Clone)]
pub struct FakeConnector {
    state: Arc<Mutex<DeviceState>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState {
                log: FakeLog::default(),
                replies: HashMap::new(),
                paced: HashMap::new(),
                fail_on: None,
                refuse: false,
                mikrotik: false,
                mode: Mode::Exec,
                banner: "\r\nUser Access Verification\r\n\r\n".to_string(),
            })),
        }
    }

    /// Device with a RouterOS-style prompt and no mode changes.
    pub fn mikrotik() -> Self {
        let connector = Self::new();
        connector.lock().mikrotik = true;
        connector
    }

    /// Every connection attempt fails authentication.
    pub fn refuse_connections(self) -> Self {
        self.lock().refuse = true;
        self
    }

    /// Output the device prints for `command` (between echo and prompt).
    pub fn reply(self, command: &str, body: &str) -> Self {
        self.lock()
            .replies
            .insert(command.to_string(), body.to_string());
        self
    }

    /// Output for `command` delivered in pieces, each `(delay, text)`
    /// becoming readable `delay` after the command was sent. The prompt
    /// follows the last piece.
    pub fn paced_reply(self, command: &str, pieces: &[(Duration, &str)]) -> Self {
        let pieces = pieces
            .iter()
            .map(|(delay, text)| (*delay, text.to_string()))
            .collect();
        self.lock().paced.insert(command.to_string(), pieces);
        self
    }

    /// The first send of `command` fails with a channel error.
    pub fn fail_on(self, command: &str) -> Self {
        self.lock().fail_on = Some(command.to_string());
        self
    }

    pub fn log(&self) -> FakeLog {
        self.lock().log.clone()
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap()
    }
}

impl Connector for FakeConnector {
    type Transport = FakeTransport;

    async fn connect(&self, config: &SshConfig) -> Result<FakeTransport> {
        let mut state = self.lock();
        state.log.connects += 1;
        state.log.hosts.push(config.host.clone());
        if state.refuse {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }
        state.mode = Mode::Exec;
        let pending = format!("{}{}", state.banner, state.prompt()).into_bytes();
        drop(state);

        Ok(FakeTransport {
            state: self.state.clone(),
            pending,
            scheduled: VecDeque::new(),
            closed: false,
        })
    }
}

/// Transport answering from the shared [`DeviceState`].
pub struct FakeTransport {
    state: Arc<Mutex<DeviceState>>,
    pending: Vec<u8>,
    scheduled: VecDeque<(Instant, Vec<u8>)>,
    closed: bool,
}

impl Transport for FakeTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let command = String::from_utf8_lossy(data).trim_end().to_string();
        let mut state = self.state.lock().unwrap();
        state.log.sent.push(command.clone());

        if state.fail_on.as_deref() == Some(command.as_str()) {
            state.fail_on = None;
            return Err(ChannelError::Closed.into());
        }

        state.transition(&command);
        if let Some(pieces) = state.paced.get(&command) {
            let sent_at = Instant::now();
            let last = pieces.len().saturating_sub(1);
            self.pending.extend_from_slice(format!("{command}\r\n").as_bytes());
            for (i, (delay, text)) in pieces.iter().enumerate() {
                let mut text = text.replace('\n', "\r\n");
                if i == last {
                    text.push_str(&state.prompt());
                }
                self.scheduled.push_back((sent_at + *delay, text.into_bytes()));
            }
            return Ok(());
        }

        let body = state.replies.get(&command).cloned().unwrap_or_default();
        let body = if body.is_empty() || body.ends_with('\n') {
            body
        } else {
            format!("{body}\n")
        };
        let reply = format!(
            "{command}\r\n{}{}",
            body.replace('\n', "\r\n"),
            state.prompt()
        );
        self.pending.extend_from_slice(reply.as_bytes());
        Ok(())
    }

    fn receive_available(&mut self) -> Result<Vec<u8>> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }
        let now = Instant::now();
        while self.scheduled.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, chunk)) = self.scheduled.pop_front() {
                self.pending.extend_from_slice(&chunk);
            }
        }
        Ok(std::mem::take(&mut self.pending))
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.state.lock().unwrap().log.close_count += 1;
        }
    }
}

pub fn test_ssh_config() -> SshConfig {
    SshConfig {
        host: "192.0.2.1".to_string(),
        port: 22,
        username: "admin".to_string(),
        auth: AuthMethod::None,
        timeout: Duration::from_secs(5),
        terminal_width: 511,
        terminal_height: 24,
        host_key_verification: HostKeyVerification::Disabled,
        known_hosts_path: None,
    }
}

/// Shell options with no settle delay and a short poll interval.
pub fn fast_options() -> ShellOptions {
    ShellOptions {
        strategy: ReadStrategy::Adaptive,
        poll_interval: Duration::from_millis(10),
        settle: Duration::ZERO,
        prompt_pattern: None,
    }
}
