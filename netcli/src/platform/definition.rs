//! Platform definition for vendor-specific configurations.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

use super::Dialect;
use super::privilege_level::PrivilegeLevel;

static GENERIC_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[$#>]\s*$").expect("valid generic prompt regex"));

/// Platform definition containing all vendor-specific configuration.
#[derive(Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "cisco_ios", "mikrotik_routeros").
    pub name: String,

    /// Privilege levels for this platform.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Privilege level expected after login.
    pub default_privilege: String,

    /// Output fragments that indicate the device rejected a command.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when the shell is opened.
    pub on_open_commands: Vec<String>,

    /// Command vocabulary for this vendor.
    pub dialect: Arc<dyn Dialect>,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: String::new(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            dialect,
        }
    }

    /// Add a privilege level.
    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    /// Set the default privilege level.
    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Get a privilege level by name.
    pub fn get_privilege(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels.get(name)
    }

    /// Build a regex matching the prompt of any privilege level.
    ///
    /// Falls back to a generic `$`, `#` or `>` prompt when the platform
    /// defines no levels.
    pub fn prompt_pattern(&self) -> Regex {
        if self.privilege_levels.is_empty() {
            return GENERIC_PROMPT.clone();
        }

        let combined = self
            .privilege_levels
            .values()
            .map(|level| format!("(?:{})", level.pattern.as_str()))
            .collect::<Vec<_>>()
            .join("|");

        Regex::new(&combined).unwrap_or_else(|_| GENERIC_PROMPT.clone())
    }

    /// Determine the privilege level from a prompt string.
    pub fn determine_privilege(&self, prompt: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels
            .values()
            .find(|level| level.matches(prompt))
    }

    /// First failure pattern contained in `output`, if any.
    pub fn detect_failure(&self, output: &str) -> Option<String> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .cloned()
    }
}

impl fmt::Debug for PlatformDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformDefinition")
            .field("name", &self.name)
            .field("privilege_levels", &self.privilege_levels)
            .field("default_privilege", &self.default_privilege)
            .field("failed_when_contains", &self.failed_when_contains)
            .field("on_open_commands", &self.on_open_commands)
            .field("dialect", &"<Dialect>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::vendors;

    #[test]
    fn test_combined_prompt_pattern() {
        let platform = vendors::cisco_ios::platform();
        let pattern = platform.prompt_pattern();
        assert!(pattern.is_match(b"Router>"));
        assert!(pattern.is_match(b"Router#"));
        assert!(pattern.is_match(b"Router(config-if)#"));
        assert!(!pattern.is_match(b"Router#show version"));
    }

    #[test]
    fn test_determine_privilege() {
        let platform = vendors::cisco_ios::platform();
        let level = platform.determine_privilege("Router#").unwrap();
        assert_eq!(level.name, "privilege_exec");
        let level = platform.determine_privilege("Router(config)#").unwrap();
        assert_eq!(level.name, "configuration");
        assert!(platform.determine_privilege("not a prompt").is_none());
    }

    #[test]
    fn test_detect_failure() {
        let platform = vendors::cisco_ios::platform();
        let output = "ip addres 10.0.0.1\n% Invalid input detected at '^' marker.";
        assert_eq!(
            platform.detect_failure(output).as_deref(),
            Some("% Invalid input")
        );
        assert_eq!(platform.detect_failure("Building configuration...\n[OK]"), None);
    }
}
