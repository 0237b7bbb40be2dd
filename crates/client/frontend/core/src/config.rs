//! Frontend configuration structures and loaders.
//!
//! Settings here are shared by every frontend implementation (console,
//! graphical, ...). Session and network settings live in the bootstrap crate.
use std::env;

/// Frontend-specific configuration.
#[derive(Clone, Debug, Default)]
pub struct FrontendConfig {
    pub channels: ChannelConfig,
    pub messages: MessageConfig,
}

impl FrontendConfig {
    pub const fn new(channels: ChannelConfig, messages: MessageConfig) -> Self {
        Self { channels, messages }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CLI_MESSAGE_CAPACITY` - Visible narration lines (default: 5)
    /// - `CLI_EVENT_BUFFER` - Event bus buffer per topic (default: 100)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(capacity) = parse::<usize>(lookup("CLI_MESSAGE_CAPACITY")) {
            config.messages.capacity = capacity.max(1);
        }
        if let Some(buffer) = parse::<usize>(lookup("CLI_EVENT_BUFFER")) {
            config.channels.event_buffer = buffer.max(1);
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct ChannelConfig {
    pub event_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { event_buffer: 100 }
    }
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub capacity: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self { capacity: 5 }
    }
}

fn parse<T>(value: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
{
    value?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = FrontendConfig::from_lookup(lookup(&[]));
        assert_eq!(config.messages.capacity, 5);
        assert_eq!(config.channels.event_buffer, 100);
    }

    #[test]
    fn variables_override_and_clamp() {
        let config = FrontendConfig::from_lookup(lookup(&[
            ("CLI_MESSAGE_CAPACITY", "0"),
            ("CLI_EVENT_BUFFER", " 32 "),
        ]));
        assert_eq!(config.messages.capacity, 1);
        assert_eq!(config.channels.event_buffer, 32);
    }

    #[test]
    fn unparsable_values_are_ignored() {
        let config = FrontendConfig::from_lookup(lookup(&[("CLI_MESSAGE_CAPACITY", "lots")]));
        assert_eq!(config.messages.capacity, 5);
    }
}
