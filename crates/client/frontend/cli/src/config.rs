//! Console-specific configuration.
use std::env;

/// Console UI configuration, separate from cross-frontend settings.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub ui: UiConfig,
}

impl CliConfig {
    /// Construct console configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CLI_SHOW_CUES` - Print move/indicator/rejection cues (default: true)
    /// - `CLI_PROMPT` - Input prompt (default: `> `)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(show) = read_env_bool("CLI_SHOW_CUES") {
            config.ui.show_cues = show;
        }
        if let Ok(prompt) = env::var("CLI_PROMPT") {
            config.ui.prompt = prompt;
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct UiConfig {
    /// Whether presentation events are echoed as text.
    pub show_cues: bool,
    pub prompt: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_cues: true,
            prompt: "> ".to_string(),
        }
    }
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
