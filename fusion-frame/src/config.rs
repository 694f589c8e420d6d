use crate::{pipeline::Format, prompt::PROMPTS};
use anyhow::Context as _;
use fusion_brain::{Credentials, Polling};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};
use waveshare_epd::Polarity;

const DEFAULT_PORT: u16 = 5000;

/// Settings taken from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Env {
    pub credentials: Credentials,
    pub api_url: Option<String>,
    pub port: u16,
}
impl Env {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |name: &str| {
            var(name)
                .filter(|value| !value.is_empty())
                .with_context(|| format!("missing {} environment variable", name))
        };
        let port = match var("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("invalid PORT {:?}", port))?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            credentials: Credentials {
                api_key: required("FB_API_KEY")?,
                api_secret: required("FB_API_SECRET")?,
            },
            api_url: var("FB_API_URL").filter(|url| !url.is_empty()),
            port,
        })
    }
}

/// Optional settings file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Prompt subjects; the style suffix is always appended.
    pub prompts: Vec<String>,
    pub format: Format,
    /// Set bits mean black instead of white in raw buffers.
    pub invert: bool,
    /// Size requested from the generator, before resizing to the panel.
    pub width: u32,
    pub height: u32,
    /// Generation style, e.g. "UHD" or "ANIME".
    pub style: Option<String>,
    /// What the generated image should avoid.
    pub negative_prompt: Option<String>,
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
}
impl Default for Settings {
    fn default() -> Self {
        let polling = Polling::default();
        Self {
            prompts: PROMPTS.iter().copied().map(String::from).collect(),
            format: Format::default(),
            invert: false,
            width: 1024,
            height: 1024,
            style: None,
            negative_prompt: None,
            poll_interval_secs: polling.interval.as_secs(),
            max_attempts: polling.max_attempts,
        }
    }
}
impl Settings {
    pub fn polling(&self) -> Polling {
        Polling {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.max_attempts,
        }
    }

    pub fn polarity(&self) -> Polarity {
        Polarity::inverted(self.invert)
    }
}

pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Settings> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    from_str(&s)
}

pub fn from_str(s: &str) -> anyhow::Result<Settings> {
    let mut settings: Settings = toml::from_str(s)?;
    if settings.prompts.is_empty() {
        settings.prompts = Settings::default().prompts;
    }
    Ok(settings)
}
