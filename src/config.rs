use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::browser::ChromiumLauncher;
use crate::error::{Error, Result};

pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<PathBuf>,
    /// Chrome profile directory. Point this at a profile that is already
    /// signed in to the registration site to reuse its session.
    pub user_data_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport_width: 1440,
            viewport_height: 900,
            chrome_path: None,
            user_data_dir: None,
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.user_data_dir = Some(dir.into());
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }

    /// Finish configuration. The launcher starts a new Chrome per session.
    pub fn build(self) -> ChromiumLauncher {
        ChromiumLauncher::new(self.build_config())
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Endpoint and credentials for an OpenAI-compatible chat completion API.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// No timeout unless configured.
    pub timeout: Option<Duration>,
}

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Load from the process environment, reading `.env` first if present.
    ///
    /// `LLM_API_KEY` (or `GROQ_API_KEY`) is required; `LLM_BASE_URL`,
    /// `LLM_MODEL`, `LLM_TEMPERATURE` and `LLM_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("LLM_API_KEY")
            .or_else(|_| env::var("GROQ_API_KEY"))
            .map_err(|_| Error::Config("set LLM_API_KEY or GROQ_API_KEY".into()))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("LLM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var("LLM_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = env::var("LLM_TEMPERATURE") {
            config.temperature = raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid LLM_TEMPERATURE: {raw}")))?;
        }
        if let Ok(raw) = env::var("LLM_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid LLM_TIMEOUT_SECS: {raw}")))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// What to do with model values that are not JSON strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValuePolicy {
    /// Discard the value; the field is treated as having no answer.
    #[default]
    Drop,
    /// Render numbers and booleans as text, join arrays of scalars with ", ".
    Coerce,
}

/// Primary and fallback selectors for each piece of event context.
#[derive(Debug, Clone)]
pub struct ContextSelectors {
    pub title: [String; 2],
    pub description: [String; 2],
    pub date_time: [String; 2],
    pub location: [String; 2],
}

impl Default for ContextSelectors {
    fn default() -> Self {
        fn pair(primary: &str, fallback: &str) -> [String; 2] {
            [primary.to_string(), fallback.to_string()]
        }
        Self {
            title: pair("h1", "[class*=\"title\"]"),
            description: pair(".event-description", "[class*=\"description\"]"),
            date_time: pair(".event-datetime", "[class*=\"date\"]"),
            location: pair("[class*=\"location\"]", "address"),
        }
    }
}

/// Per-run settings for one pass over a registration page.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Control that opens the registration form.
    pub trigger_selector: String,
    pub form_selector: String,
    pub trigger_timeout: Duration,
    pub form_timeout: Duration,
    /// How long the filled form stays open for a human to review.
    pub review_pause: Duration,
    pub context_selectors: ContextSelectors,
    pub value_policy: ValuePolicy,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            trigger_selector: "button.luma-button.primary".to_string(),
            form_selector: "form.registration-form-container".to_string(),
            trigger_timeout: Duration::from_secs(10),
            form_timeout: Duration::from_secs(10),
            review_pause: Duration::from_secs(30),
            context_selectors: ContextSelectors::default(),
            value_policy: ValuePolicy::Drop,
        }
    }
}
