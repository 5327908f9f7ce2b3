use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FieldError, FieldStatus, Pattern, TransportError};

/// Unanchored generic URL pattern: optional scheme and credentials, a dotted
/// host with an alphabetic TLD, optional port and path.
pub const DEFAULT_URL_PATTERN: &str =
    r"(https?://)?((\w+:{0,1}\w*@)?(\S+)\.[a-zA-Z]{2,})(:[0-9]+)?(/|/([\w#!:.?+=&%@!\-/]))?";

/// Hosts of well-known shortening services.
pub const DEFAULT_SHORTENED_PATTERNS: &[&str] =
    &[r"(?i)bit\.ly", r"(?i)tinyurl\.com", r"(?i)goo\.gl"];

static DEFAULT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_URL_PATTERN).expect("default url pattern compiles"));

static DEFAULT_SHORTENED_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DEFAULT_SHORTENED_PATTERNS
        .iter()
        .map(|source| Regex::new(source).expect("default shortened pattern compiles"))
        .collect()
});

pub type ValidatorFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;
pub type UrlHook = Arc<dyn Fn(&str, &FieldStatus) + Send + Sync>;
pub type StatusHook = Arc<dyn Fn(&FieldStatus) + Send + Sync>;
pub type SuccessHook = Arc<dyn Fn(&Value, &FieldStatus) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&TransportError, &FieldStatus) + Send + Sync>;

/// Callbacks fired while a field is handled. Unset hooks are no-ops.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_valid_url: Option<UrlHook>,
    pub on_invalid_url: Option<UrlHook>,
    pub on_before_send: Option<StatusHook>,
    pub on_success: Option<SuccessHook>,
    pub on_error: Option<ErrorHook>,
    pub on_complete: Option<StatusHook>,
}

impl Hooks {
    pub(crate) fn valid_url(&self, url: &str, status: &FieldStatus) {
        if let Some(hook) = &self.on_valid_url {
            hook(url, status);
        }
    }

    pub(crate) fn invalid_url(&self, url: &str, status: &FieldStatus) {
        if let Some(hook) = &self.on_invalid_url {
            hook(url, status);
        }
    }

    pub(crate) fn before_send(&self, status: &FieldStatus) {
        if let Some(hook) = &self.on_before_send {
            hook(status);
        }
    }

    pub(crate) fn success(&self, body: &Value, status: &FieldStatus) {
        if let Some(hook) = &self.on_success {
            hook(body, status);
        }
    }

    pub(crate) fn error(&self, error: &TransportError, status: &FieldStatus) {
        if let Some(hook) = &self.on_error {
            hook(error, status);
        }
    }

    pub(crate) fn complete(&self, status: &FieldStatus) {
        if let Some(hook) = &self.on_complete {
            hook(status);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_valid_url", &self.on_valid_url.is_some())
            .field("on_invalid_url", &self.on_invalid_url.is_some())
            .field("on_before_send", &self.on_before_send.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Per-field configuration. Endpoint and patterns come from configuration
/// files; the validator and hooks are attached in code.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    pub endpoint: Option<String>,
    pub url_pattern: Pattern,
    pub shortened_patterns: Vec<Pattern>,
    #[serde(skip)]
    pub validator: Option<ValidatorFn>,
    #[serde(skip)]
    pub hooks: Hooks,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            url_pattern: Pattern::from(DEFAULT_URL_RE.clone()),
            shortened_patterns: DEFAULT_SHORTENED_RES
                .iter()
                .cloned()
                .map(Pattern::from)
                .collect(),
            validator: None,
            hooks: Hooks::default(),
        }
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("endpoint", &self.endpoint)
            .field("url_pattern", &self.url_pattern)
            .field("shortened_patterns", &self.shortened_patterns)
            .field("validator", &self.validator.is_some())
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_url_pattern(mut self, pattern: Pattern) -> Self {
        self.url_pattern = pattern;
        self
    }

    pub fn with_shortened_patterns(mut self, patterns: Vec<Pattern>) -> Self {
        self.shortened_patterns = patterns;
        self
    }

    pub fn with_validator(
        mut self,
        validator: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn on_valid_url(
        mut self,
        hook: impl Fn(&str, &FieldStatus) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_valid_url = Some(Arc::new(hook));
        self
    }

    pub fn on_invalid_url(
        mut self,
        hook: impl Fn(&str, &FieldStatus) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_invalid_url = Some(Arc::new(hook));
        self
    }

    pub fn on_before_send(mut self, hook: impl Fn(&FieldStatus) + Send + Sync + 'static) -> Self {
        self.hooks.on_before_send = Some(Arc::new(hook));
        self
    }

    pub fn on_success(
        mut self,
        hook: impl Fn(&Value, &FieldStatus) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_success = Some(Arc::new(hook));
        self
    }

    pub fn on_error(
        mut self,
        hook: impl Fn(&TransportError, &FieldStatus) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_error = Some(Arc::new(hook));
        self
    }

    pub fn on_complete(mut self, hook: impl Fn(&FieldStatus) + Send + Sync + 'static) -> Self {
        self.hooks.on_complete = Some(Arc::new(hook));
        self
    }

    /// Fails unless a non-blank endpoint is configured.
    pub fn require_endpoint(&self) -> Result<&str, FieldError> {
        match self.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Ok(endpoint),
            _ => Err(FieldError::missing_endpoint()),
        }
    }

    pub fn get(&self, name: OptionName) -> OptionValue {
        match name {
            OptionName::Endpoint => OptionValue::Endpoint(self.endpoint.clone()),
            OptionName::UrlPattern => OptionValue::UrlPattern(self.url_pattern.clone()),
            OptionName::ShortenedPatterns => {
                OptionValue::ShortenedPatterns(self.shortened_patterns.clone())
            }
            OptionName::Validator => OptionValue::Validator(self.validator.clone()),
            OptionName::OnValidUrl => OptionValue::OnValidUrl(self.hooks.on_valid_url.clone()),
            OptionName::OnInvalidUrl => {
                OptionValue::OnInvalidUrl(self.hooks.on_invalid_url.clone())
            }
            OptionName::OnBeforeSend => {
                OptionValue::OnBeforeSend(self.hooks.on_before_send.clone())
            }
            OptionName::OnSuccess => OptionValue::OnSuccess(self.hooks.on_success.clone()),
            OptionName::OnError => OptionValue::OnError(self.hooks.on_error.clone()),
            OptionName::OnComplete => OptionValue::OnComplete(self.hooks.on_complete.clone()),
        }
    }

    pub fn apply(&mut self, value: OptionValue) {
        match value {
            OptionValue::Endpoint(endpoint) => self.endpoint = endpoint,
            OptionValue::UrlPattern(pattern) => self.url_pattern = pattern,
            OptionValue::ShortenedPatterns(patterns) => self.shortened_patterns = patterns,
            OptionValue::Validator(validator) => self.validator = validator,
            OptionValue::OnValidUrl(hook) => self.hooks.on_valid_url = hook,
            OptionValue::OnInvalidUrl(hook) => self.hooks.on_invalid_url = hook,
            OptionValue::OnBeforeSend(hook) => self.hooks.on_before_send = hook,
            OptionValue::OnSuccess(hook) => self.hooks.on_success = hook,
            OptionValue::OnError(hook) => self.hooks.on_error = hook,
            OptionValue::OnComplete(hook) => self.hooks.on_complete = hook,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    Endpoint,
    UrlPattern,
    ShortenedPatterns,
    Validator,
    OnValidUrl,
    OnInvalidUrl,
    OnBeforeSend,
    OnSuccess,
    OnError,
    OnComplete,
}

impl OptionName {
    pub const ALL: [OptionName; 10] = [
        OptionName::Endpoint,
        OptionName::UrlPattern,
        OptionName::ShortenedPatterns,
        OptionName::Validator,
        OptionName::OnValidUrl,
        OptionName::OnInvalidUrl,
        OptionName::OnBeforeSend,
        OptionName::OnSuccess,
        OptionName::OnError,
        OptionName::OnComplete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionName::Endpoint => "endpoint",
            OptionName::UrlPattern => "url_pattern",
            OptionName::ShortenedPatterns => "shortened_patterns",
            OptionName::Validator => "validator",
            OptionName::OnValidUrl => "on_valid_url",
            OptionName::OnInvalidUrl => "on_invalid_url",
            OptionName::OnBeforeSend => "on_before_send",
            OptionName::OnSuccess => "on_success",
            OptionName::OnError => "on_error",
            OptionName::OnComplete => "on_complete",
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionName {
    type Err = FieldError;

    /// Accepts the snake_case names as well as the plugin-era names
    /// (`api`, `urlRE`, `shortenerRE`, `URLValidator`, `onSuccess`, ...).
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        let found = match name {
            "api" => Some(OptionName::Endpoint),
            "urlRE" => Some(OptionName::UrlPattern),
            "shortenerRE" => Some(OptionName::ShortenedPatterns),
            "URLValidator" => Some(OptionName::Validator),
            _ => {
                let folded = name.replace('_', "").to_ascii_lowercase();
                OptionName::ALL
                    .into_iter()
                    .find(|candidate| candidate.as_str().replace('_', "") == folded)
            }
        };
        found.ok_or_else(|| FieldError::InvalidInvocation(format!("unknown option {name:?}")))
    }
}

/// A single option together with its value. Used for reads, updates and
/// per-attach overrides.
#[derive(Clone)]
pub enum OptionValue {
    Endpoint(Option<String>),
    UrlPattern(Pattern),
    ShortenedPatterns(Vec<Pattern>),
    Validator(Option<ValidatorFn>),
    OnValidUrl(Option<UrlHook>),
    OnInvalidUrl(Option<UrlHook>),
    OnBeforeSend(Option<StatusHook>),
    OnSuccess(Option<SuccessHook>),
    OnError(Option<ErrorHook>),
    OnComplete(Option<StatusHook>),
}

impl OptionValue {
    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        OptionValue::Endpoint(Some(endpoint.into()))
    }

    pub fn name(&self) -> OptionName {
        match self {
            OptionValue::Endpoint(_) => OptionName::Endpoint,
            OptionValue::UrlPattern(_) => OptionName::UrlPattern,
            OptionValue::ShortenedPatterns(_) => OptionName::ShortenedPatterns,
            OptionValue::Validator(_) => OptionName::Validator,
            OptionValue::OnValidUrl(_) => OptionName::OnValidUrl,
            OptionValue::OnInvalidUrl(_) => OptionName::OnInvalidUrl,
            OptionValue::OnBeforeSend(_) => OptionName::OnBeforeSend,
            OptionValue::OnSuccess(_) => OptionName::OnSuccess,
            OptionValue::OnError(_) => OptionName::OnError,
            OptionValue::OnComplete(_) => OptionName::OnComplete,
        }
    }

    /// Builds a value from text. Only endpoint and pattern options have a
    /// textual form; an empty endpoint clears it. Shortened patterns are
    /// comma separated.
    pub fn parse(name: OptionName, raw: &str) -> Result<Self, FieldError> {
        let raw = raw.trim();
        match name {
            OptionName::Endpoint if raw.is_empty() => Ok(OptionValue::Endpoint(None)),
            OptionName::Endpoint => Ok(OptionValue::endpoint(raw)),
            OptionName::UrlPattern => Pattern::new(raw).map(OptionValue::UrlPattern),
            OptionName::ShortenedPatterns => raw
                .split(',')
                .map(str::trim)
                .filter(|source| !source.is_empty())
                .map(Pattern::new)
                .collect::<Result<Vec<_>, _>>()
                .map(OptionValue::ShortenedPatterns),
            _ => Err(FieldError::InvalidInvocation(format!(
                "option {name} cannot be set from text"
            ))),
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionValue::{}({})", self.name(), self)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn set_or_unset<T>(value: &Option<T>) -> &'static str {
            if value.is_some() {
                "<set>"
            } else {
                "<unset>"
            }
        }

        match self {
            OptionValue::Endpoint(Some(endpoint)) => f.write_str(endpoint),
            OptionValue::Endpoint(None) => f.write_str("<unset>"),
            OptionValue::UrlPattern(pattern) => write!(f, "{pattern}"),
            OptionValue::ShortenedPatterns(patterns) => {
                let sources: Vec<&str> = patterns.iter().map(Pattern::as_str).collect();
                f.write_str(&sources.join(", "))
            }
            OptionValue::Validator(value) => f.write_str(set_or_unset(value)),
            OptionValue::OnValidUrl(value) | OptionValue::OnInvalidUrl(value) => {
                f.write_str(set_or_unset(value))
            }
            OptionValue::OnBeforeSend(value) | OptionValue::OnComplete(value) => {
                f.write_str(set_or_unset(value))
            }
            OptionValue::OnSuccess(value) => f.write_str(set_or_unset(value)),
            OptionValue::OnError(value) => f.write_str(set_or_unset(value)),
        }
    }
}
