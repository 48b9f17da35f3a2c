//! Synthesis configuration.

use std::env;

use crate::error::ConfigError;

pub const DEFAULT_DISCRIMINANT_PATH: &str = "type";
pub const DEFAULT_LITERAL_THRESHOLD: usize = 8;
pub const DEFAULT_MAX_DEPTH: usize = 6;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 16;
pub const DEFAULT_UNION_NAME: &str = "WebhookEvent";
pub const DEFAULT_DISPATCH_NAME: &str = "handleWebhookEvent";

/// Options recognized by the parser, the inferencer and the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisConfig {
    /// Dot separated path of the event-kind field, e.g. `type` or `event.kind`.
    pub discriminant_path: String,
    /// Distinct literal values a field may take before it widens to `string`.
    pub literal_threshold: usize,
    /// Nesting depth below the payload root beyond which shapes become `unknown`.
    pub max_depth: usize,
    /// Field names whose string values are tracked as literals (e.g. `status`).
    pub literal_fields: Vec<String>,
    /// Upper bound on concurrent store reads per synthesis call.
    pub fetch_concurrency: usize,
    /// Name of the rendered discriminated union.
    pub union_name: String,
    /// Name of the rendered dispatch function.
    pub dispatch_name: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            discriminant_path: DEFAULT_DISCRIMINANT_PATH.to_string(),
            literal_threshold: DEFAULT_LITERAL_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
            literal_fields: Vec::new(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            union_name: DEFAULT_UNION_NAME.to_string(),
            dispatch_name: DEFAULT_DISPATCH_NAME.to_string(),
        }
    }
}

impl SynthesisConfig {
    /// Defaults overridden by `HOOK_SYNTH_*` environment variables. Blank values are ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = env_string_opt("HOOK_SYNTH_DISCRIMINANT") {
            config.discriminant_path = path;
        }
        if let Some(threshold) = env_usize_opt("HOOK_SYNTH_LITERAL_THRESHOLD")? {
            config.literal_threshold = threshold;
        }
        if let Some(depth) = env_usize_opt("HOOK_SYNTH_MAX_DEPTH")? {
            config.max_depth = depth;
        }
        if let Some(fields) = env_string_opt("HOOK_SYNTH_LITERAL_FIELDS") {
            config.literal_fields = fields
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_discriminant_path(mut self, path: impl Into<String>) -> Self {
        self.discriminant_path = path.into();
        self
    }

    pub fn with_literal_threshold(mut self, threshold: usize) -> Self {
        self.literal_threshold = threshold;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_literal_field(mut self, field: impl Into<String>) -> Self {
        self.literal_fields.push(field.into());
        self
    }

    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    pub fn with_union_name(mut self, name: impl Into<String>) -> Self {
        self.union_name = name.into();
        self
    }

    pub fn with_dispatch_name(mut self, name: impl Into<String>) -> Self {
        self.dispatch_name = name.into();
        self
    }

    /// Path segments of the discriminant field.
    #[must_use]
    pub fn discriminant_segments(&self) -> Vec<String> {
        self.discriminant_path
            .split('.')
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .discriminant_path
            .split('.')
            .any(|segment| segment.trim().is_empty())
        {
            return Err(ConfigError::InvalidDiscriminantPath {
                path: self.discriminant_path.clone(),
            });
        }
        if self.max_depth < self.discriminant_path.split('.').count() {
            return Err(ConfigError::DepthBelowDiscriminant {
                max_depth: self.max_depth,
                path: self.discriminant_path.clone(),
            });
        }
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value.trim().to_string())
        }
    })
}

fn env_usize_opt(key: &'static str) -> Result<Option<usize>, ConfigError> {
    env_string_opt(key)
        .map(|value| {
            value
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidInteger { key, value })
        })
        .transpose()
}
