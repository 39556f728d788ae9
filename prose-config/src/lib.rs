//! Shared configuration loader for the prose toolchain.
//!
//! `defaults/prose.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`ProseConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use prose_babel::{ConversionOptions, ParseOptions, Schema, SchemaBuilder, SchemaError, SerializeOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/prose.default.toml");

/// Top-level configuration consumed by prose applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ProseConfig {
    pub schema: SchemaConfig,
    pub parse: ParseConfig,
    pub serialize: SerializeConfig,
}

impl ProseConfig {
    /// Builds the core schema with the configured variations.
    pub fn build_schema(&self) -> Result<Schema, SchemaError> {
        SchemaBuilder::core()
            .image_inline(self.schema.image_inline)
            .build()
    }

    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            parse: (&self.parse).into(),
            serialize: (&self.serialize).into(),
        }
    }
}

/// Variations of the core vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    pub image_inline: bool,
}

/// Mirrors the Markdown parser knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    pub allow_html: bool,
    pub linkify: bool,
    pub breaks: bool,
}

impl From<&ParseConfig> for ParseOptions {
    fn from(config: &ParseConfig) -> Self {
        ParseOptions {
            allow_html: config.allow_html,
            linkify: config.linkify,
            breaks: config.breaks,
        }
    }
}

/// Mirrors the Markdown serializer knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct SerializeConfig {
    pub tight_lists: bool,
    pub bullet_list_marker: char,
    pub html_fallback: bool,
}

impl From<&SerializeConfig> for SerializeOptions {
    fn from(config: &SerializeConfig) -> Self {
        SerializeOptions {
            tight_lists: config.tight_lists,
            bullet_list_marker: config.bullet_list_marker,
            html_fallback: config.html_fallback,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ProseConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ProseConfig, ConfigError> {
    Loader::new().build()
}
