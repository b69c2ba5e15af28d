//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `policyrag.toml` +
//! `policyrag.<env>.toml` + `APP_*` env vars (nested keys split on `__`, e.g.
//! `APP_POLICY__TRUSTED_SOURCE`). Provides helpers to expand `~` and `${VAR}`
//! and to resolve relative paths against the directory the files came from.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::{Chunker, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "policyrag.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSettings {
    pub documents_dir: String,
    pub index_dir: String,
}

impl Default for PathsSettings {
    fn default() -> Self {
        Self { documents_dir: "docs".into(), index_dir: "index".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, overlap: DEFAULT_OVERLAP }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub default_top_k: usize,
    pub recommend_top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { default_top_k: 5, recommend_top_k: 8 }
    }
}

/// Which document is authoritative and what marks a chunk as action-bearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub trusted_source: String,
    pub action_keywords: Vec<String>,
    pub citation_limit: usize,
    pub text_limit: usize,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            trusted_source: "RetentionPolicy.pdf".into(),
            action_keywords: [
                "Recommended actions",
                "RET10",
                "RET5",
                "Plan Upgrade",
                "Premium Support",
                "Contract Lock-in",
                "Escalation",
                "within 24 hours",
                "within 12 hours",
                "discount",
            ]
            .iter()
            .map(|k| (*k).to_string())
            .collect(),
            citation_limit: 6,
            text_limit: 2500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Directory holding `tokenizer.json`, `config.json` and weights.
    pub model_dir: Option<String>,
    pub use_fake: bool,
    pub fake_dim: usize,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model_dir: None, use_fake: false, fake_dim: 384, max_len: 256 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub model_path: String,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self { model_path: "models/churn_model.json".into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathsSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub policy: PolicySettings,
    pub embedding: EmbeddingSettings,
    pub classifier: ClassifierSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunker()?;
        if self.retrieval.default_top_k == 0 || self.retrieval.recommend_top_k == 0 {
            return Err(Error::InvalidConfig("retrieval top_k values must be positive".into()));
        }
        if self.policy.trusted_source.trim().is_empty() {
            return Err(Error::InvalidConfig("policy.trusted_source must not be empty".into()));
        }
        if self.policy.citation_limit == 0 || self.policy.text_limit == 0 {
            return Err(Error::InvalidConfig("policy limits must be positive".into()));
        }
        // APP_USE_FAKE_EMBEDDINGS can select the fake embedder even when use_fake is off.
        if self.embedding.fake_dim == 0 {
            return Err(Error::InvalidConfig("embedding.fake_dim must be positive".into()));
        }
        Ok(())
    }

    pub fn chunker(&self) -> Result<Chunker> {
        Chunker::new(self.chunking.chunk_size, self.chunking.overlap)
            .map_err(|e| Error::InvalidConfig(format!("chunking: {e}")))
    }
}

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load with config files looked up in `dir`. Missing files are skipped.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join(CONFIG_FILE)));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("policyrag.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("policyrag.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("policyrag.test.toml"))),
            other => tracing::warn!(env = other, "unknown RUST_ENV, using base config only"),
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: dir.to_path_buf() };
        config.settings()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Resolve a configured path against the config directory.
    pub fn resolve(&self, p: &str) -> PathBuf {
        resolve_with_base(&self.base_dir, p)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// If `p` is absolute after expansion it's returned as-is; otherwise `base.join(p)`.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
