//! Wiring shared by the `policyrag` and `policyrag-indexer` binaries.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policyrag_advisor::{Advisor, LogisticClassifier};
use policyrag_core::config::{Config, Settings};
use policyrag_core::traits::Embedder;
use policyrag_index::Retriever;

/// Logs to stderr; `RUST_LOG` overrides the default `policyrag=info`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policyrag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Configuration plus the settings decoded from it.
pub struct Runtime {
    pub config: Config,
    pub settings: Settings,
}

impl Runtime {
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        let config = match config_dir {
            Some(dir) => Config::load_from(dir),
            None => Config::load(),
        }
        .context("loading configuration")?;
        let settings = config.settings().context("decoding configuration")?;
        Ok(Self { config, settings })
    }

    pub fn documents_dir(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(|| self.config.resolve(&self.settings.paths.documents_dir))
    }

    pub fn index_dir(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(|| self.config.resolve(&self.settings.paths.index_dir))
    }

    pub fn embedder(&self, explicit_model_dir: Option<PathBuf>) -> Result<Arc<dyn Embedder>> {
        let model_dir = explicit_model_dir
            .or_else(|| self.settings.embedding.model_dir.as_deref().map(|p| self.config.resolve(p)));
        policyrag_embed::load_embedder(&self.settings.embedding, model_dir.as_deref()).context("loading embedder")
    }

    /// Retriever and advisor over the persisted index. The churn classifier
    /// is optional: without it `predict` reports the classifier unavailable.
    pub fn advisor(&self, index_dir: Option<PathBuf>, model_dir: Option<PathBuf>) -> Result<Advisor> {
        let index_dir = self.index_dir(index_dir);
        let retriever = Retriever::open(&index_dir, self.embedder(model_dir)?)
            .with_context(|| format!("opening index at {}", index_dir.display()))?;
        tracing::info!(chunks = retriever.len(), dim = retriever.dim(), "retriever ready");
        let advisor = Advisor::new(retriever, &self.settings);

        let model_path = self.config.resolve(&self.settings.classifier.model_path);
        if !model_path.exists() {
            tracing::warn!(path = %model_path.display(), "churn model not found; prediction disabled");
            return Ok(advisor);
        }
        let classifier = LogisticClassifier::load(&model_path)
            .with_context(|| format!("loading churn model {}", model_path.display()))?;
        tracing::debug!(features = ?classifier.features().collect::<Vec<_>>(), "churn model inputs");
        Ok(advisor.with_classifier(Arc::new(classifier)))
    }
}
