//! Configuration for the daily pipeline.
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. a TOML file: `$SIMWORD_CONFIG`, or `simword.toml` when present
//! 3. environment variables (a `.env` file is read first)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use simword_embeddings::DEFAULT_RANKING_LIMIT;
use simword_lexicon::{CANDIDATE_THRESHOLD, DAILY_THRESHOLD, DEFAULT_MAX_ATTEMPTS};
use simword_puzzle_store::MAX_RANKINGS;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SIMWORD_CONFIG";

/// Config file used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "simword.toml";

/// Configuration for the daily pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lexical data and target selection.
    pub lexicon: LexiconConfig,

    /// Where embedding vectors come from.
    pub embeddings: EmbeddingsConfig,

    /// Ranking parameters.
    pub ranking: RankingConfig,

    /// Where puzzles are published.
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load from the config file and environment.
    ///
    /// An explicitly named config file must exist. The implicit
    /// `simword.toml` is optional.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`PipelineConfig::load`], with `path` taking precedence over
    /// `$SIMWORD_CONFIG`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", env_file.display());
        }

        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail once a ranking is published.
    pub fn validate(&self) -> Result<()> {
        let ranking = &self.ranking;
        if ranking.limit == 0 || ranking.limit > MAX_RANKINGS {
            return Err(PipelineError::Config(format!(
                "ranking.limit must be between 1 and {MAX_RANKINGS}, got {}",
                ranking.limit
            )));
        }
        if ranking.chunk_size == 0 {
            return Err(PipelineError::Config(
                "ranking.chunk_size must be at least 1".to_string(),
            ));
        }
        if ranking.min_length > ranking.limit {
            return Err(PipelineError::Config(format!(
                "ranking.min_length {} exceeds ranking.limit {}",
                ranking.min_length, ranking.limit
            )));
        }
        Ok(())
    }

    /// Parse a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = toml::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML config text. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Override fields from environment variables looked up with `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = var("SIMWORD_WORDNET_DIR") {
            self.lexicon.wordnet_dir = dir.into();
        }
        if let Some(corpus) = var("SIMWORD_CORPUS") {
            self.lexicon.corpus = corpus.into();
        }
        if let Some(seed) = var("SIMWORD_SEED") {
            self.lexicon.seed = Some(parse_env("SIMWORD_SEED", &seed)?);
        }
        if let Some(snapshot) = var("SIMWORD_SNAPSHOT") {
            self.embeddings.snapshot = Some(snapshot.into());
        }
        if let Some(url) = var("SIMWORD_STORE_URL").or_else(|| var("DATABASE_URL")) {
            self.embeddings.url = Some(url);
        }
        if let Some(token) = var("SIMWORD_STORE_TOKEN") {
            self.embeddings.token = Some(token);
        }
        if let Some(root) = var("SIMWORD_OUTPUT_DIR") {
            self.output.root = root.into();
        }
        if let Some(once) = var("SIMWORD_ONCE_PER_DAY") {
            self.output.once_per_day = parse_env("SIMWORD_ONCE_PER_DAY", &once)?;
        }
        Ok(())
    }

    /// Set the lexicon configuration.
    pub fn with_lexicon(mut self, config: LexiconConfig) -> Self {
        self.lexicon = config;
        self
    }

    /// Set the embeddings configuration.
    pub fn with_embeddings(mut self, config: EmbeddingsConfig) -> Self {
        self.embeddings = config;
        self
    }

    /// Set the ranking configuration.
    pub fn with_ranking(mut self, config: RankingConfig) -> Self {
        self.ranking = config;
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.output.root = root.into();
        self
    }

    /// Enable or disable once-per-day publishing.
    pub fn with_once_per_day(mut self, enabled: bool) -> Self {
        self.output.once_per_day = enabled;
        self
    }

    /// Fix the seed for target draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.lexicon.seed = Some(seed);
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PipelineError::Config(format!("invalid value for {key}: {value:?}")))
}

/// Configuration for lexical data and target selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// WordNet dictionary directory holding the `index.*` files.
    pub wordnet_dir: PathBuf,

    /// Frequency corpus: tagged or plain text, or a `.tsv` of counts.
    pub corpus: PathBuf,

    /// Minimum corpus frequency for daily targets.
    pub daily_threshold: u64,

    /// Minimum corpus frequency for the exported candidate pool.
    pub candidate_threshold: u64,

    /// Bound on target draws.
    pub max_attempts: usize,

    /// Seed for target draws. Unset means a fresh random seed per run.
    pub seed: Option<u64>,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            wordnet_dir: PathBuf::from("data/wordnet"),
            corpus: PathBuf::from("data/brown.txt"),
            daily_threshold: DAILY_THRESHOLD,
            candidate_threshold: CANDIDATE_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }
}

/// Configuration for the embedding source.
///
/// Exactly one of `snapshot` and `url` must be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// JSON snapshot mapping words to vectors.
    pub snapshot: Option<PathBuf>,

    /// Base URL of a remote vector service.
    pub url: Option<String>,

    /// Bearer token for the remote service.
    pub token: Option<String>,

    /// Entries per remote scan page.
    pub page_size: usize,

    /// Expected vector dimension, if known up front.
    pub dimension: Option<usize>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            url: None,
            token: None,
            page_size: simword_embeddings::remote::DEFAULT_PAGE_SIZE,
            dimension: None,
        }
    }
}

/// The resolved embedding source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingSource {
    Snapshot(PathBuf),
    Remote { url: String, token: Option<String> },
}

impl EmbeddingsConfig {
    /// Use a snapshot file.
    pub fn snapshot(path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot: Some(path.into()),
            ..Self::default()
        }
    }

    /// Use a remote service.
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Resolve the configured source.
    pub fn source(&self) -> Result<EmbeddingSource> {
        match (&self.snapshot, &self.url) {
            (Some(path), None) => Ok(EmbeddingSource::Snapshot(path.clone())),
            (None, Some(url)) => Ok(EmbeddingSource::Remote {
                url: url.clone(),
                token: self.token.clone(),
            }),
            (Some(_), Some(_)) => Err(PipelineError::Config(
                "both an embedding snapshot and a store url are configured".to_string(),
            )),
            (None, None) => Err(PipelineError::Config(
                "no embedding source: set embeddings.snapshot or SIMWORD_STORE_URL".to_string(),
            )),
        }
    }
}

/// Configuration for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of ranked words kept per puzzle.
    pub limit: usize,

    /// Scanned entries scored per parallel batch.
    pub chunk_size: usize,

    /// Shortest ranking a run may publish.
    pub min_length: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RANKING_LIMIT,
            chunk_size: simword_embeddings::ranking::DEFAULT_CHUNK_SIZE,
            min_length: 1,
        }
    }
}

/// Configuration for publishing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory of the puzzle store.
    pub root: PathBuf,

    /// Skip the run when today's puzzle is already published.
    pub once_per_day: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("output"),
            once_per_day: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.lexicon.daily_threshold, 25);
        assert_eq!(config.lexicon.candidate_threshold, 6);
        assert_eq!(config.lexicon.max_attempts, 1000);
        assert_eq!(config.ranking.limit, 1000);
        assert!(!config.output.once_per_day);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            [embeddings]
            snapshot = "vectors.json"

            [output]
            root = "/srv/puzzles"
            once_per_day = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.embeddings.source().unwrap(),
            EmbeddingSource::Snapshot(PathBuf::from("vectors.json"))
        );
        assert_eq!(config.output.root, PathBuf::from("/srv/puzzles"));
        assert!(config.output.once_per_day);
        assert_eq!(config.ranking, RankingConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = PipelineConfig::from_toml("[ranking]\nlimit = \"many\"");
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_validate_ranking_bounds() {
        assert!(PipelineConfig::default().validate().is_ok());

        let at_cap = PipelineConfig::from_toml("[ranking]\nlimit = 1000").unwrap();
        assert!(at_cap.validate().is_ok());

        for toml in [
            "[ranking]\nlimit = 1001",
            "[ranking]\nlimit = 0",
            "[ranking]\nchunk_size = 0",
            "[ranking]\nlimit = 5\nmin_length = 6",
        ] {
            let config = PipelineConfig::from_toml(toml).unwrap();
            assert!(
                matches!(config.validate(), Err(PipelineError::Config(_))),
                "{toml}"
            );
        }
    }

    #[test]
    fn test_load_rejects_oversized_limit() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("simword.toml");
        std::fs::write(&path, "[ranking]\nlimit = 5000\n").unwrap();

        let result = PipelineConfig::load_from(Some(&path));
        assert!(matches!(result, Err(PipelineError::Config(msg)) if msg.contains("ranking.limit")));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "http://vectors.local/api"),
            ("SIMWORD_STORE_TOKEN", "secret"),
            ("SIMWORD_SEED", "42"),
            ("SIMWORD_ONCE_PER_DAY", "true"),
        ]);
        let mut config = PipelineConfig::default();
        config
            .apply_env(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(
            config.embeddings.source().unwrap(),
            EmbeddingSource::Remote {
                url: "http://vectors.local/api".to_string(),
                token: Some("secret".to_string()),
            }
        );
        assert_eq!(config.lexicon.seed, Some(42));
        assert!(config.output.once_per_day);
    }

    #[test]
    fn test_store_url_wins_over_database_url() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "http://old.local"),
            ("SIMWORD_STORE_URL", "http://new.local"),
        ]);
        let mut config = PipelineConfig::default();
        config
            .apply_env(|key| env.get(key).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.embeddings.url.as_deref(), Some("http://new.local"));
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = PipelineConfig::default();
        let result = config.apply_env(|key| (key == "SIMWORD_SEED").then(|| "soon".to_string()));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_missing_or_ambiguous_source() {
        assert!(EmbeddingsConfig::default().source().is_err());

        let both = EmbeddingsConfig {
            url: Some("http://vectors.local".to_string()),
            ..EmbeddingsConfig::snapshot("vectors.json")
        };
        assert!(matches!(both.source(), Err(PipelineError::Config(_))));
    }
}
