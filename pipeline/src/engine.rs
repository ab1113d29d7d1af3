//! The daily puzzle pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use simword_embeddings::{
    EmbeddingStore, Ranking, RankingStats, RemoteStore, SimilarityRanker, SnapshotStore, Word,
};
use simword_lexicon::{LexicalContext, Selection, TargetSelector, VocabularyBuilder};
use simword_puzzle_store::{PuzzleDraft, PuzzleStore, ranking_file_name};

use crate::config::{EmbeddingSource, EmbeddingsConfig, LexiconConfig, PipelineConfig};
use crate::error::{PipelineError, Result};

/// Result of a daily run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A new puzzle was committed.
    Published(PublishedPuzzle),

    /// Today's puzzle already existed and once-per-day is enabled.
    AlreadyPublished { index: u64, date: NaiveDate },
}

impl RunOutcome {
    /// Index of the puzzle the run produced or found.
    pub fn index(&self) -> u64 {
        match self {
            Self::Published(puzzle) => puzzle.index,
            Self::AlreadyPublished { index, .. } => *index,
        }
    }
}

/// Summary of a committed puzzle.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPuzzle {
    pub index: u64,
    pub date: NaiveDate,
    pub target: Word,

    /// Number of ranked words stored.
    pub ranked: usize,

    /// Target draws consumed.
    pub attempts: usize,

    pub stats: RankingStats,
}

/// Generates and publishes daily puzzles.
///
/// Stages run strictly in order: vocabulary, target selection, ranking,
/// commit. A run either commits one complete record or leaves the store
/// untouched.
pub struct DailyPipeline {
    /// Configuration.
    config: PipelineConfig,

    /// Lexical database and frequencies.
    context: LexicalContext,

    /// Embedding source.
    store: Arc<dyn EmbeddingStore>,

    /// Published puzzles.
    puzzles: PuzzleStore,
}

impl DailyPipeline {
    /// Load every resource named by `config`.
    pub async fn new(config: PipelineConfig) -> Result<Self> {
        info!("Initializing daily pipeline");

        let context = load_context(&config.lexicon).await?;
        let store = open_embedding_store(&config.embeddings).await?;
        Self::from_parts(config, context, store)
    }

    /// Assemble a pipeline from already loaded parts.
    pub fn from_parts(
        config: PipelineConfig,
        context: LexicalContext,
        store: Arc<dyn EmbeddingStore>,
    ) -> Result<Self> {
        config.validate()?;
        let puzzles = PuzzleStore::open(&config.output.root)?;
        Ok(Self {
            config,
            context,
            store,
            puzzles,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn puzzles(&self) -> &PuzzleStore {
        &self.puzzles
    }

    fn ranker(&self) -> SimilarityRanker {
        SimilarityRanker::new()
            .with_limit(self.config.ranking.limit)
            .with_chunk_size(self.config.ranking.chunk_size)
    }

    fn selector(&self) -> TargetSelector {
        TargetSelector::new(self.config.lexicon.max_attempts)
    }

    fn rng(&self) -> StdRng {
        match self.config.lexicon.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Run for today's local date.
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_for(Local::now().date_naive(), self.rng()).await
    }

    /// Run for `date`, drawing the target with `rng`.
    pub async fn run_for(&self, date: NaiveDate, rng: StdRng) -> Result<RunOutcome> {
        if self.config.output.once_per_day {
            if let Some(index) = self.published_on(date).await? {
                info!("Puzzle {index} already published for {date}, skipping");
                return Ok(RunOutcome::AlreadyPublished { index, date });
            }
        }

        let vocabulary =
            VocabularyBuilder::new(self.config.lexicon.daily_threshold).build_from(&self.context)?;
        info!("Daily vocabulary has {} words", vocabulary.len());

        let Selection {
            word,
            vector,
            attempts,
        } = self
            .selector()
            .select(
                &vocabulary,
                self.store.as_ref(),
                self.context.lexicon(),
                rng,
            )
            .await?;

        let ranking = self.ranker().rank(&word, &vector, self.store.as_ref()).await?;
        let min = self.config.ranking.min_length;
        if ranking.len() < min {
            return Err(PipelineError::RankingTooShort {
                target: word.to_string(),
                len: ranking.len(),
                min,
            });
        }

        let ranked = ranking.len();
        let stats = ranking.stats.clone();
        let draft = PuzzleDraft::new(word.clone(), ranking.entries)?;

        let puzzles = self.puzzles.clone();
        let index = tokio::task::spawn_blocking(move || puzzles.commit(&draft, date)).await??;

        info!("Published puzzle {index} for {date}: '{word}' with {ranked} ranked words");
        Ok(RunOutcome::Published(PublishedPuzzle {
            index,
            date,
            target: word,
            ranked,
            attempts,
            stats,
        }))
    }

    /// Index of a complete puzzle the pointer records for `date`.
    async fn published_on(&self, date: NaiveDate) -> Result<Option<u64>> {
        let puzzles = self.puzzles.clone();
        let index = tokio::task::spawn_blocking(move || -> simword_puzzle_store::Result<_> {
            let Some(pointer) = puzzles.daily_pointer()? else {
                return Ok(None);
            };
            if pointer.date != date {
                return Ok(None);
            }
            Ok(puzzles.load(pointer.count)?.map(|record| record.index))
        })
        .await??;
        Ok(index)
    }

    /// Rank the vocabulary against `word`, or against a target drawn from
    /// the candidate pool when no word is given.
    pub async fn rank_word(&self, word: Option<&str>) -> Result<Ranking> {
        let selection = match word {
            Some(word) => self.selector().resolve(word, self.store.as_ref()).await?,
            None => {
                let pool = VocabularyBuilder::new(self.config.lexicon.candidate_threshold)
                    .build_from(&self.context)?;
                self.selector()
                    .select(&pool, self.store.as_ref(), self.context.lexicon(), self.rng())
                    .await?
            }
        };

        let ranking = self
            .ranker()
            .rank(&selection.word, &selection.vector, self.store.as_ref())
            .await?;
        Ok(ranking)
    }
}

/// Load the WordNet index and frequency corpus on a blocking thread.
pub async fn load_context(config: &LexiconConfig) -> Result<LexicalContext> {
    let wordnet_dir = config.wordnet_dir.clone();
    let corpus = config.corpus.clone();
    debug!(
        "Loading lexical context from {} and {}",
        wordnet_dir.display(),
        corpus.display()
    );
    let context =
        tokio::task::spawn_blocking(move || LexicalContext::load(&wordnet_dir, &corpus)).await??;
    Ok(context)
}

/// Open the configured embedding source.
pub async fn open_embedding_store(config: &EmbeddingsConfig) -> Result<Arc<dyn EmbeddingStore>> {
    match config.source()? {
        EmbeddingSource::Snapshot(path) => {
            let store = SnapshotStore::load(&path).await?;
            info!(
                "Loaded {} vectors from snapshot {}",
                store.len(),
                path.display()
            );
            Ok(Arc::new(store))
        }
        EmbeddingSource::Remote { url, token } => {
            let mut store = RemoteStore::new(&url)?.with_page_size(config.page_size);
            if let Some(token) = token {
                store = store.with_token(token);
            }
            if let Some(dimension) = config.dimension {
                store = store.with_dimension(dimension);
            }
            info!("Using remote vector store at {url}");
            Ok(Arc::new(store))
        }
    }
}

/// Write the candidate pool to `path`, one word per line, sorted.
///
/// Returns the number of words written.
pub async fn export_candidates(
    context: &LexicalContext,
    threshold: u64,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let path = path.as_ref();
    let pool = VocabularyBuilder::new(threshold).build_from(context)?;

    let mut content = String::new();
    for word in pool.iter() {
        content.push_str(word.as_str());
        content.push('\n');
    }
    tokio::fs::write(path, content).await?;

    info!("Wrote {} candidate words to {}", pool.len(), path.display());
    Ok(pool.len())
}

/// Write a ranking as `top1000_<target>.json` inside `dir`.
pub async fn write_ranking(ranking: &Ranking, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(ranking_file_name(ranking.target.as_str()));
    let content = serde_json::to_vec(&ranking.entries)?;
    tokio::fs::write(&path, content).await?;

    info!(
        "Wrote {} ranked words for '{}' to {}",
        ranking.len(),
        ranking.target,
        path.display()
    );
    Ok(path)
}
