//! The lexical context shared by vocabulary building and target selection.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::senses::LexicalDatabase;
use crate::wordnet::WordNetIndex;

/// Lexical database and frequency table, loaded once per run and passed
/// explicitly to every stage that needs them.
#[derive(Clone)]
pub struct LexicalContext {
    lexicon: Arc<dyn LexicalDatabase>,
    frequencies: Arc<FrequencyTable>,
}

impl LexicalContext {
    pub fn new(lexicon: Arc<dyn LexicalDatabase>, frequencies: FrequencyTable) -> Self {
        Self {
            lexicon,
            frequencies: Arc::new(frequencies),
        }
    }

    /// Load a WordNet dictionary directory and a frequency corpus.
    pub fn load(wordnet_dir: impl AsRef<Path>, corpus: impl AsRef<Path>) -> Result<Self> {
        let lexicon = WordNetIndex::load(wordnet_dir)?;
        let frequencies = FrequencyTable::load(corpus)?;
        Ok(Self::new(Arc::new(lexicon), frequencies))
    }

    pub fn lexicon(&self) -> &dyn LexicalDatabase {
        self.lexicon.as_ref()
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }
}
