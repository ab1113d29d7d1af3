//! Reader for WordNet `index.*` files.
//!
//! Each dictionary directory holds one index file per part of speech
//! (`index.noun`, `index.verb`, `index.adj`, `index.adv`). Lines starting with
//! a space are license text; every other line reads
//!
//! ```text
//! lemma pos synset_cnt p_cnt [ptr_symbol...] sense_cnt tagsense_cnt synset_offset...
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{LexiconError, Result};
use crate::senses::{LexicalDatabase, PartOfSpeech, Sense};

/// Index files read from a dictionary directory, with whether each is
/// required.
const INDEX_FILES: [(&str, PartOfSpeech, bool); 4] = [
    ("index.noun", PartOfSpeech::Noun, true),
    ("index.verb", PartOfSpeech::Verb, true),
    ("index.adj", PartOfSpeech::Adjective, true),
    ("index.adv", PartOfSpeech::Adverb, false),
];

/// One parsed index line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexLine {
    lemma: String,
    pos: PartOfSpeech,
    offsets: Vec<String>,
}

fn parse_line(line: &str) -> std::result::Result<IndexLine, String> {
    let mut fields = line.split_whitespace();
    let mut next = |what: &str| fields.next().ok_or_else(|| format!("missing {what}"));

    let lemma = next("lemma")?.to_lowercase();
    let tag = next("pos")?;
    let pos = PartOfSpeech::from_tag(tag).ok_or_else(|| format!("unknown pos tag {tag:?}"))?;
    let synset_cnt = parse_count(next("synset_cnt")?, "synset_cnt")?;
    let p_cnt = parse_count(next("p_cnt")?, "p_cnt")?;
    for _ in 0..p_cnt {
        next("ptr_symbol")?;
    }
    parse_count(next("sense_cnt")?, "sense_cnt")?;
    parse_count(next("tagsense_cnt")?, "tagsense_cnt")?;

    // synset_cnt is untrusted input, so no pre-allocation.
    let mut offsets = Vec::new();
    for _ in 0..synset_cnt {
        offsets.push(next("synset_offset")?.to_string());
    }

    Ok(IndexLine {
        lemma,
        pos,
        offsets,
    })
}

fn parse_count(raw: &str, what: &str) -> std::result::Result<usize, String> {
    raw.parse()
        .map_err(|_| format!("{what} is not a number: {raw:?}"))
}

/// A WordNet lexicon built from index files.
#[derive(Debug, Clone, Default)]
pub struct WordNetIndex {
    /// Lemma to senses.
    senses: HashMap<String, Vec<Sense>>,

    /// Lemmas per part of speech, in file order.
    lemmas: BTreeMap<PartOfSpeech, Vec<String>>,
}

impl WordNetIndex {
    /// Load every index file from a WordNet `dict` directory.
    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        let dict_dir = dict_dir.as_ref();
        let mut index = Self::default();

        for (file_name, pos, required) in INDEX_FILES {
            let path = dict_dir.join(file_name);
            if !required && !path.exists() {
                debug!("Optional index file missing: {}", path.display());
                continue;
            }
            let content = fs::read_to_string(&path).map_err(|source| LexiconError::ReadFile {
                path: path.clone(),
                source,
            })?;
            let added = index.add_index(&path, pos, &content)?;
            debug!("Read {added} lemmas from {}", path.display());
        }

        info!(
            "Loaded WordNet index from {} ({} lemmas)",
            dict_dir.display(),
            index.senses.len()
        );
        Ok(index)
    }

    /// Parse the content of one index file.
    ///
    /// `path` is only used in error messages. Lines whose tag disagrees with
    /// `expected` are rejected.
    pub fn add_index(&mut self, path: &Path, expected: PartOfSpeech, content: &str) -> Result<usize> {
        let mut added = 0;
        for (number, line) in content.lines().enumerate() {
            if line.is_empty() || line.starts_with(' ') {
                continue;
            }

            let parsed = parse_line(line).map_err(|reason| parse_error(path, number + 1, reason))?;
            if parsed.pos != expected {
                return Err(parse_error(
                    path,
                    number + 1,
                    format!("expected {expected:?} entry, found {:?}", parsed.pos),
                ));
            }

            let senses = self.senses.entry(parsed.lemma.clone()).or_default();
            for offset in parsed.offsets {
                senses.push(Sense::new(format!("{offset}-{}", expected.tag()), expected));
            }
            self.lemmas.entry(expected).or_default().push(parsed.lemma);
            added += 1;
        }
        Ok(added)
    }

    pub fn lemma_count(&self) -> usize {
        self.senses.len()
    }
}

fn parse_error(path: &Path, line: usize, reason: String) -> LexiconError {
    LexiconError::Parse {
        path: PathBuf::from(path),
        line,
        reason,
    }
}

impl LexicalDatabase for WordNetIndex {
    fn synsets(&self, word: &str) -> Vec<Sense> {
        self.senses
            .get(&word.trim().to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    fn all_lemmas(&self, pos: PartOfSpeech) -> Vec<String> {
        self.lemmas.get(&pos).cloned().unwrap_or_default()
    }
}
