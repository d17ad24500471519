
// imports
use crate::error::{CbowError, Result};

use std::cmp::Reverse;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tracing::info;


/// The most frequent tokens of a corpus with a dense id for each.
///
/// Ids are given by rank, the most frequent token is id 0. Equally frequent
/// tokens are ranked by where they first appear in the token stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVocabulary", into = "RawVocabulary")]
pub struct Vocabulary {
    i2t: Vec<String>,
    counts: Vec<usize>,
    t2i: HashMap<String, usize>,
}

// what goes on disk, the token -> id map is rebuilt on load
#[derive(Serialize, Deserialize)]
struct RawVocabulary {
    i2t: Vec<String>,
    counts: Vec<usize>,
}

impl TryFrom<RawVocabulary> for Vocabulary {
    type Error = CbowError;

    fn try_from(raw: RawVocabulary) -> Result<Self> {

        if raw.i2t.len() != raw.counts.len() {
            return Err(CbowError::InvalidVocabulary(format!(
                "{} tokens but {} counts", raw.i2t.len(), raw.counts.len()
            )));
        }

        let mut t2i = HashMap::with_capacity(raw.i2t.len());
        for (i, t) in raw.i2t.iter().enumerate() {
            if t2i.insert(t.to_owned(), i).is_some() {
                return Err(CbowError::InvalidVocabulary(format!("token {} appears twice", t)));
            }
        }

        Ok(Self { i2t: raw.i2t, counts: raw.counts, t2i })
    }
}

impl From<Vocabulary> for RawVocabulary {
    fn from(vocab: Vocabulary) -> Self {
        Self { i2t: vocab.i2t, counts: vocab.counts }
    }
}

impl Vocabulary {

    fn from_ranked(ranked: Vec<(String, usize)>) -> Self {
        let (i2t, counts): (Vec<String>, Vec<usize>) = ranked.into_iter().unzip();
        let t2i = i2t.iter().enumerate().map(|(i, t)| (t.to_owned(), i)).collect();
        Self { i2t, counts, t2i }
    }

    pub fn len(&self) -> usize {
        self.i2t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2t.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.t2i.contains_key(token)
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.t2i.get(token).copied()
    }

    pub fn token(&self, id: usize) -> Option<&str> {
        self.i2t.get(id).map(String::as_str)
    }

    pub fn count(&self, token: &str) -> Option<usize> {
        self.id(token).map(|i| self.counts[i])
    }

    /// Tokens in id order.
    pub fn tokens(&self) -> &[String] {
        &self.i2t
    }

    /// Maps every token to its id, failing on the first one outside the vocabulary.
    pub fn ids<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<usize>> {
        tokens
            .iter()
            .map(|t| {
                let t = t.as_ref();
                self.id(t).ok_or_else(|| CbowError::UnknownToken(t.to_string()))
            })
            .collect()
    }
}


pub fn build_vocabulary<S: AsRef<str>>(tokens: &[S], size: usize) -> Result<Vocabulary> {

    if size == 0 {
        return Err(CbowError::InvalidSize);
    }

    // count occurrences, remembering where each token was seen first
    let mut token2count: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, tok) in tokens.iter().enumerate() {
        let entry = token2count.entry(tok.as_ref()).or_insert((0, position));
        entry.0 += 1;
    }

    // sort by count (descending) and first-seen position, take the `size` first entries
    let mut tup = token2count
        .into_iter()
        .map(|(tok, (count, first))| (tok, count, first))
        .collect::<Vec<(&str, usize, usize)>>();
    tup.sort_by_key(|&(_, count, first)| (Reverse(count), first));

    let distinct = tup.len();
    tup.truncate(size);

    info!(kept = tup.len(), distinct, "built vocabulary of most common tokens");

    Ok(Vocabulary::from_ranked(
        tup.into_iter().map(|(tok, count, _)| (tok.to_string(), count)).collect(),
    ))
}


pub fn filter_tokens<S: AsRef<str>>(tokens: &[S], vocabulary: &Vocabulary) -> Vec<String> {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| vocabulary.contains(t))
        .map(str::to_string)
        .collect()
}
