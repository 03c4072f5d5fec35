//! Word lists: the immutable dictionary and the per-game working pool.

use rand::Rng;
use rand::seq::index;

/// The full word list a game was created with.
///
/// Normalized on construction: trimmed, lower-cased, empty lines dropped,
/// sorted and de-duplicated. Never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    pub fn from_words<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort();
        words.dedup();
        Self { words }
    }

    /// One word per line, as in a plain word-list file.
    pub fn from_lines(text: &str) -> Self {
        Self::from_words(text.lines())
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Words still eligible for selection in one game.
///
/// Sampling leaves the pool untouched; only a word the drawer actually
/// picks is taken out. [`reset`](Self::reset) refills the pool with a
/// fresh copy of the dictionary, so picks never shrink the dictionary.
#[derive(Debug, Clone)]
pub struct WordPool {
    dictionary: Dictionary,
    pool: Vec<String>,
}

impl WordPool {
    pub fn new(dictionary: Dictionary) -> Self {
        let pool = dictionary.words.clone();
        Self { dictionary, pool }
    }

    /// Two distinct words from the pool, or `None` if fewer than two remain.
    pub fn sample_pair(&self) -> Option<[String; 2]> {
        self.sample_pair_with(&mut rand::rng())
    }

    pub fn sample_pair_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<[String; 2]> {
        if self.pool.len() < 2 {
            return None;
        }
        let picked = index::sample(rng, self.pool.len(), 2);
        Some([
            self.pool[picked.index(0)].clone(),
            self.pool[picked.index(1)].clone(),
        ])
    }

    /// Removes a picked word for the rest of the game. Returns `false` if
    /// it was not in the pool.
    pub fn take(&mut self, word: &str) -> bool {
        match self.pool.iter().position(|w| w == word) {
            Some(i) => {
                self.pool.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Refills the pool from the dictionary.
    pub fn reset(&mut self) {
        self.pool = self.dictionary.words.clone();
    }

    pub fn contains(&self, word: &str) -> bool {
        self.pool.iter().any(|w| w == word)
    }

    /// Words left in the pool.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}
