use crate::catalog::Word;
use rand::seq::SliceRandom;

/// A fresh, uniformly random ordering of the session's words, walked front to
/// back. Every session start builds a new one.
#[derive(Debug, Clone)]
pub struct WordSequencer {
    order: Vec<Word>,
    pos: usize,
}

impl WordSequencer {
    pub fn new(words: &[Word]) -> Self {
        let mut order = words.to_vec();
        // Fisher-Yates via rand; every permutation equally likely.
        order.shuffle(&mut rand::thread_rng());
        Self { order, pos: 0 }
    }

    pub fn current(&self) -> Option<&Word> {
        self.order.get(self.pos)
    }

    /// Step to the next word, returning it, or None when the permutation is
    /// exhausted.
    pub fn advance(&mut self) -> Option<&Word> {
        self.pos += 1;
        self.order.get(self.pos)
    }

    pub fn is_last(&self) -> bool {
        self.pos + 1 >= self.order.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
