//! Incremental segmentation state.
//!
//! A [`StreamingSession`] keeps what must survive between incremental calls:
//! the character offset of the next chunk, the next sentence id, the words
//! tokenized but not yet part of a closed sentence, and the splitter session
//! that remembers boundary state (open quotes, words since the last break).
//!
//! Offsets and ids only move forward; [`StreamingSession::reset`] is the one
//! way to rewind them.

use std::sync::Arc;

use tracing::debug;

use super::traits::{SessionId, Splitter, Tokenizer};
use crate::types::{Sentence, SentenceId, Word};

/// First id handed out by a fresh or reset session.
pub const FIRST_SENTENCE_ID: u64 = 1;

pub struct StreamingSession {
    splitter: Option<Arc<dyn Splitter>>,
    session: Option<SessionId>,
    offset: usize,
    next_sentence_id: u64,
    pending: Vec<Word>,
}

impl StreamingSession {
    /// Open a session on `splitter`, if there is one. The splitter session is
    /// closed when this value is dropped.
    pub fn new(splitter: Option<Arc<dyn Splitter>>) -> Self {
        let session = splitter.as_ref().map(|s| s.open_session());
        if let Some(id) = session {
            debug!(%id, "opened segmentation session");
        }
        Self {
            splitter,
            session,
            offset: 0,
            next_sentence_id: FIRST_SENTENCE_ID,
            pending: Vec::new(),
        }
    }

    /// Character offset the next chunk starts at.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn next_sentence_id(&self) -> u64 {
        self.next_sentence_id
    }

    /// Words waiting for their sentence to close.
    pub fn pending(&self) -> &[Word] {
        &self.pending
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session
    }

    /// Tokenize `text` at the current offset and queue the words.
    pub fn push_text(&mut self, tokenizer: &dyn Tokenizer, text: &str) {
        let words = tokenizer.tokenize(text, &mut self.offset);
        self.pending.extend(words);
    }

    /// Move the current offset forward to `offset`. Never moves backward.
    pub fn advance_to(&mut self, offset: usize) {
        self.offset = self.offset.max(offset);
    }

    /// Hand the queued words to the splitter and take back the closed
    /// sentences, which leave the queue. With `flush`, everything queued is
    /// closed. Without a splitter, a flush closes the queue as one sentence.
    pub fn split(&mut self, flush: bool) -> Vec<Sentence> {
        let (Some(splitter), Some(session)) = (self.splitter.as_ref(), self.session) else {
            if flush {
                return self.take_pending().into_iter().collect();
            }
            return Vec::new();
        };
        let outcome = splitter.split(session, &self.pending, flush);
        let consumed = outcome.consumed.min(self.pending.len());
        self.pending.drain(..consumed);
        let mut sentences = outcome.sentences;
        self.assign_ids(&mut sentences);
        sentences
    }

    /// Every queued word as one sentence, or `None` when nothing is queued.
    pub fn take_pending(&mut self) -> Option<Sentence> {
        if self.pending.is_empty() {
            return None;
        }
        let mut sentence = Sentence::new(std::mem::take(&mut self.pending));
        sentence.id = Some(self.allocate_id());
        Some(sentence)
    }

    fn assign_ids(&mut self, sentences: &mut [Sentence]) {
        for sentence in sentences {
            sentence.id = Some(self.allocate_id());
        }
    }

    fn allocate_id(&mut self) -> SentenceId {
        let id = SentenceId(self.next_sentence_id);
        self.next_sentence_id += 1;
        id
    }

    /// Rewind the offset and id counter for a new, unrelated stream. The
    /// splitter session and the queued words are left as they are.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.next_sentence_id = FIRST_SENTENCE_ID;
    }
}

impl Drop for StreamingSession {
    fn drop(&mut self) {
        if let (Some(splitter), Some(id)) = (self.splitter.as_ref(), self.session.take()) {
            splitter.close_session(id);
            debug!(%id, "closed segmentation session");
        }
    }
}

impl std::fmt::Debug for StreamingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingSession")
            .field("session", &self.session)
            .field("offset", &self.offset)
            .field("next_sentence_id", &self.next_sentence_id)
            .field("pending", &self.pending.len())
            .finish()
    }
}
