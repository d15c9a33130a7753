//! Greedy bigram tagger.
//!
//! Picks one reading per word, left to right, scoring each candidate by its
//! lexical probability times a coarse transition weight from the previous
//! word's chosen category. Readings that split a word into sub-words
//! (contractions) are expanded in place when retokenization is on.
//!
//! With `force_select = none`, readings tied with the best score stay
//! selected too; otherwise exactly one reading per word is selected.

use rayon::prelude::*;

use crate::pipeline::config::{ForceSelect, TaggerResources};
use crate::pipeline::observer::STAGE_HMM_TAGGER;
use crate::pipeline::traits::{SentenceStage, StageResult};
use crate::types::{PosTag, Sentence, Word};

#[derive(Debug, Clone)]
pub struct BigramTagger {
    retokenize: bool,
    force_select: ForceSelect,
}

impl Default for BigramTagger {
    fn default() -> Self {
        Self {
            retokenize: true,
            force_select: ForceSelect::Tagger,
        }
    }
}

impl BigramTagger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_resources(res: &TaggerResources) -> Self {
        Self {
            retokenize: res.retokenize,
            force_select: res.force_select,
        }
    }

    /// Weight of category `next` following category `prev`.
    fn transition(prev: Option<PosTag>, next: PosTag) -> f64 {
        use PosTag::*;
        match (prev, next) {
            (Some(Determiner), Noun | Adjective | ProperNoun | Numeral) => 2.0,
            (Some(Determiner), Verb) => 0.3,
            (Some(Pronoun), Verb) => 2.0,
            (Some(Adjective), Noun) => 1.5,
            (Some(Preposition), Noun | Determiner | ProperNoun | Pronoun) => 1.5,
            (Some(Preposition), Verb) => 0.5,
            _ => 1.0,
        }
    }

    fn tag_sentence(&self, sentence: &mut Sentence) {
        let mut prev: Option<PosTag> = None;
        for word in sentence.words.iter_mut() {
            if word.analyses.is_empty() {
                prev = None;
                continue;
            }
            let scores: Vec<f64> = word
                .analyses
                .iter()
                .map(|a| {
                    let category = PosTag::from_tag(a.tag.split('+').next().unwrap_or(""));
                    a.prob * Self::transition(prev, category)
                })
                .collect();
            let best = scores
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
                .map(|(i, _)| i)
                .unwrap_or(0);
            word.select(best);
            if self.force_select == ForceSelect::None {
                for (analysis, score) in word.analyses.iter_mut().zip(&scores) {
                    if (score - scores[best]).abs() < f64::EPSILON {
                        analysis.selected = true;
                    }
                }
            }
            prev = Some(PosTag::from_tag(
                word.analyses[best].tag.split('+').last().unwrap_or(""),
            ));
        }

        if self.retokenize {
            sentence.words = std::mem::take(&mut sentence.words)
                .into_iter()
                .flat_map(expand_retokenization)
                .collect();
        }
    }
}

/// Replace a word by the sub-words of its selected reading, if any.
fn expand_retokenization(mut word: Word) -> Vec<Word> {
    let Some(idx) = word.analyses.iter().position(|a| a.selected) else {
        return vec![word];
    };
    if word.analyses[idx].retokenization.is_empty() {
        return vec![word];
    }
    let mut parts = std::mem::take(&mut word.analyses[idx].retokenization);
    for part in &mut parts {
        if !part.analyses.is_empty() {
            part.select(0);
        }
    }
    parts
}

impl SentenceStage for BigramTagger {
    fn name(&self) -> &str {
        STAGE_HMM_TAGGER
    }

    fn analyze(&self, sentences: &mut [&mut Sentence]) -> StageResult {
        sentences
            .par_iter_mut()
            .for_each(|sentence| self.tag_sentence(sentence));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::morpho::HeuristicMorpho;
    use crate::nlp::tokenizer::Tokenizer;
    use crate::pipeline::config::MorphoOptions;
    use crate::pipeline::traits::MorphAnalyzer;

    fn tagged(text: &str, tagger: &BigramTagger) -> Sentence {
        let mut sentence = Sentence::new(Tokenizer::new().tokenize_at(text, 0));
        HeuristicMorpho::new()
            .analyze(&mut [&mut sentence], &MorphoOptions::default())
            .unwrap();
        tagger.analyze(&mut [&mut sentence]).unwrap();
        sentence
    }

    #[test]
    fn test_one_reading_selected_per_word() {
        let s = tagged("The dogs walked home.", &BigramTagger::new());
        for word in &s.words {
            assert_eq!(word.analyses.iter().filter(|a| a.selected).count(), 1);
        }
    }

    #[test]
    fn test_transition_prefers_noun_after_determiner() {
        // "runs" is NNS 0.7 / VBZ 0.3 lexically; after "the" the noun wins.
        let s = tagged("the runs", &BigramTagger::new());
        assert_eq!(s.words[1].tag(), Some("NNS"));
    }

    #[test]
    fn test_retokenization_expands_contractions() {
        let s = tagged("I don't know", &BigramTagger::new());
        assert_eq!(s.forms(), vec!["I", "do", "n't", "know"]);
        assert_eq!(s.words[2].tag(), Some("RB"));
        assert!(s.words[2].selected().is_some());

        let keep = BigramTagger::from_resources(&TaggerResources {
            retokenize: false,
            ..Default::default()
        });
        let s = tagged("I don't know", &keep);
        assert_eq!(s.forms(), vec!["I", "don't", "know"]);
    }

    #[test]
    fn test_unforced_selection_keeps_ties() {
        let mut word = Word::new("saw", 0, 3);
        word.add_analysis(crate::types::Analysis::new("saw", "NN", 0.5));
        word.add_analysis(crate::types::Analysis::new("see", "VBD", 0.5));
        let mut forced = Sentence::new(vec![word.clone()]);
        BigramTagger::new().analyze(&mut [&mut forced]).unwrap();
        assert_eq!(forced.words[0].analyses.iter().filter(|a| a.selected).count(), 1);
        assert_eq!(forced.words[0].tag(), Some("NN"));

        let loose = BigramTagger::from_resources(&TaggerResources {
            force_select: ForceSelect::None,
            ..Default::default()
        });
        let mut unforced = Sentence::new(vec![word]);
        loose.analyze(&mut [&mut unforced]).unwrap();
        assert_eq!(unforced.words[0].analyses.iter().filter(|a| a.selected).count(), 2);
    }

    #[test]
    fn test_words_without_readings_are_skipped() {
        let mut sentence = Sentence::new(vec![Word::new("x", 0, 1)]);
        BigramTagger::new().analyze(&mut [&mut sentence]).unwrap();
        assert!(sentence.words[0].selected().is_none());
    }
}
