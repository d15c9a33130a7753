//! Heuristic morphological analysis
//!
//! Assigns candidate readings (lemma, tag, probability) to every word that
//! has none yet. This is a reference implementation driven by closed-class
//! word lists and English suffix rules, enough to exercise the pipeline
//! without trained resources. Each sub-module honours its switch in
//! [`MorphoOptions`].

use std::path::Path;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::errors::{AnalyzerError, Result};
use crate::pipeline::config::{MorphoOptions, MorphoResources};
use crate::pipeline::traits::{MorphAnalyzer, StageResult};
use crate::types::{Analysis, PosTag, Sentence, Word};

/// Dictionary resource: `{ "entries": { "form": [["lemma", "TAG", 0.7]] } }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DictionaryFile {
    entries: FxHashMap<String, Vec<(String, String, f64)>>,
}

/// Built-in morphological analyzer.
#[derive(Debug, Clone)]
pub struct HeuristicMorpho {
    decimal: char,
    thousand: char,
    probability_threshold: f64,
    dictionary: FxHashMap<String, Vec<(String, String, f64)>>,
    user_map: FxHashMap<String, (String, String)>,
}

impl Default for HeuristicMorpho {
    fn default() -> Self {
        Self {
            decimal: '.',
            thousand: ',',
            probability_threshold: 0.001,
            dictionary: FxHashMap::default(),
            user_map: FxHashMap::default(),
        }
    }
}

impl HeuristicMorpho {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from morphology resources. A path of `"builtin"` means "no
    /// extra entries"; any other dictionary or user-map path is read as JSON.
    pub fn from_resources(res: &MorphoResources) -> Result<Self> {
        let mut morpho = Self {
            decimal: res.decimal.chars().next().unwrap_or('.'),
            thousand: res.thousand.chars().next().unwrap_or(','),
            probability_threshold: res.probability_threshold,
            ..Default::default()
        };
        if let Some(path) = external(res.dictionary_file.as_deref()) {
            let file: DictionaryFile = read_json(path)?;
            morpho.dictionary = file
                .entries
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect();
        }
        if let Some(path) = external(res.user_map_file.as_deref()) {
            let map: FxHashMap<String, (String, String)> = read_json(path)?;
            morpho.user_map = map;
        }
        Ok(morpho)
    }

    /// Add a dictionary entry.
    pub fn with_entry(mut self, form: &str, lemma: &str, tag: &str, prob: f64) -> Self {
        self.dictionary
            .entry(form.to_lowercase())
            .or_default()
            .push((lemma.to_string(), tag.to_string(), prob));
        self
    }

    fn analyze_word(&self, word: &mut Word, sentence_initial: bool, opts: &MorphoOptions) {
        if !word.analyses.is_empty() {
            return;
        }
        let owned = word.form.clone();
        let form = owned.as_str();
        let lower = form.to_lowercase();

        if opts.user_map {
            if let Some((lemma, tag)) = self.user_map.get(form) {
                word.add_analysis(Analysis::new(lemma.clone(), tag.clone(), 1.0));
                return;
            }
        }

        if opts.punctuation_detection && is_punctuation(form) {
            word.add_analysis(Analysis::new(form, punctuation_tag(form), 1.0));
            return;
        }

        if opts.numbers_detection {
            if let Some(value) = self.parse_number(form) {
                word.add_analysis(Analysis::new(value, PosTag::Numeral.as_str(), 1.0));
                return;
            }
        }

        if opts.retok_contractions {
            if let Some(analysis) = contraction(word) {
                word.add_analysis(analysis);
                return;
            }
        }

        if opts.dictionary_search {
            if let Some(entries) = self.dictionary.get(&lower) {
                for (lemma, tag, prob) in entries {
                    word.add_analysis(Analysis::new(lemma.clone(), tag.clone(), *prob));
                }
            } else if let Some(pos) = function_word_pos(&lower) {
                word.add_analysis(Analysis::new(lower.clone(), pos.as_str(), 1.0));
            }
            if !word.analyses.is_empty() {
                self.normalize(word, opts);
                return;
            }
        }

        if opts.ne_recognition && !sentence_initial && is_capitalized(form) {
            word.add_analysis(Analysis::new(form, PosTag::ProperNoun.as_str(), 1.0));
            return;
        }

        if opts.affix_analysis {
            for (lemma, tag, prob) in suffix_readings(&lower) {
                word.add_analysis(Analysis::new(lemma, tag, prob));
            }
        }

        if word.analyses.is_empty() {
            let pos = guess_pos(form);
            word.add_analysis(Analysis::new(basic_lemmatize(form), pos.as_str(), 1.0));
        }
        self.normalize(word, opts);
    }

    /// Scale probabilities to sum to one and drop readings under the
    /// threshold.
    fn normalize(&self, word: &mut Word, opts: &MorphoOptions) {
        if !opts.probability_assignment {
            return;
        }
        let total: f64 = word.analyses.iter().map(|a| a.prob).sum();
        if total <= 0.0 {
            let uniform = 1.0 / word.analyses.len().max(1) as f64;
            word.analyses.iter_mut().for_each(|a| a.prob = uniform);
            return;
        }
        word.analyses.iter_mut().for_each(|a| a.prob /= total);
        if word.analyses.len() > 1 {
            let threshold = self.probability_threshold;
            word.analyses.retain(|a| a.prob >= threshold);
        }
        word.analyses
            .sort_by(|a, b| b.prob.total_cmp(&a.prob));
    }

    fn parse_number(&self, form: &str) -> Option<String> {
        let mut normalized = String::with_capacity(form.len());
        let mut digits = 0;
        for c in form.chars() {
            if c.is_ascii_digit() {
                digits += 1;
                normalized.push(c);
            } else if c == self.thousand {
                continue;
            } else if c == self.decimal {
                normalized.push('.');
            } else {
                return None;
            }
        }
        (digits > 0).then_some(normalized)
    }
}

impl MorphAnalyzer for HeuristicMorpho {
    fn analyze(&self, sentences: &mut [&mut Sentence], options: &MorphoOptions) -> StageResult {
        sentences.par_iter_mut().for_each(|sentence| {
            for (idx, word) in sentence.words.iter_mut().enumerate() {
                self.analyze_word(word, idx == 0, options);
            }
        });
        Ok(())
    }
}

fn external(path: Option<&str>) -> Option<&str> {
    path.filter(|p| *p != crate::pipeline::stages::BUILTIN_RESOURCE)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let text = std::fs::read_to_string(Path::new(path))
        .map_err(|e| AnalyzerError::resource_load("morpho", path, e.to_string()))?;
    serde_json::from_str(&text)
        .map_err(|e| AnalyzerError::resource_load("morpho", path, e.to_string()))
}

fn is_capitalized(form: &str) -> bool {
    let mut chars = form.chars();
    chars.next().map(char::is_uppercase).unwrap_or(false)
}

fn is_punctuation(form: &str) -> bool {
    !form.is_empty() && form.chars().all(|c| !c.is_alphanumeric())
}

fn punctuation_tag(form: &str) -> &'static str {
    match form {
        "." | "..." | "…" => "Fp",
        "," => "Fc",
        ";" => "Fx",
        ":" => "Fd",
        "?" => "Fit",
        "!" => "Fat",
        "(" | "[" => "Fpa",
        ")" | "]" => "Fpt",
        "\"" | "«" | "»" => "Fe",
        "-" | "–" | "—" => "Fg",
        _ => "Fz",
    }
}

/// English clitic contractions, split into sub-words on the reading.
fn contraction(word: &Word) -> Option<Analysis> {
    const CLITICS: &[(&str, &str, &str)] = &[
        ("n't", "not", "RB"),
        ("'re", "be", "VBP"),
        ("'ll", "will", "MD"),
        ("'ve", "have", "VBP"),
        ("'m", "be", "VBP"),
        ("'d", "would", "MD"),
        ("'s", "'s", "POS"),
    ];
    let lower = word.form.to_lowercase();
    let (suffix, lemma, tag) = CLITICS
        .iter()
        .find(|(s, _, _)| lower.ends_with(s) && lower.len() > s.len())?;

    let total = word.form.chars().count();
    let clitic_len = suffix.chars().count();
    let head_len = total - clitic_len;
    let head_form: String = word.form.chars().take(head_len).collect();
    let clitic_form: String = word.form.chars().skip(head_len).collect();
    let head_lower = head_form.to_lowercase();
    let (head_lemma, head_tag) = match head_lower.as_str() {
        "wo" => ("will".to_string(), "MD"),
        "ca" => ("can".to_string(), "MD"),
        "do" | "does" | "did" => ("do".to_string(), "VBP"),
        "is" | "are" | "was" | "were" => ("be".to_string(), "VBP"),
        _ => {
            let pos = function_word_pos(&head_lower).unwrap_or_else(|| guess_pos(&head_form));
            (basic_lemmatize(&head_form), pos.as_str())
        }
    };

    let start = word.span.start;
    let mut head = Word::new(head_form, start, start + head_len);
    head.add_analysis(Analysis::new(head_lemma.clone(), head_tag, 1.0));
    let mut clitic = Word::new(clitic_form, start + head_len, word.span.end);
    clitic.add_analysis(Analysis::new(*lemma, *tag, 1.0));

    let mut analysis = Analysis::new(
        format!("{head_lemma}+{lemma}"),
        format!("{head_tag}+{tag}"),
        1.0,
    );
    analysis.retokenization = vec![head, clitic];
    Some(analysis)
}

/// Candidate readings from English suffixes.
fn suffix_readings(lower: &str) -> Vec<(String, &'static str, f64)> {
    let lemma = basic_lemmatize(lower);
    if lower.ends_with("ing") && lower.len() > 4 {
        vec![(lemma.clone(), "VBG", 0.7), (lower.to_string(), "NN", 0.3)]
    } else if lower.ends_with("ed") && lower.len() > 3 {
        vec![(lemma.clone(), "VBD", 0.5), (lemma, "VBN", 0.4), (lower.to_string(), "JJ", 0.1)]
    } else if lower.ends_with("ly") && lower.len() > 3 {
        vec![(lower.to_string(), "RB", 0.9), (lower.to_string(), "JJ", 0.1)]
    } else if lower.ends_with('s') && !lower.ends_with("ss") && lower.len() > 2 {
        vec![(lemma.clone(), "NNS", 0.7), (lemma, "VBZ", 0.3)]
    } else {
        Vec::new()
    }
}

/// Basic heuristic POS guess for unknown words.
pub fn guess_pos(word: &str) -> PosTag {
    let lower = word.to_lowercase();

    if let Some(pos) = function_word_pos(&lower) {
        return pos;
    }

    if is_capitalized(word) && word.chars().skip(1).all(|c| c.is_lowercase()) {
        return PosTag::ProperNoun;
    }

    if ["ful", "less", "ous", "ive", "able", "ible", "al", "ic"]
        .iter()
        .any(|s| lower.ends_with(s))
    {
        return PosTag::Adjective;
    }

    if lower.ends_with("ing") || lower.ends_with("ed") || lower.ends_with("ize") {
        return PosTag::Verb;
    }

    if lower.ends_with("ly") {
        return PosTag::Adverb;
    }

    if !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return PosTag::Numeral;
    }

    PosTag::Noun
}

/// Closed-class English words.
pub fn function_word_pos(lower: &str) -> Option<PosTag> {
    let pos = match lower {
        "a" | "an" | "the" | "this" | "that" | "these" | "those" | "my" | "your" | "his"
        | "her" | "its" | "our" | "their" | "some" | "any" | "each" | "every" | "no" => {
            PosTag::Determiner
        }
        "and" | "or" | "but" | "nor" | "so" | "yet" | "if" | "because" | "while" | "though"
        | "although" | "when" | "unless" | "until" | "since" => PosTag::Conjunction,
        "of" | "to" | "in" | "for" | "on" | "with" | "at" | "from" | "by" | "about" | "as"
        | "into" | "like" | "through" | "after" | "over" | "between" | "out" | "against"
        | "during" | "without" | "before" | "under" | "around" | "among" => PosTag::Preposition,
        "i" | "you" | "he" | "she" | "it" | "we" | "they" | "me" | "him" | "us" | "them"
        | "myself" | "yourself" | "ourselves" | "themselves" => PosTag::Pronoun,
        "is" | "are" | "was" | "were" | "be" | "been" | "am" | "has" | "have" | "had" | "do"
        | "does" | "did" => PosTag::Verb,
        "not" => PosTag::Particle,
        "oh" | "hey" | "wow" | "hello" | "bye" => PosTag::Interjection,
        _ => return None,
    };
    Some(pos)
}

/// Simple English lemmatization.
pub fn basic_lemmatize(word: &str) -> String {
    let lower = word.to_lowercase();

    if lower.ends_with("ies") && lower.len() > 4 {
        return format!("{}y", &lower[..lower.len() - 3]);
    }
    if lower.ends_with("es") && lower.len() > 3 {
        let stem = &lower[..lower.len() - 2];
        if stem.ends_with("ss")
            || stem.ends_with("sh")
            || stem.ends_with("ch")
            || stem.ends_with('x')
            || stem.ends_with('o')
        {
            return stem.to_string();
        }
    }
    if lower.ends_with('s') && lower.len() > 2 && !lower.ends_with("ss") {
        return lower[..lower.len() - 1].to_string();
    }
    if lower.ends_with("ing") && lower.len() > 5 {
        let stem = &lower[..lower.len() - 3];
        let chars: Vec<char> = stem.chars().collect();
        if chars.len() >= 2 && chars[chars.len() - 1] == chars[chars.len() - 2] {
            return chars[..chars.len() - 1].iter().collect();
        }
        return stem.to_string();
    }
    if lower.ends_with("ed") && lower.len() > 4 {
        if lower.ends_with("ied") {
            return format!("{}y", &lower[..lower.len() - 3]);
        }
        let stem = &lower[..lower.len() - 2];
        let chars: Vec<char> = stem.chars().collect();
        if chars.len() >= 2 && chars[chars.len() - 1] == chars[chars.len() - 2] {
            return chars[..chars.len() - 1].iter().collect();
        }
        return stem.to_string();
    }

    lower
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::tokenizer::Tokenizer;

    fn analyze(text: &str, opts: &MorphoOptions) -> Sentence {
        let mut sentence = Sentence::new(Tokenizer::new().tokenize_at(text, 0));
        let morpho = HeuristicMorpho::new();
        morpho.analyze(&mut [&mut sentence], opts).unwrap();
        sentence
    }

    #[test]
    fn test_every_word_gets_a_reading() {
        let s = analyze("The cats were running quickly.", &MorphoOptions::default());
        assert!(s.words.iter().all(|w| !w.analyses.is_empty()));
        assert_eq!(s.words[0].analyses[0].tag, "DT");
        assert_eq!(s.words[1].analyses[0].lemma, "cat");
        assert_eq!(s.words[3].analyses[0].tag, "VBG");
        assert_eq!(s.words[5].analyses[0].tag, "Fp");
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let s = analyze("walked", &MorphoOptions::default());
        let total: f64 = s.words[0].analyses.iter().map(|a| a.prob).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(s.words[0].analyses.len() > 1);
    }

    #[test]
    fn test_numbers_use_separators() {
        let s = analyze("It cost 1,234.5 today", &MorphoOptions::default());
        assert_eq!(s.words[2].analyses[0].tag, "CD");
        assert_eq!(s.words[2].analyses[0].lemma, "1234.5");

        let mut opts = MorphoOptions::default();
        opts.numbers_detection = false;
        let s = analyze("42", &opts);
        assert_eq!(s.words[0].analyses[0].tag, "CD");
        assert_eq!(s.words[0].analyses[0].lemma, "42");
    }

    #[test]
    fn test_contractions_retokenize() {
        let s = analyze("I don't know", &MorphoOptions::default());
        let reading = &s.words[1].analyses[0];
        assert_eq!(reading.lemma, "do+not");
        assert_eq!(reading.retokenization.len(), 2);
        assert_eq!(reading.retokenization[0].form, "do");
        assert_eq!(reading.retokenization[1].form, "n't");
        assert_eq!(reading.retokenization[1].span.end, s.words[1].span.end);
    }

    #[test]
    fn test_named_entities_need_switch() {
        let s = analyze("We met Alice", &MorphoOptions::default());
        assert_eq!(s.words[2].analyses[0].tag, "NNP");

        let mut opts = MorphoOptions::default();
        opts.ne_recognition = false;
        let s = analyze("We met Alice", &opts);
        assert_eq!(s.words[2].analyses[0].tag, "NNP");
        assert_eq!(s.words[2].analyses[0].lemma, "alice");
    }

    #[test]
    fn test_existing_readings_are_kept() {
        let mut sentence = Sentence::new(vec![Word::new("run", 0, 3)]);
        sentence.words[0].add_analysis(Analysis::new("run", "VB", 1.0));
        HeuristicMorpho::new()
            .analyze(&mut [&mut sentence], &MorphoOptions::default())
            .unwrap();
        assert_eq!(sentence.words[0].analyses.len(), 1);
    }

    #[test]
    fn test_dictionary_entries() {
        let morpho = HeuristicMorpho::new()
            .with_entry("saw", "see", "VBD", 0.8)
            .with_entry("saw", "saw", "NN", 0.2);
        let mut sentence = Sentence::new(vec![Word::new("He", 0, 2), Word::new("saw", 3, 6)]);
        morpho
            .analyze(&mut [&mut sentence], &MorphoOptions::default())
            .unwrap();
        let tags: Vec<&str> = sentence.words[1]
            .analyses
            .iter()
            .map(|a| a.tag.as_str())
            .collect();
        assert_eq!(tags, vec!["VBD", "NN"]);
    }

    #[test]
    fn test_user_map_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usermap.json");
        std::fs::write(&path, r#"{ "lol": ["laugh", "UH"] }"#).unwrap();
        let res = MorphoResources {
            user_map_file: Some(path.display().to_string()),
            ..Default::default()
        };
        let morpho = HeuristicMorpho::from_resources(&res).unwrap();
        let mut sentence = Sentence::new(vec![Word::new("lol", 0, 3)]);
        let mut opts = MorphoOptions::default();
        opts.user_map = true;
        morpho.analyze(&mut [&mut sentence], &opts).unwrap();
        assert_eq!(sentence.words[0].analyses[0].lemma, "laugh");
    }

    #[test]
    fn test_basic_lemmatization() {
        assert_eq!(basic_lemmatize("running"), "run");
        assert_eq!(basic_lemmatize("cats"), "cat");
        assert_eq!(basic_lemmatize("studies"), "study");
        assert_eq!(basic_lemmatize("boxes"), "box");
    }

    #[test]
    fn test_pos_guessing() {
        assert_eq!(guess_pos("beautiful"), PosTag::Adjective);
        assert_eq!(guess_pos("running"), PosTag::Verb);
        assert_eq!(guess_pos("quickly"), PosTag::Adverb);
        assert_eq!(guess_pos("information"), PosTag::Noun);
    }
}
