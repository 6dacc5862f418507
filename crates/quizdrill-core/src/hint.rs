// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! One-shot hints.
//!
//! A hint is derived from the question alone, except for multiple-choice
//! questions, where a wrong option is picked at random. [`HintCache`] makes
//! sure that pick happens once per question, so asking for the hint again
//! shows the same option.

use std::collections::HashMap;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::grade::grade;
use crate::rng::TinyRng;
use crate::types::question::Question;
use crate::types::question::QuestionId;
use crate::types::question::QuestionKind;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Hint {
    /// Eliminate this wrong option.
    Eliminate(String),
    /// The answer has `chars` characters and starts with `first`.
    Length { chars: usize, first: String },
    /// The answer starts with these words.
    Prefix(String),
    /// Nothing useful to say.
    Empty,
}

impl Hint {
    pub fn is_empty(&self) -> bool {
        matches!(self, Hint::Empty)
    }
}

impl Display for Hint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Hint::Eliminate(option) => write!(f, "50/50: eliminate \"{option}\"."),
            Hint::Length { chars, first } => {
                write!(f, "The answer has {chars} characters and starts with \"{first}...\".")
            }
            Hint::Prefix(words) => write!(f, "The answer starts with \"{words}...\"."),
            Hint::Empty => Ok(()),
        }
    }
}

/// Derive a hint for a question. `rng` is only consulted for multiple-choice
/// questions, whose candidates are the options that would grade wrong.
pub fn generate_hint(question: &Question, rng: &mut TinyRng) -> Hint {
    match question.kind() {
        QuestionKind::MultipleChoice { options } => {
            let wrong: Vec<&String> = options
                .iter()
                .filter(|option| !grade(question, option))
                .collect();
            match rng.index(wrong.len()) {
                Some(i) => Hint::Eliminate(wrong[i].clone()),
                None => Hint::Empty,
            }
        }
        QuestionKind::FillInBlank => {
            let answer = question.correct_answer().trim();
            let first: String = answer
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default();
            Hint::Length {
                chars: answer.chars().count(),
                first,
            }
        }
        QuestionKind::Rearrange { .. } => prefix_hint(question.correct_answer()),
    }
}

/// The first half of the words, rounded up, with at least one word.
fn prefix_hint(answer: &str) -> Hint {
    let words: Vec<&str> = answer.split_whitespace().collect();
    if words.is_empty() {
        return Hint::Empty;
    }
    let count = words.len().div_ceil(2).max(1);
    Hint::Prefix(words[..count].join(" "))
}

/// Hints generated so far in the current pass, keyed by question.
pub struct HintCache {
    rng: TinyRng,
    hints: HashMap<QuestionId, Hint>,
}

impl HintCache {
    pub fn new(rng: TinyRng) -> Self {
        Self {
            rng,
            hints: HashMap::new(),
        }
    }

    /// Return the cached hint for the question, generating it on first use.
    pub fn get_or_generate(&mut self, question: &Question) -> &Hint {
        let rng = &mut self.rng;
        self.hints
            .entry(question.id())
            .or_insert_with(|| generate_hint(question, rng))
    }

    pub fn get(&self, id: QuestionId) -> Option<&Hint> {
        self.hints.get(&id)
    }

    /// Forget all hints. Called when a new pass starts.
    pub fn clear(&mut self) {
        self.hints.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multiple_choice(options: &[&str], answer: &str) -> Question {
        Question::new(
            QuestionId::new(1),
            QuestionKind::MultipleChoice {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            "Q".to_string(),
            answer.to_string(),
        )
    }

    fn with_kind(kind: QuestionKind, answer: &str) -> Question {
        Question::new(QuestionId::new(1), kind, "Q".to_string(), answer.to_string())
    }

    #[test]
    fn test_multiple_choice_eliminates_a_wrong_option() {
        let q = multiple_choice(&["cat", "dog", "bird", "fish"], "dog");
        for seed in 0..64 {
            let mut rng = TinyRng::from_seed(seed);
            match generate_hint(&q, &mut rng) {
                Hint::Eliminate(option) => {
                    assert_ne!(option, "dog");
                    assert!(["cat", "bird", "fish"].contains(&option.as_str()));
                }
                other => panic!("unexpected hint {other:?}"),
            }
        }
    }

    #[test]
    fn test_multiple_choice_never_eliminates_a_variant_of_the_answer() {
        let q = multiple_choice(&["Cat", "dog", "Cat!"], "cat");
        for seed in 0..64 {
            let mut rng = TinyRng::from_seed(seed);
            assert_eq!(
                generate_hint(&q, &mut rng),
                Hint::Eliminate("dog".to_string())
            );
        }
    }

    #[test]
    fn test_multiple_choice_without_wrong_options() {
        let q = multiple_choice(&["dog"], "dog");
        let mut rng = TinyRng::from_seed(1);
        assert_eq!(generate_hint(&q, &mut rng), Hint::Empty);
        assert_eq!(generate_hint(&q, &mut rng).to_string(), "");
    }

    #[test]
    fn test_fill_in_blank() {
        let q = with_kind(QuestionKind::FillInBlank, " goes ");
        let mut rng = TinyRng::from_seed(1);
        let hint = generate_hint(&q, &mut rng);
        assert_eq!(
            hint,
            Hint::Length {
                chars: 4,
                first: "G".to_string()
            }
        );
        assert_eq!(
            hint.to_string(),
            "The answer has 4 characters and starts with \"G...\"."
        );
    }

    #[test]
    fn test_fill_in_blank_non_ascii() {
        let q = with_kind(QuestionKind::FillInBlank, "éclair");
        let mut rng = TinyRng::from_seed(1);
        assert_eq!(
            generate_hint(&q, &mut rng),
            Hint::Length {
                chars: 6,
                first: "É".to_string()
            }
        );
    }

    #[test]
    fn test_rearrange_prefix_rounds_up() {
        let parts = QuestionKind::Rearrange { parts: vec![] };
        let mut rng = TinyRng::from_seed(1);
        let cases = [
            ("happy", "happy"),
            ("I am", "I"),
            ("I am happy", "I am"),
            ("She goes to school", "She goes"),
            ("She goes to school by bus", "She goes to"),
        ];
        for (answer, prefix) in cases {
            let q = with_kind(parts.clone(), answer);
            assert_eq!(generate_hint(&q, &mut rng), Hint::Prefix(prefix.to_string()));
        }
    }

    #[test]
    fn test_rearrange_empty_answer() {
        let q = with_kind(QuestionKind::Rearrange { parts: vec![] }, "  ");
        let mut rng = TinyRng::from_seed(1);
        assert!(generate_hint(&q, &mut rng).is_empty());
    }

    #[test]
    fn test_cache_is_stable() {
        let q = multiple_choice(&["a", "b", "c", "d", "e", "f", "g"], "a");
        let mut cache = HintCache::new(TinyRng::from_seed(99));
        let first = cache.get_or_generate(&q).clone();
        for _ in 0..20 {
            assert_eq!(cache.get_or_generate(&q), &first);
        }
        assert_eq!(cache.get(q.id()), Some(&first));
    }

    #[test]
    fn test_cache_clear() {
        let q = with_kind(QuestionKind::FillInBlank, "hi");
        let mut cache = HintCache::new(TinyRng::from_seed(1));
        cache.get_or_generate(&q);
        cache.clear();
        assert_eq!(cache.get(q.id()), None);
    }
}
