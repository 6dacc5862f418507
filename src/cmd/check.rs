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


use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;

use quizdrill_core::Question;
use quizdrill_core::QuestionId;
use quizdrill_core::QuestionKind;
use quizdrill_core::markdown::media_urls;
use quizdrill_core::normalize;

use crate::bank::Bank;
use crate::error::Fallible;
use crate::error::fail;
use crate::media::reference::BankMedia;
use crate::media::reference::MediaError;

/// Something wrong with a question that the parser can't see.
#[derive(Debug, PartialEq)]
pub struct Problem {
    pub source_path: String,
    pub question: QuestionId,
    pub message: String,
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: question {}: {}",
            self.source_path, self.question, self.message
        )
    }
}

pub fn check_bank(path: Option<String>) -> Fallible<()> {
    let bank: Bank = Bank::load(path)?;
    let problems: Vec<Problem> = find_problems(&bank)?;
    for problem in problems.iter() {
        println!("{problem}");
    }
    if problems.is_empty() {
        println!("{}: {} questions, no problems.", bank.name, bank.questions.len());
        Ok(())
    } else {
        fail(format!("Found {} problems.", problems.len()))
    }
}

pub fn find_problems(bank: &Bank) -> Fallible<Vec<Problem>> {
    let mut media: HashMap<&str, BankMedia> = HashMap::new();
    let mut problems: Vec<Problem> = Vec::new();
    for question in bank.questions.iter() {
        let source_path: &str = question.source_path();
        if !media.contains_key(source_path) {
            let file_media = BankMedia::new(&bank.directory, Path::new(source_path))?;
            media.insert(source_path, file_media);
        }
        let mut messages: Vec<String> = lint_question(question);
        if let Some(file_media) = media.get(source_path) {
            messages.extend(check_media(question, file_media));
        }
        problems.extend(messages.into_iter().map(|message| Problem {
            source_path: source_path.to_string(),
            question: question.id(),
            message,
        }));
    }
    Ok(problems)
}

/// Answers that can never be given.
fn lint_question(question: &Question) -> Vec<String> {
    let mut messages = Vec::new();
    match question.kind() {
        QuestionKind::MultipleChoice { options } => {
            let answer = normalize(question.correct_answer());
            if !options.iter().any(|option| normalize(option) == answer) {
                messages.push(format!(
                    "answer {:?} is not one of the options.",
                    question.correct_answer()
                ));
            }
            let mut seen: HashSet<String> = HashSet::new();
            for option in options {
                if !seen.insert(normalize(option)) {
                    messages.push(format!("option {option:?} is repeated."));
                }
            }
        }
        QuestionKind::FillInBlank => {
            if normalize(question.correct_answer()).is_empty() {
                messages.push("answer is empty.".to_string());
            }
        }
        QuestionKind::Rearrange { parts } => {
            if sorted_words(&parts.join(" ")) != sorted_words(question.correct_answer()) {
                messages.push(format!(
                    "parts do not rearrange into the answer {:?}.",
                    question.correct_answer()
                ));
            }
        }
    }
    messages
}

fn sorted_words(text: &str) -> Vec<String> {
    let mut words: Vec<String> = normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    words.sort();
    words
}

fn check_media(question: &Question, media: &BankMedia) -> Vec<String> {
    let mut references: Vec<String> = Vec::new();
    references.extend(question.image().map(str::to_string));
    references.extend(question.audio().map(str::to_string));
    references.extend(media_urls(question.text()));
    references.extend(media_urls(question.explanation()));
    references
        .into_iter()
        .filter_map(|reference| match media.locate(&reference) {
            Ok(_) | Err(MediaError::External) => None,
            Err(e) => Some(format!("media reference {reference:?}: {e}")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use super::*;
    use crate::helper::create_tmp_copy_of_test_directory;
    use crate::helper::create_tmp_directory;

    fn load(text: &str) -> Fallible<Bank> {
        let root = create_tmp_directory()?;
        write(root.join("bank.md"), text)?;
        Bank::load(Some(root.display().to_string()))
    }

    #[test]
    fn test_fixture_has_no_problems() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let bank = Bank::load(Some(directory.clone()))?;
        assert_eq!(find_problems(&bank)?, Vec::new());
        check_bank(Some(directory))?;
        Ok(())
    }

    #[test]
    fn test_answer_not_among_options() -> Fallible<()> {
        let bank = load("MC: Pick one.\nO: cat\nO: dog\nA: cow\n")?;
        let problems = find_problems(&bank)?;
        assert_eq!(problems.len(), 1);
        assert_eq!(
            problems[0].to_string(),
            "bank.md: question 1: answer \"cow\" is not one of the options."
        );
        Ok(())
    }

    #[test]
    fn test_answer_matches_option_after_normalization() -> Fallible<()> {
        let bank = load("MC: Pick one.\nO: Cat.\nO: dog\nA: cat\n")?;
        assert!(find_problems(&bank)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_repeated_option() -> Fallible<()> {
        let bank = load("MC: Pick one.\nO: cat\nO: Cat\nA: cat\n")?;
        let problems = find_problems(&bank)?;
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].message, "option \"Cat\" is repeated.");
        Ok(())
    }

    #[test]
    fn test_rearrange_mismatch() -> Fallible<()> {
        let bank = load(
            "R: Order.\nP: happy | am | I\nA: I am happy\n---\nR: Order.\nP: sad | am | I\nA: I am happy\n",
        )?;
        let problems = find_problems(&bank)?;
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].question, QuestionId::new(2));
        Ok(())
    }

    #[test]
    fn test_missing_media() -> Fallible<()> {
        let bank = load(
            "F: Look: ![bus](bus.png)\nA: bus\nAUDIO: sounds/bus.mp3\n---\nF: Listen.\nA: x\nAUDIO: https://example.com/x.mp3\n",
        )?;
        let problems = find_problems(&bank)?;
        let messages: Vec<&str> = problems.iter().map(|p| p.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "media reference \"sounds/bus.mp3\": file not found.",
                "media reference \"bus.png\": file not found."
            ]
        );
        assert!(check_bank(Some(bank.directory.display().to_string())).is_err());
        Ok(())
    }
}
