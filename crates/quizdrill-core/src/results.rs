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

use serde::Serialize;

use crate::types::answer::UserAnswer;
use crate::types::question::Question;
use crate::types::question::QuestionId;

/// Points awarded per correct answer.
pub const POINTS_PER_CORRECT: u32 = 10;

pub fn score<'a>(answers: impl IntoIterator<Item = &'a UserAnswer>) -> u32 {
    let correct = answers.into_iter().filter(|a| a.is_correct).count();
    u32::try_from(correct)
        .unwrap_or(u32::MAX)
        .saturating_mul(POINTS_PER_CORRECT)
}

/// Answered question ids, split by correctness. Both lists are sorted.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Partition {
    pub correct: Vec<QuestionId>,
    pub wrong: Vec<QuestionId>,
}

pub fn partition<'a>(answers: impl IntoIterator<Item = &'a UserAnswer>) -> Partition {
    let mut result = Partition::default();
    for answer in answers {
        if answer.is_correct {
            result.correct.push(answer.question_id);
        } else {
            result.wrong.push(answer.question_id);
        }
    }
    result.correct.sort();
    result.wrong.sort();
    result
}

/// Aggregate numbers for the progress header and the results page.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub correct: usize,
    pub wrong: usize,
    pub score: u32,
    pub max_score: u32,
}

impl Summary {
    /// Only answers to questions in `active` are counted. The answer map may
    /// cover fewer questions than the active list.
    pub fn new(active: &[Question], answers: &HashMap<QuestionId, UserAnswer>) -> Self {
        let relevant: Vec<&UserAnswer> = active
            .iter()
            .filter_map(|q| answers.get(&q.id()))
            .collect();
        let correct = relevant.iter().filter(|a| a.is_correct).count();
        let answered = relevant.len();
        let total = active.len();
        Self {
            total,
            answered,
            unanswered: total - answered,
            correct,
            wrong: answered - correct,
            score: score(relevant),
            max_score: u32::try_from(total)
                .unwrap_or(u32::MAX)
                .saturating_mul(POINTS_PER_CORRECT),
        }
    }

    /// Percentage of questions answered, from 0 to 100.
    pub fn progress_percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            (self.answered * 100) / self.total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::fill_in;

    fn answer(id: u32, is_correct: bool) -> UserAnswer {
        UserAnswer {
            question_id: QuestionId::new(id),
            response: String::new(),
            is_correct,
        }
    }

    #[test]
    fn test_empty() {
        let answers: Vec<UserAnswer> = Vec::new();
        assert_eq!(score(&answers), 0);
        assert_eq!(partition(&answers), Partition::default());
    }

    #[test]
    fn test_score_is_ten_per_correct() {
        let answers = vec![answer(1, true), answer(2, false), answer(3, true)];
        assert_eq!(score(&answers), 20);
        let all_wrong = vec![answer(1, false), answer(2, false)];
        assert_eq!(score(&all_wrong), 0);
    }

    #[test]
    fn test_partition_is_sorted() {
        let answers = vec![
            answer(5, false),
            answer(2, true),
            answer(3, false),
            answer(1, true),
        ];
        let p = partition(&answers);
        assert_eq!(p.correct, vec![QuestionId::new(1), QuestionId::new(2)]);
        assert_eq!(p.wrong, vec![QuestionId::new(3), QuestionId::new(5)]);
    }

    #[test]
    fn test_summary_with_partial_answers() {
        let active = vec![fill_in(1, "a"), fill_in(2, "b"), fill_in(3, "c")];
        let mut answers = HashMap::new();
        answers.insert(QuestionId::new(1), answer(1, true));
        answers.insert(QuestionId::new(3), answer(3, false));
        let s = Summary::new(&active, &answers);
        assert_eq!(s.total, 3);
        assert_eq!(s.answered, 2);
        assert_eq!(s.unanswered, 1);
        assert_eq!(s.correct, 1);
        assert_eq!(s.wrong, 1);
        assert_eq!(s.score, 10);
        assert_eq!(s.max_score, 30);
        assert_eq!(s.progress_percent(), 66);
    }

    #[test]
    fn test_summary_ignores_answers_outside_active_list() {
        let active = vec![fill_in(2, "b")];
        let mut answers = HashMap::new();
        answers.insert(QuestionId::new(1), answer(1, true));
        answers.insert(QuestionId::new(7), answer(7, true));
        let s = Summary::new(&active, &answers);
        assert_eq!(s.answered, 0);
        assert_eq!(s.unanswered, 1);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn test_summary_empty_active_list() {
        let s = Summary::new(&[], &HashMap::new());
        assert_eq!(s.total, 0);
        assert_eq!(s.score, 0);
        assert_eq!(s.progress_percent(), 100);
    }
}
