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

//! The quiz session state machine.
//!
//! A [`Session`] goes `NotStarted -> InProgress -> Finished`, and back to
//! `InProgress` on every restart. A restart replaces the active question
//! list and clears all answers; only the player's name carries over.
//!
//! Navigation is clamped rather than rejected. Operations that only make
//! sense in a given phase (`submit`, `retry_wrong`) return an error and
//! leave the session untouched when called out of phase.
//!
//! The session is not synchronized. Callers that share it across tasks must
//! serialize access themselves.

use std::collections::HashMap;
use std::collections::HashSet;

use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::grade::grade;
use crate::results::Partition;
use crate::results::Summary;
use crate::results::partition;
use crate::types::answer::UserAnswer;
use crate::types::question::Question;
use crate::types::question::QuestionId;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum Phase {
    NotStarted,
    InProgress,
    Finished,
}

pub struct Session {
    /// The full bank, in bank order.
    bank: Vec<Question>,
    player: Option<String>,
    /// The questions of the current pass.
    active: Vec<Question>,
    /// Index into `active`. Always zero when `active` is empty.
    cursor: usize,
    answers: HashMap<QuestionId, UserAnswer>,
    phase: Phase,
}

impl Session {
    pub fn new(bank: Vec<Question>) -> Self {
        Self {
            bank,
            player: None,
            active: Vec::new(),
            cursor: 0,
            answers: HashMap::new(),
            phase: Phase::NotStarted,
        }
    }

    /// Start a new pass over `questions` for `player`.
    ///
    /// This replaces the active list and clears all answers. An empty list is
    /// accepted: the session is then in progress with no current question,
    /// and it is up to the caller to offer something else to do.
    pub fn start(&mut self, player: impl Into<String>, questions: Vec<Question>) {
        self.player = Some(player.into());
        self.restart(questions);
    }

    fn restart(&mut self, questions: Vec<Question>) {
        let mut seen: HashSet<QuestionId> = HashSet::new();
        let mut active: Vec<Question> = Vec::with_capacity(questions.len());
        for question in questions {
            if seen.insert(question.id()) {
                active.push(question);
            } else {
                log::warn!("Dropping duplicate question id {}", question.id());
            }
        }
        log::debug!("Starting a pass over {} questions", active.len());
        self.active = active;
        self.cursor = 0;
        self.answers = HashMap::new();
        self.phase = Phase::InProgress;
    }

    /// Grade `response` against the current question and record it,
    /// replacing any earlier answer to the same question. The cursor does not
    /// move.
    pub fn submit(&mut self, response: &str) -> Fallible<&UserAnswer> {
        if self.phase != Phase::InProgress {
            return fail("Cannot submit an answer outside of a session in progress.");
        }
        let Some(question) = self.active.get(self.cursor) else {
            return fail("Cannot submit an answer: there is no current question.");
        };
        let id = question.id();
        let answer = UserAnswer {
            question_id: id,
            response: response.to_string(),
            is_correct: grade(question, response),
        };
        log::debug!(
            "Question {id} answered {}",
            if answer.is_correct { "correctly" } else { "incorrectly" }
        );
        self.answers.insert(id, answer);
        match self.answers.get(&id) {
            Some(answer) => Ok(answer),
            None => fail("Answer was not recorded."),
        }
    }

    /// Move to the next question. No-op on the last question.
    pub fn next(&mut self) {
        if self.cursor + 1 < self.active.len() {
            self.cursor += 1;
        }
    }

    /// Move to the previous question. No-op on the first question.
    pub fn prev(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// Move on without answering.
    pub fn skip(&mut self) {
        self.next();
    }

    /// Move the cursor to `index`. Out-of-range indices are ignored.
    pub fn jump(&mut self, index: usize) {
        if index < self.active.len() {
            self.cursor = index;
        }
    }

    /// End the pass, whether or not every question was answered.
    pub fn finish(&mut self) {
        match self.phase {
            Phase::NotStarted => log::debug!("Ignoring finish: session not started"),
            Phase::InProgress | Phase::Finished => {
                log::debug!("Finishing pass with {} answers", self.answers.len());
                self.phase = Phase::Finished;
            }
        }
    }

    /// Start a pass over the questions answered incorrectly in the finished
    /// pass, in bank order. If there are none, the new pass is empty.
    pub fn retry_wrong(&mut self) -> Fallible<()> {
        if self.phase != Phase::Finished {
            return fail("Can only retry wrong answers once the session is finished.");
        }
        let wrong: HashSet<QuestionId> = self.partition().wrong.into_iter().collect();
        let questions: Vec<Question> = self
            .bank
            .iter()
            .filter(|q| wrong.contains(&q.id()))
            .cloned()
            .collect();
        self.restart(questions);
        Ok(())
    }

    /// Start a pass over the whole bank.
    pub fn retry_all(&mut self) {
        self.restart(self.bank.clone());
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn bank(&self) -> &[Question] {
        &self.bank
    }

    pub fn active_questions(&self) -> &[Question] {
        &self.active
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The question under the cursor. `None` when the pass is empty.
    pub fn current(&self) -> Option<&Question> {
        self.active.get(self.cursor)
    }

    /// The recorded answer to the current question, if there is one.
    pub fn current_answer(&self) -> Option<&UserAnswer> {
        self.current().and_then(|q| self.answers.get(&q.id()))
    }

    pub fn answer_for(&self, id: QuestionId) -> Option<&UserAnswer> {
        self.answers.get(&id)
    }

    pub fn answers(&self) -> &HashMap<QuestionId, UserAnswer> {
        &self.answers
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.active.len()
    }

    pub fn all_answered(&self) -> bool {
        self.active.iter().all(|q| self.answers.contains_key(&q.id()))
    }

    pub fn partition(&self) -> Partition {
        partition(self.answers.values())
    }

    pub fn summary(&self) -> Summary {
        Summary::new(&self.active, &self.answers)
    }
}
