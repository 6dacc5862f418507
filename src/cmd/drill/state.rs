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


use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use quizdrill_core::HintCache;
use quizdrill_core::Question;
use quizdrill_core::QuestionId;
use quizdrill_core::Session;
use quizdrill_core::Timestamp;
use tokio::sync::oneshot::Sender;

use crate::error::ErrorReport;
use crate::error::Fallible;

#[derive(Clone)]
pub struct ServerState {
    pub bank_name: String,
    /// Absolute path to the bank directory.
    pub directory: PathBuf,
    pub mutable: Arc<Mutex<MutableState>>,
    pub shutdown_tx: Arc<Mutex<Option<Sender<()>>>>,
}

impl ServerState {
    pub fn lock(&self) -> Fallible<MutexGuard<'_, MutableState>> {
        self.mutable
            .lock()
            .map_err(|_| ErrorReport::new("Server state is poisoned."))
    }
}

pub struct MutableState {
    pub session: Session,
    pub view: QuestionView,
    pub hints: HintCache,
    /// When the current pass started.
    pub started_at: Option<Timestamp>,
    /// When the current pass finished.
    pub finished_at: Option<Timestamp>,
}

impl MutableState {
    pub fn new(session: Session, hints: HintCache) -> Self {
        Self {
            session,
            view: QuestionView::default(),
            hints,
            started_at: None,
            finished_at: None,
        }
    }

    /// Bookkeeping after the session restarted with a new pass.
    pub fn restarted(&mut self) {
        self.hints.clear();
        self.started_at = Some(Timestamp::now());
        self.finished_at = None;
        self.view = QuestionView::for_question(self.session.current().map(Question::id));
    }

    /// Reset the view if the question under the cursor changed.
    pub fn sync_view(&mut self) {
        let current: Option<QuestionId> = self.session.current().map(Question::id);
        if self.view.question_id != current {
            self.view = QuestionView::for_question(current);
        }
    }
}

/// Presentation state for the question on screen. It never outlives the
/// question: moving to another question starts from a blank view.
#[derive(Default, Debug, PartialEq)]
pub struct QuestionView {
    question_id: Option<QuestionId>,
    /// What the user typed in the answer box, kept across hint requests.
    pub draft: String,
    /// Indices into the rearrange parts, in the order the user picked them.
    pub selected_parts: Vec<usize>,
    pub show_hint: bool,
    /// Whether the question list modal is open.
    pub show_grid: bool,
}

impl QuestionView {
    fn for_question(question_id: Option<QuestionId>) -> Self {
        Self {
            question_id,
            ..Self::default()
        }
    }

    pub fn pick(&mut self, part: usize, part_count: usize) {
        if part < part_count && !self.selected_parts.contains(&part) {
            self.selected_parts.push(part);
        }
    }

    pub fn unpick(&mut self, part: usize) {
        self.selected_parts.retain(|p| *p != part);
    }

    /// The picked parts joined by single spaces, in pick order.
    pub fn assemble(&self, parts: &[String]) -> String {
        self.selected_parts
            .iter()
            .filter_map(|i| parts.get(*i))
            .map(String::as_str)
            .collect::<Vec<&str>>()
            .join(" ")
    }
}
