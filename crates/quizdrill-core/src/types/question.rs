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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

/// Ordinal identifier of a question within a bank. Ids are assigned in load
/// order starting from 1, so they are stable across sessions over the same
/// bank.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct QuestionId(u32);

impl QuestionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u32 {
        self.0
    }
}

impl Display for QuestionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The answer modality of a question.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum QuestionType {
    MultipleChoice,
    FillInBlank,
    Rearrange,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::FillInBlank => "fill in the blank",
            QuestionType::Rearrange => "rearrange",
        }
    }
}

/// Type-specific question data.
#[derive(Clone, PartialEq, Debug)]
pub enum QuestionKind {
    MultipleChoice {
        /// The options, in display order.
        options: Vec<String>,
    },
    FillInBlank,
    Rearrange {
        /// The tokens the user reorders.
        parts: Vec<String>,
    },
}

/// An immutable question record from a bank.
#[derive(Clone, PartialEq, Debug)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    text: String,
    correct_answer: String,
    explanation: String,
    image: Option<String>,
    audio: Option<String>,
    /// Path of the bank file this question was read from.
    source_path: String,
}

impl Question {
    pub fn new(id: QuestionId, kind: QuestionKind, text: String, correct_answer: String) -> Self {
        Self {
            id,
            kind,
            text,
            correct_answer,
            explanation: String::new(),
            image: None,
            audio: None,
            source_path: String::new(),
        }
    }

    pub fn with_explanation(self, explanation: impl Into<String>) -> Self {
        Self {
            explanation: explanation.into(),
            ..self
        }
    }

    pub fn with_image(self, image: Option<String>) -> Self {
        Self { image, ..self }
    }

    pub fn with_audio(self, audio: Option<String>) -> Self {
        Self { audio, ..self }
    }

    pub fn with_source_path(self, source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            ..self
        }
    }

    /// Assign a new id. Used by the bank loader, which numbers questions
    /// across all files in load order.
    pub fn with_id(self, id: QuestionId) -> Self {
        Self { id, ..self }
    }

    pub fn id(&self) -> QuestionId {
        self.id
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::FillInBlank => QuestionType::FillInBlank,
            QuestionKind::Rearrange { .. } => QuestionType::Rearrange,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn audio(&self) -> Option<&str> {
        self.audio.as_deref()
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// The options of a multiple-choice question, empty for other types.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => options,
            _ => &[],
        }
    }

    /// The tokens of a rearrange question, empty for other types.
    pub fn rearrange_parts(&self) -> &[String] {
        match &self.kind {
            QuestionKind::Rearrange { parts } => parts,
            _ => &[],
        }
    }
}
