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

use crate::types::question::Question;
use crate::types::question::QuestionId;
use crate::types::question::QuestionKind;

pub fn fill_in(id: u32, answer: &str) -> Question {
    Question::new(
        QuestionId::new(id),
        QuestionKind::FillInBlank,
        format!("Question {id}"),
        answer.to_string(),
    )
}

pub fn multiple_choice(id: u32, options: &[&str], answer: &str) -> Question {
    Question::new(
        QuestionId::new(id),
        QuestionKind::MultipleChoice {
            options: options.iter().map(|o| o.to_string()).collect(),
        },
        format!("Question {id}"),
        answer.to_string(),
    )
}

pub fn rearrange(id: u32, parts: &[&str], answer: &str) -> Question {
    Question::new(
        QuestionId::new(id),
        QuestionKind::Rearrange {
            parts: parts.iter().map(|p| p.to_string()).collect(),
        },
        format!("Question {id}"),
        answer.to_string(),
    )
}
