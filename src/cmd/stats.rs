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

use clap::ValueEnum;
use quizdrill_core::Question;
use quizdrill_core::QuestionType;
use serde::Serialize;

use crate::bank::Bank;
use crate::error::Fallible;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum StatsFormat {
    /// Human-readable text.
    Text,
    /// JSON.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct BankStats {
    pub name: String,
    pub files: usize,
    pub questions: usize,
    pub multiple_choice: usize,
    pub fill_in_blank: usize,
    pub rearrange: usize,
    pub with_image: usize,
    pub with_audio: usize,
    pub with_explanation: usize,
}

impl BankStats {
    pub fn new(bank: &Bank) -> Self {
        let questions: &[Question] = &bank.questions;
        let of_type = |t: QuestionType| questions.iter().filter(|q| q.question_type() == t).count();
        Self {
            name: bank.name.clone(),
            files: bank.files.len(),
            questions: questions.len(),
            multiple_choice: of_type(QuestionType::MultipleChoice),
            fill_in_blank: of_type(QuestionType::FillInBlank),
            rearrange: of_type(QuestionType::Rearrange),
            with_image: questions.iter().filter(|q| q.image().is_some()).count(),
            with_audio: questions.iter().filter(|q| q.audio().is_some()).count(),
            with_explanation: questions
                .iter()
                .filter(|q| !q.explanation().is_empty())
                .count(),
        }
    }

    fn to_text(&self) -> String {
        let rows: [(&str, usize); 8] = [
            ("Files", self.files),
            ("Questions", self.questions),
            ("Multiple choice", self.multiple_choice),
            ("Fill in the blank", self.fill_in_blank),
            ("Rearrange", self.rearrange),
            ("With image", self.with_image),
            ("With audio", self.with_audio),
            ("With explanation", self.with_explanation),
        ];
        let mut text = format!("{}\n", self.name);
        for (key, value) in rows {
            text.push_str(&format!("  {key}: {value}\n"));
        }
        text
    }
}

pub fn print_stats(path: Option<String>, format: StatsFormat) -> Fallible<()> {
    let bank: Bank = Bank::load(path)?;
    let stats = BankStats::new(&bank);
    match format {
        StatsFormat::Text => print!("{}", stats.to_text()),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}
