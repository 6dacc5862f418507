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


//! quizdrill-core: the quiz engine behind quizdrill.
//!
//! This library has no I/O of its own. It provides:
//! - The question bank format and its parser
//! - Answer normalization and grading
//! - Hint generation
//! - The quiz session state machine
//! - Scoring and result aggregation

pub mod error;
pub mod grade;
pub mod hint;
pub mod markdown;
pub mod normalize;
pub mod parser;
pub mod results;
pub mod rng;
pub mod session;
pub mod types;

#[cfg(test)]
mod test_fixtures;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, fail};
pub use grade::grade;
pub use hint::{Hint, HintCache, generate_hint};
pub use normalize::normalize;
pub use parser::{ParsedBank, parse_bank};
pub use results::{POINTS_PER_CORRECT, Partition, Summary, partition, score};
pub use rng::TinyRng;
pub use session::{Phase, Session};
pub use types::answer::UserAnswer;
pub use types::question::{Question, QuestionId, QuestionKind, QuestionType};
pub use types::timestamp::Timestamp;
