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

use crate::normalize::normalize;
use crate::types::question::Question;

/// Exact-match grading after normalization. No partial credit.
///
/// For rearrange questions the response is the chosen tokens joined by
/// single spaces. The tokens are not checked against the question's parts:
/// any string that normalizes to the correct answer is accepted.
pub fn grade(question: &Question, response: &str) -> bool {
    normalize(response) == normalize(question.correct_answer())
}
