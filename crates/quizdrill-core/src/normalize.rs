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

/// Punctuation removed before comparing answers. ASCII only: non-ASCII
/// punctuation (e.g. `“`, `。`) is kept as-is.
const STRIPPED_PUNCTUATION: [char; 8] = ['.', ',', '!', '?', ';', ':', '\'', '"'];

/// Canonicalize an answer for comparison: strip punctuation, collapse runs
/// of whitespace into a single space, trim, and lowercase.
pub fn normalize(s: &str) -> String {
    let stripped: String = s
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    let collapsed: String = stripped.split_whitespace().collect::<Vec<&str>>().join(" ");
    collapsed.to_lowercase()
}
