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

//! Parser for question bank files.
//!
//! A bank file is Markdown with optional TOML frontmatter. Questions are
//! introduced by `MC:`, `F:` or `R:` and followed by field lines:
//!
//! ```text
//! MC: Which one is an animal?
//! O: table
//! O: cat
//! A: cat
//! E: A cat is an animal.
//! ---
//! R: Put the words in order.
//! P: happy | am | I
//! A: I am happy
//! AUDIO: audio/happy.mp3
//! ```

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::question::Question;
use crate::types::question::QuestionId;
use crate::types::question::QuestionKind;
use crate::types::question::QuestionType;

/// Metadata that can be specified at the top of a bank file.
#[derive(Debug, Default, Deserialize)]
pub struct BankMetadata {
    pub name: Option<String>,
}

/// Frontmatter split off from the start of a bank file.
pub struct Frontmatter<'a> {
    pub metadata: BankMetadata,
    /// The text after the frontmatter.
    pub content: &'a str,
    /// Number of lines consumed by the frontmatter.
    pub line_offset: usize,
}

/// Split TOML frontmatter off the text, if present.
///
/// A file may also begin with a question separator. The leading `---` only
/// opens frontmatter if it is closed before the first question starts.
pub fn extract_frontmatter(text: &str) -> Fallible<Frontmatter<'_>> {
    let no_frontmatter = Frontmatter {
        metadata: BankMetadata::default(),
        content: text,
        line_offset: 0,
    };
    let mut lines = text.lines().enumerate().peekable();

    match lines.peek() {
        Some((_, line)) if line.trim() == "---" => {}
        _ => return Ok(no_frontmatter),
    };
    lines.next();

    let mut frontmatter_lines = Vec::new();
    let mut closing_line_idx = None;
    for (idx, line) in lines {
        match Line::read(line) {
            Line::Separator => {
                closing_line_idx = Some(idx);
                break;
            }
            Line::Start(..) => return Ok(no_frontmatter),
            _ => frontmatter_lines.push(line),
        }
    }

    let closing_line_idx = closing_line_idx
        .ok_or_else(|| ErrorReport::new("Frontmatter opening '---' found but no closing '---'"))?;

    let metadata: BankMetadata = toml::from_str(&frontmatter_lines.join("\n"))?;

    // Byte offset of the line after the closing delimiter.
    let content_start_line = closing_line_idx + 1;
    let byte_pos = text
        .match_indices('\n')
        .nth(closing_line_idx)
        .map(|(pos, _)| pos + 1);
    let content = match byte_pos {
        Some(pos) if pos < text.len() => &text[pos..],
        _ => "",
    };

    Ok(Frontmatter {
        metadata,
        content,
        line_offset: content_start_line,
    })
}

/// A parsed bank: its display name, if any file declares one, and its
/// questions numbered `1..=n` in file order.
pub struct ParsedBank {
    pub name: Option<String>,
    pub questions: Vec<Question>,
}

/// Parse bank files, given as `(path, content)` pairs, in the order given.
pub fn parse_bank<'a>(files: impl Iterator<Item = (&'a str, &'a str)>) -> Fallible<ParsedBank> {
    let mut name: Option<String> = None;
    let mut questions: Vec<Question> = Vec::new();
    for (path, text) in files {
        let frontmatter = extract_frontmatter(text)?;
        if name.is_none() {
            name = frontmatter.metadata.name;
        }
        let parser = Parser::new(path.to_string(), frontmatter.line_offset);
        questions.extend(parser.parse(frontmatter.content)?);
    }
    let questions = questions
        .into_iter()
        .zip(1u32..)
        .map(|(q, id)| q.with_id(QuestionId::new(id)))
        .collect();
    Ok(ParsedBank { name, questions })
}

pub struct Parser {
    source_path: String,
    line_offset: usize,
}

#[derive(Debug)]
pub struct ParserError {
    pub message: String,
    pub source_path: String,
    pub line_num: usize,
}

impl ParserError {
    fn new(message: impl Into<String>, source_path: String, line_num: usize) -> Self {
        ParserError {
            message: message.into(),
            source_path,
            line_num,
        }
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Location: {}:{}",
            self.message,
            self.source_path,
            self.line_num + 1
        )
    }
}

impl Error for ParserError {}

/// Which multi-line field untagged lines are appended to.
#[derive(Clone, Copy, PartialEq)]
enum OpenField {
    Question,
    Explanation,
    /// A single-line field: only blank lines may follow.
    None,
}

/// A question being read.
struct Draft {
    question_type: QuestionType,
    text: String,
    options: Vec<String>,
    parts: Vec<String>,
    answer: Option<String>,
    explanation: Option<String>,
    image: Option<String>,
    audio: Option<String>,
    start_line: usize,
}

impl Draft {
    fn new(question_type: QuestionType, text: String, start_line: usize) -> Self {
        Self {
            question_type,
            text,
            options: Vec::new(),
            parts: Vec::new(),
            answer: None,
            explanation: None,
            image: None,
            audio: None,
            start_line,
        }
    }
}

enum State {
    /// Between questions.
    Initial,
    /// Reading a question.
    Reading { draft: Draft, open: OpenField },
}

enum Line {
    /// `MC: <text>`, `F: <text>` or `R: <text>`.
    Start(QuestionType, String),
    /// `O: <option>`.
    Option(String),
    /// `P: <part> | <part> | ...`.
    Parts(Vec<String>),
    /// `A: <answer>`.
    Answer(String),
    /// `E: <explanation>`.
    Explanation(String),
    /// `IMG: <path or URL>`.
    Image(String),
    /// `AUDIO: <path or URL>`.
    Audio(String),
    /// A line that's just `---`.
    Separator,
    /// Any other line.
    Text(String),
}

const TAGS: [&str; 9] = ["MC:", "F:", "R:", "O:", "P:", "A:", "E:", "IMG:", "AUDIO:"];

impl Line {
    fn read(line: &str) -> Self {
        if line.trim() == "---" {
            return Line::Separator;
        }
        for tag in TAGS {
            if let Some(rest) = line.strip_prefix(tag) {
                let rest = rest.trim().to_string();
                return match tag {
                    "MC:" => Line::Start(QuestionType::MultipleChoice, rest),
                    "F:" => Line::Start(QuestionType::FillInBlank, rest),
                    "R:" => Line::Start(QuestionType::Rearrange, rest),
                    "O:" => Line::Option(rest),
                    "P:" => Line::Parts(split_parts(&rest)),
                    "A:" => Line::Answer(rest),
                    "E:" => Line::Explanation(rest),
                    "IMG:" => Line::Image(rest),
                    _ => Line::Audio(rest),
                };
            }
        }
        Line::Text(line.to_string())
    }

    fn tag_name(&self) -> &'static str {
        match self {
            Line::Start(..) => "question",
            Line::Option(_) => "option",
            Line::Parts(_) => "parts",
            Line::Answer(_) => "answer",
            Line::Explanation(_) => "explanation",
            Line::Image(_) => "image",
            Line::Audio(_) => "audio",
            Line::Separator => "separator",
            Line::Text(_) => "text",
        }
    }
}

fn split_parts(text: &str) -> Vec<String> {
    text.split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl Parser {
    pub fn new(source_path: String, line_offset: usize) -> Self {
        Parser {
            source_path,
            line_offset,
        }
    }

    /// Parse all the questions in the given text. Questions are numbered from
    /// 1 in the order they appear.
    pub fn parse(&self, text: &str) -> Result<Vec<Question>, ParserError> {
        let mut questions = Vec::new();
        let mut state = State::Initial;
        let lines: Vec<&str> = text.lines().collect();
        for (line_num, line) in lines.iter().enumerate() {
            let line = Line::read(line);
            state = self.parse_line(state, line, line_num + self.line_offset, &mut questions)?;
        }
        if let State::Reading { draft, .. } = state {
            questions.push(self.build(draft)?);
        }
        Ok(questions
            .into_iter()
            .zip(1u32..)
            .map(|(q, id)| q.with_id(QuestionId::new(id)))
            .collect())
    }

    fn error(&self, message: impl Into<String>, line_num: usize) -> ParserError {
        ParserError::new(message, self.source_path.clone(), line_num)
    }

    fn parse_line(
        &self,
        state: State,
        line: Line,
        line_num: usize,
        questions: &mut Vec<Question>,
    ) -> Result<State, ParserError> {
        match state {
            State::Initial => match line {
                Line::Start(question_type, text) => Ok(State::Reading {
                    draft: Draft::new(question_type, text, line_num),
                    open: OpenField::Question,
                }),
                Line::Separator | Line::Text(_) => Ok(State::Initial),
                other => Err(self.error(
                    format!("Found {} tag outside of a question.", other.tag_name()),
                    line_num,
                )),
            },
            State::Reading { mut draft, open } => match line {
                Line::Start(question_type, text) => {
                    questions.push(self.build(draft)?);
                    Ok(State::Reading {
                        draft: Draft::new(question_type, text, line_num),
                        open: OpenField::Question,
                    })
                }
                Line::Separator => {
                    questions.push(self.build(draft)?);
                    Ok(State::Initial)
                }
                Line::Option(option) => {
                    if draft.question_type != QuestionType::MultipleChoice {
                        return Err(self.error(
                            "Found option tag on a question that is not multiple choice.",
                            line_num,
                        ));
                    }
                    if option.is_empty() {
                        return Err(self.error("Found an empty option.", line_num));
                    }
                    draft.options.push(option);
                    Ok(State::Reading {
                        draft,
                        open: OpenField::None,
                    })
                }
                Line::Parts(parts) => {
                    if draft.question_type != QuestionType::Rearrange {
                        return Err(self.error(
                            "Found parts tag on a question that is not a rearrange question.",
                            line_num,
                        ));
                    }
                    draft.parts.extend(parts);
                    Ok(State::Reading {
                        draft,
                        open: OpenField::None,
                    })
                }
                Line::Answer(answer) => {
                    if draft.answer.is_some() {
                        return Err(self.error("Found answer tag while reading an answer.", line_num));
                    }
                    draft.answer = Some(answer);
                    Ok(State::Reading {
                        draft,
                        open: OpenField::None,
                    })
                }
                Line::Explanation(text) => {
                    if draft.explanation.is_some() {
                        return Err(self.error("Found a second explanation tag.", line_num));
                    }
                    draft.explanation = Some(text);
                    Ok(State::Reading {
                        draft,
                        open: OpenField::Explanation,
                    })
                }
                Line::Image(path) => {
                    if draft.image.is_some() {
                        return Err(self.error("Found a second image tag.", line_num));
                    }
                    draft.image = Some(path);
                    Ok(State::Reading {
                        draft,
                        open: OpenField::None,
                    })
                }
                Line::Audio(path) => {
                    if draft.audio.is_some() {
                        return Err(self.error("Found a second audio tag.", line_num));
                    }
                    draft.audio = Some(path);
                    Ok(State::Reading {
                        draft,
                        open: OpenField::None,
                    })
                }
                Line::Text(text) => {
                    match open {
                        OpenField::Question => {
                            draft.text = format!("{}\n{text}", draft.text);
                        }
                        OpenField::Explanation => {
                            let explanation = draft.explanation.take().unwrap_or_default();
                            draft.explanation = Some(format!("{explanation}\n{text}"));
                        }
                        OpenField::None => {
                            if !text.trim().is_empty() {
                                return Err(self.error(
                                    "Found text after a single-line field.",
                                    line_num,
                                ));
                            }
                        }
                    }
                    Ok(State::Reading { draft, open })
                }
            },
        }
    }

    /// Turn a finished draft into a question.
    fn build(&self, draft: Draft) -> Result<Question, ParserError> {
        let Some(answer) = draft.answer else {
            return Err(self.error("Question without an answer.", draft.start_line));
        };
        let kind = match draft.question_type {
            QuestionType::MultipleChoice => {
                if draft.options.is_empty() {
                    return Err(self.error(
                        "Multiple-choice question without options.",
                        draft.start_line,
                    ));
                }
                QuestionKind::MultipleChoice {
                    options: draft.options,
                }
            }
            QuestionType::FillInBlank => QuestionKind::FillInBlank,
            QuestionType::Rearrange => {
                if draft.parts.is_empty() {
                    return Err(self.error("Rearrange question without parts.", draft.start_line));
                }
                QuestionKind::Rearrange { parts: draft.parts }
            }
        };
        let question = Question::new(
            QuestionId::new(0),
            kind,
            draft.text.trim().to_string(),
            answer,
        )
        .with_explanation(draft.explanation.unwrap_or_default().trim())
        .with_image(draft.image.filter(|s| !s.is_empty()))
        .with_audio(draft.audio.filter(|s| !s.is_empty()))
        .with_source_path(self.source_path.clone());
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() -> Result<(), ParserError> {
        let questions = make_test_parser().parse("")?;
        assert!(questions.is_empty());
        Ok(())
    }

    #[test]
    fn test_text_outside_questions_is_ignored() -> Result<(), ParserError> {
        let input = "# Unit 3\n\nSome notes.\n---\n";
        let questions = make_test_parser().parse(input)?;
        assert!(questions.is_empty());
        Ok(())
    }

    #[test]
    fn test_multiple_choice() -> Result<(), ParserError> {
        let input = "MC: Which is an animal?\nO: table\nO: cat\nA: cat\nE: Cats are animals.";
        let questions = make_test_parser().parse(input)?;
        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.id(), QuestionId::new(1));
        assert_eq!(q.question_type(), QuestionType::MultipleChoice);
        assert_eq!(q.text(), "Which is an animal?");
        assert_eq!(q.options(), &["table".to_string(), "cat".to_string()]);
        assert_eq!(q.correct_answer(), "cat");
        assert_eq!(q.explanation(), "Cats are animals.");
        assert_eq!(q.source_path(), "test.md");
        Ok(())
    }

    #[test]
    fn test_fill_in_with_media() -> Result<(), ParserError> {
        let input = "F: Look and write.\nA: goes\nIMG: images/bus.png\nAUDIO: https://example.com/a.mp3";
        let questions = make_test_parser().parse(input)?;
        let q = &questions[0];
        assert_eq!(q.question_type(), QuestionType::FillInBlank);
        assert_eq!(q.image(), Some("images/bus.png"));
        assert_eq!(q.audio(), Some("https://example.com/a.mp3"));
        Ok(())
    }

    #[test]
    fn test_rearrange_parts() -> Result<(), ParserError> {
        let input = "R: Order the words.\nP: happy | am\nP: I\nA: I am happy";
        let questions = make_test_parser().parse(input)?;
        assert_eq!(
            questions[0].rearrange_parts(),
            &["happy".to_string(), "am".to_string(), "I".to_string()]
        );
        Ok(())
    }

    #[test]
    fn test_multiline_text_and_explanation() -> Result<(), ParserError> {
        let input = "F: Read:\n\nTom ___ to school.\nA: goes\nE: Third person\nsingular.\n";
        let questions = make_test_parser().parse(input)?;
        assert_eq!(questions[0].text(), "Read:\n\nTom ___ to school.");
        assert_eq!(questions[0].explanation(), "Third person\nsingular.");
        Ok(())
    }

    #[test]
    fn test_questions_are_numbered() -> Result<(), ParserError> {
        let input = "F: one\nA: 1\n---\nF: two\nA: 2\nF: three\nA: 3";
        let questions = make_test_parser().parse(input)?;
        let ids: Vec<u32> = questions.iter().map(|q| q.id().into_inner()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_question_without_answer() {
        let result = make_test_parser().parse("F: Question without answer");
        assert!(result.is_err());
    }

    #[test]
    fn test_answer_outside_question() {
        let err = make_test_parser().parse("A: cat").err().unwrap();
        assert_eq!(err.message, "Found answer tag outside of a question.");
        assert_eq!(err.line_num, 0);
    }

    #[test]
    fn test_two_answers() {
        let result = make_test_parser().parse("F: x\nA: 1\nA: 2");
        assert!(result.is_err());
    }

    #[test]
    fn test_option_on_fill_in() {
        let result = make_test_parser().parse("F: x\nO: a\nA: a");
        assert!(result.is_err());
    }

    #[test]
    fn test_parts_on_multiple_choice() {
        let result = make_test_parser().parse("MC: x\nP: a | b\nA: a b");
        assert!(result.is_err());
    }

    #[test]
    fn test_multiple_choice_without_options() {
        let result = make_test_parser().parse("MC: x\nA: a");
        assert!(result.is_err());
    }

    #[test]
    fn test_rearrange_without_parts() {
        let result = make_test_parser().parse("R: x\nA: a b");
        assert!(result.is_err());
    }

    #[test]
    fn test_text_after_answer() {
        let err = make_test_parser()
            .parse("F: x\nA: a\nstray")
            .err()
            .unwrap();
        assert_eq!(err.line_num, 2);
        assert_eq!(err.to_string(), "Found text after a single-line field. Location: test.md:3");
    }

    #[test]
    fn test_frontmatter() -> Fallible<()> {
        let text = "---\nname = \"Set 07\"\n---\nF: x\nA: a\n";
        let fm = extract_frontmatter(text)?;
        assert_eq!(fm.metadata.name.as_deref(), Some("Set 07"));
        assert_eq!(fm.content, "F: x\nA: a\n");
        assert_eq!(fm.line_offset, 3);
        Ok(())
    }

    #[test]
    fn test_frontmatter_without_closing() {
        assert!(extract_frontmatter("---\nname = \"x\"\n").is_err());
    }

    #[test]
    fn test_leading_separator_is_not_frontmatter() -> Fallible<()> {
        let text = "---\nF: x\nA: a\n---\nname = \"not toml\"\n---\nF: y\nA: b\n";
        let fm = extract_frontmatter(text)?;
        assert!(fm.metadata.name.is_none());
        assert_eq!(fm.content, text);
        assert_eq!(fm.line_offset, 0);
        let bank = parse_bank([("bank.md", text)].into_iter())?;
        assert_eq!(bank.questions.len(), 2);
        assert_eq!(bank.questions[1].text(), "y");
        Ok(())
    }

    #[test]
    fn test_frontmatter_only() -> Fallible<()> {
        let fm = extract_frontmatter("---\nname = \"x\"\n---")?;
        assert_eq!(fm.content, "");
        Ok(())
    }

    #[test]
    fn test_error_lines_account_for_frontmatter() {
        let text = "---\nname = \"x\"\n---\nA: stray";
        let result = parse_bank([("bank.md", text)].into_iter());
        let err = result.err().unwrap();
        assert_eq!(
            err.to_string(),
            "error: Parse error: Found answer tag outside of a question. Location: bank.md:4"
        );
    }

    #[test]
    fn test_parse_bank_numbers_across_files() -> Fallible<()> {
        let a = "---\nname = \"First\"\n---\nF: a\nA: a\n---\nF: b\nA: b";
        let b = "---\nname = \"Second\"\n---\nF: c\nA: c";
        let bank = parse_bank([("a.md", a), ("b.md", b)].into_iter())?;
        assert_eq!(bank.name.as_deref(), Some("First"));
        let ids: Vec<u32> = bank.questions.iter().map(|q| q.id().into_inner()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(bank.questions[2].source_path(), "b.md");
        Ok(())
    }

    fn make_test_parser() -> Parser {
        Parser::new("test.md".to_string(), 0)
    }
}
