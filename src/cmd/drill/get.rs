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

use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;
use quizdrill_core::Hint;
use quizdrill_core::POINTS_PER_CORRECT;
use quizdrill_core::Phase;
use quizdrill_core::Question;
use quizdrill_core::QuestionKind;
use quizdrill_core::UserAnswer;
use quizdrill_core::markdown::markdown_to_html;
use quizdrill_core::normalize;

use crate::cmd::drill::state::MutableState;
use crate::cmd::drill::state::ServerState;
use crate::cmd::drill::template::page_template;
use crate::error::Fallible;
use crate::media::reference::BankMedia;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    match render_page(&state) {
        Ok(markup) => (StatusCode::OK, Html(markup.into_string())),
        Err(e) => {
            log::error!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.to_string()))
        }
    }
}

fn render_page(state: &ServerState) -> Fallible<Markup> {
    let m = state.lock()?;
    let body: Markup = match m.session.phase() {
        Phase::NotStarted => render_start(state, &m),
        Phase::InProgress => match m.session.current() {
            Some(question) => render_question(state, &m, question)?,
            None => render_nothing_to_retry(),
        },
        Phase::Finished => render_results(&m),
    };
    Ok(page_template(&state.bank_name, body))
}

fn render_start(state: &ServerState, m: &MutableState) -> Markup {
    html! {
        div.start {
            h1 { (state.bank_name) }
            p.summary { (m.session.bank().len()) " questions" }
            form action="/" method="post" {
                input type="hidden" name="action" value="Start";
                input #name type="text" name="name" placeholder="Your name" autocomplete="off" required autofocus;
                input #start type="submit" value="Start";
            }
        }
    }
}

fn render_question(state: &ServerState, m: &MutableState, question: &Question) -> Fallible<Markup> {
    let media = BankMedia::new(&state.directory, Path::new(question.source_path()))?;
    let rewriter = |url: &str| media.url(url);
    let text: String = markdown_to_html(question.text(), Some(&rewriter));
    let image: Option<String> = question.image().and_then(|path| media.url(path));
    let audio: Option<String> = question.audio().and_then(|path| media.url(path));
    let answer: Option<&UserAnswer> = m.session.current_answer();
    let explanation: String = markdown_to_html(question.explanation(), Some(&rewriter));
    let summary = m.session.summary();
    let cursor: usize = m.session.cursor();
    let progress_style = format!("width: {}%;", summary.progress_percent());

    let answer_area: Markup = match (question.kind(), answer) {
        (QuestionKind::MultipleChoice { options }, answer) => {
            render_options(m, question, options, answer)
        }
        (QuestionKind::FillInBlank, None) => html! {
            form.answer-form action="/" method="post" {
                input #response type="text" name="response" value=(m.view.draft) placeholder="Type your answer" autocomplete="off" autofocus;
                button #submit type="submit" name="action" value="Submit" { "Submit" }
                button #hint type="submit" name="action" value="Hint" { (hint_label(m)) }
            }
        },
        (QuestionKind::Rearrange { parts }, None) => render_parts(m, parts),
        (QuestionKind::FillInBlank | QuestionKind::Rearrange { .. }, Some(answer)) => html! {
            div.response { "Your answer: " strong { (answer.response) } }
        },
    };
    let hint: Markup = if m.view.show_hint && answer.is_none() {
        match m.hints.get(question.id()) {
            Some(hint) if !hint.is_empty() => html! { div.hint { (hint.to_string()) } },
            _ => html! { div.hint { "No hint available for this question." } },
        }
    } else {
        html! {}
    };
    let feedback: Markup = match answer {
        Some(answer) => html! {
            div.feedback.correct[answer.is_correct].wrong[!answer.is_correct] {
                @if answer.is_correct {
                    p { "Correct! +" (POINTS_PER_CORRECT) " points" }
                } @else {
                    p { "Incorrect. The answer is: " strong { (question.correct_answer()) } }
                }
                @if !question.explanation().is_empty() {
                    div.explanation.rich-text { (PreEscaped(explanation)) }
                }
            }
        },
        None => html! {},
    };
    let is_last: bool = m.session.is_last();
    Ok(html! {
        div.root {
            div.header {
                form.header-action action="/" method="post" {
                    input type="hidden" name="action" value="Prev";
                    input #prev type="submit" value="Prev" disabled[cursor == 0];
                }
                div.progress {
                    div.progress-bar {
                        div.progress-fill style=(progress_style) {}
                    }
                    span.progress-text { "Question " (cursor + 1) " of " (summary.total) }
                }
                span.score { "Score: " (summary.score) }
                form.header-action action="/" method="post" {
                    input type="hidden" name="action" value="Grid";
                    input #grid type="submit" value="Questions";
                }
                form.header-action action="/" method="post" {
                    input type="hidden" name="action" value="Finish";
                    input #end type="submit" value="Finish" title="End the quiz now";
                }
            }
            div.card-container {
                div.card {
                    div.card-header {
                        span.question-type { (question.question_type().label()) }
                    }
                    div.question.rich-text { (PreEscaped(text)) }
                    @if let Some(image) = image {
                        img.question-image src=(image) alt="";
                    }
                    @if let Some(audio) = audio {
                        audio.question-audio controls src=(audio) {}
                    }
                    (answer_area)
                    (hint)
                    (feedback)
                }
            }
            div.controls {
                form action="/" method="post" {
                    @if answer.is_none() && !is_last {
                        button #skip type="submit" name="action" value="Skip" { "Skip" }
                    }
                    @if is_last {
                        button #finish type="submit" name="action" value="Finish" { "Finish" }
                    } @else {
                        button #next type="submit" name="action" value="Next" { "Next" }
                    }
                }
            }
            @if m.view.show_grid {
                (render_grid(m))
            }
        }
    })
}

fn render_options(
    m: &MutableState,
    question: &Question,
    options: &[String],
    answer: Option<&UserAnswer>,
) -> Markup {
    let eliminated: Option<&str> = match m.hints.get(question.id()) {
        Some(Hint::Eliminate(option)) if m.view.show_hint => Some(option.as_str()),
        _ => None,
    };
    let correct: String = normalize(question.correct_answer());
    match answer {
        Some(answer) => html! {
            div.options {
                @for option in options {
                    @let is_correct = normalize(option) == correct;
                    @let is_chosen = *option == answer.response;
                    div.option.correct[is_correct].wrong[is_chosen && !is_correct] { (option) }
                }
            }
        },
        None => html! {
            div.options {
                @for option in options {
                    form action="/" method="post" {
                        input type="hidden" name="action" value="Submit";
                        button.option type="submit" name="response" value=(option) disabled[eliminated == Some(option.as_str())] {
                            (option)
                        }
                    }
                }
            }
            (hint_button(m))
        },
    }
}

fn render_parts(m: &MutableState, parts: &[String]) -> Markup {
    let selected: &[usize] = &m.view.selected_parts;
    html! {
        div.rearrange {
            div.selected {
                @for i in selected {
                    @if let Some(part) = parts.get(*i) {
                        form action="/" method="post" {
                            input type="hidden" name="action" value="Unpick";
                            input type="hidden" name="part" value=(i);
                            button.part.picked type="submit" { (part) }
                        }
                    }
                }
                @if selected.is_empty() {
                    span.placeholder { "Pick the parts in order." }
                }
            }
            div.parts {
                @for (i, part) in parts.iter().enumerate() {
                    @if !selected.contains(&i) {
                        form action="/" method="post" {
                            input type="hidden" name="action" value="Pick";
                            input type="hidden" name="part" value=(i);
                            button.part type="submit" { (part) }
                        }
                    }
                }
            }
            form action="/" method="post" {
                input type="hidden" name="action" value="Submit";
                button #submit type="submit" disabled[selected.is_empty()] { "Submit" }
            }
        }
        (hint_button(m))
    }
}

fn hint_button(m: &MutableState) -> Markup {
    html! {
        form.hint-form action="/" method="post" {
            input type="hidden" name="action" value="Hint";
            button #hint type="submit" { (hint_label(m)) }
        }
    }
}

fn hint_label(m: &MutableState) -> &'static str {
    if m.view.show_hint { "Hide hint" } else { "Hint" }
}

/// The question list modal. Questions keep their bank numbers, so a retry
/// pass shows which ones are being retried.
fn render_grid(m: &MutableState) -> Markup {
    let cursor: usize = m.session.cursor();
    html! {
        div.grid-modal {
            div.grid {
                h2 { "Questions" }
                div.grid-items {
                    @for (i, question) in m.session.active_questions().iter().enumerate() {
                        @let answer = m.session.answer_for(question.id());
                        form action="/" method="post" {
                            input type="hidden" name="action" value="Jump";
                            input type="hidden" name="index" value=(i);
                            button.grid-item.current[i == cursor]
                                .correct[answer.is_some_and(|a| a.is_correct)]
                                .wrong[answer.is_some_and(|a| !a.is_correct)]
                                type="submit" { (question.id().to_string()) }
                        }
                    }
                }
                form action="/" method="post" {
                    input type="hidden" name="action" value="CloseGrid";
                    input #close-grid type="submit" value="Close";
                }
            }
        }
    }
}

/// Shown when a retry of the wrong answers has nothing in it.
fn render_nothing_to_retry() -> Markup {
    html! {
        div.finished {
            h1 { "Nothing to retry" }
            p.summary { "Every question in the last round was answered correctly." }
            div.retry {
                form action="/" method="post" {
                    input type="hidden" name="action" value="RetryAll";
                    input #retry-all type="submit" value="Retry all";
                }
                form action="/" method="post" {
                    input type="hidden" name="action" value="Finish";
                    input #finish type="submit" value="Finish";
                }
            }
        }
    }
}

fn render_results(m: &MutableState) -> Markup {
    let summary = m.session.summary();
    let player: &str = m.session.player().unwrap_or("Player");
    let no_wrong_answers: bool = m.session.partition().wrong.is_empty();
    let started: String = m.started_at.map(|t| t.pretty()).unwrap_or_default();
    let finished: String = m.finished_at.map(|t| t.pretty()).unwrap_or_default();
    let duration: i64 = match (m.started_at, m.finished_at) {
        (Some(started), Some(finished)) => finished.seconds_since(started),
        _ => 0,
    };
    html! {
        div.finished {
            h1 { "Quiz Completed" }
            div.summary {
                (player) ", you scored " (summary.score) " out of " (summary.max_score) "."
            }
            h2 { "Results" }
            div.stats {
                table {
                    tbody {
                        tr { td.key { "Questions" } td.val { (summary.total) } }
                        tr { td.key { "Correct" } td.val { (summary.correct) } }
                        tr { td.key { "Wrong" } td.val { (summary.wrong) } }
                        tr { td.key { "Unanswered" } td.val { (summary.unanswered) } }
                        tr { td.key { "Started" } td.val { (started) } }
                        tr { td.key { "Finished" } td.val { (finished) } }
                        tr { td.key { "Duration (seconds)" } td.val { (duration) } }
                    }
                }
            }
            h2 { "Answers" }
            table.answers {
                thead {
                    tr { th { "#" } th { "Question" } th { "Your answer" } th { "Correct answer" } }
                }
                tbody {
                    @for (i, question) in m.session.active_questions().iter().enumerate() {
                        @let answer = m.session.answer_for(question.id());
                        tr.correct[answer.is_some_and(|a| a.is_correct)]
                          .wrong[answer.is_some_and(|a| !a.is_correct)] {
                            td { (i + 1) }
                            td { (question.text()) }
                            td {
                                @match answer {
                                    Some(answer) => { (answer.response) }
                                    None => { em { "skipped" } }
                                }
                            }
                            td { (question.correct_answer()) }
                        }
                    }
                }
            }
            div.retry {
                form action="/" method="post" {
                    input type="hidden" name="action" value="RetryWrong";
                    input #retry-wrong type="submit" value="Retry wrong answers" disabled[no_wrong_answers];
                }
                form action="/" method="post" {
                    input type="hidden" name="action" value="RetryAll";
                    input #retry-all type="submit" value="Retry all";
                }
            }
            div.shutdown-container {
                form action="/" method="post" {
                    input type="hidden" name="action" value="Shutdown";
                    input #shutdown .shutdown-button type="submit" value="Shutdown" title="Shut down the server";
                }
            }
        }
    }
}
