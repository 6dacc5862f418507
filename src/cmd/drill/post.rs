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


use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use quizdrill_core::Phase;
use quizdrill_core::QuestionKind;
use quizdrill_core::Timestamp;
use serde::Deserialize;

use crate::cmd::drill::state::MutableState;
use crate::cmd::drill::state::ServerState;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Start,
    Submit,
    Pick,
    Unpick,
    Hint,
    Next,
    Prev,
    Skip,
    Jump,
    Grid,
    CloseGrid,
    Finish,
    RetryWrong,
    RetryAll,
    Shutdown,
}

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
    /// The player's name, for `Start`.
    name: Option<String>,
    /// The typed or chosen answer, for `Submit` and `Hint`.
    response: Option<String>,
    /// Index into the rearrange parts, for `Pick` and `Unpick`.
    part: Option<usize>,
    /// Index into the active questions, for `Jump`.
    index: Option<usize>,
}

pub async fn post_handler(State(state): State<ServerState>, Form(form): Form<FormData>) -> Response {
    match action_handler(&state, form) {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => {
            log::error!("{e}");
            (StatusCode::BAD_REQUEST, Html(e.to_string())).into_response()
        }
    }
}

fn action_handler(state: &ServerState, form: FormData) -> Fallible<()> {
    log::debug!("Action: {:?}", form.action);
    if form.action == Action::Shutdown {
        return shutdown(state);
    }
    let mut mutable = state.lock()?;
    let m: &mut MutableState = &mut mutable;
    match form.action {
        Action::Start => {
            let name: String = form.name.unwrap_or_default();
            let name: &str = name.trim();
            if name.is_empty() {
                log::debug!("Ignoring start without a player name");
            } else {
                let questions = m.session.bank().to_vec();
                m.session.start(name, questions);
                m.restarted();
            }
        }
        Action::Submit => submit(m, form.response.unwrap_or_default())?,
        Action::Pick => {
            let part = form.part.ok_or_else(|| ErrorReport::new("Missing part."))?;
            if m.session.current_answer().is_none() {
                if let Some(question) = m.session.current() {
                    m.view.pick(part, question.rearrange_parts().len());
                }
            }
        }
        Action::Unpick => {
            let part = form.part.ok_or_else(|| ErrorReport::new("Missing part."))?;
            m.view.unpick(part);
        }
        Action::Hint => {
            if let Some(response) = form.response {
                m.view.draft = response;
            }
            let MutableState {
                session,
                view,
                hints,
                ..
            } = &mut *m;
            if view.show_hint {
                view.show_hint = false;
            } else if let Some(question) = session.current() {
                hints.get_or_generate(question);
                view.show_hint = true;
            }
        }
        Action::Next => m.session.next(),
        Action::Prev => m.session.prev(),
        Action::Skip => m.session.skip(),
        Action::Jump => {
            let index = form.index.ok_or_else(|| ErrorReport::new("Missing index."))?;
            m.session.jump(index);
            m.sync_view();
            m.view.show_grid = false;
        }
        Action::Grid => m.view.show_grid = true,
        Action::CloseGrid => m.view.show_grid = false,
        Action::Finish => {
            m.session.finish();
            if m.session.phase() == Phase::Finished && m.finished_at.is_none() {
                m.finished_at = Some(Timestamp::now());
            }
        }
        Action::RetryWrong => {
            m.session.retry_wrong()?;
            m.restarted();
        }
        Action::RetryAll => {
            if m.session.phase() == Phase::NotStarted {
                return fail("Cannot restart a quiz that has not started.");
            }
            m.session.retry_all();
            m.restarted();
        }
        Action::Shutdown => {}
    }
    m.sync_view();
    Ok(())
}

/// Answer the current question. Each question is answered at most once
/// through the UI, and empty answers are not submitted.
fn submit(m: &mut MutableState, response: String) -> Fallible<()> {
    let Some(question) = m.session.current() else {
        return fail("There is no question to answer.");
    };
    if m.session.current_answer().is_some() {
        log::debug!("Ignoring new answer to question {}", question.id());
        return Ok(());
    }
    let response: String = match question.kind() {
        QuestionKind::Rearrange { parts } => m.view.assemble(parts),
        QuestionKind::MultipleChoice { .. } | QuestionKind::FillInBlank => response,
    };
    if response.trim().is_empty() {
        log::debug!("Ignoring empty answer to question {}", question.id());
        m.view.draft.clear();
        return Ok(());
    }
    m.session.submit(&response)?;
    Ok(())
}

fn shutdown(state: &ServerState) -> Fallible<()> {
    let sender = state
        .shutdown_tx
        .lock()
        .map_err(|_| ErrorReport::new("Shutdown channel is poisoned."))?
        .take();
    if let Some(sender) = sender {
        let _ = sender.send(());
    }
    Ok(())
}
