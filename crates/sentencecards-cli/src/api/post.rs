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

//! Handlers that change the collection.

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde::Serialize;
use sentencecards_core::contract::ReviewRequest;
use sentencecards_core::contract::ReviewResult;
use sentencecards_core::types::timestamp::Timestamp;

use crate::api::response::ApiResult;
use crate::api::response::success;
use crate::api::state::ServerState;
use crate::cmd::show::CardView;
use crate::collection::Edit;
use crate::error::Fallible;
use crate::error::invalid;

fn from_body<T>(body: Result<Json<T>, JsonRejection>) -> Fallible<T> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => invalid(rejection.body_text()),
    }
}

#[derive(Deserialize)]
pub struct NewSentence {
    source: String,
    translation: String,
}

pub async fn create_handler(
    State(state): State<ServerState>,
    body: Result<Json<NewSentence>, JsonRejection>,
) -> ApiResult {
    let body = from_body(body)?;
    let now = Timestamp::now();
    let card = state.coll.add(&body.source, &body.translation, now)?;
    Ok(success(StatusCode::CREATED, CardView::new(card, now)))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SentenceUpdate {
    source: Option<String>,
    translation: Option<String>,
    favorite: Option<bool>,
}

pub async fn update_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<SentenceUpdate>, JsonRejection>,
) -> ApiResult {
    let body = from_body(body)?;
    let id = state.coll.resolve(&id)?;
    let card = state.coll.edit(
        id,
        Edit {
            source: body.source,
            translation: body.translation,
            favorite: body.favorite,
        },
    )?;
    Ok(success(StatusCode::OK, CardView::new(card, Timestamp::now())))
}

#[derive(Serialize)]
struct Deleted {
    deleted: String,
}

pub async fn delete_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = state.coll.resolve(&id)?;
    state.coll.delete(id)?;
    Ok(success(
        StatusCode::OK,
        Deleted {
            deleted: id.to_hex(),
        },
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewResponse {
    success: bool,
    data: CardView,
    sm2_result: ReviewResult,
}

pub async fn review_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult {
    let request = from_body(body)?;
    let id = state.coll.resolve(&id)?;
    let now = Timestamp::now();
    let reviewed = state.coll.review(id, request.quality, now)?;
    let response = ReviewResponse {
        success: true,
        sm2_result: ReviewResult::from(&reviewed),
        data: CardView::new(reviewed.card, now),
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

#[derive(Serialize)]
struct ResetCount {
    reset: usize,
}

pub async fn reset_handler(State(state): State<ServerState>) -> ApiResult {
    let reset = state.coll.reset_all(Timestamp::now())?;
    Ok(success(StatusCode::OK, ResetCount { reset }))
}
