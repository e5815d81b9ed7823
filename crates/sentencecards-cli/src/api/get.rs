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

use axum::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde::Serialize;
use sentencecards_core::stats::Stats;
use sentencecards_core::types::timestamp::Timestamp;

use crate::api::response::ApiError;
use crate::api::response::ApiResult;
use crate::api::response::Pagination;
use crate::api::response::success;
use crate::api::state::ServerState;
use crate::cmd::list::ListQuery;
use crate::cmd::list::query_cards;
use crate::cmd::list::query_due;
use crate::cmd::show::CardView;
use crate::cmd::stats::render_stats;
use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::invalid;

fn from_query<T>(params: Result<Query<T>, QueryRejection>) -> Fallible<T> {
    match params {
        Ok(Query(query)) => Ok(query),
        Err(rejection) => invalid(rejection.body_text()),
    }
}

#[derive(Serialize)]
struct Page {
    success: bool,
    data: Vec<CardView>,
    pagination: Pagination,
}

pub async fn list_handler(
    State(state): State<ServerState>,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult {
    let params = from_query(params)?;
    let now = Timestamp::now();
    let listing = query_cards(&state.coll, &params, now)?;
    let pagination = Pagination {
        page: listing.page,
        limit: listing.limit,
        total: listing.total,
        pages: listing.pages(),
        has_next: listing.page < listing.pages(),
        has_prev: listing.page > 1,
    };
    let data = listing
        .cards
        .into_iter()
        .map(|card| CardView::new(card, now))
        .collect();
    let page = Page {
        success: true,
        data,
        pagination,
    };
    Ok((StatusCode::OK, Json(page)).into_response())
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct DueQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct Due {
    success: bool,
    data: Vec<CardView>,
    count: usize,
}

pub async fn due_handler(
    State(state): State<ServerState>,
    params: Result<Query<DueQuery>, QueryRejection>,
) -> ApiResult {
    let params = from_query(params)?;
    let now = Timestamp::now();
    let data: Vec<CardView> = query_due(&state.coll, params.limit, now)?
        .into_iter()
        .map(|card| CardView::new(card, now))
        .collect();
    let due = Due {
        success: true,
        count: data.len(),
        data,
    };
    Ok((StatusCode::OK, Json(due)).into_response())
}

pub async fn show_handler(State(state): State<ServerState>, Path(id): Path<String>) -> ApiResult {
    let id = state.coll.resolve(&id)?;
    let card = state.coll.card(id)?;
    Ok(success(StatusCode::OK, CardView::new(card, Timestamp::now())))
}

pub async fn stats_handler(State(state): State<ServerState>) -> ApiResult {
    let stats: Stats = state.coll.stats(Timestamp::now())?;
    Ok(success(StatusCode::OK, stats))
}

pub async fn stats_page(State(state): State<ServerState>) -> ApiResult {
    let now = Timestamp::now();
    let stats: Stats = state.coll.stats(now)?;
    Ok(Html(render_stats(&stats, now).into_string()).into_response())
}

pub async fn not_found_handler() -> Response {
    ApiError::from(ErrorReport::with_kind(ErrorKind::NotFound, "no such route.")).into_response()
}
