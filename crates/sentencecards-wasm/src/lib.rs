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

//! The scheduler, level classifier and statistics for JavaScript callers.
//!
//! Every function takes and returns JSON strings. Failures are reported as
//! `{"error": "..."}`.

use serde::Serialize;
use sentencecards_core::contract::ReviewResult;
use sentencecards_core::level::Level;
use sentencecards_core::review::apply_review;
use sentencecards_core::stats::CardStats;
use sentencecards_core::stats::Stats;
use sentencecards_core::types::card::Card;
use sentencecards_core::types::timestamp::Timestamp;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct Failure {
    error: String,
}

fn respond(result: Result<String, String>) -> String {
    match result {
        Ok(json) => json,
        Err(error) => serde_json::to_string(&Failure { error })
            .unwrap_or_else(|_| String::from("{\"error\":\"unknown error\"}")),
    }
}

fn parse_card(card_json: &str) -> Result<Card, String> {
    serde_json::from_str(card_json).map_err(|e| format!("invalid card: {e}"))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewOutput {
    card: Card,
    sm2_result: ReviewResult,
}

fn review_inner(card_json: &str, quality: i64, now: &str) -> Result<String, String> {
    let card = parse_card(card_json)?;
    let now = Timestamp::parse(now).map_err(|e| e.to_string())?;
    let reviewed = apply_review(&card, quality, now).map_err(|e| e.to_string())?;
    let output = ReviewOutput {
        sm2_result: ReviewResult::from(&reviewed),
        card: reviewed.card,
    };
    to_json(&output)
}

/// Review a card. `now` is an RFC 3339 timestamp. Returns the updated card
/// and the review result.
#[wasm_bindgen]
pub fn review_card(card_json: &str, quality: i32, now: &str) -> String {
    respond(review_inner(card_json, quality as i64, now))
}

/// The level of an interval in days, with its emoji and color.
#[wasm_bindgen]
pub fn classify_interval(interval: f64) -> String {
    respond(to_json(&Level::from_interval(interval).details()))
}

fn card_stats_inner(card_json: &str, now: &str) -> Result<String, String> {
    let card = parse_card(card_json)?;
    let now = Timestamp::parse(now).map_err(|e| e.to_string())?;
    to_json(&CardStats::of(&card, now))
}

#[wasm_bindgen]
pub fn card_stats(card_json: &str, now: &str) -> String {
    respond(card_stats_inner(card_json, now))
}

fn collection_stats_inner(cards_json: &str, now: &str) -> Result<String, String> {
    let cards: Vec<Card> =
        serde_json::from_str(cards_json).map_err(|e| format!("invalid cards: {e}"))?;
    let now = Timestamp::parse(now).map_err(|e| e.to_string())?;
    to_json(&Stats::aggregate(&cards, now))
}

/// Aggregate statistics over a JSON array of cards.
#[wasm_bindgen]
pub fn collection_stats(cards_json: &str, now: &str) -> String {
    respond(collection_stats_inner(cards_json, now))
}
