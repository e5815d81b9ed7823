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

use clap::Args;
use serde::Deserialize;
use sentencecards_core::contract::FormattedInterval;
use sentencecards_core::contract::IntervalUnit;
use sentencecards_core::contract::format_interval;
use sentencecards_core::level::Level;
use sentencecards_core::types::card::Card;
use sentencecards_core::types::timestamp::Timestamp;

use crate::collection::Collection;
use crate::db::CardFilter;
use crate::db::SortBy;
use crate::error::Fallible;

/// Largest page size accepted.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Largest row offset SQLite accepts.
const MAX_OFFSET: usize = i64::MAX as usize;

/// Clamp a requested page and page size to the accepted ranges, returning
/// `(page, limit, offset)`.
pub fn page_window(page: usize, limit: usize) -> (usize, usize, usize) {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = (page - 1).saturating_mul(limit).min(MAX_OFFSET);
    (page, limit, offset)
}

/// Clamp a requested number of due cards, falling back to `default`.
pub fn due_limit(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).clamp(1, MAX_PAGE_LIMIT)
}

/// The due cards, most overdue first.
pub fn query_due(coll: &Collection, limit: Option<usize>, now: Timestamp) -> Fallible<Vec<Card>> {
    let limit = due_limit(limit, coll.config.due_limit);
    coll.db.due_cards(&coll.user, now, limit)
}

/// Filters, ordering and paging for a card listing.
#[derive(Args, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ListQuery {
    /// Only cards at this level.
    #[arg(long)]
    pub level: Option<Level>,
    /// Only favorite cards.
    #[arg(long)]
    pub favorite: bool,
    /// Only cards that are due.
    #[arg(long)]
    pub due: bool,
    #[arg(long, value_enum, default_value_t = SortBy::Newest)]
    pub sort: SortBy,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Page size; defaults to the configured `page_limit`.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// One page of a listing.
pub struct Listing {
    pub cards: Vec<Card>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

impl Listing {
    pub fn pages(&self) -> usize {
        self.total.div_ceil(self.limit)
    }
}

pub fn query_cards(coll: &Collection, query: &ListQuery, now: Timestamp) -> Fallible<Listing> {
    let filter = CardFilter {
        level: query.level,
        favorite: query.favorite,
        due_at: if query.due { Some(now) } else { None },
    };
    let limit = query.limit.unwrap_or(coll.config.page_limit);
    let (page, limit, offset) = page_window(query.page, limit);
    let total = coll.db.count_cards(&coll.user, &filter)?;
    let cards = coll
        .db
        .list_cards(&coll.user, &filter, query.sort, limit, offset)?;
    Ok(Listing {
        cards,
        page,
        limit,
        total,
    })
}

pub fn list_cards(coll: &Collection, query: &ListQuery, now: Timestamp) -> Fallible<()> {
    let listing = query_cards(coll, query, now)?;
    for card in &listing.cards {
        println!("{}", card_line(card, now));
    }
    println!(
        "page {} of {}, {} cards",
        listing.page,
        listing.pages(),
        listing.total
    );
    Ok(())
}

pub fn list_due(coll: &Collection, limit: Option<usize>, now: Timestamp) -> Fallible<()> {
    let cards = query_due(coll, limit, now)?;
    if cards.is_empty() {
        println!("No cards due.");
        return Ok(());
    }
    for card in &cards {
        println!("{}", card_line(card, now));
    }
    Ok(())
}

/// One line summarizing a card.
pub fn card_line(card: &Card, now: Timestamp) -> String {
    let level = card.level();
    let due = if card.is_due(now) {
        "due".to_string()
    } else {
        format!("in {}d", now.days_until(card.scheduling.next_review_at))
    };
    let star = if card.favorite { "*" } else { " " };
    format!(
        "{} {star} {} {:<9} {:>9} {:>6}  {} = {}",
        card.id.short(),
        level.details().emoji,
        level.as_str(),
        interval_text(format_interval(card.scheduling.interval)),
        due,
        card.source,
        card.translation
    )
}

pub(crate) fn interval_text(interval: FormattedInterval) -> String {
    let unit = match interval.unit {
        IntervalUnit::Minutes => "min",
        IntervalUnit::Hours => "h",
        IntervalUnit::Day | IntervalUnit::Days => "d",
    };
    format!("{}{unit}", interval.value)
}
