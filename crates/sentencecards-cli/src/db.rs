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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use clap::ValueEnum;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Deserialize;
use sentencecards_core::level::Level;
use sentencecards_core::sm2::Quality;
use sentencecards_core::sm2::SchedulingState;
use sentencecards_core::types::card::Card;
use sentencecards_core::types::card::source_key;
use sentencecards_core::types::card_id::CardId;
use sentencecards_core::types::card_id::UserId;
use sentencecards_core::types::history::HistoryEntry;
use sentencecards_core::types::history::MAX_HISTORY_ENTRIES;
use sentencecards_core::types::history::ReviewHistory;
use sentencecards_core::types::timestamp::Timestamp;

use crate::error::Fallible;

const CARD_COLUMNS: &str = "card_id, owner, source, translation, interval_days, ease_factor, repetitions, next_review_at, review_count, correct_count, wrong_count, favorite, last_reviewed_at, created_at";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Which cards a listing includes.
#[derive(Clone, Debug, Default)]
pub struct CardFilter {
    pub level: Option<Level>,
    pub favorite: bool,
    /// Only cards due at this instant.
    pub due_at: Option<Timestamp>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Soonest due first.
    NextReview,
    /// Longest interval first.
    Interval,
    /// Alphabetically by sentence.
    Source,
    /// Most recently added first.
    #[default]
    Newest,
}

impl SortBy {
    fn order_by(self) -> &'static str {
        match self {
            SortBy::NextReview => "next_review_at asc",
            SortBy::Interval => "interval_days desc",
            SortBy::Source => "source asc",
            SortBy::Newest => "created_at desc",
        }
    }
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Add a new card to the database.
    pub fn insert_card(&self, card: &Card) -> Fallible<()> {
        log::debug!("Adding new card: {}", card.id.short());
        let conn = self.acquire();
        let sql = format!(
            "insert into cards ({CARD_COLUMNS}, source_key) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);"
        );
        let s = &card.scheduling;
        conn.execute(
            &sql,
            (
                card.id,
                &card.owner,
                &card.source,
                &card.translation,
                s.interval,
                s.ease_factor,
                s.repetitions,
                s.next_review_at,
                card.review_count,
                card.correct_count,
                card.wrong_count,
                card.favorite,
                card.last_reviewed_at,
                card.created_at,
                card.source_key(),
            ),
        )?;
        Ok(())
    }

    /// Get a card, with its review history. Cards owned by someone else are
    /// reported as missing.
    pub fn get_card(&self, owner: &UserId, id: CardId) -> Fallible<Option<Card>> {
        let conn = self.acquire();
        let sql = format!("select {CARD_COLUMNS} from cards where card_id = ? and owner = ?;");
        let card: Option<Card> = conn
            .query_row(&sql, (id, owner), card_from_row)
            .optional()?;
        match card {
            Some(mut card) => {
                card.history = load_history(&conn, id)?;
                Ok(Some(card))
            }
            None => Ok(None),
        }
    }

    /// Find the card whose sentence matches `source_key` case-insensitively.
    pub fn find_by_source_key(&self, owner: &UserId, source_key: &str) -> Fallible<Option<CardId>> {
        let conn = self.acquire();
        let sql = "select card_id from cards where owner = ? and source_key = ?;";
        let id: Option<CardId> = conn
            .query_row(sql, (owner, source_key), |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    /// List cards matching a filter. Histories are not loaded.
    pub fn list_cards(
        &self,
        owner: &UserId,
        filter: &CardFilter,
        sort: SortBy,
        limit: usize,
        offset: usize,
    ) -> Fallible<Vec<Card>> {
        let (clause, mut params) = where_clause(owner, filter);
        let sql = format!(
            "select {CARD_COLUMNS} from cards where {clause} order by {} limit ? offset ?;",
            sort.order_by()
        );
        params.push(sql_count(limit));
        params.push(sql_count(offset));
        self.query_cards(&sql, params)
    }

    pub fn count_cards(&self, owner: &UserId, filter: &CardFilter) -> Fallible<usize> {
        let (clause, params) = where_clause(owner, filter);
        let sql = format!("select count(*) from cards where {clause};");
        let conn = self.acquire();
        let count: i64 = conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Cards due at `now`, most overdue first and harder cards before easier
    /// ones.
    pub fn due_cards(&self, owner: &UserId, now: Timestamp, limit: usize) -> Fallible<Vec<Card>> {
        let sql = format!(
            "select {CARD_COLUMNS} from cards where owner = ? and next_review_at <= ? order by next_review_at asc, ease_factor asc limit ?;"
        );
        let params = vec![
            Value::Text(owner.to_string()),
            Value::Text(now.to_rfc3339()),
            sql_count(limit),
        ];
        self.query_cards(&sql, params)
    }

    /// Every card a user owns. Histories are not loaded.
    pub fn all_cards(&self, owner: &UserId) -> Fallible<Vec<Card>> {
        let sql = format!("select {CARD_COLUMNS} from cards where owner = ? order by created_at asc;");
        self.query_cards(&sql, vec![Value::Text(owner.to_string())])
    }

    /// Every card a user owns, with review histories.
    pub fn all_cards_with_history(&self, owner: &UserId) -> Fallible<Vec<Card>> {
        let mut cards = self.all_cards(owner)?;
        let conn = self.acquire();
        for card in cards.iter_mut() {
            card.history = load_history(&conn, card.id)?;
        }
        Ok(cards)
    }

    /// Persist a review.
    ///
    /// The update only applies if the stored card still has the review count
    /// `previous` was read with. Returns `false` if another review got there
    /// first, in which case nothing is written.
    pub fn save_review(&self, previous: &Card, next: &Card, entry: &HistoryEntry) -> Fallible<bool> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let s = &next.scheduling;
        let sql = "update cards set interval_days = ?, ease_factor = ?, repetitions = ?, next_review_at = ?, review_count = ?, correct_count = ?, wrong_count = ?, last_reviewed_at = ? where card_id = ? and owner = ? and review_count = ?;";
        let changed = tx.execute(
            sql,
            (
                s.interval,
                s.ease_factor,
                s.repetitions,
                s.next_review_at,
                next.review_count,
                next.correct_count,
                next.wrong_count,
                next.last_reviewed_at,
                next.id,
                &next.owner,
                previous.review_count,
            ),
        )?;
        if changed == 0 {
            log::debug!("Lost review race for card {}", next.id.short());
            return Ok(false);
        }
        insert_history_entry(&tx, next.id, entry)?;
        trim_history(&tx, next.id)?;
        tx.commit()?;
        Ok(true)
    }

    pub fn update_content(
        &self,
        owner: &UserId,
        id: CardId,
        source: &str,
        translation: &str,
    ) -> Fallible<bool> {
        let conn = self.acquire();
        let sql = "update cards set source = ?, source_key = ?, translation = ? where card_id = ? and owner = ?;";
        let changed = conn.execute(sql, (source, source_key(source), translation, id, owner))?;
        Ok(changed > 0)
    }

    pub fn set_favorite(&self, owner: &UserId, id: CardId, favorite: bool) -> Fallible<bool> {
        let conn = self.acquire();
        let sql = "update cards set favorite = ? where card_id = ? and owner = ?;";
        let changed = conn.execute(sql, (favorite, id, owner))?;
        Ok(changed > 0)
    }

    pub fn delete_card(&self, owner: &UserId, id: CardId) -> Fallible<bool> {
        let conn = self.acquire();
        let sql = "delete from cards where card_id = ? and owner = ?;";
        let changed = conn.execute(sql, (id, owner))?;
        Ok(changed > 0)
    }

    /// Write a card's reset scheduling state and clear its history.
    pub fn save_reset(&self, card: &Card) -> Fallible<()> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        write_reset(&tx, card)?;
        tx.commit()?;
        Ok(())
    }

    /// Reset every card a user owns. Returns how many were reset.
    pub fn save_reset_all(&self, cards: &[Card]) -> Fallible<usize> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        for card in cards {
            write_reset(&tx, card)?;
        }
        tx.commit()?;
        Ok(cards.len())
    }

    fn query_cards(&self, sql: &str, params: Vec<Value>) -> Fallible<Vec<Card>> {
        let conn = self.acquire();
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(card_from_row(row)?);
        }
        Ok(cards)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A row count or offset as a SQL integer. Never negative, since SQLite reads
/// a negative limit as "no limit".
fn sql_count(n: usize) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

fn where_clause(owner: &UserId, filter: &CardFilter) -> (String, Vec<Value>) {
    let mut clauses = vec!["owner = ?".to_string()];
    let mut params = vec![Value::Text(owner.to_string())];
    if let Some(level) = filter.level {
        let (lower, upper) = level.interval_bounds();
        clauses.push("interval_days >= ?".to_string());
        params.push(Value::Real(lower));
        if let Some(upper) = upper {
            clauses.push("interval_days < ?".to_string());
            params.push(Value::Real(upper));
        }
    }
    if filter.favorite {
        clauses.push("favorite = 1".to_string());
    }
    if let Some(now) = filter.due_at {
        clauses.push("next_review_at <= ?".to_string());
        params.push(Value::Text(now.to_rfc3339()));
    }
    (clauses.join(" and "), params)
}

fn card_from_row(row: &Row) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        owner: row.get(1)?,
        source: row.get(2)?,
        translation: row.get(3)?,
        scheduling: SchedulingState {
            interval: row.get(4)?,
            ease_factor: row.get(5)?,
            repetitions: row.get(6)?,
            next_review_at: row.get(7)?,
        },
        review_count: row.get(8)?,
        correct_count: row.get(9)?,
        wrong_count: row.get(10)?,
        history: ReviewHistory::new(),
        favorite: row.get(11)?,
        last_reviewed_at: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn load_history(conn: &Connection, id: CardId) -> Fallible<ReviewHistory> {
    let sql = "select reviewed_at, quality, interval_before, interval_after from review_history where card_id = ? order by entry_id asc;";
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([id])?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        let quality: i64 = row.get(1)?;
        entries.push(HistoryEntry {
            date: row.get(0)?,
            quality: Quality::try_from(quality)?,
            interval_before: row.get(2)?,
            interval_after: row.get(3)?,
        });
    }
    Ok(entries.into_iter().collect())
}

fn insert_history_entry(tx: &Transaction, id: CardId, entry: &HistoryEntry) -> Fallible<()> {
    let sql = "insert into review_history (card_id, reviewed_at, quality, interval_before, interval_after) values (?, ?, ?, ?, ?);";
    tx.execute(
        sql,
        (
            id,
            entry.date,
            entry.quality.as_i64(),
            entry.interval_before,
            entry.interval_after,
        ),
    )?;
    Ok(())
}

fn trim_history(tx: &Transaction, id: CardId) -> Fallible<()> {
    let sql = "delete from review_history where card_id = ? and entry_id not in (select entry_id from review_history where card_id = ? order by entry_id desc limit ?);";
    tx.execute(sql, (id, id, MAX_HISTORY_ENTRIES as i64))?;
    Ok(())
}

fn write_reset(tx: &Transaction, card: &Card) -> Fallible<()> {
    let s = &card.scheduling;
    let sql = "update cards set interval_days = ?, ease_factor = ?, repetitions = ?, next_review_at = ?, review_count = 0, correct_count = 0, wrong_count = 0, last_reviewed_at = null where card_id = ? and owner = ?;";
    tx.execute(
        sql,
        (
            s.interval,
            s.ease_factor,
            s.repetitions,
            s.next_review_at,
            card.id,
            &card.owner,
        ),
    )?;
    tx.execute("delete from review_history where card_id = ?;", [card.id])?;
    Ok(())
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use sentencecards_core::review::apply_review;
    use sentencecards_core::review::reset;
    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;
    use crate::error::ErrorReport;

    fn now() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 8, 1, 7, 0, 0).unwrap())
    }

    fn open() -> Fallible<(TempDir, Database)> {
        let dir = tempdir()?;
        let path = dir.path().join("test.db");
        let db = Database::new(path.to_str().ok_or_else(|| ErrorReport::new("invalid path"))?)?;
        Ok((dir, db))
    }

    fn anna() -> UserId {
        UserId::new("anna")
    }

    #[test]
    fn test_sql_count_is_never_negative() {
        assert_eq!(sql_count(20), Value::Integer(20));
        assert_eq!(sql_count(usize::MAX), Value::Integer(i64::MAX));
    }

    #[test]
    fn test_reopen_keeps_schema() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("test.db");
        let path = path.to_str().ok_or_else(|| ErrorReport::new("invalid path"))?;
        let card = Card::new(anna(), "Hallo", "Hello", now());
        Database::new(path)?.insert_card(&card)?;
        let db = Database::new(path)?;
        assert_eq!(db.get_card(&anna(), card.id)?, Some(card));
        Ok(())
    }

    #[test]
    fn test_cards_are_scoped_to_owner() -> Fallible<()> {
        let (_dir, db) = open()?;
        let card = Card::new(anna(), "Hallo", "Hello", now());
        db.insert_card(&card)?;
        let ben = UserId::new("ben");
        assert!(db.get_card(&ben, card.id)?.is_none());
        assert!(!db.delete_card(&ben, card.id)?);
        assert!(db.all_cards(&ben)?.is_empty());
        assert_eq!(db.all_cards(&anna())?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_source_is_rejected() -> Fallible<()> {
        let (_dir, db) = open()?;
        let card = Card::new(anna(), "Guten Tag", "Good day", now());
        db.insert_card(&card)?;
        assert_eq!(db.find_by_source_key(&anna(), "guten tag")?, Some(card.id));
        let dup = Card::new(anna(), "GUTEN TAG ", "Good day", now().plus_minutes(1));
        assert!(db.insert_card(&dup).is_err());
        Ok(())
    }

    #[test]
    fn test_save_review_and_history() -> Fallible<()> {
        let (_dir, db) = open()?;
        let card = Card::new(anna(), "Tschüss", "Bye", now());
        db.insert_card(&card)?;
        let reviewed = apply_review(&card, 3, now())?;
        assert!(db.save_review(&card, &reviewed.card, &reviewed.entry)?);
        let stored = db.get_card(&anna(), card.id)?.ok_or_else(|| ErrorReport::new("missing"))?;
        assert_eq!(stored, reviewed.card);
        assert_eq!(stored.history.len(), 1);
        Ok(())
    }

    #[test]
    fn test_stale_review_is_not_written() -> Fallible<()> {
        let (_dir, db) = open()?;
        let card = Card::new(anna(), "Bitte", "Please", now());
        db.insert_card(&card)?;
        let first = apply_review(&card, 3, now())?;
        let second = apply_review(&card, 0, now())?;
        assert!(db.save_review(&card, &first.card, &first.entry)?);
        assert!(!db.save_review(&card, &second.card, &second.entry)?);
        let stored = db.get_card(&anna(), card.id)?.ok_or_else(|| ErrorReport::new("missing"))?;
        assert_eq!(stored.scheduling, first.card.scheduling);
        assert_eq!(stored.history.len(), 1);
        Ok(())
    }

    #[test]
    fn test_history_is_trimmed() -> Fallible<()> {
        let (_dir, db) = open()?;
        let mut card = Card::new(anna(), "Ja", "Yes", now());
        db.insert_card(&card)?;
        for i in 0..(MAX_HISTORY_ENTRIES + 3) {
            let reviewed = apply_review(&card, 2, now().plus_minutes(i as i64))?;
            assert!(db.save_review(&card, &reviewed.card, &reviewed.entry)?);
            card = reviewed.card;
        }
        let stored = db.get_card(&anna(), card.id)?.ok_or_else(|| ErrorReport::new("missing"))?;
        assert_eq!(stored.history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(stored.history, card.history);
        Ok(())
    }

    #[test]
    fn test_filters_and_sorting() -> Fallible<()> {
        let (_dir, db) = open()?;
        let a = Card::new(anna(), "a", "A", now());
        let b = Card::new(anna(), "b", "B", now().plus_minutes(1));
        let c = Card::new(anna(), "c", "C", now().plus_minutes(2));
        for card in [&a, &b, &c] {
            db.insert_card(card)?;
        }
        // b becomes "learning" and is no longer due.
        let reviewed = apply_review(&b, 3, now())?;
        db.save_review(&b, &reviewed.card, &reviewed.entry)?;
        db.set_favorite(&anna(), c.id, true)?;

        let all = CardFilter::default();
        let ids = |cards: Vec<Card>| cards.into_iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(db.list_cards(&anna(), &all, SortBy::Newest, 10, 0)?), vec![c.id, b.id, a.id]);
        assert_eq!(ids(db.list_cards(&anna(), &all, SortBy::Source, 2, 1)?), vec![b.id, c.id]);
        assert_eq!(ids(db.list_cards(&anna(), &all, SortBy::Interval, 1, 0)?), vec![b.id]);

        let learning = CardFilter {
            level: Some(Level::Learning),
            ..CardFilter::default()
        };
        assert_eq!(ids(db.list_cards(&anna(), &learning, SortBy::Newest, 10, 0)?), vec![b.id]);
        let favorites = CardFilter {
            favorite: true,
            ..CardFilter::default()
        };
        assert_eq!(db.count_cards(&anna(), &favorites)?, 1);
        let due = CardFilter {
            due_at: Some(now().plus_minutes(5)),
            ..CardFilter::default()
        };
        assert_eq!(db.count_cards(&anna(), &due)?, 2);
        assert_eq!(db.count_cards(&anna(), &all)?, 3);
        Ok(())
    }

    #[test]
    fn test_due_cards_order() -> Fallible<()> {
        let (_dir, db) = open()?;
        let early = Card::new(anna(), "früh", "early", now());
        let late = Card::new(anna(), "spät", "late", now().plus_minutes(30));
        let future = Card::new(anna(), "morgen", "tomorrow", now().plus_days(1.0));
        for card in [&late, &future, &early] {
            db.insert_card(card)?;
        }
        let due = db.due_cards(&anna(), now().plus_minutes(60), 10)?;
        assert_eq!(due.iter().map(|c| c.id).collect::<Vec<_>>(), vec![early.id, late.id]);
        assert_eq!(db.due_cards(&anna(), now().plus_minutes(60), 1)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_edit_favorite_delete() -> Fallible<()> {
        let (_dir, db) = open()?;
        let card = Card::new(anna(), "Haus", "House", now());
        db.insert_card(&card)?;
        assert!(db.update_content(&anna(), card.id, "Das Haus", "The house")?);
        assert!(db.set_favorite(&anna(), card.id, true)?);
        let stored = db.get_card(&anna(), card.id)?.ok_or_else(|| ErrorReport::new("missing"))?;
        assert_eq!(stored.source, "Das Haus");
        assert!(stored.favorite);
        assert_eq!(db.find_by_source_key(&anna(), "das haus")?, Some(card.id));
        assert!(db.delete_card(&anna(), card.id)?);
        assert!(db.get_card(&anna(), card.id)?.is_none());
        Ok(())
    }

    #[test]
    fn test_reset() -> Fallible<()> {
        let (_dir, db) = open()?;
        let card = Card::new(anna(), "Katze", "Cat", now());
        db.insert_card(&card)?;
        let reviewed = apply_review(&card, 3, now())?;
        db.save_review(&card, &reviewed.card, &reviewed.entry)?;
        let later = now().plus_days(1.0);
        db.save_reset(&reset(&reviewed.card, later))?;
        let stored = db.get_card(&anna(), card.id)?.ok_or_else(|| ErrorReport::new("missing"))?;
        assert_eq!(stored.scheduling, SchedulingState::initial(later));
        assert_eq!(stored.review_count, 0);
        assert!(stored.history.is_empty());
        Ok(())
    }
}
