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

use std::env::current_dir;
use std::path::PathBuf;

use sentencecards_core::review::Reviewed;
use sentencecards_core::review::apply_review;
use sentencecards_core::review::reset;
use sentencecards_core::stats::Stats;
use sentencecards_core::types::card::Card;
use sentencecards_core::types::card::source_key;
use sentencecards_core::types::card_id::CardId;
use sentencecards_core::types::card_id::UserId;
use sentencecards_core::types::timestamp::Timestamp;

use crate::config::Config;
use crate::db::Database;
use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::error::invalid;

pub const DATABASE_FILE_NAME: &str = "sentencecards.db";

/// Longest sentence or translation accepted, in characters.
pub const MAX_TEXT_LENGTH: usize = 500;

/// A directory holding one database and, optionally, a configuration file.
pub struct Collection {
    pub directory: PathBuf,
    pub db: Database,
    pub config: Config,
    /// The user commands act on behalf of.
    pub user: UserId,
}

/// Changes to a card's content or flags. `None` leaves a field alone.
#[derive(Default)]
pub struct Edit {
    pub source: Option<String>,
    pub translation: Option<String>,
    pub favorite: Option<bool>,
}

impl Collection {
    pub fn new(directory: Option<String>, user: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let config = Config::load(&directory)?;

        let db_path: PathBuf = directory.join(DATABASE_FILE_NAME);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;

        let user = UserId::new(user.unwrap_or_else(|| config.user.clone()));
        log::debug!("Opened collection {} as {user}.", directory.display());

        Ok(Self {
            directory,
            db,
            config,
            user,
        })
    }

    /// Fetch one of the user's cards.
    pub fn card(&self, id: CardId) -> Fallible<Card> {
        match self.db.get_card(&self.user, id)? {
            Some(card) => Ok(card),
            None => Err(ErrorReport::with_kind(
                ErrorKind::NotFound,
                format!("no card with id {id}."),
            )),
        }
    }

    /// Resolve a full card id, or a prefix matching exactly one of the user's
    /// cards.
    pub fn resolve(&self, id: &str) -> Fallible<CardId> {
        let id = id.trim().to_lowercase();
        if id.len() == 64 {
            return Ok(id.parse()?);
        }
        if id.is_empty() {
            return invalid("empty card id.");
        }
        let matches: Vec<CardId> = self
            .db
            .all_cards(&self.user)?
            .into_iter()
            .map(|card| card.id)
            .filter(|card_id| card_id.to_hex().starts_with(&id))
            .collect();
        match matches.as_slice() {
            [only] => Ok(*only),
            [] => Err(ErrorReport::with_kind(
                ErrorKind::NotFound,
                format!("no card with id {id}."),
            )),
            _ => invalid(format!("the id {id} is ambiguous.")),
        }
    }

    /// Add a sentence. Fails if the user already has it, ignoring case.
    pub fn add(&self, source: &str, translation: &str, now: Timestamp) -> Fallible<Card> {
        let (source, translation) = validate_content(source, translation)?;
        if self
            .db
            .find_by_source_key(&self.user, &source_key(&source))?
            .is_some()
        {
            return invalid("this sentence already exists.");
        }
        let card = Card::new(self.user.clone(), source, translation, now);
        self.db.insert_card(&card)?;
        log::info!("Added card {}.", card.id.short());
        Ok(card)
    }

    /// Review a card and persist the result.
    pub fn review(&self, id: CardId, quality: i64, now: Timestamp) -> Fallible<Reviewed> {
        let card = self.card(id)?;
        let reviewed = apply_review(&card, quality, now)?;
        if !self
            .db
            .save_review(&card, &reviewed.card, &reviewed.entry)?
        {
            return Err(ErrorReport::with_kind(
                ErrorKind::Conflict,
                "the card was reviewed concurrently, try again.",
            ));
        }
        log::info!(
            "Reviewed {} as {}: interval {} -> {} days, EF={:.2}, due {}",
            id.short(),
            reviewed.quality,
            reviewed.previous.interval,
            reviewed.card.scheduling.interval,
            reviewed.card.scheduling.ease_factor,
            reviewed.card.scheduling.next_review_at,
        );
        Ok(reviewed)
    }

    pub fn edit(&self, id: CardId, edit: Edit) -> Fallible<Card> {
        let card = self.card(id)?;
        if edit.source.is_some() || edit.translation.is_some() {
            let source = edit.source.unwrap_or_else(|| card.source.clone());
            let translation = edit.translation.unwrap_or_else(|| card.translation.clone());
            let (source, translation) = validate_content(&source, &translation)?;
            if let Some(other) = self.db.find_by_source_key(&self.user, &source_key(&source))? {
                if other != id {
                    return invalid("this sentence already exists.");
                }
            }
            self.db
                .update_content(&self.user, id, &source, &translation)?;
        }
        if let Some(favorite) = edit.favorite {
            self.db.set_favorite(&self.user, id, favorite)?;
        }
        log::info!("Edited card {}.", id.short());
        self.card(id)
    }

    pub fn delete(&self, id: CardId) -> Fallible<()> {
        if !self.db.delete_card(&self.user, id)? {
            return Err(ErrorReport::with_kind(
                ErrorKind::NotFound,
                format!("no card with id {id}."),
            ));
        }
        log::info!("Deleted card {}.", id.short());
        Ok(())
    }

    pub fn reset_card(&self, id: CardId, now: Timestamp) -> Fallible<Card> {
        let card = reset(&self.card(id)?, now);
        self.db.save_reset(&card)?;
        log::info!("Reset card {}.", id.short());
        Ok(card)
    }

    /// Reset every card the user owns. Returns how many there were.
    pub fn reset_all(&self, now: Timestamp) -> Fallible<usize> {
        let cards: Vec<Card> = self
            .db
            .all_cards(&self.user)?
            .iter()
            .map(|card| reset(card, now))
            .collect();
        let count = self.db.save_reset_all(&cards)?;
        log::info!("Reset {count} cards.");
        Ok(count)
    }

    pub fn stats(&self, now: Timestamp) -> Fallible<Stats> {
        let cards = self.db.all_cards(&self.user)?;
        Ok(Stats::aggregate(&cards, now))
    }
}

/// Trimmed sentence and translation, validated.
pub fn validate_content(source: &str, translation: &str) -> Fallible<(String, String)> {
    let source = source.trim();
    let translation = translation.trim();
    for (name, text) in [("sentence", source), ("translation", translation)] {
        if text.is_empty() {
            return invalid(format!("the {name} is required."));
        }
        if text.chars().count() > MAX_TEXT_LENGTH {
            return invalid(format!(
                "the {name} cannot be longer than {MAX_TEXT_LENGTH} characters."
            ));
        }
    }
    Ok((source.to_string(), translation.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use sentencecards_core::level::Level;
    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 9, 1, 20, 0, 0).unwrap())
    }

    fn open() -> Fallible<(TempDir, Collection)> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()), None)?;
        Ok((dir, coll))
    }

    #[test]
    fn test_non_existent_directory() {
        let result = Collection::new(Some("./derpherp".to_string()), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_user_defaults_to_config() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().display().to_string();
        let coll = Collection::new(Some(path.clone()), None)?;
        assert_eq!(coll.user, UserId::new("local"));
        assert!(dir.path().join(DATABASE_FILE_NAME).exists());
        let coll = Collection::new(Some(path), Some("anna".to_string()))?;
        assert_eq!(coll.user, UserId::new("anna"));
        Ok(())
    }

    #[test]
    fn test_unknown_card() -> Fallible<()> {
        let (_dir, coll) = open()?;
        let missing = CardId::from_hex("0000000000000000000000000000000000000000000000000000000000000000")?;
        let err = coll.card(missing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(coll.delete(missing).unwrap_err().kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[test]
    fn test_resolve_prefix() -> Fallible<()> {
        let (_dir, coll) = open()?;
        let card = coll.add("Wasser", "Water", now())?;
        assert_eq!(coll.resolve(&card.id.short())?, card.id);
        assert_eq!(coll.resolve(&card.id.to_hex().to_uppercase())?, card.id);
        assert!(coll.resolve("").is_err());
        let other = if card.id.to_hex().starts_with('f') { "0" } else { "f" };
        assert_eq!(coll.resolve(other).unwrap_err().kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[test]
    fn test_add_rejects_duplicates() -> Fallible<()> {
        let (_dir, coll) = open()?;
        coll.add("Guten Abend", "Good evening", now())?;
        let err = coll.add(" guten ABEND", "Good evening", now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        let err = coll.add("", "Good evening", now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        Ok(())
    }

    #[test]
    fn test_review_persists() -> Fallible<()> {
        let (_dir, coll) = open()?;
        let card = coll.add("Ich habe Hunger", "I am hungry", now())?;
        let reviewed = coll.review(card.id, 3, now())?;
        assert_eq!(reviewed.card.scheduling.interval, 3.0);
        let stored = coll.card(card.id)?;
        assert_eq!(stored.review_count, 1);
        assert_eq!(stored.level(), Level::Learning);
        let err = coll.review(card.id, 4, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert_eq!(coll.card(card.id)?.review_count, 1);
        Ok(())
    }

    #[test]
    fn test_edit() -> Fallible<()> {
        let (_dir, coll) = open()?;
        let a = coll.add("eins", "one", now())?;
        let b = coll.add("zwei", "two", now())?;
        let edited = coll.edit(
            a.id,
            Edit {
                translation: Some("1".to_string()),
                favorite: Some(true),
                ..Edit::default()
            },
        )?;
        assert_eq!(edited.source, "eins");
        assert_eq!(edited.translation, "1");
        assert!(edited.favorite);
        // Keeping its own sentence is not a duplicate, taking another's is.
        coll.edit(
            a.id,
            Edit {
                source: Some("EINS".to_string()),
                ..Edit::default()
            },
        )?;
        let err = coll
            .edit(
                b.id,
                Edit {
                    source: Some("eins".to_string()),
                    ..Edit::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        Ok(())
    }

    #[test]
    fn test_reset_all_and_stats() -> Fallible<()> {
        let (_dir, coll) = open()?;
        let a = coll.add("rot", "red", now())?;
        let b = coll.add("blau", "blue", now())?;
        coll.review(a.id, 3, now())?;
        coll.review(b.id, 2, now())?;
        let stats = coll.stats(now())?;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.due, 0);
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.levels.learning, 2);

        assert_eq!(coll.reset_all(now())?, 2);
        let stats = coll.stats(now())?;
        assert_eq!(stats.due, 2);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.levels.new, 2);
        Ok(())
    }

    #[test]
    fn test_validate_content() {
        assert_eq!(
            validate_content("  Hallo ", " Hello").unwrap(),
            ("Hallo".to_string(), "Hello".to_string())
        );
        assert!(validate_content("   ", "Hello").is_err());
        assert!(validate_content("Hallo", "").is_err());
        let long = "ä".repeat(MAX_TEXT_LENGTH + 1);
        assert!(validate_content(&long, "x").is_err());
        assert!(validate_content(&"ä".repeat(MAX_TEXT_LENGTH), "x").is_ok());
    }
}
