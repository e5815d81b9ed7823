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

use sentencecards_core::types::timestamp::Timestamp;

use crate::collection::Collection;
use crate::error::Fallible;

/// Reset one card, or every card when `id` is `None`.
pub fn reset_cards(coll: &Collection, id: Option<&str>, now: Timestamp) -> Fallible<()> {
    match id {
        Some(id) => {
            let id = coll.resolve(id)?;
            coll.reset_card(id, now)?;
            println!("Reset {}.", id.short());
        }
        None => {
            let count = coll.reset_all(now)?;
            println!("Reset {count} cards.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use sentencecards_core::level::Level;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_reset_one() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()), None)?;
        let now = Timestamp::new(Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap());
        let a = coll.add("Apfel", "apple", now)?;
        let b = coll.add("Birne", "pear", now)?;
        coll.review(a.id, 3, now)?;
        coll.review(b.id, 3, now)?;

        reset_cards(&coll, Some(&a.id.short()), now)?;
        let a = coll.card(a.id)?;
        assert_eq!(a.level(), Level::New);
        assert_eq!(a.review_count, 0);
        assert!(a.history.is_empty());
        assert!(a.is_due(now));
        assert_eq!(coll.card(b.id)?.level(), Level::Learning);
        Ok(())
    }
}
