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

use crate::collection::Collection;
use crate::collection::Edit;
use crate::error::Fallible;
use crate::error::invalid;

pub fn edit_card(
    coll: &Collection,
    id: &str,
    source: Option<String>,
    translation: Option<String>,
) -> Fallible<()> {
    if source.is_none() && translation.is_none() {
        return invalid("nothing to change, pass --source or --translation.");
    }
    let id = coll.resolve(id)?;
    let card = coll.edit(
        id,
        Edit {
            source,
            translation,
            favorite: None,
        },
    )?;
    println!("{} = {}", card.source, card.translation);
    Ok(())
}

pub fn favorite_card(coll: &Collection, id: &str, favorite: bool) -> Fallible<()> {
    let id = coll.resolve(id)?;
    coll.edit(
        id,
        Edit {
            favorite: Some(favorite),
            ..Edit::default()
        },
    )?;
    Ok(())
}

pub fn delete_card(coll: &Collection, id: &str) -> Fallible<()> {
    let id = coll.resolve(id)?;
    coll.delete(id)?;
    println!("Deleted {}.", id.short());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use sentencecards_core::types::timestamp::Timestamp;
    use tempfile::tempdir;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_edit_favorite_delete() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()), None)?;
        let now = Timestamp::new(Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap());
        let card = coll.add("Danke schön", "Thank you", now)?;
        let prefix = card.id.short();

        let err = edit_card(&coll, &prefix, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);

        edit_card(&coll, &prefix, None, Some("Thanks a lot".to_string()))?;
        favorite_card(&coll, &prefix, true)?;
        let stored = coll.card(card.id)?;
        assert_eq!(stored.translation, "Thanks a lot");
        assert!(stored.favorite);

        delete_card(&coll, &prefix)?;
        assert_eq!(coll.card(card.id).unwrap_err().kind(), ErrorKind::NotFound);
        Ok(())
    }
}
