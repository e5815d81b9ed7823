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

use sentencecards_core::contract::ReviewResult;
use sentencecards_core::review::Reviewed;
use sentencecards_core::types::timestamp::Timestamp;

use crate::collection::Collection;
use crate::error::Fallible;

pub fn review_card(coll: &Collection, id: &str, quality: i64, now: Timestamp) -> Fallible<()> {
    let id = coll.resolve(id)?;
    let reviewed: Reviewed = coll.review(id, quality, now)?;
    let result = ReviewResult::from(&reviewed);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
