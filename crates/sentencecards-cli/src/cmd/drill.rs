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

use std::io::BufRead;
use std::io::Write;

use sentencecards_core::contract::format_interval;
use sentencecards_core::sm2::Quality;
use sentencecards_core::types::timestamp::Timestamp;

use crate::cmd::list::interval_text;
use crate::collection::Collection;
use crate::error::Fallible;

/// What the user typed at the quality prompt.
#[derive(Debug, PartialEq)]
enum Answer {
    Rate(i64),
    Quit,
    Invalid,
}

fn parse_answer(line: &str) -> Answer {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Answer::Quit;
    }
    match line.parse::<i64>() {
        Ok(value) if Quality::try_from(value).is_ok() => Answer::Rate(value),
        _ => Answer::Invalid,
    }
}

/// Read one line. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Review the due cards one at a time: show the sentence, wait for Enter,
/// show the translation and ask for a rating. Cards failed during the session
/// come back in a later session, not this one.
pub fn drill<R: BufRead, W: Write>(
    coll: &Collection,
    mut input: R,
    mut output: W,
    clock: impl Fn() -> Timestamp,
) -> Fallible<()> {
    let cards = coll
        .db
        .due_cards(&coll.user, clock(), coll.config.due_limit)?;
    if cards.is_empty() {
        writeln!(output, "No cards due.")?;
        return Ok(());
    }
    let total = cards.len();
    let mut reviewed = 0;
    'session: for (index, card) in cards.iter().enumerate() {
        writeln!(output)?;
        writeln!(output, "[{}/{total}] {}", index + 1, card.source)?;
        write!(output, "Press Enter to reveal. ")?;
        output.flush()?;
        if read_line(&mut input)?.is_none() {
            break;
        }
        writeln!(output, "{}", card.translation)?;
        let quality = loop {
            write!(
                output,
                "0 = Again, 1 = Hard, 2 = Good, 3 = Excellent, q = quit: "
            )?;
            output.flush()?;
            let Some(line) = read_line(&mut input)? else {
                break 'session;
            };
            match parse_answer(&line) {
                Answer::Rate(quality) => break quality,
                Answer::Quit => break 'session,
                Answer::Invalid => writeln!(output, "Please answer 0, 1, 2, 3 or q.")?,
            }
        };
        let result = coll.review(card.id, quality, clock())?;
        let interval = interval_text(format_interval(result.card.scheduling.interval));
        writeln!(
            output,
            "{}: next review in {interval}.",
            result.quality.label()
        )?;
        reviewed += 1;
    }
    writeln!(output)?;
    writeln!(output, "Reviewed {reviewed} of {total} cards.")?;
    Ok(())
}
