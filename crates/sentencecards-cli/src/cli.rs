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

use std::io::stdin;
use std::io::stdout;

use clap::Args;
use clap::Parser;
use sentencecards_core::types::timestamp::Timestamp;

use crate::api::server::start_server;
use crate::cmd::add::add_card;
use crate::cmd::drill::drill;
use crate::cmd::edit::delete_card;
use crate::cmd::edit::edit_card;
use crate::cmd::edit::favorite_card;
use crate::cmd::export::export_collection;
use crate::cmd::list::ListQuery;
use crate::cmd::list::list_cards;
use crate::cmd::list::list_due;
use crate::cmd::reset::reset_cards;
use crate::cmd::review::review_card;
use crate::cmd::show::show_card;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::collection::Collection;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Add a sentence and its translation.
    Add {
        #[command(flatten)]
        target: Target,
        /// The sentence to learn.
        source: String,
        /// Its translation.
        translation: String,
    },
    /// List cards.
    List {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        query: ListQuery,
    },
    /// List the cards that are due now.
    Due {
        #[command(flatten)]
        target: Target,
        /// Defaults to the configured `due_limit`.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print a card, its statistics and its review history as JSON.
    Show {
        #[command(flatten)]
        target: Target,
        /// Card id, or an unambiguous prefix of one.
        id: String,
    },
    /// Record a review of one card.
    Review {
        #[command(flatten)]
        target: Target,
        /// Card id, or an unambiguous prefix of one.
        id: String,
        /// 0 = Again, 1 = Hard, 2 = Good, 3 = Excellent.
        #[arg(allow_negative_numbers = true)]
        quality: i64,
    },
    /// Review the due cards interactively.
    Drill {
        #[command(flatten)]
        target: Target,
    },
    /// Change a card's sentence or translation.
    Edit {
        #[command(flatten)]
        target: Target,
        id: String,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        translation: Option<String>,
    },
    /// Mark or unmark a card as favorite.
    Favorite {
        #[command(flatten)]
        target: Target,
        id: String,
        /// Remove the mark instead.
        #[arg(long)]
        off: bool,
    },
    /// Delete a card.
    Delete {
        #[command(flatten)]
        target: Target,
        id: String,
    },
    /// Forget all progress on one card, or on every card.
    Reset {
        #[command(flatten)]
        target: Target,
        /// Reset only this card.
        id: Option<String>,
    },
    /// Print collection statistics.
    Stats {
        #[command(flatten)]
        target: Target,
        #[arg(long, default_value_t = StatsFormat::Json)]
        format: StatsFormat,
    },
    /// Export all cards and their histories as JSON.
    Export {
        #[command(flatten)]
        target: Target,
    },
    /// Serve the JSON API.
    Serve {
        #[command(flatten)]
        target: Target,
        /// Defaults to the configured `port`.
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Which collection, and whose cards.
#[derive(Args)]
struct Target {
    /// Path to the collection directory. Defaults to the current directory.
    #[arg(long, short = 'd')]
    directory: Option<String>,
    /// The user to act as. Defaults to the configured `user`.
    #[arg(long, short = 'u')]
    user: Option<String>,
}

impl Target {
    fn open(self) -> Fallible<Collection> {
        Collection::new(self.directory, self.user)
    }
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    let now = Timestamp::now();
    match cli {
        Command::Add {
            target,
            source,
            translation,
        } => add_card(&target.open()?, &source, &translation, now),
        Command::List { target, query } => list_cards(&target.open()?, &query, now),
        Command::Due { target, limit } => list_due(&target.open()?, limit, now),
        Command::Show { target, id } => show_card(&target.open()?, &id, now),
        Command::Review {
            target,
            id,
            quality,
        } => review_card(&target.open()?, &id, quality, now),
        Command::Drill { target } => {
            let coll = target.open()?;
            drill(&coll, stdin().lock(), stdout().lock(), Timestamp::now)
        }
        Command::Edit {
            target,
            id,
            source,
            translation,
        } => edit_card(&target.open()?, &id, source, translation),
        Command::Favorite { target, id, off } => favorite_card(&target.open()?, &id, !off),
        Command::Delete { target, id } => delete_card(&target.open()?, &id),
        Command::Reset { target, id } => reset_cards(&target.open()?, id.as_deref(), now),
        Command::Stats { target, format } => print_stats(&target.open()?, format, now),
        Command::Export { target } => export_collection(&target.open()?, now),
        Command::Serve { target, port } => {
            let coll = target.open()?;
            let port = port.unwrap_or(coll.config.port);
            start_server(coll, port).await
        }
    }
}
