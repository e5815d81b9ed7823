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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use maud::DOCTYPE;
use maud::Markup;
use maud::html;
use sentencecards_core::level::Level;
use sentencecards_core::stats::Stats;
use sentencecards_core::types::timestamp::Timestamp;

use crate::collection::Collection;
use crate::error::Fallible;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// HTML output.
    Html,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Html => write!(f, "html"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(coll: &Collection, format: StatsFormat, now: Timestamp) -> Fallible<()> {
    let stats: Stats = coll.stats(now)?;
    match format {
        StatsFormat::Html => {
            println!("{}", render_stats(&stats, now).into_string());
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

pub(crate) fn render_stats(stats: &Stats, now: Timestamp) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Statistics" }
            }
            body {
                h1 { "Statistics" }
                p { "As of " (now) "." }
                table.summary {
                    tr { th { "Cards" } td { (stats.total) } }
                    tr { th { "Due" } td { (stats.due) } }
                    tr { th { "Reviews" } td { (stats.total_reviews) } }
                    tr { th { "Accuracy" } td { (stats.overall_accuracy) "%" } }
                    tr { th { "Mastery" } td { (stats.mastery_percentage) "%" } }
                    tr { th { "Average interval" } td { (stats.average_interval) " days" } }
                }
                table.levels {
                    tr {
                        th { "Level" }
                        th { "Cards" }
                    }
                    @for level in Level::ALL {
                        @let details = level.details();
                        tr style={ "color: " (details.color) } {
                            td { (details.emoji) " " (level) }
                            td { (stats.levels.get(level)) }
                        }
                    }
                }
            }
        }
    }
}
