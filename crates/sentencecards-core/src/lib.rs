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

//! Scheduling, mastery levels and statistics for sentence flashcards.
//!
//! Everything here is pure: the current time is always passed in, and cards
//! are values that are never mutated in place. Servers and browser clients
//! link this one crate so they cannot drift apart.

pub mod contract;
pub mod error;
pub mod level;
pub mod review;
pub mod sm2;
pub mod stats;
pub mod types;
