// Copyright 2025 Chris Custine
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

//! Network connectivity for live AIVDM feeds.
//!
//! AIS receivers such as AIS-catcher, rtl_ais and most gpsd relays publish
//! raw sentences over plain TCP, one per line.

pub mod feed;

pub use feed::{Feed, FeedConfig, FeedEvent, FeedState};
