// Copyright (C) 2024-present The Routebench Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! BGP route propagation benchmark built on passive session capture.
//!
//! The benchmark watches both directions of an established BGP session,
//! counts prefixes the local speaker advertises and receives, and writes
//! a time series report once the exchange goes quiet.

pub mod config;
pub mod driver;
pub mod neighbor;
pub mod report;
