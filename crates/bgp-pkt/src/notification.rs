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

//! Representation for BGP Notification message

use serde::{Deserialize, Serialize};

/// BGP Notification message as defined by [RFC4271](https://datatracker.ietf.org/doc/html/rfc4271#section-4.5).
/// A passive observer only records the session going down; error code,
/// subcode, and data are carried raw.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BgpNotificationMessage {
    code: u8,
    subcode: u8,
    value: Vec<u8>,
}

impl BgpNotificationMessage {
    pub const fn new(code: u8, subcode: u8, value: Vec<u8>) -> Self {
        Self {
            code,
            subcode,
            value,
        }
    }

    pub const fn code(&self) -> u8 {
        self.code
    }

    pub const fn subcode(&self) -> u8 {
        self.subcode
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}
