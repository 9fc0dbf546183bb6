// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for the Visor client (preferences, storage,
//! lifecycle). Keeps UI/runtime adapters thin and framework-agnostic.

pub mod defaults;
pub mod lifecycle;
pub mod prefs;
pub mod service;
pub mod storage;
