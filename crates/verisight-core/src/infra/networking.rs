// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod http;
pub mod inference;
pub mod sightengine;
