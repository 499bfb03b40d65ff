// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod domain;
pub mod factory;
pub mod infra;
pub mod verisight;
