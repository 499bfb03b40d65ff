// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod cli;
pub mod config;

pub mod caching;
pub mod identity;
pub mod networking;
pub mod persistence;
