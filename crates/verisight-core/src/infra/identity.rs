// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod cookies;
pub mod jar;
