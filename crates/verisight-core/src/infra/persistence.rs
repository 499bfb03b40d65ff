// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub mod scans;
pub mod users;

static STAGING_FILE_EXTENSION: &str = "staging";

fn staging_sibling(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    target.with_file_name(format!("{}.{}.{}", file_name, Uuid::new_v4(), STAGING_FILE_EXTENSION))
}

/// Publishes a complete document at `target` unless one is already there.
///
/// Returns `false` when another writer published first. Readers never observe partial contents.
pub(crate) fn publish_once(target: &Path, contents: &[u8]) -> anyhow::Result<bool> {
    let staging_file = staging_sibling(target);
    std::fs::write(&staging_file, contents)?;

    let published = match std::fs::hard_link(&staging_file, target) {
        Ok(_) => Ok(true),
        Err(incoming) if incoming.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(incoming) => Err(incoming.into()),
    };

    if let Err(incoming) = std::fs::remove_file(&staging_file) {
        log::warn!("[verisight.storage] cannot remove {:?} | reason = {}", staging_file, incoming);
    }

    published
}

/// Atomically replaces whatever lives at `target`; the last writer wins
pub(crate) fn publish_replacing(target: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let staging_file = staging_sibling(target);
    std::fs::write(&staging_file, contents)?;
    std::fs::rename(&staging_file, target)?;
    Ok(())
}
