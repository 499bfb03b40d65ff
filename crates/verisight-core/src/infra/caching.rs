// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use std::env::home_dir;
use std::path::{Path, PathBuf};

pub mod provider_scores;

static DATA_FOLDER_PROVIDER_SCORES: &str = "provider-scores";
static DATA_FOLDER_SCANS: &str = "scans";
static DATA_FOLDER_USERS: &str = "users";
static DATA_FOLDER_SESSION: &str = "session";

pub fn default_home_dir() -> PathBuf {
    match home_dir() {
        None => PathBuf::from("/var/cache/.verisight"),
        Some(dir) => dir.join(".verisight"),
    }
}

#[derive(Clone, Debug)]
pub struct CacheManager {
    home_dir: PathBuf,
}

impl CacheManager {
    pub fn new(home_dir: PathBuf) -> Self {
        Self { home_dir }
    }

    pub fn provider_scores_dir(&self) -> PathBuf {
        self.home_dir.join(DATA_FOLDER_PROVIDER_SCORES)
    }

    pub fn scans_dir(&self) -> PathBuf {
        self.home_dir.join(DATA_FOLDER_SCANS)
    }

    pub fn users_dir(&self) -> PathBuf {
        self.home_dir.join(DATA_FOLDER_USERS)
    }

    pub fn session_dir(&self) -> PathBuf {
        self.home_dir.join(DATA_FOLDER_SESSION)
    }

    pub fn cleanup_provider_scores(&self) {
        self.cleanup(self.provider_scores_dir().as_path());
    }

    pub fn cleanup_all(&self) {
        self.cleanup(self.home_dir.as_path());
    }

    fn cleanup(&self, target_folder: &Path) {
        if !target_folder.exists() {
            log::info!("[verisight.storage] nothing to remove at {:?}", target_folder);
            return;
        }

        match std::fs::remove_dir_all(target_folder) {
            Ok(_) => log::info!("[verisight.storage] removed {:?}", target_folder),
            Err(_) => log::error!("[verisight.storage] cannot remove : {:?}", target_folder),
        }
    }
}
