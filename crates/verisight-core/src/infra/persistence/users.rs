// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::interfaces::UserDirectory;
use crate::domain::models::{UserAccount, VerifiedPrincipal};
use crate::infra::persistence::{publish_once, publish_replacing};
use anyhow::bail;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

static ACCOUNT_FILE_EXTENSION: &str = "json";

/// User accounts provisioned on first sight, keyed by normalized email
#[derive(Clone, Debug)]
pub struct UsersDirectory {
    root_dir: PathBuf,
}

impl UsersDirectory {
    pub fn new(root_dir: PathBuf) -> Self {
        Self { root_dir }
    }

    fn account_file(&self, normalized_email: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(normalized_email.as_bytes()));
        self.root_dir.join(format!("{}.{}", digest, ACCOUNT_FILE_EXTENSION))
    }

    fn new_account(normalized_email: String, principal: &VerifiedPrincipal) -> UserAccount {
        UserAccount {
            id: Uuid::new_v4().to_string(),
            email: normalized_email,
            name: principal.name.clone(),
            created_at: Utc::now(),
        }
    }

    fn read_account(&self, account_file: &Path) -> anyhow::Result<UserAccount> {
        let account = serde_json::from_slice(&std::fs::read(account_file)?)?;
        Ok(account)
    }
}

impl UserDirectory for UsersDirectory {
    fn find_or_create(&self, principal: &VerifiedPrincipal) -> anyhow::Result<UserAccount> {
        let normalized_email = principal.email.trim().to_lowercase();

        if normalized_email.is_empty() {
            bail!("verisight.users : verified principal without email")
        }

        let account_file = self.account_file(&normalized_email);

        if account_file.exists() {
            match self.read_account(&account_file) {
                Ok(account) => return Ok(account),
                Err(incoming) => {
                    log::warn!("[verisight.storage] replacing unreadable {:?} | reason = {}", account_file, incoming);
                    let account = Self::new_account(normalized_email, principal);
                    publish_replacing(&account_file, &serde_json::to_vec(&account)?)?;
                    return self.read_account(&account_file);
                },
            }
        }

        std::fs::create_dir_all(&self.root_dir)?;
        let account = Self::new_account(normalized_email, principal);

        if !publish_once(&account_file, &serde_json::to_vec(&account)?)? {
            // Someone provisioned the same email concurrently
            return self.read_account(&account_file);
        }

        log::info!("[verisight.identity] provisioned user {}", account.id);
        Ok(account)
    }

    fn find_by_id(&self, user_id: &str) -> anyhow::Result<Option<UserAccount>> {
        if !self.root_dir.exists() {
            return Ok(None);
        }

        for dir_entry in std::fs::read_dir(&self.root_dir)? {
            let account_file = dir_entry?.path();

            if account_file.extension().is_none_or(|ext| ext != ACCOUNT_FILE_EXTENSION) {
                continue;
            }

            match self.read_account(&account_file) {
                Ok(account) if account.id == user_id => return Ok(Some(account)),
                Ok(_) => {},
                Err(incoming) => log::warn!("[verisight.storage] skipping {:?} | reason = {}", account_file, incoming),
            }
        }

        Ok(None)
    }
}
