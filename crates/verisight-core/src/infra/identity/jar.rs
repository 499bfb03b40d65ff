// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use uuid::Uuid;

static GUEST_COOKIE_FILE_NAME: &str = "guest-cookie";
static COOKIE_SECRET_FILE_NAME: &str = "cookie-secret";

/// Where this client keeps its guest cookie between invocations, like a browser would
#[derive(Clone, Debug)]
pub struct GuestCookieJar {
    session_dir: PathBuf,
}

impl GuestCookieJar {
    pub fn new(session_dir: PathBuf) -> Self {
        Self { session_dir }
    }

    pub fn load(&self) -> Option<String> {
        let cookie_file = self.session_dir.join(GUEST_COOKIE_FILE_NAME);

        match std::fs::read_to_string(&cookie_file) {
            Ok(cookie) if !cookie.trim().is_empty() => Some(cookie.trim().to_string()),
            Ok(_) => None,
            Err(_) => {
                log::info!("[verisight.identity] no guest cookie at {:?}", cookie_file);
                None
            },
        }
    }

    pub fn store(&self, cookie: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.session_dir)?;
        std::fs::write(self.session_dir.join(GUEST_COOKIE_FILE_NAME), cookie)?;
        log::info!("[verisight.identity] guest cookie saved");
        Ok(())
    }

    /// Secret used to sign guest cookies when none is configured; generated once per installation
    pub fn signing_secret(&self) -> anyhow::Result<String> {
        let secret_file = self.session_dir.join(COOKIE_SECRET_FILE_NAME);

        if let Ok(existing) = std::fs::read_to_string(&secret_file)
            && !existing.trim().is_empty()
        {
            return Ok(existing.trim().to_string());
        }

        std::fs::create_dir_all(&self.session_dir)?;
        let generated = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        std::fs::write(&secret_file, &generated)?;
        log::info!("[verisight.identity] generated cookie secret at {:?}", secret_file);
        Ok(generated)
    }
}
