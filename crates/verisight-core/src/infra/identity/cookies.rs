// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, bail};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

static SIGNATURE_SEPARATOR: char = '.';

/// Tamper-evident guest cookies, formatted as `<guest id>.<hex HMAC-SHA256>`
pub struct CookieSigner {
    secret: Vec<u8>,
}

impl CookieSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    fn mac_for(&self, guest_id: &str) -> anyhow::Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| anyhow!("verisight.identity : unusable cookie secret"))?;
        mac.update(guest_id.as_bytes());
        Ok(mac)
    }

    pub fn sign(&self, guest_id: &str) -> anyhow::Result<String> {
        if guest_id.is_empty() || guest_id.contains(SIGNATURE_SEPARATOR) {
            bail!("verisight.identity : cannot sign guest id '{}'", guest_id)
        }

        let signature = self.mac_for(guest_id)?.finalize().into_bytes();
        Ok(format!("{}{}{}", guest_id, SIGNATURE_SEPARATOR, hex::encode(signature)))
    }

    /// Returns the guest id carried by a cookie, only if its signature checks out
    pub fn verify(&self, cookie: &str) -> Option<String> {
        let (guest_id, signature) = cookie.trim().rsplit_once(SIGNATURE_SEPARATOR)?;

        if guest_id.is_empty() {
            return None;
        }

        let signature = hex::decode(signature).ok()?;
        self.mac_for(guest_id).ok()?.verify_slice(&signature).ok()?;
        Some(guest_id.to_string())
    }
}
