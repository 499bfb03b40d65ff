// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::interfaces::UserDirectory;
use crate::domain::models::{Identity, ScanRecord, VerifiedPrincipal};
use crate::infra::identity::cookies::CookieSigner;
use crate::infra::persistence::users::UsersDirectory;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// What a client tells about itself, besides any cookie it holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientContext {
    pub principal: Option<VerifiedPrincipal>,
    pub accepts_cookies: bool,
    pub client_ip: String,
    pub user_agent: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    pub client: ClientContext,
    pub guest_cookie: Option<String>,
}

/// The identity for one request, plus a guest cookie the client must keep when one was just issued
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub identity: Identity,
    pub issued_cookie: Option<String>,
}

fn one_way_hash(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

pub struct OwnershipResolver {
    cookie_signer: CookieSigner,
    users: UsersDirectory,
}

impl OwnershipResolver {
    pub fn new(cookie_signer: CookieSigner, users: UsersDirectory) -> Self {
        Self { cookie_signer, users }
    }

    pub fn resolve_identity(&self, request: &RequestContext) -> ResolvedIdentity {
        if let Some(principal) = &request.client.principal {
            match self.users.find_or_create(principal) {
                Ok(account) => {
                    return ResolvedIdentity {
                        identity: Identity::AuthenticatedUser { id: account.id },
                        issued_cookie: None,
                    };
                },
                Err(incoming) => {
                    log::warn!(
                        "[verisight.identity] cannot provision {}; proceeding as guest | reason = {}",
                        principal.email,
                        incoming
                    );
                },
            }
        }

        self.resolve_guest(request)
    }

    fn resolve_guest(&self, request: &RequestContext) -> ResolvedIdentity {
        if !request.client.accepts_cookies {
            return self.fingerprinted_guest(request);
        }

        let presented = request
            .guest_cookie
            .as_deref()
            .and_then(|cookie| self.cookie_signer.verify(cookie));

        if let Some(guest_id) = presented {
            return ResolvedIdentity {
                identity: Identity::Guest {
                    hash: one_way_hash(&guest_id),
                },
                issued_cookie: None,
            };
        }

        if request.guest_cookie.is_some() {
            log::warn!("[verisight.identity] discarding guest cookie with invalid signature");
        }

        let guest_id = Uuid::new_v4().to_string();

        match self.cookie_signer.sign(&guest_id) {
            Ok(cookie) => {
                log::info!("[verisight.identity] issued new guest cookie");
                ResolvedIdentity {
                    identity: Identity::Guest {
                        hash: one_way_hash(&guest_id),
                    },
                    issued_cookie: Some(cookie),
                }
            },
            Err(incoming) => {
                log::warn!("[verisight.identity] cannot issue guest cookie | reason = {}", incoming);
                self.fingerprinted_guest(request)
            },
        }
    }

    // Clients without cookies are told apart only by network address and user agent
    fn fingerprinted_guest(&self, request: &RequestContext) -> ResolvedIdentity {
        let fingerprint = format!("{}|{}", request.client.client_ip, request.client.user_agent);

        ResolvedIdentity {
            identity: Identity::Guest {
                hash: one_way_hash(&fingerprint),
            },
            issued_cookie: None,
        }
    }
}

/// Ownership partitions never overlap: users see only their records, guests only theirs
pub fn owns_record(identity: &Identity, record: &ScanRecord) -> bool {
    identity.owner() == record.owner
}
