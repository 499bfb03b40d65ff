// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::Identity;
use crate::domain::ownership::{ClientContext, OwnershipResolver, RequestContext};
use crate::infra::identity::jar::GuestCookieJar;

/// Resolves who is calling, once per task, keeping any freshly issued guest cookie in the jar
pub struct VerisightSessions {
    resolver: OwnershipResolver,
    cookie_jar: GuestCookieJar,
    client: ClientContext,
}

impl VerisightSessions {
    pub fn new(resolver: OwnershipResolver, cookie_jar: GuestCookieJar, client: ClientContext) -> Self {
        Self {
            resolver,
            cookie_jar,
            client,
        }
    }

    pub fn current_identity(&self) -> anyhow::Result<Identity> {
        let guest_cookie = match self.client.accepts_cookies {
            true => self.cookie_jar.load(),
            false => None,
        };

        let request = RequestContext {
            client: self.client.clone(),
            guest_cookie,
        };

        let resolved = self.resolver.resolve_identity(&request);

        if let Some(cookie) = &resolved.issued_cookie {
            self.cookie_jar.store(cookie)?;
        }

        log::info!("[verisight.identity] acting as {}", resolved.identity);
        Ok(resolved.identity)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::models::{Identity, VerifiedPrincipal};
    use crate::domain::ownership::{ClientContext, OwnershipResolver};
    use crate::infra::identity::cookies::CookieSigner;
    use crate::infra::identity::jar::GuestCookieJar;
    use crate::infra::persistence::users::UsersDirectory;
    use crate::verisight::sessions::VerisightSessions;
    use assertor::{BooleanAssertion, EqualityAssertion, OptionAssertion};
    use std::path::Path;
    use temp_dir::TempDir;

    fn sessions(home: &Path, client: ClientContext) -> VerisightSessions {
        let resolver = OwnershipResolver::new(CookieSigner::new(b"secret"), UsersDirectory::new(home.join("users")));
        VerisightSessions::new(resolver, GuestCookieJar::new(home.join("session")), client)
    }

    fn anonymous_client(accepts_cookies: bool) -> ClientContext {
        ClientContext {
            principal: None,
            accepts_cookies,
            client_ip: "127.0.0.1".to_string(),
            user_agent: "verisight/test".to_string(),
        }
    }

    #[test]
    fn should_keep_same_guest_identity_across_invocations() {
        let temp_dir = TempDir::new().unwrap();

        let first = sessions(temp_dir.path(), anonymous_client(true)).current_identity().unwrap();
        let second = sessions(temp_dir.path(), anonymous_client(true)).current_identity().unwrap();

        assertor::assert_that!(second).is_equal_to(first);
        assertor::assert_that!(GuestCookieJar::new(temp_dir.path().join("session")).load()).is_some();
    }

    #[test]
    fn should_not_touch_cookie_jar_without_cookies() {
        let temp_dir = TempDir::new().unwrap();

        let identity = sessions(temp_dir.path(), anonymous_client(false)).current_identity().unwrap();

        assertor::assert_that!(matches!(identity, Identity::Guest { .. })).is_true();
        assertor::assert_that!(GuestCookieJar::new(temp_dir.path().join("session")).load()).is_none();
    }

    #[test]
    fn should_act_as_verified_user() {
        let temp_dir = TempDir::new().unwrap();
        let mut client = anonymous_client(true);
        client.principal = Some(VerifiedPrincipal {
            email: "grace@example.com".to_string(),
            name: None,
        });

        let identity = sessions(temp_dir.path(), client).current_identity().unwrap();

        assertor::assert_that!(matches!(identity, Identity::AuthenticatedUser { .. })).is_true();
    }
}
