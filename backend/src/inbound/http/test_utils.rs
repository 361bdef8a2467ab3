//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::http::header::HeaderName;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::domain::ApplicationUser;
use crate::domain::AppUserId;
use crate::domain::ports::{MockApplicationUserRepository, MockTenantCommand, MockTenantQuery};

use super::state::{HttpState, HttpStatePorts};

/// Identity header every handler test authenticates with.
pub const TEST_IDENTITY_HEADER: &str = "x-test-email";

/// Email of [`fixture_owner`].
pub const OWNER_EMAIL: &str = "owner@example.com";

/// Build a session middleware configured for tests.
///
/// Uses a fresh key per invocation, names the cookie `session` and drops the
/// `Secure` flag for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The application user behind [`TEST_IDENTITY_HEADER`].
pub fn fixture_owner() -> ApplicationUser {
    let at = Utc
        .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("fixture timestamp");
    ApplicationUser {
        id: AppUserId::from_uuid(Uuid::from_u128(0x11)),
        oidc_sub: None,
        email: OWNER_EMAIL.to_owned(),
        created_at: at,
        updated_at: at,
    }
}

/// HTTP state over the given tenant mocks, trusting [`TEST_IDENTITY_HEADER`].
pub fn test_state(tenants: MockTenantCommand, tenants_query: MockTenantQuery) -> HttpState {
    let mut app_users = MockApplicationUserRepository::new();
    app_users
        .expect_find_or_create_by_email()
        .returning(|_| Ok(fixture_owner()));
    app_users
        .expect_find_by_id()
        .returning(|_| Ok(Some(fixture_owner())));

    HttpState::new(HttpStatePorts {
        tenants: Arc::new(tenants),
        tenants_query: Arc::new(tenants_query),
        app_users: Arc::new(app_users),
    })
    .with_trusted_header(HeaderName::from_static(TEST_IDENTITY_HEADER))
}
