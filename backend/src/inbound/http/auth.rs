//! Caller identity for protected endpoints.
//!
//! A request is authenticated when its session already names an application
//! user, or when a trusted proxy header carries an email. The header path
//! registers unknown emails on first sight and pins the identity in the
//! session so later requests skip the lookup by email.

use actix_session::SessionExt;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, info, warn};

use crate::domain::ports::ApplicationUserRepositoryError;
use crate::domain::{AppUserId, ApplicationUser, Error};

use super::session::SessionContext;
use super::state::HttpState;

const MAX_EMAIL_LEN: usize = 254;

/// The authenticated application user behind a request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub ApplicationUser);

impl AuthenticatedUser {
    pub fn id(&self) -> &AppUserId {
        &self.0.id
    }
}

fn map_repository_error(error: ApplicationUserRepositoryError) -> Error {
    match error {
        ApplicationUserRepositoryError::Connection { message } => {
            warn!(%message, "identity store unreachable");
            Error::service_unavailable("identity store is unavailable")
        }
        ApplicationUserRepositoryError::Query { message } => {
            Error::internal(format!("identity lookup failed: {message}"))
        }
    }
}

/// Trim and lowercase an asserted email, rejecting obviously malformed values.
fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty()
        || email.len() > MAX_EMAIL_LEN
        || email.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return None;
    }
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(email)
}

fn asserted_email(req: &HttpRequest, state: &HttpState) -> Option<String> {
    let header = state.trusted_header.as_ref()?;
    let value = req.headers().get(header)?;
    let Ok(raw) = value.to_str() else {
        warn!(header = %header, "trusted identity header is not valid UTF-8");
        return None;
    };
    let email = normalize_email(raw);
    if email.is_none() {
        warn!(header = %header, "trusted identity header does not hold an email");
    }
    email
}

async fn resolve(
    state: web::Data<HttpState>,
    session: SessionContext,
    email: Option<String>,
) -> Result<AuthenticatedUser, Error> {
    if let Some(id) = session.user_id()? {
        match state.app_users.find_by_id(&id).await {
            Ok(Some(user)) => return Ok(AuthenticatedUser(user)),
            Ok(None) => {
                debug!(user_id = %id, "session names an unknown user");
                session.clear();
            }
            Err(error) => return Err(map_repository_error(error)),
        }
    }

    let Some(email) = email else {
        return Err(Error::unauthorized("login required"));
    };

    let user = state
        .app_users
        .find_or_create_by_email(&email)
        .await
        .map_err(map_repository_error)?;
    session.persist_user(&user.id)?;
    info!(user_id = %user.id, "authenticated via trusted header");
    Ok(AuthenticatedUser(user))
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session = SessionContext::new(req.get_session());
        let email = state
            .as_ref()
            .and_then(|state| asserted_email(req, state.get_ref()));

        Box::pin(async move {
            let Some(state) = state else {
                return Err(Error::internal("HTTP state is not configured").into());
            };
            resolve(state, session, email).await.map_err(Into::into)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::http::header::HeaderName;
    use actix_web::{App, HttpResponse, test as actix_test};
    use chrono::Utc;
    use rstest::rstest;

    use crate::domain::ports::{
        MockApplicationUserRepository, MockTenantCommand, MockTenantQuery,
    };
    use crate::inbound::http::state::HttpStatePorts;

    fn user(email: &str) -> ApplicationUser {
        ApplicationUser {
            id: AppUserId::random(),
            oidc_sub: None,
            email: email.to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn state(repo: MockApplicationUserRepository, header: Option<&'static str>) -> HttpState {
        let state = HttpState::new(HttpStatePorts {
            tenants: Arc::new(MockTenantCommand::new()),
            tenants_query: Arc::new(MockTenantQuery::new()),
            app_users: Arc::new(repo),
        });
        match header {
            Some(name) => state.with_trusted_header(HeaderName::from_static(name)),
            None => state,
        }
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.0.email)
    }

    #[rstest]
    #[case("alice@example.com", Some("alice@example.com"))]
    #[case("  Alice@Example.COM ", Some("alice@example.com"))]
    #[case("", None)]
    #[case("alice", None)]
    #[case("@example.com", None)]
    #[case("alice@", None)]
    #[case("a@b@c", None)]
    #[case("al ice@example.com", None)]
    fn emails_are_normalised(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_email(raw).as_deref(), expected);
    }

    #[actix_web::test]
    async fn missing_identity_is_unauthorised() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state(
                    MockApplicationUserRepository::new(),
                    Some("x-forwarded-email"),
                )))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn header_is_ignored_when_not_configured() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state(MockApplicationUserRepository::new(), None)))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header(("x-forwarded-email", "alice@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn trusted_header_registers_and_pins_session() {
        let alice = user("alice@example.com");
        let alice_id = alice.id;
        let mut repo = MockApplicationUserRepository::new();
        let created = alice.clone();
        repo.expect_find_or_create_by_email()
            .withf(|email: &str| email == "alice@example.com")
            .times(1)
            .return_once(move |_| Ok(created));
        repo.expect_find_by_id()
            .withf(move |id: &AppUserId| *id == alice_id)
            .times(1)
            .return_once(move |_| Ok(Some(alice)));

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state(repo, Some("x-forwarded-email"))))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let first = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header(("x-forwarded-email", "Alice@Example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::OK);
        let cookie = first
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let second = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(second).await, "alice@example.com");
    }

    #[actix_web::test]
    async fn unreachable_identity_store_is_503() {
        let mut repo = MockApplicationUserRepository::new();
        repo.expect_find_or_create_by_email()
            .return_once(|_| Err(ApplicationUserRepositoryError::connection("refused")));

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state(repo, Some("x-forwarded-email"))))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header(("x-forwarded-email", "alice@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
