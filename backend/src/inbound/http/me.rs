//! Caller identity endpoints.
//!
//! ```text
//! GET  /api/v1/me
//! POST /api/v1/auth/logout
//! ```

use actix_web::{HttpResponse, get, post};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AppUserId, Error};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::session::SessionContext;

/// The authenticated application user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: AppUserId,
    #[schema(example = "owner@example.com")]
    pub email: String,
}

/// Describe the caller.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Authenticated user", body = MeResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(caller: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        id: caller.0.id,
        email: caller.0.email,
    })
}

/// End the session. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use serde_json::Value;

    use crate::domain::ports::{MockTenantCommand, MockTenantQuery};
    use crate::inbound::http::configure;
    use crate::inbound::http::test_utils::{
        OWNER_EMAIL, TEST_IDENTITY_HEADER, fixture_owner, test_session_middleware, test_state,
    };

    #[actix_web::test]
    async fn me_describes_the_caller() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(
                    MockTenantCommand::new(),
                    MockTenantQuery::new(),
                )))
                .wrap(test_session_middleware())
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/me")
                .insert_header((TEST_IDENTITY_HEADER, OWNER_EMAIL))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        assert_eq!(body["email"], OWNER_EMAIL);
        assert_eq!(body["id"], fixture_owner().id.to_string());
    }

    #[actix_web::test]
    async fn logout_without_session_still_succeeds() {
        let app = actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .service(logout),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri("/auth/logout").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
