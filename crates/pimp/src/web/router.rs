//! Router Configuration
//!
//! Route configuration for the website and its JSON API.

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    accreditation, api, auth, business, claim, dashboard, directory, health, home,
};
use super::state::AppState;

/// A row of the route table printed by `pimp routes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    /// HTTP methods, e.g. `GET` or `GET/POST`.
    pub method: &'static str,
    /// Path pattern.
    pub path: &'static str,
    /// What the route serves.
    pub page: &'static str,
}

const fn route(method: &'static str, path: &'static str, page: &'static str) -> RouteInfo {
    RouteInfo { method, path, page }
}

/// Every route [`create_router`] registers.
pub const ROUTES: &[RouteInfo] = &[
    route("GET", "/", "Home"),
    route("GET", "/directory", "Business directory"),
    route("GET", "/search", "Search"),
    route("GET", "/business/{slug}", "Business profile"),
    route("GET", "/business/{slug}/reviews", "Business reviews"),
    route("GET/POST", "/business/{slug}/review", "Write a review"),
    route("GET", "/accreditation", "Accreditation program"),
    route("GET/POST", "/accreditation/apply", "Accreditation application"),
    route("GET", "/dashboard", "Owner dashboard"),
    route("POST", "/dashboard/reviews/{id}/respond", "Respond to a review"),
    route("GET/POST", "/dashboard/settings", "Listing settings"),
    route("GET", "/dashboard/analytics", "Listing analytics"),
    route("GET/POST", "/login", "Sign in"),
    route("GET/POST", "/register", "Create an account"),
    route("POST", "/logout", "Sign out"),
    route("GET/POST", "/forgot-password", "Forgot password"),
    route("GET/POST", "/reset-password", "Reset password"),
    route("GET", "/claim", "Find a business to claim"),
    route("GET/POST", "/claim/{slug}", "Claim a business"),
    route("GET", "/api/businesses", "API: business list"),
    route("GET", "/api/businesses/{slug}", "API: business detail"),
    route("GET", "/api/businesses/{slug}/reviews", "API: business reviews"),
    route("POST", "/api/reviews/{id}/helpful", "API: helpful vote"),
    route("GET", "/api/categories", "API: categories"),
    route("GET", "/health", "Health check"),
    route("GET", "/public/*", "Static assets"),
];

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Asset URLs carry no version, so clients revalidate after an hour.
    let static_service = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        ))
        .service(ServeDir::new(&state.config().server.static_dir));

    let api_routes = Router::new()
        .route("/businesses", get(api::businesses))
        .route("/businesses/{slug}", get(api::business))
        .route("/businesses/{slug}/reviews", get(api::business_reviews))
        .route("/reviews/{id}/helpful", post(api::helpful))
        .route("/categories", get(api::categories));

    Router::new()
        .route("/", get(home::home))
        .route("/directory", get(directory::directory))
        .route("/search", get(directory::search))
        .route("/business/{slug}", get(business::profile))
        .route("/business/{slug}/reviews", get(business::reviews))
        .route(
            "/business/{slug}/review",
            get(business::review_form).post(business::submit_review),
        )
        .route("/accreditation", get(accreditation::info))
        .route(
            "/accreditation/apply",
            get(accreditation::apply_form).post(accreditation::apply_step),
        )
        .route("/dashboard", get(dashboard::dashboard))
        .route("/dashboard/reviews/{id}/respond", post(dashboard::respond))
        .route(
            "/dashboard/settings",
            get(dashboard::settings).post(dashboard::save_settings),
        )
        .route("/dashboard/analytics", get(dashboard::analytics))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", get(auth::forgot_form).post(auth::forgot))
        .route("/reset-password", get(auth::reset_form).post(auth::reset))
        .route("/claim", get(claim::search))
        .route("/claim/{slug}", get(claim::claim_form).post(claim::claim_step))
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .nest_service("/public", static_service)
        .fallback(super::handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::domain::review::RESPONSE_MAX;
    use crate::domain::{NewClaim, VerificationMethod};
    use crate::storage::seed::{
        seed_demo_data, DEMO_CUSTOMER_EMAIL, DEMO_OWNER_EMAIL, DEMO_PASSWORD,
    };
    use crate::storage::{BusinessQuery, Storage};
    use crate::web::nav;

    fn seeded_state() -> AppState {
        let storage = Storage::open_in_memory().unwrap();
        seed_demo_data(&storage).unwrap();
        AppState::new(Config::default(), storage)
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        create_router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn get_page(state: &AppState, uri: &str) -> Response {
        send(state, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(state: &AppState, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        send(state, request.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// Session cookie for a seeded account.
    fn sign_in(state: &AppState, email: &str) -> String {
        let storage = state.storage().unwrap();
        let user = storage.user_by_email(email).unwrap().unwrap();
        let session = storage
            .create_session(user.id, state.config().session_ttl())
            .unwrap();
        format!("{}={}", state.config().auth.cookie_name, session.token)
    }

    fn first_slug(state: &AppState) -> String {
        let storage = state.storage().unwrap();
        let page = storage.search_businesses(&BusinessQuery::new(1)).unwrap();
        page.items[0].slug.clone()
    }

    fn owned_slug(state: &AppState) -> String {
        let storage = state.storage().unwrap();
        let owner = storage.user_by_email(DEMO_OWNER_EMAIL).unwrap().unwrap();
        storage.businesses_owned_by(owner.id).unwrap()[0].slug.clone()
    }

    #[tokio::test]
    async fn test_home_page() {
        let state = seeded_state();
        let response = get_page(&state, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("P.I.M.P Business Repository"));
        assert!(html.contains("href=\"/directory?category=restaurants\""));
    }

    #[tokio::test]
    async fn test_every_navigation_link_routes() {
        let state = seeded_state();
        for link in nav::all_links() {
            let response = get_page(&state, link).await;
            let status = response.status();
            assert!(
                status != StatusCode::NOT_FOUND && status != StatusCode::METHOD_NOT_ALLOWED,
                "{link} answered {status}"
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_routes_render_404_page() {
        let state = seeded_state();
        let response = get_page(&state, "/no-such-page").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Page not found"));

        let response = get_page(&state, "/business/no-such-business").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get_page(&state, "/directory?category=submarines").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_and_reviews_pages() {
        let state = seeded_state();
        let slug = first_slug(&state);

        let response = get_page(&state, &format!("/business/{slug}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("distribution"));
        assert!(html.contains(r#"<span class="stars" role="img" aria-label="Rated "#));
        assert!(html.contains(r#"<span class="star star--full" aria-hidden="true">"#));
        assert!(!html.contains("&lt;span class=&quot;star"));

        let response = get_page(&state, &format!("/business/{slug}/reviews?stars=5&sort=helpful")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get_page(&state, &format!("/business/{slug}/reviews?page=banana")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_filters() {
        let state = seeded_state();
        let response = get_page(&state, "/search?q=&accredited=on&min_rating=4&sort=rating").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("All businesses"));
    }

    #[tokio::test]
    async fn test_review_form_requires_login() {
        let state = seeded_state();
        let slug = first_slug(&state);
        let response = get_page(&state, &format!("/business/{slug}/review")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/login?next=/business/"));
    }

    #[tokio::test]
    async fn test_post_review_then_duplicate_conflicts() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_CUSTOMER_EMAIL);
        let slug = {
            let storage = state.storage().unwrap();
            let customer = storage.user_by_email(DEMO_CUSTOMER_EMAIL).unwrap().unwrap();
            storage
                .search_businesses(&BusinessQuery::new(100))
                .unwrap()
                .items
                .into_iter()
                .find(|b| !storage.has_reviewed(customer.id, b.id).unwrap())
                .unwrap()
                .slug
        };
        let uri = format!("/business/{slug}/review");

        let response = post_form(&state, &uri, "rating=&title=&body=", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Title is required"));

        let body = "rating=4&title=Solid+work&body=Arrived+on+time+and+cleaned+up+afterwards.";
        let response = post_form(&state, &uri, body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            format!("/business/{slug}/reviews?notice=review-posted")
        );

        let response = post_form(&state, &uri, body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_redirects_to_next() {
        let state = seeded_state();
        let body = format!(
            "email={}&password={DEMO_PASSWORD}&next=/search",
            DEMO_CUSTOMER_EMAIL.replace('@', "%40")
        );
        let response = post_form(&state, "/login", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/search?notice=logged-in");
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(cookie.starts_with(&format!("{}=", state.config().auth.cookie_name)));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password_and_offsite_next() {
        let state = seeded_state();
        let body = format!(
            "email={}&password=wrong-password&next=https://evil.example",
            DEMO_CUSTOMER_EMAIL.replace('@', "%40")
        );
        let response = post_form(&state, "/login", &body, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("incorrect"));
    }

    #[tokio::test]
    async fn test_login_ignores_next_with_control_characters() {
        let state = seeded_state();
        for next in ["%2F%09%2Fevil.example", "%2F%0A%2Fevil.example"] {
            let body = format!(
                "email={}&password={DEMO_PASSWORD}&next={next}",
                DEMO_CUSTOMER_EMAIL.replace('@', "%40")
            );
            let response = post_form(&state, "/login", &body, None).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), "/dashboard?notice=logged-in", "{next}");
        }
    }

    #[tokio::test]
    async fn test_empty_forms_are_unprocessable() {
        let state = seeded_state();
        for uri in ["/login", "/register", "/forgot-password", "/reset-password"] {
            let response = post_form(&state, uri, "", None).await;
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let state = seeded_state();
        let body = format!(
            "name=Dup&email={}&password=longenough&confirm=longenough&role=consumer&terms=on",
            DEMO_CUSTOMER_EMAIL.replace('@', "%40")
        );
        let response = post_form(&state, "/register", &body, None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(body_text(response).await.contains("already exists"));
    }

    #[tokio::test]
    async fn test_forgot_password_does_not_reveal_accounts() {
        let state = seeded_state();
        let known = post_form(
            &state,
            "/forgot-password",
            &format!("email={}", DEMO_CUSTOMER_EMAIL.replace('@', "%40")),
            None,
        )
        .await;
        let unknown = post_form(&state, "/forgot-password", "email=nobody%40example.com", None).await;
        assert_eq!(known.status(), StatusCode::OK);
        assert_eq!(unknown.status(), StatusCode::OK);
        assert_eq!(body_text(known).await, body_text(unknown).await);
    }

    #[tokio::test]
    async fn test_reset_with_bad_token() {
        let state = seeded_state();
        let response = get_page(&state, "/reset-password?token=nope").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_owner_dashboard_pages() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_OWNER_EMAIL);
        let slug = owned_slug(&state);
        for uri in [
            "/dashboard".to_string(),
            format!("/dashboard/settings?business={slug}"),
            format!("/dashboard/analytics?business={slug}"),
        ] {
            let request = Request::get(&uri)
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap();
            let response = send(&state, request).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_customer_dashboard_suggests_claiming() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_CUSTOMER_EMAIL);
        let request = Request::get("/dashboard")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Claim your business"));

        let request = Request::get("/dashboard/settings")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&state, request).await.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_settings_save_redirects() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_OWNER_EMAIL);
        let slug = owned_slug(&state);
        let body = format!(
            "business={slug}&tagline=Fresh&phone=%28555%29+010-1000&email=shop%40example.com&hours_monday=9-5"
        );
        let response = post_form(&state, "/dashboard/settings", &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).ends_with("notice=settings-saved"));

        let storage = state.storage().unwrap();
        let business = storage.require_business(&slug).unwrap();
        assert_eq!(business.tagline, "Fresh");
        assert_eq!(business.hours.len(), 1);
    }

    /// Slug of an unowned listing that is not accredited.
    fn unclaimed_slug(state: &AppState) -> String {
        let storage = state.storage().unwrap();
        let query = BusinessQuery {
            unclaimed_only: true,
            ..BusinessQuery::new(100)
        };
        storage
            .search_businesses(&query)
            .unwrap()
            .items
            .into_iter()
            .find(|b| !b.accreditation.is_accredited() && !b.accreditation.is_pending())
            .unwrap()
            .slug
    }

    const CLAIM_FIELDS: &str = "position=Owner&phone=%28555%29+010-3000&method=phone&note=";

    #[tokio::test]
    async fn test_claim_wizard_files_claim() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_CUSTOMER_EMAIL);
        let slug = unclaimed_slug(&state);
        let uri = format!("/claim/{slug}");

        let response = post_form(&state, &uri, "step=1&action=next&position=", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Choose a role"));

        let body = format!("step=1&action=next&{CLAIM_FIELDS}");
        let response = post_form(&state, &uri, &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"name="step" value="2""#));

        let body = format!("step=3&action=back&{CLAIM_FIELDS}");
        let response = post_form(&state, &uri, &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"name="step" value="2""#));

        let body = format!("step=3&action=submit&{CLAIM_FIELDS}");
        let response = post_form(&state, &uri, &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = format!("step=3&action=submit&{CLAIM_FIELDS}&confirm=on");
        let response = post_form(&state, &uri, &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard?notice=claim-submitted");

        {
            let storage = state.storage().unwrap();
            let customer = storage.user_by_email(DEMO_CUSTOMER_EMAIL).unwrap().unwrap();
            let business = storage.require_business(&slug).unwrap();
            assert!(storage.pending_claim(customer.id, business.id).unwrap().is_some());
        }

        let response = post_form(&state, &uri, &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let request = Request::get(&uri)
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&state, request).await.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_claim_of_owned_listing_conflicts() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_CUSTOMER_EMAIL);
        let uri = format!("/claim/{}", owned_slug(&state));
        let body = format!("step=1&action=next&{CLAIM_FIELDS}");
        let response = post_form(&state, &uri, &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(body_text(response).await.contains("already been claimed"));
    }

    #[tokio::test]
    async fn test_claim_requires_login() {
        let state = seeded_state();
        let uri = format!("/claim/{}", unclaimed_slug(&state));
        let response = get_page(&state, &uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/login?next="));
    }

    #[tokio::test]
    async fn test_accreditation_wizard_submits_application() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_CUSTOMER_EMAIL);
        let slug = unclaimed_slug(&state);
        let business_id = {
            // The customer takes over a listing that has never been accredited.
            let storage = state.storage().unwrap();
            let customer = storage.user_by_email(DEMO_CUSTOMER_EMAIL).unwrap().unwrap();
            let business = storage.require_business(&slug).unwrap();
            let claim = storage
                .create_claim(&NewClaim {
                    business_id: business.id,
                    user_id: customer.id,
                    position: "Owner".to_string(),
                    phone: "(555) 010-3000".to_string(),
                    method: VerificationMethod::Phone,
                    note: String::new(),
                })
                .unwrap();
            storage.approve_claim(claim.id).unwrap();
            business.id
        };
        let fields = format!(
            "business_id={business_id}&years=6&employees=4&contact_name=Alex+Rivera\
             &email=alex%40pimp.example&phone=%28555%29+010-3000\
             &complaint_process=We+answer+every+complaint+within+two+business+days."
        );

        let response = get_page(&state, "/accreditation/apply").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let body = format!("step=1&action=next&{fields}").replace("employees=4", "employees=0");
        let response = post_form(&state, "/accreditation/apply", &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = format!("step=1&action=next&{fields}");
        let response = post_form(&state, "/accreditation/apply", &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"name="step" value="2""#));

        let body = format!("step=3&action=submit&{fields}");
        let response = post_form(&state, "/accreditation/apply", &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("You must agree to the standards"));

        let body = format!("step=3&action=submit&{fields}&agree=on");
        let response = post_form(&state, "/accreditation/apply", &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard?notice=application-submitted");

        {
            let storage = state.storage().unwrap();
            let business = storage.require_business(&slug).unwrap();
            assert!(business.accreditation.is_pending());
        }

        // A pending listing is no longer offered.
        let response = post_form(&state, "/accreditation/apply", &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    /// The newest unanswered review on the demo owner's listing.
    fn owned_review_id(state: &AppState) -> i64 {
        let slug = owned_slug(state);
        let storage = state.storage().unwrap();
        storage
            .recent_reviews(1000)
            .unwrap()
            .into_iter()
            .find(|recent| recent.business_slug == slug && recent.review.response.is_none())
            .unwrap()
            .review
            .id
    }

    #[tokio::test]
    async fn test_owner_responds_to_review() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_OWNER_EMAIL);
        let review_id = owned_review_id(&state);
        let uri = format!("/dashboard/reviews/{review_id}/respond");

        let response = post_form(&state, &uri, "response=Thanks+for+visiting", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).ends_with("notice=response-posted"));

        let storage = state.storage().unwrap();
        let review = storage.review_by_id(review_id).unwrap().unwrap();
        assert_eq!(review.response.unwrap().body, "Thanks for visiting");
    }

    #[tokio::test]
    async fn test_respond_rejects_other_users() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_CUSTOMER_EMAIL);
        let uri = format!("/dashboard/reviews/{}/respond", owned_review_id(&state));
        let response = post_form(&state, &uri, "response=Not+my+listing", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = post_form(&state, "/dashboard/reviews/999999/respond", "response=Hi", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_respond_validates_length() {
        let state = seeded_state();
        let cookie = sign_in(&state, DEMO_OWNER_EMAIL);
        let review_id = owned_review_id(&state);
        let uri = format!("/dashboard/reviews/{review_id}/respond");

        let body = format!("response={}", "x".repeat(RESPONSE_MAX + 1));
        let response = post_form(&state, &uri, &body, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains(&format!("at most {RESPONSE_MAX} characters")));

        let response = post_form(&state, &uri, "response=+++", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_api_endpoints() {
        let state = seeded_state();
        let response = get_page(&state, "/api/categories").await;
        assert_eq!(response.status(), StatusCode::OK);
        let categories: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(categories.as_array().map(Vec::len), Some(crate::domain::CATEGORIES.len()));

        let response = get_page(&state, "/api/businesses?q=&page=1").await;
        let page: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(page["pagination"]["total"].as_u64().unwrap() > 0);

        let response = get_page(&state, "/api/businesses/no-such-business").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(error["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_helpful_vote_counts_up() {
        let state = seeded_state();
        let review_id = {
            let storage = state.storage().unwrap();
            storage.recent_reviews(1).unwrap()[0].review.id
        };
        let uri = format!("/api/reviews/{review_id}/helpful");
        let first: serde_json::Value =
            serde_json::from_str(&body_text(post_form(&state, &uri, "", None).await).await).unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&body_text(post_form(&state, &uri, "", None).await).await).unwrap();
        assert_eq!(
            second["helpful"].as_u64().unwrap(),
            first["helpful"].as_u64().unwrap() + 1
        );
    }

    #[tokio::test]
    async fn test_health() {
        let state = seeded_state();
        let response = get_page(&state, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[test]
    fn test_route_table_paths_are_unique() {
        let mut paths: Vec<&str> = ROUTES.iter().map(|r| r.path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), ROUTES.len());
    }
}
