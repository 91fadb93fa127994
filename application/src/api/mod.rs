//! HTTP API definitions.

pub mod auth;
pub mod index;
mod page;
pub mod secret;

use axum::{middleware, routing::get, Extension, Router};
use service::command::{
    self, create_user_session, register_user, Command, SessionOutput,
};
use tracerr::Traced;

use crate::Service;

pub use self::{auth::Credentials, secret::Identity};

/// Builds the [`Router`] serving all the HTTP routes with the provided
/// [`Service`].
///
/// Every route of the protected sub-[`Router`] passes through the
/// [`secret::require_authenticated()`] guard.
#[must_use]
pub fn router<Db>(service: Service<Db>) -> Router
where
    Db: Clone + Send + Sync + 'static,
    Service<Db>: Command<
            command::RegisterUser,
            Ok = SessionOutput,
            Err = Traced<register_user::ExecutionError>,
        > + Command<
            command::CreateUserSession,
            Ok = SessionOutput,
            Err = Traced<create_user_session::ExecutionError>,
        >,
{
    let protected = Router::new()
        .route("/secret", get(secret::secret))
        .route_layer(middleware::from_fn(secret::require_authenticated::<Db>));

    Router::new()
        .route("/", get(index::index::<Db>))
        .route("/register", get(auth::home).post(auth::register::<Db>))
        .route("/login", get(auth::home).post(auth::login::<Db>))
        .route("/logout", get(auth::logout::<Db>))
        .merge(protected)
        .layer(Extension(service))
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use axum::{
        body::{self, Body},
        response::Response,
        Router,
    };
    use common::DateTime;
    use http::{header, Request, StatusCode};
    use service::{
        domain::user::{self, session},
        infra::Memory,
    };
    use tower::ServiceExt as _;

    use crate::Service;

    use super::router;

    const SECRET: &str = "test-secret";

    /// Creates a fresh application backed by an empty [`Memory`] store.
    fn app() -> Router {
        router(Service::<Memory>::new(
            service::Config::new(SECRET, Duration::from_secs(60)),
            Memory::new(),
        ))
    }

    /// Sends the provided `req` to the `app`, keeping its store for the
    /// following requests.
    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::get(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        send(app, req.body(Body::empty()).unwrap()).await
    }

    async fn post_form(app: &Router, uri: &str, form: &str) -> Response {
        send(
            app,
            Request::post(uri)
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from(form.to_owned()))
                .unwrap(),
        )
        .await
    }

    fn token(username: &str, secret: &str) -> String {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &session::Claims {
                username: user::Username::new(username).unwrap(),
                expires_at: (DateTime::now() + Duration::from_secs(60))
                    .coerce(),
            },
            &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn set_cookies(resp: &Response) -> Vec<String> {
        resp.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_owned())
            .collect()
    }

    /// Returns the `session` cookie established by the `resp`, ready to be
    /// sent back.
    fn session_cookie(resp: &Response) -> Option<String> {
        set_cookies(resp)
            .into_iter()
            .filter_map(|c| c.split(';').next().map(str::to_owned))
            .find(|c| c.starts_with("session=") && c != "session=")
    }

    fn assert_redirected_with(resp: &Response, notice: Option<&str>) {
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/");

        let notices = set_cookies(resp)
            .into_iter()
            .filter(|c| c.starts_with("notice="))
            .collect::<Vec<_>>();
        match notice {
            Some(code) => {
                assert_eq!(notices.len(), 1, "{notices:?}");
                assert!(
                    notices[0].starts_with(&format!("notice={code};")),
                    "{notices:?}",
                );
            }
            None => assert!(notices.is_empty(), "{notices:?}"),
        }
    }

    async fn text(resp: Response) -> String {
        let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn guard_redirects_anonymous() {
        let resp = get(&app(), "/secret", None).await;

        assert_redirected_with(&resp, Some("login_required"));
        assert!(text(resp).await.is_empty());
    }

    #[tokio::test]
    async fn guard_admits_authenticated() {
        let cookie = format!("session={}", token("alice", SECRET));

        let resp = get(&app(), "/secret", Some(&cookie)).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(set_cookies(&resp).is_empty());
        assert!(text(resp).await.contains("Secret page of alice"));
    }

    #[tokio::test]
    async fn guard_treats_invalid_tokens_as_anonymous() {
        let app = app();
        let forged = format!("session={}", token("alice", "other-secret"));

        for cookie in [forged.as_str(), "session=garbage", "session="] {
            let resp = get(&app, "/secret", Some(cookie)).await;

            assert_redirected_with(&resp, Some("login_required"));
        }
    }

    #[tokio::test]
    async fn secret_page_escapes_username() {
        let cookie = format!("session={}", token("<b>", SECRET));

        let resp = get(&app(), "/secret", Some(&cookie)).await;

        let page = text(resp).await;
        assert!(page.contains("&lt;b&gt;"));
        assert!(!page.contains("<b>"));
    }

    #[tokio::test]
    async fn registration_logs_in() {
        let app = app();

        let resp =
            post_form(&app, "/register", "username=alice&password=pw1").await;

        assert_redirected_with(&resp, Some("registered"));
        let session = set_cookies(&resp)
            .into_iter()
            .find(|c| c.starts_with("session="))
            .expect("no `session` cookie");
        assert!(session.contains("HttpOnly"), "{session}");
        assert!(session.contains("SameSite=Lax"), "{session}");
        assert!(session.contains("Path=/"), "{session}");

        let cookie = session_cookie(&resp).unwrap();
        let page = text(get(&app, "/", Some(&cookie)).await).await;
        assert!(page.contains("Logged in as alice"));
    }

    #[tokio::test]
    async fn registration_refuses_taken_username() {
        let app = app();
        let resp =
            post_form(&app, "/register", "username=alice&password=pw1").await;
        assert_redirected_with(&resp, Some("registered"));

        let resp =
            post_form(&app, "/register", "username=alice&password=pw2").await;

        assert_redirected_with(&resp, Some("user_exists"));
        assert!(session_cookie(&resp).is_none());

        let resp =
            post_form(&app, "/login", "username=alice&password=pw2").await;
        assert_redirected_with(&resp, Some("wrong_credentials"));
    }

    #[tokio::test]
    async fn login_sets_session_without_notice() {
        let app = app();
        _ = post_form(&app, "/register", "username=alice&password=pw1").await;

        let resp =
            post_form(&app, "/login", "username=alice&password=pw1").await;

        assert_redirected_with(&resp, None);
        let cookie = session_cookie(&resp).expect("no `session` cookie");
        let resp = get(&app, "/secret", Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(text(resp).await.contains("Secret page of alice"));
    }

    #[tokio::test]
    async fn registered_user_walks_through() {
        let app = app();

        let resp =
            post_form(&app, "/register", "username=alice&password=pw1").await;
        assert_redirected_with(&resp, Some("registered"));
        let cookie = session_cookie(&resp).unwrap();

        let resp = get(&app, "/logout", Some(&cookie)).await;
        assert_redirected_with(&resp, Some("logged_out"));
        assert!(session_cookie(&resp).is_none());

        let resp =
            post_form(&app, "/login", "username=alice&password=wrong").await;
        assert_redirected_with(&resp, Some("wrong_credentials"));
        assert!(session_cookie(&resp).is_none());

        let resp =
            post_form(&app, "/login", "username=alice&password=pw1").await;
        assert_redirected_with(&resp, None);
        let cookie = session_cookie(&resp).unwrap();

        let resp = get(&app, "/secret", Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(text(resp).await.contains("Secret page of alice"));
    }

    #[tokio::test]
    async fn unknown_user_stays_outside() {
        let app = app();

        let resp = post_form(&app, "/login", "username=bob&password=pw1").await;
        assert_redirected_with(&resp, Some("wrong_credentials"));
        assert!(session_cookie(&resp).is_none());

        let resp = get(&app, "/secret", None).await;
        assert_redirected_with(&resp, Some("login_required"));
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let cookie = format!("session={}", token("alice", SECRET));

        let resp = get(&app(), "/logout", Some(&cookie)).await;

        assert_redirected_with(&resp, Some("logged_out"));
        assert!(set_cookies(&resp).iter().any(|c| {
            c.starts_with("session=;") && c.contains("Max-Age=0")
        }));
    }

    #[tokio::test]
    async fn logout_is_unconditional() {
        let resp = get(&app(), "/logout", None).await;

        assert_redirected_with(&resp, Some("logged_out"));
    }

    #[tokio::test]
    async fn index_shows_notice_once() {
        let app = app();
        let resp = get(&app, "/", Some("notice=logged_out")).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(set_cookies(&resp).iter().any(|c| {
            c.starts_with("notice=;") && c.contains("Max-Age=0")
        }));
        assert!(text(resp).await.contains("Logged out"));

        let resp = get(&app, "/", None).await;

        assert!(set_cookies(&resp).is_empty());
        assert!(!text(resp).await.contains("Logged out"));
    }

    #[tokio::test]
    async fn index_ignores_unknown_notice() {
        let resp = get(&app(), "/", Some("notice=%3Cscript%3E")).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!text(resp).await.contains("class=\"notice\""));
    }

    #[tokio::test]
    async fn index_names_authenticated_user() {
        let cookie = format!("session={}", token("alice", SECRET));

        let page = text(get(&app(), "/", Some(&cookie)).await).await;

        assert!(page.contains("Logged in as alice"));
    }

    #[tokio::test]
    async fn form_routes_redirect_on_get() {
        let app = app();

        for uri in ["/register", "/login"] {
            let resp = get(&app, uri, None).await;

            assert_redirected_with(&resp, None);
            assert!(set_cookies(&resp).is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_registration_is_invalid_input() {
        let app = app();
        let long = "a".repeat(user::Username::MAX_LEN + 1);

        for form in [
            "username=&password=pw1".to_owned(),
            "password=pw1".to_owned(),
            format!("username={long}&password=pw1"),
            "username=a%00b&password=pw1".to_owned(),
            "username=alice&password=p%00w".to_owned(),
        ] {
            let resp = post_form(&app, "/register", &form).await;

            assert_redirected_with(&resp, Some("invalid_input"));
            assert!(session_cookie(&resp).is_none());
        }
    }

    #[tokio::test]
    async fn malformed_login_is_wrong_credentials() {
        let app = app();

        for form in [
            "username=&password=pw1",
            "username=a%00b&password=pw1",
            "username=alice&password=p%00w",
        ] {
            let resp = post_form(&app, "/login", form).await;

            assert_redirected_with(&resp, Some("wrong_credentials"));
            assert!(session_cookie(&resp).is_none());
        }
    }
}
