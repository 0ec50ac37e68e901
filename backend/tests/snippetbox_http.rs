//! End-to-end HTTP behaviour over the full middleware chain.
//!
//! The application runs in-process against the fixture ports, so no
//! database is needed. A small cookie jar carries the session between
//! requests the way a browser would.

use std::sync::{Arc, OnceLock};

use actix_web::body::{MessageBody, to_bytes};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{test, web};
use async_trait::async_trait;
use regex::Regex;
use rstest::rstest;

use snippetbox::domain::ports::{
    FIXTURE_DUPLICATE_EMAIL, FIXTURE_USER_EMAIL, FIXTURE_USER_PASSWORD, SnippetPersistenceError,
    SnippetRepository, SnippetsQuery,
};
use snippetbox::domain::{Error, NewSnippet, Snippet, SnippetId, SnippetService, TRACE_ID_HEADER};
use snippetbox::inbound::http::state::{HttpState, HttpStatePorts};
use snippetbox::inbound::http::templates::TemplateCache;
use snippetbox::server::{AppDependencies, SESSION_COOKIE, build_app};

/// Session cookie carried between requests.
#[derive(Default)]
struct Jar(Option<Cookie<'static>>);

impl Jar {
    fn attach(&self, req: test::TestRequest) -> test::TestRequest {
        match &self.0 {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    fn update<B>(&mut self, res: &ServiceResponse<B>) {
        if let Some(cookie) = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
        {
            self.0 = Some(cookie.into_owned());
        }
    }
}

fn state(ports: HttpStatePorts) -> web::Data<HttpState> {
    let templates = TemplateCache::load().expect("embedded templates parse");
    web::Data::new(HttpState::new(ports, Arc::new(templates)))
}

macro_rules! app {
    () => {
        app!(HttpStatePorts::fixtures())
    };
    ($ports:expr) => {
        test::init_service(build_app(AppDependencies {
            http_state: state($ports),
            key: Key::generate(),
            cookie_secure: false,
        }))
        .await
    };
}

macro_rules! call {
    ($app:expr, $jar:expr, $req:expr) => {{
        let res = test::call_service(&$app, $jar.attach($req).to_request()).await;
        $jar.update(&res);
        res
    }};
}

macro_rules! get_page {
    ($app:expr, $jar:expr, $uri:expr) => {{
        let res = call!($app, $jar, test::TestRequest::get().uri($uri));
        let status = res.status();
        (status, body_text(res).await)
    }};
}

/// Fetch `form_uri` for a token, then submit `fields` to `action`.
macro_rules! submit {
    ($app:expr, $jar:expr, $form_uri:expr, $action:expr, $fields:expr) => {{
        let (_, html) = get_page!($app, $jar, $form_uri);
        let token = csrf_token(&html);
        let mut fields: Vec<(&str, &str)> = $fields.to_vec();
        fields.push(("csrf_token", token.as_str()));
        call!(
            $app,
            $jar,
            test::TestRequest::post().uri($action).set_form(&fields)
        )
    }};
}

macro_rules! login {
    ($app:expr, $jar:expr) => {{
        let res = submit!(
            $app,
            $jar,
            "/user/login",
            "/user/login",
            [("email", FIXTURE_USER_EMAIL), ("password", FIXTURE_USER_PASSWORD)]
        );
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }};
}

async fn body_text<B: MessageBody>(res: ServiceResponse<B>) -> String {
    let bytes = test::read_body(res).await;
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

fn csrf_token(html: &str) -> String {
    static TOKEN_RX: OnceLock<Regex> = OnceLock::new();
    let rx = TOKEN_RX.get_or_init(|| {
        Regex::new(r"name='csrf_token' value='([^']+)'").expect("token pattern compiles")
    });
    rx.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|token| token.as_str().to_owned())
        .expect("page carries a csrf token")
}

fn location<B>(res: &ServiceResponse<B>) -> Option<&str> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Snippet repository whose every call fails the same way.
struct BrokenRepository(fn() -> SnippetPersistenceError);

#[async_trait]
impl SnippetRepository for BrokenRepository {
    async fn insert(&self, _snippet: &NewSnippet) -> Result<SnippetId, SnippetPersistenceError> {
        Err((self.0)())
    }

    async fn find_live(&self, _id: SnippetId) -> Result<Option<Snippet>, SnippetPersistenceError> {
        Err((self.0)())
    }

    async fn latest_live(&self, _limit: i64) -> Result<Vec<Snippet>, SnippetPersistenceError> {
        Err((self.0)())
    }
}

/// Snippet lookups that panic mid-request.
struct PanickingSnippets;

#[async_trait]
impl SnippetsQuery for PanickingSnippets {
    async fn get(&self, _id: SnippetId) -> Result<Snippet, Error> {
        panic!("snippet lookup exploded")
    }

    async fn latest(&self) -> Result<Vec<Snippet>, Error> {
        panic!("snippet listing exploded")
    }
}

#[actix_web::test]
async fn ping_answers_ok_with_hardening_headers() {
    let app = app!();
    let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;

    assert_eq!(res.status(), StatusCode::OK);
    let header_value = |name: &str| {
        res.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    assert_eq!(header_value("x-xss-protection").as_deref(), Some("1; mode=block"));
    assert_eq!(header_value("x-frame-options").as_deref(), Some("deny"));
    assert!(header_value(TRACE_ID_HEADER).is_some());
    assert_eq!(body_text(res).await, "OK");
}

#[actix_web::test]
async fn home_lists_latest_snippets() {
    let app = app!();
    let mut jar = Jar::default();
    let (status, html) = get_page!(app, jar, "/");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<th>Title</th>"));
    assert!(html.contains("An old silent pond"));
}

#[actix_web::test]
async fn about_page_renders() {
    let app = app!();
    let mut jar = Jar::default();
    let (status, html) = get_page!(app, jar, "/about");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Lorem ipsum dolor sit amet consectetur"));
}

#[actix_web::test]
async fn existing_snippet_is_shown() {
    let app = app!();
    let mut jar = Jar::default();
    let (status, html) = get_page!(app, jar, "/snippet/1");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("An old silent pond..."));
}

#[rstest]
#[case("/snippet/2")]
#[case("/snippet/0")]
#[case("/snippet/-1")]
#[case("/snippet/1.23")]
#[case("/snippet/foo")]
#[case("/snippet/")]
#[case("/snippet/1/")]
#[case("/no/such/page")]
#[actix_web::test]
async fn unknown_snippets_and_paths_are_not_found(#[case] uri: &str) {
    let app = app!();
    let mut jar = Jar::default();
    let (status, body) = get_page!(app, jar, uri);
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Not Found");
}

#[actix_web::test]
async fn wrong_method_on_a_known_path_is_not_found() {
    let app = app!();
    let mut jar = Jar::default();
    let (status, _) = get_page!(app, jar, "/user/logout");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn store_unreachable() -> SnippetPersistenceError {
    SnippetPersistenceError::connection("connection refused")
}

fn query_failed() -> SnippetPersistenceError {
    SnippetPersistenceError::query("relation \"snippets\" does not exist")
}

#[rstest]
#[case(store_unreachable)]
#[case(query_failed)]
#[actix_web::test]
async fn store_failures_are_internal_errors(#[case] failure: fn() -> SnippetPersistenceError) {
    let service = Arc::new(SnippetService::new(Arc::new(BrokenRepository(failure))));
    let mut ports = HttpStatePorts::fixtures();
    ports.snippets = service.clone();
    ports.snippets_query = service;

    let app = app!(ports);
    let mut jar = Jar::default();
    for uri in ["/", "/snippet/1"] {
        let (status, body) = get_page!(app, jar, uri);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");
    }
}

#[actix_web::test]
async fn handler_panics_become_closing_500s() {
    let mut ports = HttpStatePorts::fixtures();
    ports.snippets_query = Arc::new(PanickingSnippets);
    let app = app!(ports);

    let req = test::TestRequest::get().uri("/snippet/1").to_request();
    let error = match test::try_call_service(&app, req).await {
        Ok(res) => panic!("expected the panic to surface, got {}", res.status()),
        Err(error) => error,
    };
    let res = error.error_response();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let header_value = |name: header::HeaderName| {
        res.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    assert_eq!(header_value(header::CONNECTION).as_deref(), Some("close"));
    assert_eq!(header_value(header::X_FRAME_OPTIONS).as_deref(), Some("deny"));
    let body = to_bytes(res.into_body()).await.expect("body collects");
    assert_eq!(body, "Internal Server Error");

    let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn malformed_percent_escapes_are_bad_requests() {
    let app = app!();
    let mut jar = Jar::default();
    login!(app, jar);
    let (_, html) = get_page!(app, jar, "/snippet/create");
    let token = csrf_token(&html);

    let body = format!("title=%zz&content=x&expires=7&csrf_token={token}");
    let res = call!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/snippet/create")
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload(body)
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(res).await, "Bad Request");
}

#[actix_web::test]
async fn non_utf8_form_bodies_are_bad_requests() {
    let app = app!();
    let mut jar = Jar::default();
    let _ = get_page!(app, jar, "/user/login");

    let res = call!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/user/login")
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload(vec![b'e', b'=', 0xff, 0xfe])
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn posts_without_a_csrf_token_are_rejected() {
    let app = app!();
    let mut jar = Jar::default();
    let _ = get_page!(app, jar, "/user/login");

    let res = call!(
        app,
        jar,
        test::TestRequest::post().uri("/user/login").set_form([
            ("email", FIXTURE_USER_EMAIL),
            ("password", FIXTURE_USER_PASSWORD),
        ])
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(res).await, "Bad Request");
}

#[actix_web::test]
async fn stale_csrf_tokens_are_rejected() {
    let app = app!();
    let mut jar = Jar::default();
    let _ = get_page!(app, jar, "/user/login");

    let res = call!(
        app,
        jar,
        test::TestRequest::post().uri("/user/login").set_form([
            ("email", FIXTURE_USER_EMAIL),
            ("password", FIXTURE_USER_PASSWORD),
            ("csrf_token", "forged"),
        ])
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn create_form_requires_login() {
    let app = app!();
    let mut jar = Jar::default();

    let res = call!(app, jar, test::TestRequest::get().uri("/snippet/create"));
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/user/login"));

    let (status, html) = get_page!(app, jar, "/user/login");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Please log in before continuing."));
    assert!(html.contains(r#"<input type="submit" value="Login">"#));
}

#[actix_web::test]
async fn wrong_credentials_redisplay_login_and_keep_session() {
    let app = app!();
    let mut jar = Jar::default();
    let (_, html) = get_page!(app, jar, "/user/login");
    let token = csrf_token(&html);

    let req = jar.attach(test::TestRequest::post().uri("/user/login").set_form([
        ("email", FIXTURE_USER_EMAIL),
        ("password", "wrong-password"),
        ("csrf_token", token.as_str()),
    ]));
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.response()
            .cookies()
            .all(|cookie| cookie.name() != SESSION_COOKIE),
        "a failed login must not touch the session"
    );
    let html = body_text(res).await;
    assert!(html.contains("Email or Password is incorrect"));
    assert!(html.contains(&format!("value='{FIXTURE_USER_EMAIL}'")));

    let res = call!(app, jar, test::TestRequest::get().uri("/snippet/create"));
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn blank_login_fields_are_flagged() {
    let app = app!();
    let mut jar = Jar::default();
    let res = submit!(
        app,
        jar,
        "/user/login",
        "/user/login",
        [("email", ""), ("password", "")]
    );
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert_eq!(html.matches("This field cannot be blank").count(), 2);
}

#[actix_web::test]
async fn login_grants_access_to_the_create_form() {
    let app = app!();
    let mut jar = Jar::default();
    let res = submit!(
        app,
        jar,
        "/user/login",
        "/user/login",
        [("email", FIXTURE_USER_EMAIL), ("password", FIXTURE_USER_PASSWORD)]
    );
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/snippet/create"));

    let res = call!(app, jar, test::TestRequest::get().uri("/snippet/create"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok()),
        Some("no-store")
    );
    let html = body_text(res).await;
    assert!(html.contains(r#"<input type="submit" value="Publish snippet">"#));
    assert!(html.contains("Logout (Alice)"));
}

#[actix_web::test]
async fn valid_snippet_redirects_to_its_page() {
    let app = app!();
    let mut jar = Jar::default();
    login!(app, jar);

    let res = submit!(
        app,
        jar,
        "/snippet/create",
        "/snippet/create",
        [
            ("title", "O snail"),
            ("content", "O snail\nClimb Mount Fuji,"),
            ("expires", "7"),
        ]
    );
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/snippet/2"));

    let (_, html) = get_page!(app, jar, "/");
    assert!(html.contains("Snippet successfully created!"));
    let (_, html) = get_page!(app, jar, "/");
    assert!(!html.contains("Snippet successfully created!"));
}

#[actix_web::test]
async fn invalid_snippet_redisplays_the_form() {
    let app = app!();
    let mut jar = Jar::default();
    login!(app, jar);

    let res = submit!(
        app,
        jar,
        "/snippet/create",
        "/snippet/create",
        [("title", ""), ("content", "kept content"), ("expires", "30")]
    );
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert!(html.contains("This field cannot be blank"));
    assert!(html.contains("This field is invalid"));
    assert!(html.contains("kept content"));
}

#[actix_web::test]
async fn anonymous_snippet_posts_are_redirected() {
    let app = app!();
    let mut jar = Jar::default();
    let res = submit!(
        app,
        jar,
        "/user/login",
        "/snippet/create",
        [("title", "t"), ("content", "c"), ("expires", "1")]
    );
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/user/login"));
}

#[actix_web::test]
async fn signup_redirects_to_login_with_a_flash() {
    let app = app!();
    let mut jar = Jar::default();
    let res = submit!(
        app,
        jar,
        "/user/signup",
        "/user/signup",
        [
            ("name", "Bob"),
            ("email", "bob@example.com"),
            ("password", "validPa$$word"),
        ]
    );
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/user/login"));

    let (_, html) = get_page!(app, jar, "/user/login");
    assert!(html.contains("Your signup was successful. Please log in."));
}

#[actix_web::test]
async fn duplicate_email_is_a_field_error() {
    let app = app!();
    let mut jar = Jar::default();
    let res = submit!(
        app,
        jar,
        "/user/signup",
        "/user/signup",
        [
            ("name", "Bob"),
            ("email", FIXTURE_DUPLICATE_EMAIL),
            ("password", "validPa$$word"),
        ]
    );
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert!(html.contains("Address is already in use"));
    assert!(html.contains("value='Bob'"));
}

#[rstest]
#[case("", "bob@example.com", "validPa$$word", "This field cannot be blank")]
#[case("Bob", "bob@example.", "validPa$$word", "This field is invalid")]
#[case("Bob", "bob@example.com", "pa$$", "This field is too short (minimum is 10 characters)")]
#[actix_web::test]
async fn invalid_signups_redisplay_the_form(
    #[case] name: &str,
    #[case] email: &str,
    #[case] password: &str,
    #[case] message: &str,
) {
    let app = app!();
    let mut jar = Jar::default();
    let res = submit!(
        app,
        jar,
        "/user/signup",
        "/user/signup",
        [("name", name), ("email", email), ("password", password)]
    );
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains(message));
}

#[actix_web::test]
async fn logout_ends_the_session() {
    let app = app!();
    let mut jar = Jar::default();
    login!(app, jar);

    let res = submit!(app, jar, "/about", "/user/logout", [] as [(&str, &str); 0]);
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/"));

    let (_, html) = get_page!(app, jar, "/");
    assert!(html.contains("logged out successfully!"));
    assert!(!html.contains("Logout (Alice)"));

    let res = call!(app, jar, test::TestRequest::get().uri("/snippet/create"));
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}
