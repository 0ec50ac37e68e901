//! Account handlers.
//!
//! ```text
//! GET  /user/signup   form
//! POST /user/signup   register
//! GET  /user/login    form
//! POST /user/login    authenticate and start a session
//! POST /user/logout   end the session (login required)
//! ```

use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, get, post, web};
use tracing::info;

use crate::domain::{ErrorCode, LoginCredentials, NewUser};
use crate::inbound::http::HttpResult;
use crate::inbound::http::auth::require_authenticated_user;
use crate::inbound::http::forms::{Form, email_regex};
use crate::inbound::http::pages::see_other;
use crate::inbound::http::render::Renderer;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::templates::Page;

pub(crate) const SIGNUP_FLASH: &str = "Your signup was successful. Please log in.";
pub(crate) const LOGOUT_FLASH: &str = "You've been logged out successfully!";
pub(crate) const DUPLICATE_EMAIL_MESSAGE: &str = "Address is already in use";
pub(crate) const BAD_CREDENTIALS_MESSAGE: &str = "Email or Password is incorrect";

const NAME_MAX_CHARS: usize = 255;
const EMAIL_MAX_CHARS: usize = 255;
const PASSWORD_MIN_CHARS: usize = 10;

#[get("/user/signup")]
pub async fn signup_form(renderer: Renderer) -> HttpResult<HttpResponse> {
    renderer.with_form(Form::new()).render(Page::Signup)
}

fn validate_signup(form: &mut Form) -> Option<NewUser> {
    form.required(&["name", "email", "password"]);
    form.max_length("name", NAME_MAX_CHARS);
    form.max_length("email", EMAIL_MAX_CHARS);
    form.matches_pattern("email", email_regex());
    form.min_length("password", PASSWORD_MIN_CHARS);
    form.valid()
        .then(|| NewUser::new(form.get("name"), form.get("email"), form.get("password")))
}

#[post("/user/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    renderer: Renderer,
    mut form: Form,
) -> HttpResult<HttpResponse> {
    let Some(user) = validate_signup(&mut form) else {
        return renderer.with_form(form).render(Page::Signup);
    };

    match state.signup.register(&user).await {
        Ok(()) => {
            session.put_flash(SIGNUP_FLASH)?;
            Ok(see_other("/user/login"))
        }
        Err(error) if error.code() == ErrorCode::Conflict => {
            form.add_error("email", DUPLICATE_EMAIL_MESSAGE);
            renderer.with_form(form).render(Page::Signup)
        }
        Err(error) => Err(error),
    }
}

#[get("/user/login")]
pub async fn login_form(renderer: Renderer) -> HttpResult<HttpResponse> {
    renderer.with_form(Form::new()).render(Page::Login)
}

fn validate_login(form: &mut Form) -> Option<LoginCredentials> {
    form.required(&["email", "password"]);
    if !form.valid() {
        return None;
    }
    match LoginCredentials::try_from_parts(form.get("email"), form.get("password")) {
        Ok(credentials) => Some(credentials),
        Err(error) => {
            form.add_generic_error(error.to_string());
            None
        }
    }
}

#[post("/user/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    renderer: Renderer,
    mut form: Form,
) -> HttpResult<HttpResponse> {
    let Some(credentials) = validate_login(&mut form) else {
        return renderer.with_form(form).render(Page::Login);
    };

    match state.login.authenticate(&credentials).await {
        Ok(user_id) => {
            session.renew();
            session.persist_user(user_id)?;
            info!(user_id = %user_id, "user logged in");
            Ok(see_other("/snippet/create"))
        }
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            form.add_generic_error(BAD_CREDENTIALS_MESSAGE);
            renderer.with_form(form).render(Page::Login)
        }
        Err(error) => Err(error),
    }
}

#[post("/user/logout", wrap = "from_fn(require_authenticated_user)")]
pub async fn logout(session: SessionContext) -> HttpResult<HttpResponse> {
    session.remove_user();
    session.renew();
    session.put_flash(LOGOUT_FLASH)?;
    Ok(see_other("/"))
}
