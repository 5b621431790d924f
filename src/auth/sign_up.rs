//! The sign-up page and the route handler for creating a new user.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{PASSWORD_MIN_LENGTH, PasswordHash, User, ValidatedPassword, create_user, set_auth_cookie},
    category::create_default_categories,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        email_input, loading_spinner, log_in_register, password_input,
    },
    timezone::get_local_offset,
};

const INVALID_EMAIL_ERROR_MSG: &str = "Ingresa un correo electrónico válido";
const DUPLICATE_EMAIL_ERROR_MSG: &str = "Ya existe una cuenta con este correo";
const PASSWORD_MISMATCH_ERROR_MSG: &str = "Las contraseñas no coinciden";
const INTERNAL_ERROR_MSG: &str = "No se pudo crear la cuenta. Inténtalo de nuevo más tarde.";

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirmar contraseña"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length);

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

/// Error messages shown under each sign-up field.
#[derive(Default)]
struct SignUpErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
    form: Option<&'a str>,
}

fn sign_up_form(email: &str, errors: SignUpErrors<'_>) -> Markup {
    // `PASSWORD_MIN_LENGTH` is small enough to always fit.
    let min_length = u8::try_from(PASSWORD_MIN_LENGTH).unwrap_or(u8::MAX);

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, errors.email))
            (password_input(min_length, errors.password))
            (confirm_password_input(min_length, errors.confirm_password))

            @if let Some(error_message) = errors.form
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Crear cuenta"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "¿Ya tienes una cuenta? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Inicia sesión"
                }
            }
        }
    }
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    let sign_up_form = sign_up_form("", SignUpErrors::default());
    let content = log_in_register("Crea una nueva cuenta", &sign_up_form);
    base("Crear cuenta", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "America/Bogota".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignUpState> for Key {
    fn from_ref(state: &SignUpState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Serialize, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create the user and their default categories in one SQL transaction.
fn create_user_with_categories(
    email: EmailAddress,
    password_hash: PasswordHash,
    db_connection: &Mutex<Connection>,
) -> Result<User, Error> {
    let connection = db_connection.lock().map_err(|_| Error::DatabaseLockError)?;
    let transaction = connection.unchecked_transaction()?;

    let user = create_user(email, password_hash, &transaction)?;
    create_default_categories(user.id, &transaction)?;

    transaction.commit()?;

    Ok(user)
}

/// Handler for sign-up requests.
///
/// On success the user is signed in and redirected to the dashboard,
/// otherwise the form is returned with messages explaining the problem.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<SignUpForm>,
) -> Response {
    let email = match EmailAddress::from_str(user_data.email.trim()) {
        Ok(email) => email,
        Err(_) => {
            return sign_up_form(
                &user_data.email,
                SignUpErrors {
                    email: Some(INVALID_EMAIL_ERROR_MSG),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return sign_up_form(
            &user_data.email,
            SignUpErrors {
                confirm_password: Some(PASSWORD_MISMATCH_ERROR_MSG),
                ..Default::default()
            },
        )
        .into_response();
    }

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(Error::TooWeak(message)) => {
            return sign_up_form(
                &user_data.email,
                SignUpErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unexpected error while validating a password: {error}");
            return internal_error_form(&user_data.email);
        }
    };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("An error occurred while hashing a password: {error}");
            return internal_error_form(&user_data.email);
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let user = match create_user_with_categories(email, password_hash, &state.db_connection) {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return sign_up_form(
                &user_data.email,
                SignUpErrors {
                    email: Some(DUPLICATE_EMAIL_ERROR_MSG),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return internal_error_form(&user_data.email);
        }
    };

    tracing::info!("Created user {} ({})", user.id, user.email);

    redirect_after_sign_up(set_auth_cookie(
        jar,
        user.id,
        state.cookie_duration,
        local_offset,
    ))
}

/// Send a new user to the dashboard, or to the log-in page if their auth
/// cookie could not be set.
fn redirect_after_sign_up(jar: Result<PrivateCookieJar, Error>) -> Response {
    match jar {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                (),
            )
                .into_response()
        }
    }
}

fn internal_error_form(email: &str) -> Response {
    sign_up_form(
        email,
        SignUpErrors {
            form: Some(INTERNAL_ERROR_MSG),
            ..Default::default()
        },
    )
    .into_response()
}
