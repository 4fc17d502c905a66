//! Login handshake.
//!
//! Triggered when the resume page answers 403. Posts the credentials the
//! same way the login form does and inspects the JSON verdict.

use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use reqwest::multipart::Form;
use serde::Deserialize;

use crate::error::{BoostError, Result};
use crate::remote::client::HhClient;

const LOGIN_PATH: &str = "/account/login?backurl=%2Fapplicant%2Fresumes&role=applicant";

/// Verdict returned by the login endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginResponse {
    pub recaptcha: Recaptcha,
    pub hhcaptcha: HhCaptcha,
    pub redirect_url: String,
    pub login_error: LoginError,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Recaptcha {
    pub is_bot: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HhCaptcha {
    pub is_bot: bool,
    pub captcha_state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginError {
    pub code: String,
    #[serde(rename = "trl")]
    pub translation: String,
}

impl LoginResponse {
    /// Turn the verdict into an error if the login did not go through.
    pub fn check(&self) -> Result<()> {
        if self.recaptcha.is_bot {
            return Err(BoostError::Auth("triggered ReCaptcha bot protection".to_string()));
        }
        if self.hhcaptcha.is_bot {
            return Err(BoostError::Auth(format!(
                "triggered HHCaptcha bot protection: state = {}",
                self.hhcaptcha.captcha_state
            )));
        }
        if !self.login_error.code.is_empty() {
            return Err(BoostError::Auth(format!(
                "\"{}\" / \"{}\"",
                self.login_error.code, self.login_error.translation
            )));
        }
        Ok(())
    }
}

impl HhClient {
    /// Log in with the configured credentials.
    pub async fn authenticate(&self, xsrf: &str) -> Result<()> {
        tracing::debug!("Authenticating in HH");

        let mut headers = self.xhr_headers(xsrf)?;
        headers.insert("x-hhtmsource", HeaderValue::from_static("account_login"));
        headers.insert("x-hhtmfrom", HeaderValue::from_static("main"));

        let form = Form::new()
            .text("accountType", "APPLICANT")
            .text("remember", "true")
            .text("username", self.login.clone())
            .text("password", self.password.clone())
            .text("failUrl", LOGIN_PATH)
            .text("captchaText", "");

        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .headers(headers)
            .multipart(form)
            .send()
            .await?;
        self.trace("POST", &response);

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let verdict: LoginResponse = response.json().await?;
        verdict.check()?;

        tracing::debug!(redirect = %verdict.redirect_url, "Authenticated successfully");
        Ok(())
    }
}

pub(crate) fn status_error(status: StatusCode) -> BoostError {
    BoostError::Status(status.as_u16())
}
