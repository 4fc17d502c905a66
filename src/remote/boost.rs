//! Boost ("touch") a single resume.

use reqwest::StatusCode;
use reqwest::multipart::Form;

use crate::domain::Item;
use crate::error::{BoostError, Result};
use crate::remote::auth::status_error;
use crate::remote::client::HhClient;

const TOUCH_PATH: &str = "/applicant/resumes/touch";

/// Map the touch endpoint's status to a boost outcome.
pub(crate) fn boost_outcome(status: StatusCode) -> Result<()> {
    if status == StatusCode::CONFLICT {
        return Err(BoostError::TooEarly);
    }
    if !status.is_success() {
        return Err(status_error(status));
    }
    Ok(())
}

impl HhClient {
    /// Boost `item`, reusing the XSRF token captured when it was discovered.
    pub async fn boost(&self, item: &Item) -> Result<()> {
        tracing::debug!(title = %item.title, "Boosting resume");

        let form = Form::new()
            .text("resume", item.id.clone())
            .text("undirectable", "true");

        let response = self
            .http
            .post(self.url(TOUCH_PATH))
            .headers(self.xhr_headers(&item.session_token)?)
            .multipart(form)
            .send()
            .await?;
        self.trace("POST", &response);

        boost_outcome(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_too_early() {
        let err = boost_outcome(StatusCode::CONFLICT).unwrap_err();
        assert!(err.is_too_early());
    }

    #[test]
    fn test_success_statuses() {
        assert!(boost_outcome(StatusCode::OK).is_ok());
        assert!(boost_outcome(StatusCode::NO_CONTENT).is_ok());
    }

    #[test]
    fn test_other_failures() {
        let err = boost_outcome(StatusCode::INTERNAL_SERVER_ERROR).unwrap_err();
        assert!(matches!(err, BoostError::Status(500)));
        assert!(!err.is_too_early());
    }
}
