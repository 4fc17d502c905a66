//! Resume discovery: scrape the applicant resume page.
//!
//! The page embeds its initial state as JSON inside
//! `<template id="HH-Lux-InitialState">`; the resume list lives under
//! `applicantResumes`.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::domain::Item;
use crate::error::{BoostError, Result};
use crate::remote::auth::status_error;
use crate::remote::client::{HhClient, RESUMES_PATH, xsrf_token};

const INITIAL_STATE_ID: &str = "HH-Lux-InitialState";

/// Initial state embedded in the resume page.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InitialState {
    pub account: Account,
    pub applicant_resumes: Vec<ApplicantResume>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Account {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApplicantResume {
    #[serde(rename = "_attributes")]
    pub attributes: ResumeAttributes,
    pub title: Vec<TitlePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeAttributes {
    pub hash: String,
    pub has_public_visibility: bool,
    /// Last update, unix milliseconds
    pub updated: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TitlePart {
    #[serde(rename = "string")]
    pub data: String,
}

impl InitialState {
    /// Convert the resume list into items carrying `xsrf`.
    pub fn into_items(self, xsrf: &str) -> Vec<Item> {
        self.applicant_resumes
            .into_iter()
            .map(|resume| {
                let title = resume
                    .title
                    .iter()
                    .map(|part| part.data.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                let updated = DateTime::<Utc>::from_timestamp_millis(resume.attributes.updated).unwrap_or_default();
                Item::new(
                    resume.attributes.hash,
                    title,
                    resume.attributes.has_public_visibility,
                    updated,
                    xsrf,
                )
            })
            .collect()
    }
}

impl HhClient {
    /// Fetch the current resume list, logging in once if required.
    pub async fn fetch_resumes(&self) -> Result<Vec<Item>> {
        tracing::debug!("Getting resume list from HH");

        let mut logged_in = false;
        loop {
            let response = self
                .http
                .get(self.url(RESUMES_PATH))
                .headers(document_headers())
                .send()
                .await?;
            self.trace("GET", &response);

            let xsrf = xsrf_token(&response).ok_or(BoostError::MissingSessionToken)?;
            let status = response.status();

            if status == StatusCode::FORBIDDEN && !logged_in {
                tracing::debug!("Got HTTP 403, attempting to authenticate");
                self.authenticate(&xsrf).await?;
                logged_in = true;
                continue;
            }
            if !status.is_success() {
                return Err(status_error(status));
            }

            let body = response.text().await?;
            tracing::debug!("Parsing resume list response body");

            let state = parse_initial_state(&body)?;
            tracing::info!(
                email = %state.account.email,
                name = %format!("{} {}", state.account.first_name, state.account.last_name),
                phone = %state.account.phone,
                "Extracted HH account info"
            );
            tracing::debug!(num_resumes = state.applicant_resumes.len(), "Extracting resumes");

            return Ok(state.into_items(&xsrf));
        }
    }
}

fn document_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers
}

/// Locate and decode the initial state JSON in a resume page.
pub(crate) fn parse_initial_state(html: &str) -> Result<InitialState> {
    let raw = extract_initial_state(html)
        .ok_or_else(|| BoostError::Parse("missing HH-Lux-InitialState template".to_string()))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Text content of the `HH-Lux-InitialState` template, entities decoded.
///
/// Only the template's direct text children are joined; the id match is
/// case-insensitive.
pub(crate) fn extract_initial_state(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let templates = Selector::parse("template").ok()?;

    document
        .select(&templates)
        .find(|template| {
            template
                .value()
                .attr("id")
                .is_some_and(|id| id.eq_ignore_ascii_case(INITIAL_STATE_ID))
        })
        .map(|template| {
            template
                .children()
                .filter_map(|child| child.value().as_text())
                .map(|text| &**text)
                .collect()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Resumes</title></head>
<body>
<template id="other">{"ignored": true}</template>
<template id="HH-Lux-InitialState">{"account": {"email": "me@example.com", "firstName": "Ivan", "lastName": "Petrov"},
"applicantResumes": [
  {"_attributes": {"hash": "abc123", "hasPublicVisibility": true, "updated": 1700000000000},
   "title": [{"string": "Rust developer"}, {"string": "Backend"}]},
  {"_attributes": {"hash": "def456", "hasPublicVisibility": false, "updated": 1700000360000},
   "title": [{"string": "Tech &amp; Ops"}]}
]}</template>
</body></html>"#;

    #[test]
    fn test_extract_initial_state() {
        let raw = extract_initial_state(PAGE).unwrap();
        assert!(raw.starts_with("{\"account\""));
        assert!(raw.contains("Tech & Ops"));
    }

    #[test]
    fn test_extract_initial_state_missing() {
        assert!(extract_initial_state("<html><template id=\"other\">x</template></html>").is_none());
        assert!(matches!(parse_initial_state("<html></html>"), Err(BoostError::Parse(_))));
    }

    #[test]
    fn test_numeric_and_named_entities_are_decoded() {
        let page = r#"<template id="HH-Lux-InitialState">{"applicantResumes": [
  {"_attributes": {"hash": "r1"}, "title": [{"string": "Rust &#8212; &lt;Dev&gt; &#x41;&nbsp;B"}]}
]}</template>"#;
        let items = parse_initial_state(page).unwrap().into_items("x");
        assert_eq!(items[0].title, "Rust \u{2014} <Dev> A\u{a0}B");
    }

    #[test]
    fn test_only_the_id_attribute_matches() {
        let page = r#"<template data-id="HH-Lux-InitialState">{}</template>
<templatex id="HH-Lux-InitialState">{}</templatex>"#;
        assert!(extract_initial_state(page).is_none());
    }

    #[test]
    fn test_id_match_ignores_case() {
        let page = r#"<TEMPLATE ID='hh-lux-initialstate'>{"applicantResumes": []}</TEMPLATE>"#;
        assert_eq!(extract_initial_state(page).as_deref(), Some(r#"{"applicantResumes": []}"#));
    }

    #[test]
    fn test_parse_resumes() {
        let state = parse_initial_state(PAGE).unwrap();
        assert_eq!(state.account.email, "me@example.com");

        let items = state.into_items("xsrf-token");
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].id, "abc123");
        assert_eq!(items[0].title, "Rust developer; Backend");
        assert!(items[0].visible);
        assert_eq!(items[0].last_refreshed_at.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(items[0].session_token, "xsrf-token");

        assert_eq!(items[1].id, "def456");
        assert_eq!(items[1].title, "Tech & Ops");
        assert!(!items[1].visible);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let page = r#"<template id="HH-Lux-InitialState">{not json</template>"#;
        assert!(matches!(parse_initial_state(page), Err(BoostError::Json(_))));
    }

    #[test]
    fn test_empty_state() {
        let page = r#"<template id='hh-lux-initialstate'>{}</template>"#;
        let items = parse_initial_state(page).unwrap().into_items("x");
        assert!(items.is_empty());
    }
}
