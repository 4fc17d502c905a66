//! HTTP client impersonating a mainline Chrome browser.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Response, Url};

use crate::config::AccountConfig;
use crate::error::{BoostError, Result};

/// Path of the applicant resume list page.
pub const RESUMES_PATH: &str = "/applicant/resumes?role=applicant";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(50);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(25);
const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Session with the HeadHunter web frontend.
///
/// Cookies live in memory for the lifetime of the process.
pub struct HhClient {
    pub(crate) http: reqwest::Client,
    jar: Arc<Jar>,
    endpoint: Url,
    pub(crate) login: String,
    pub(crate) password: String,
    http_debug: bool,
}

impl HhClient {
    /// Build a client for `account`.
    pub fn new(account: &AccountConfig, http_debug: bool) -> Result<Self> {
        let endpoint = Url::parse(&account.endpoint)
            .map_err(|e| BoostError::Parse(format!("HeadHunter endpoint URL: {}", e)))?;
        let jar = Arc::new(Jar::default());

        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .default_headers(browser_headers(account.chrome_version)?)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_idle_timeout(IDLE_TIMEOUT)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            http,
            jar,
            endpoint,
            login: account.login.clone(),
            password: account.password.clone(),
            http_debug,
        })
    }

    /// Absolute URL for a path (with optional query) on the endpoint.
    pub fn url(&self, path_and_query: &str) -> Url {
        build_url(&self.endpoint, path_and_query)
    }

    /// Headers the frontend sends on its XHR calls.
    pub(crate) fn xhr_headers(&self, xsrf: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHTTPRequest"));
        headers.insert("accept", HeaderValue::from_static("application/json"));
        headers.insert("x-xsrftoken", header_value(xsrf)?);
        headers.insert("referer", header_value(self.url(RESUMES_PATH).as_str())?);
        headers.extend(self.gss_headers());
        Ok(headers)
    }

    /// Mirror the anti-bot cookies into their request headers.
    fn gss_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(cookies) = self.jar.cookies(&self.endpoint) else {
            return headers;
        };
        let Ok(cookies) = cookies.to_str() else {
            return headers;
        };
        for (name, value) in mirrored_cookies(cookies) {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(name, value);
            }
        }
        headers
    }

    /// Log the exchange when HTTP debugging is on.
    pub(crate) fn trace(&self, method: &str, response: &Response) {
        if self.http_debug {
            tracing::debug!(
                method,
                url = %response.url(),
                status = response.status().as_u16(),
                "HTTP exchange"
            );
        }
    }
}

/// Join an endpoint with a fixed path and query, dropping any endpoint path.
pub(crate) fn build_url(endpoint: &Url, path_and_query: &str) -> Url {
    let (path, query) = match path_and_query.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path_and_query, None),
    };
    let mut url = endpoint.clone();
    url.set_path(path);
    url.set_query(query);
    url
}

/// Value of the `_xsrf` cookie set by a response.
pub(crate) fn xsrf_token(response: &Response) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name() == "_xsrf")
        .map(|cookie| cookie.value().to_string())
}

/// Pairs of (header name, value) for the cookies the frontend mirrors.
pub(crate) fn mirrored_cookies(cookie_header: &str) -> Vec<(HeaderName, &str)> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .filter_map(|(name, value)| {
            let header = match name {
                "gsscgib-w-hh" => "x-gib-gsscgib-w-hh",
                "fgsscgib-w-hh" => "x-gib-fgsscgib-w-hh",
                _ => return None,
            };
            Some((HeaderName::from_static(header), value))
        })
        .collect()
}

/// `Sec-Ch-Ua` brand list with randomized GREASE, the way Chrome builds it.
pub(crate) fn greased_brands(chrome_version: u32) -> String {
    const GREASE_CHARS: [char; 11] = [' ', '(', ':', '-', '.', '/', ')', ';', '=', '?', '_'];
    const GREASE_VERSIONS: [u32; 3] = [8, 99, 24];

    let mut rng = rand::rng();
    let grease1 = GREASE_CHARS[rng.random_range(0..GREASE_CHARS.len())];
    let grease2 = GREASE_CHARS[rng.random_range(0..GREASE_CHARS.len())];
    let grease3 = GREASE_VERSIONS[rng.random_range(0..GREASE_VERSIONS.len())];

    let mut brands = vec![
        format!("\"Chromium\";v=\"{}\"", chrome_version),
        format!("\"Google Chrome\";v=\"{}\"", chrome_version),
        format!("\"Not{}A{}Brand\";v=\"{}\"", grease1, grease2, grease3),
    ];
    brands.shuffle(&mut rng);
    brands.join(", ")
}

fn browser_headers(chrome_version: u32) -> Result<HeaderMap> {
    let user_agent = format!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36",
        chrome_version
    );

    let mut headers = HeaderMap::new();
    headers.insert("user-agent", header_value(&user_agent)?);
    headers.insert("sec-ch-ua", header_value(&greased_brands(chrome_version))?);
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Windows\""));
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert("accept-language", HeaderValue::from_static("en,ru;q=0.9"));
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| BoostError::Parse(format!("invalid header value: {}", e)))
}
