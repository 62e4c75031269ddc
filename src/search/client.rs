use crate::error::{Error, Result};
use crate::flatten::{materialize_many, materialize_one, FlattenConfig, Flattener, SearchResponse};
use crate::hooks::{NoopHooks, SearchHooks, Span, SpanName};
use crate::search::parameters::SearchParameters;
use crate::search::retry::{
    deadline_after, retry_after, DEFAULT_RETRY_AFTER_SECS, RATE_LIMIT_RESET_HEADER,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use url::Url;

pub const CDN_URL: &str = "https://cdn.contentful.com";
pub const PREVIEW_URL: &str = "https://preview.contentful.com";

/// Configuration for the search client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Delivery or preview access token
    pub token: String,

    pub space_id: String,

    /// Use the preview API instead of the CDN
    pub preview: bool,

    /// Overrides the CDN/preview host
    pub base_url: Option<String>,

    /// Sent as `include` on every request
    pub include_depth: u8,

    /// Time budget for retrying rate-limited requests within one call.
    /// `None` fails on the first 429. Clamped to one year.
    pub retry_timeout: Option<Duration>,

    /// Wait when the rate limit reset header is missing
    pub default_retry_after_secs: u64,

    pub request_timeout: Duration,

    pub user_agent: String,

    pub flatten: FlattenConfig,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>, space_id: impl Into<String>, preview: bool) -> Self {
        ClientConfig {
            token: token.into(),
            space_id: space_id.into(),
            preview,
            ..Default::default()
        }
    }

    /// Host requests are sent to
    pub fn endpoint(&self) -> &str {
        match (&self.base_url, self.preview) {
            (Some(base_url), _) => base_url,
            (None, true) => PREVIEW_URL,
            (None, false) => CDN_URL,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            token: String::new(),
            space_id: String::new(),
            preview: false,
            base_url: None,
            include_depth: 10,
            retry_timeout: None,
            default_retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
            request_timeout: Duration::from_secs(30),
            user_agent: format!("contentful-flatten/{}", env!("CARGO_PKG_VERSION")),
            flatten: FlattenConfig::default(),
        }
    }
}

/// Blocking client for the entries endpoint
pub struct Client {
    config: ClientConfig,
    http: reqwest::blocking::Client,
    flattener: Flattener,
    hooks: Arc<dyn SearchHooks>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Client {
            flattener: Flattener::new(config.flatten.clone()),
            config,
            http,
            hooks: Arc::new(NoopHooks),
        })
    }

    /// Report span events to `hooks`
    pub fn with_hooks(mut self, hooks: Arc<dyn SearchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full entries URL for `params`, without the forced `include`
    pub fn entries_url(&self, params: &SearchParameters) -> Result<Url> {
        let base = self.config.endpoint().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/spaces/{}/entries", base, self.config.space_id))?;
        if !params.is_empty() {
            url.set_query(Some(&params.encode()));
        }
        Ok(url)
    }

    /// Fetch one page of raw search results
    pub fn search(&self, params: SearchParameters) -> Result<SearchResponse> {
        self.search_until(params, self.deadline())
    }

    /// Fetch entries and deserialize them into a list of `T`.
    ///
    /// Fails with [`Error::NoEntries`] when nothing matched.
    pub fn get_many<T: DeserializeOwned>(&self, params: SearchParameters) -> Result<Vec<T>> {
        let span = Span::start(self.hooks.as_ref(), SpanName::GetMany);
        let result = self.search_until(params, self.deadline()).and_then(|response| {
            ensure_entries(&response)?;
            let items = self.flatten(|flattener| flattener.flatten_many(response))?;
            materialize_many(items)
        });
        span.finish(&result);
        result
    }

    /// Fetch exactly one entry and deserialize it into `T`.
    ///
    /// Fails with [`Error::NoEntries`] or [`Error::MoreThanOneEntry`] when the
    /// search does not match exactly one entry.
    pub fn get_one<T: DeserializeOwned>(&self, params: SearchParameters) -> Result<T> {
        let span = Span::start(self.hooks.as_ref(), SpanName::GetOne);
        let result = self.search_until(params, self.deadline()).and_then(|mut response| {
            ensure_entries(&response)?;
            if response.total != 1 || response.items.len() != 1 {
                return Err(Error::MoreThanOneEntry);
            }

            let item = self.flatten(|flattener| {
                response.includes.inject_entries(&response.items);
                flattener.flatten_one(&response.items[0], &response.includes)
            })?;
            materialize_one(item)
        });
        span.finish(&result);
        result
    }

    fn deadline(&self) -> Option<Instant> {
        self.config
            .retry_timeout
            .map(|timeout| deadline_after(Instant::now(), timeout))
    }

    fn flatten<T>(&self, run: impl FnOnce(&Flattener) -> Result<T>) -> Result<T> {
        let span = Span::start(self.hooks.as_ref(), SpanName::Flatten);
        let result = run(&self.flattener);
        span.finish(&result);
        result
    }

    fn search_until(&self, params: SearchParameters, deadline: Option<Instant>) -> Result<SearchResponse> {
        let mut span = Span::start(self.hooks.as_ref(), SpanName::Search);
        let result = self.fetch(params, deadline, &mut span);
        span.finish(&result);
        result
    }

    fn fetch(&self, params: SearchParameters, deadline: Option<Instant>, span: &mut Span<'_>) -> Result<SearchResponse> {
        let params = params.set("include", self.config.include_depth.to_string());
        let url = self.entries_url(&params)?;

        span.attribute("http.host", url.host_str().unwrap_or_default());
        span.attribute("http.method", "GET");
        span.attribute("http.path", url.path());
        span.attribute("http.query", url.query().unwrap_or_default());

        loop {
            let response = self
                .http
                .get(url.clone())
                .bearer_auth(&self.config.token)
                .send()?;
            let status = response.status();
            span.attribute("http.status_code", status.as_u16());

            if status == StatusCode::TOO_MANY_REQUESTS {
                let reset = response
                    .headers()
                    .get(RATE_LIMIT_RESET_HEADER)
                    .and_then(|value| value.to_str().ok());
                let wait = retry_after(deadline, reset, self.config.default_retry_after_secs, Instant::now())
                    .ok_or(Error::TooManyRequests)?;

                span.attribute("http.ratelimit_reset", wait.as_secs());
                thread::sleep(wait);
                continue;
            }

            if status != StatusCode::OK {
                return Err(Error::Status(status.as_u16()));
            }

            let body = response.bytes()?;
            return serde_json::from_slice(&body).map_err(Error::Decode);
        }
    }
}

/// `NoEntries` unless both `total` and `items` report results
fn ensure_entries(response: &SearchResponse) -> Result<()> {
    if response.total == 0 || response.items.is_empty() {
        return Err(Error::NoEntries);
    }
    Ok(())
}
