//! Online-judge adapter: plain form login, JSON homework calendar.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    AdapterError, Assignment, Credentials, JudgeItem, Platform, RawBatch, Result,
};
use crate::normalize::normalize;
use crate::source::AssignmentSource;
use crate::transport::{SessionTransport, TransportConfig};

/// Timestamp body of `endAt` once its offset suffix is stripped.
const END_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Length of the `+08:00`-style suffix `endAt` always carries.
const END_AT_SUFFIX_LEN: usize = 6;

/// Online-judge adapter configuration.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub base_url: String,
    pub transport: TransportConfig,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://acm.shanghaitech.edu.cn".to_string(),
            transport: TransportConfig {
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                     (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3"
                    .to_string(),
                ..TransportConfig::default()
            },
        }
    }
}

/// The online-judge adapter.
pub struct OnlineJudge {
    config: JudgeConfig,
}

/// A judge session. The login response body is not validated — the judge
/// answers the form POST with a cookie either way, and a bad login only
/// shows up when the homework fetch comes back empty or unauthorized.
pub struct JudgeSession {
    transport: SessionTransport,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HomeworkFeed {
    calendar: Vec<HomeworkItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HomeworkItem {
    title: String,
    rule: String,
    /// `%Y-%m-%dT%H:%M:%S` plus a fixed-width offset suffix.
    end_at: String,
    /// Assignment groups; the first is the course label.
    assign: Vec<String>,
    doc_id: String,
}

/// Strip the offset suffix and interpret the rest as local time, the way
/// the site's own frontend treats these values.
fn parse_end_at(raw: &str, title: &str) -> Result<i64> {
    let body = raw
        .len()
        .checked_sub(END_AT_SUFFIX_LEN)
        .and_then(|cut| raw.get(..cut))
        .ok_or_else(|| {
            AdapterError::MalformedUpstreamData(format!(
                "endAt {raw:?} on {title:?} is too short"
            ))
        })?;
    let naive = NaiveDateTime::parse_from_str(body, END_AT_FORMAT).map_err(|e| {
        AdapterError::MalformedUpstreamData(format!("unparseable endAt {raw:?} on {title:?}: {e}"))
    })?;
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| {
            AdapterError::MalformedUpstreamData(format!(
                "endAt {raw:?} on {title:?} does not exist locally"
            ))
        })
}

impl OnlineJudge {
    pub fn new(config: JudgeConfig) -> Self {
        Self { config }
    }

    /// Post the login form. Success is assumed; only transport-level
    /// failures (bad status, timeout) surface here.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<JudgeSession> {
        let transport = SessionTransport::open(&self.config.transport)?;
        let login_url = format!("{}/login", self.config.base_url);
        let form = [
            ("uname", credentials.identity.as_str()),
            ("password", credentials.secret.as_str()),
            ("tfa", ""),
            ("authnChallenge", ""),
        ];
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        transport
            .post_form_with_headers(&login_url, &form, headers)
            .await?;
        debug!("judge login form posted");
        Ok(JudgeSession {
            transport,
            base_url: self.config.base_url.clone(),
        })
    }
}

/// Map one feed item into a raw record.
fn to_raw(item: HomeworkItem, base_url: &str) -> Result<JudgeItem> {
    let due = parse_end_at(&item.end_at, &item.title)?;
    let course = item.assign.first().cloned().ok_or_else(|| {
        AdapterError::MalformedUpstreamData(format!(
            "homework {:?} has no assignment group",
            item.title
        ))
    })?;
    Ok(JudgeItem {
        title: item.title,
        rule: item.rule,
        course,
        due,
        url: format!("{base_url}/homework/{}", item.doc_id),
    })
}

impl JudgeSession {
    /// Homework calendar items, mapped into raw records.
    pub async fn fetch_assignments(&self) -> Result<Vec<JudgeItem>> {
        let url = format!("{}/homework", self.base_url);
        let feed: HomeworkFeed = self.transport.get_json(&url).await?;
        feed.calendar
            .into_iter()
            .map(|item| to_raw(item, &self.base_url))
            .collect()
    }
}

#[async_trait]
impl AssignmentSource for OnlineJudge {
    fn platform(&self) -> Platform {
        Platform::OnlineJudge
    }

    async fn collect(
        &self,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<Vec<Assignment>> {
        let session = self.authenticate(credentials).await?;
        let items = session.fetch_assignments().await?;
        normalize(RawBatch::Judge(items), now)
    }
}
