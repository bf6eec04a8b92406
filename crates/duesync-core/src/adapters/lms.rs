//! LMS adapter: CAS-style single sign-on with an encrypted password
//! field, then JSON calendar feeds.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, info};

use crate::cipher::encrypt_password;
use crate::domain::{
    AdapterError, Assignment, Credentials, LmsEvent, Platform, RawBatch, Result,
};
use crate::normalize::normalize;
use crate::source::AssignmentSource;
use crate::transport::{SessionTransport, TransportConfig};

/// `end` field format of both calendar feeds.
const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Fixed offset the past-due feed's timestamps are expressed in.
const PAST_DUE_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// LMS adapter configuration.
#[derive(Debug, Clone)]
pub struct LmsConfig {
    /// Full SSO login URL, service parameter included.
    pub sso_login_url: String,
    /// LMS portal root the calendar and launch URLs hang off.
    pub portal_url: String,
    pub transport: TransportConfig,
}

impl Default for LmsConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            "sec-ch-ua",
            HeaderValue::from_static(
                "\"Not/A)Brand\";v=\"99\", \"Microsoft Edge\";v=\"115\", \"Chromium\";v=\"115\"",
            ),
        );
        headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
        headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Windows\""));

        Self {
            sso_login_url: "https://ids.shanghaitech.edu.cn/authserver/login?service=https%3A%2F%2Felearning.shanghaitech.edu.cn%3A8443%2Fwebapps%2Fbb-BB-BBLEARN%2Findex.jsp".to_string(),
            portal_url: "https://elearning.shanghaitech.edu.cn:8443".to_string(),
            transport: TransportConfig {
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                     (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36 Edg/115.0.1901.188"
                    .to_string(),
                // The portal's certificate chain does not validate.
                accept_invalid_certs: true,
                default_headers: headers,
                ..TransportConfig::default()
            },
        }
    }
}

/// The LMS adapter.
pub struct Lms {
    config: LmsConfig,
}

/// An authenticated LMS session.
#[derive(Debug)]
pub struct LmsSession {
    transport: SessionTransport,
    portal_url: String,
}

/// One event as the calendar feeds serve it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarEvent {
    title: String,
    /// Naive `%Y-%m-%dT%H:%M:%S` string; which timezone it means depends
    /// on the feed it came from.
    end: String,
    calendar_name: String,
    attemptable: bool,
    item_source_id: String,
}

/// Scan `page` for the form field introduced by `marker` (a `name="…"` or
/// `id="…"` attribute), capturing the `value` attribute before the next
/// tag close. The SSO login page is not worth a full HTML parse for three
/// hidden fields.
fn scan_form_value(page: &str, marker: &str, field: &'static str) -> Result<String> {
    let start = page.find(marker).ok_or(AdapterError::TokenMissing(field))?;
    let tag_end = page[start..]
        .find("/>")
        .ok_or(AdapterError::TokenMissing(field))?;
    let tag = &page[start..start + tag_end];
    let value_start = tag
        .find("value=\"")
        .map(|i| i + "value=\"".len())
        .ok_or(AdapterError::TokenMissing(field))?;
    let value_end = tag[value_start..]
        .find('"')
        .ok_or(AdapterError::TokenMissing(field))?;
    Ok(tag[value_start..value_start + value_end].to_string())
}

/// Interpret a naive feed timestamp as local time.
fn parse_local(raw: &str, title: &str) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(raw, EVENT_TIME_FORMAT).map_err(|e| {
        AdapterError::MalformedUpstreamData(format!(
            "unparseable event time {raw:?} on {title:?}: {e}"
        ))
    })?;
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| {
            AdapterError::MalformedUpstreamData(format!(
                "event time {raw:?} on {title:?} does not exist locally"
            ))
        })
}

/// Interpret a naive feed timestamp at the fixed past-due offset.
fn parse_past_due(raw: &str, title: &str) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(raw, EVENT_TIME_FORMAT).map_err(|e| {
        AdapterError::MalformedUpstreamData(format!(
            "unparseable event time {raw:?} on {title:?}: {e}"
        ))
    })?;
    // A naive instant at UTC+8 is that many seconds earlier in UTC.
    Ok(naive.and_utc().timestamp() - i64::from(PAST_DUE_UTC_OFFSET_SECS))
}

impl Lms {
    pub fn new(config: LmsConfig) -> Self {
        Self { config }
    }

    /// Run the SSO login: scrape `lt`, `execution`, and the password
    /// encryption salt off the login page, encrypt the secret, and post
    /// the assembled form.
    ///
    /// Unlike the upstream client this adapter replaces, the outcome is
    /// verified: a response still on the SSO login path means the
    /// credentials were rejected.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<LmsSession> {
        let transport = SessionTransport::open(&self.config.transport)?;
        let page = transport.get_text(&self.config.sso_login_url).await?;

        let lt = scan_form_value(&page, "name=\"lt\"", "lt")?;
        let execution = scan_form_value(&page, "name=\"execution\"", "execution")?;
        let salt = scan_form_value(&page, "id=\"pwdEncryptSalt\"", "pwdEncryptSalt")?;
        debug!("sso login page fields extracted");

        let password = encrypt_password(&salt, &credentials.secret)?;
        let form = [
            ("username", credentials.identity.as_str()),
            ("password", password.as_str()),
            ("lt", lt.as_str()),
            ("dllt", "generalLogin"),
            ("execution", execution.as_str()),
            ("_eventId", "submit"),
            ("rmShown", "1"),
        ];
        let response = transport
            .post_form(&self.config.sso_login_url, &form)
            .await?;

        let landed = response.url().to_string();
        if landed.contains("/authserver/login") {
            return Err(AdapterError::AuthenticationFailed(
                "single sign-on did not leave the login page".to_string(),
            ));
        }
        info!("sso login accepted");
        Ok(LmsSession {
            transport,
            portal_url: self.config.portal_url.clone(),
        })
    }
}

impl LmsSession {
    /// Fetch upcoming and past-due calendar events and map them into raw
    /// records.
    ///
    /// The two feeds disagree about timezones and that asymmetry is
    /// inherited, not unified: upcoming `end` strings are naive local
    /// time, past-due `end` strings are fixed UTC+8.
    pub async fn fetch_assignments(&self, now: DateTime<Utc>) -> Result<Vec<LmsEvent>> {
        let upcoming_url = format!(
            "{}/webapps/calendar/calendarData/allCourseEvents?start={}",
            self.portal_url,
            now.timestamp() * 1000
        );
        let upcoming: Vec<CalendarEvent> = self.transport.get_json(&upcoming_url).await?;

        let past_due_url = format!(
            "{}/webapps/calendar/calendarData/pastDueEvents",
            self.portal_url
        );
        let past_due: Vec<CalendarEvent> = self.transport.get_json(&past_due_url).await?;

        let mut events = Vec::with_capacity(upcoming.len() + past_due.len());
        for event in upcoming {
            let due = parse_local(&event.end, &event.title)?;
            events.push(self.to_raw(event, due));
        }
        for event in past_due {
            let due = parse_past_due(&event.end, &event.title)?;
            events.push(self.to_raw(event, due));
        }
        Ok(events)
    }

    fn to_raw(&self, event: CalendarEvent, due: i64) -> LmsEvent {
        let url = format!(
            "{}/webapps/calendar/launch/attempt/_blackboard.platform.gradebook2.GradableItem-{}",
            self.portal_url, event.item_source_id
        );
        LmsEvent {
            title: event.title,
            course: event.calendar_name,
            due,
            attemptable: event.attemptable,
            url,
        }
    }
}

#[async_trait]
impl AssignmentSource for Lms {
    fn platform(&self) -> Platform {
        Platform::Lms
    }

    async fn collect(
        &self,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<Vec<Assignment>> {
        let session = self.authenticate(credentials).await?;
        let events = session.fetch_assignments(now).await?;
        normalize(RawBatch::Lms(events), now)
    }
}
