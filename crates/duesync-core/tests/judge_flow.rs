//! Integration tests for the online-judge adapter: form login, homework
//! feed mapping, and the time-heuristic `submitted` flag end to end.

mod support;

use chrono::{Duration, Local, Utc};
use duesync_core::{AssignmentSource, Credentials, JudgeConfig, OnlineJudge, Platform};
use support::{spawn_server, Request, Response};

fn end_at(offset: Duration) -> String {
    format!(
        "{}+08:00",
        (Local::now() + offset).format("%Y-%m-%dT%H:%M:%S")
    )
}

/// Test: the full collect pass - login, fetch, normalize - marks a closed
/// homework window submitted and an open one not submitted.
#[tokio::test]
async fn test_collect_applies_submitted_heuristic() {
    let feed = format!(
        r#"{{
            "calendar": [
                {{
                    "title": "Closed HW",
                    "rule": "homework",
                    "endAt": "{}",
                    "assign": ["Algorithms"],
                    "docId": "aaa111"
                }},
                {{
                    "title": "Open HW",
                    "rule": "homework",
                    "endAt": "{}",
                    "assign": ["Algorithms"],
                    "docId": "bbb222"
                }}
            ]
        }}"#,
        end_at(Duration::hours(-1)),
        end_at(Duration::hours(1)),
    );

    let base = spawn_server(move |req: Request| {
        match (req.method.as_str(), req.path.as_str()) {
            ("POST", "/login") => {
                if req.body.contains("uname=acct") && req.body.contains("tfa=") {
                    Response::json("{}").with_header("set-cookie", "sid=1; Path=/")
                } else {
                    Response::status(500)
                }
            }
            ("GET", "/homework") => Response::json(&feed),
            _ => Response::status(404),
        }
    })
    .await;

    let judge = OnlineJudge::new(JudgeConfig {
        base_url: base.clone(),
        ..JudgeConfig::default()
    });
    assert_eq!(judge.platform(), Platform::OnlineJudge);

    let assignments = judge
        .collect(&Credentials::new("acct", "pw"), Utc::now())
        .await
        .expect("judge collect failed");
    assert_eq!(assignments.len(), 2);

    let closed = assignments.iter().find(|a| a.title == "Closed HW").unwrap();
    let open = assignments.iter().find(|a| a.title == "Open HW").unwrap();
    assert!(closed.submitted, "a past end time counts as submitted");
    assert!(!open.submitted, "a future end time does not");
    assert_eq!(closed.status, "Live");
    assert_eq!(closed.course, "Algorithms");
    assert!(closed.url.ends_with("/homework/aaa111"));
    assert_eq!(closed.platform, Platform::OnlineJudge);
}
