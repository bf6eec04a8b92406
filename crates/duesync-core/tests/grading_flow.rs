//! Integration tests for the grading-site adapter against a fixture
//! server: token-based login, outcome classification by landing URL,
//! dashboard and course-page extraction, end-to-end normalization.

mod support;

use chrono::Utc;
use duesync_core::{
    normalize, AdapterError, Credentials, GradingConfig, GradingSite, RawBatch, Role,
};
use support::{spawn_server, Request, Response};

const LOGIN_PAGE: &str = r#"<html><body>
  <form action="/login" method="post">
    <input type="hidden" name="authenticity_token" value="tok-abc123" />
  </form>
</body></html>"#;

const DASHBOARD: &str = r#"<html><body>
  <h1>Student Courses</h1>
  <div class="courseList">
    <div class="courseList--term">Fall 2025</div>
    <div class="courseList--coursesForTerm">
      <a class="courseBox" href="/courses/101">
        <h3 class="courseBox--shortname">CS 101</h3>
        <div class="courseBox--name">Intro to Computer Science</div>
      </a>
    </div>
  </div>
</body></html>"#;

const COURSE_PAGE: &str = r#"<html><body><table><tbody>
  <tr>
    <th>Homework 1</th>
    <td>No Submission</td>
    <td>
      <time class="submissionTimeChart--dueDate" datetime="2025-09-10 23:59:00 +0800">Sep 10</time>
      <time class="submissionTimeChart--dueDate" datetime="2025-09-12 23:59:00 +0800">Sep 12</time>
    </td>
  </tr>
  <tr>
    <th>Homework 2</th>
    <td>Submitted</td>
    <td>
      <time class="submissionTimeChart--dueDate" datetime="2025-09-20 23:59:00 +0800">Sep 20</time>
    </td>
  </tr>
</tbody></table></body></html>"#;

fn router(req: Request) -> Response {
    match (req.method.as_str(), req.path.as_str()) {
        ("GET", "/") if req.has_cookie("signed_session=ok") => Response::html(DASHBOARD),
        ("GET", "/") => Response::html(LOGIN_PAGE),
        ("POST", "/login") => {
            if !req.body.contains("authenticity_token=tok-abc123") {
                return Response::status(500);
            }
            if req.body.contains("session%5Bpassword%5D=right-horse") {
                Response::redirect("/account")
                    .with_header("set-cookie", "signed_session=ok; Path=/")
            } else if req.body.contains("session%5Bemail%5D=weird%40example.edu") {
                Response::redirect("/somewhere-else")
            } else {
                Response::redirect("/login")
            }
        }
        ("GET", "/login") => Response::html(LOGIN_PAGE),
        ("GET", "/account") => Response::html("<html><body>Account</body></html>"),
        ("GET", "/somewhere-else") => Response::html("<html><body>?</body></html>"),
        ("GET", "/courses/101") => Response::html(COURSE_PAGE),
        _ => Response::status(404),
    }
}

fn site(base_url: String) -> GradingSite {
    GradingSite::new(GradingConfig {
        base_url,
        ..GradingConfig::default()
    })
}

/// Test: accepted login lands on an account URL and the session can walk
/// dashboard -> course page -> normalized assignments.
#[tokio::test]
async fn test_login_fetch_and_normalize() {
    let base = spawn_server(router).await;
    let site = site(base);
    let creds = Credentials::new("student@example.edu", "right-horse");

    let session = site.authenticate(&creds).await.expect("login flow failed");
    assert!(session.is_authenticated());

    let courses = session.fetch_courses(Role::Student).await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, 101);
    assert_eq!(courses[0].term, "Fall 2025");

    let rows = session.fetch_assignments(&courses[0]).await.unwrap();
    assert_eq!(rows.len(), 2);

    let assignments = normalize(RawBatch::Grading(rows), Utc::now()).unwrap();
    assert!(!assignments[0].submitted);
    assert!(assignments[1].submitted);
    let late = assignments[0].late_due.expect("first row has a late due");
    assert!(late > assignments[0].due);
    assert_eq!(assignments[1].late_due, None);
}

/// Test: rejected credentials land back on a login URL - an
/// unauthenticated session, not an error - and fetches then refuse to run.
#[tokio::test]
async fn test_rejected_login_is_unauthenticated() {
    let base = spawn_server(router).await;
    let site = site(base);
    let creds = Credentials::new("student@example.edu", "wrong-horse");

    let session = site.authenticate(&creds).await.unwrap();
    assert!(!session.is_authenticated());

    let err = session.fetch_courses(Role::Student).await.unwrap_err();
    assert!(matches!(err, AdapterError::NotAuthenticated));
}

/// Test: a landing URL that is neither account nor login violates the
/// protocol assumption.
#[tokio::test]
async fn test_unknown_landing_url_is_hard_error() {
    let base = spawn_server(router).await;
    let site = site(base);
    let creds = Credentials::new("weird@example.edu", "whatever");

    let err = site.authenticate(&creds).await.unwrap_err();
    assert!(matches!(err, AdapterError::UnknownAuthState(_)));
}
