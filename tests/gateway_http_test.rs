//! HTTP gateway tests against a mock Rounds API

use chrono::NaiveDate;
use mockito::Matcher;
use rounds::adapters::api::{HttpGateway, RemoteGateway};
use rounds::config::{secret_string, ApiConfig, RetryConfig};
use rounds::domain::{
    Department, DepartmentFilter, NationalId, NetworkError, PatientId, Role, RoundsError, Session,
    VisitId, VisitOps, VisitPatch,
};
use serde_json::json;

fn gateway(url: &str) -> HttpGateway {
    let config = ApiConfig {
        base_url: url.to_string(),
        timeout_seconds: 5,
        retry: RetryConfig {
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 1.0,
        },
        ..ApiConfig::default()
    };
    HttpGateway::new(&config, 50).unwrap()
}

fn session() -> Session {
    Session::new("esude", "E. Sude", "tok", Role::Student)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn scope_query(department: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("department".into(), department.into()),
        Matcher::UrlEncoded("day".into(), "2024-05-01".into()),
    ])
}

#[tokio::test]
async fn test_login_returns_session() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "esude".into()),
            Matcher::UrlEncoded("password".into(), "pw".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "tok-1",
                "username": "esude",
                "display_name": "E. Sude",
                "role": "supervisor"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let session = gateway
        .login("  ESude ", &secret_string("pw".to_string()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(session.username, "esude");
    assert_eq!(session.display_name, "E. Sude");
    assert_eq!(session.role, Role::Supervisor);
    assert_eq!(session.bearer(), "Bearer tok-1");
}

#[tokio::test]
async fn test_login_bad_credentials_is_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/auth/login")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(json!({"detail": "Incorrect username or password"}).to_string())
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let err = gateway
        .login("esude", &secret_string("wrong".to_string()))
        .await
        .unwrap_err();

    match err {
        RoundsError::Network(NetworkError::Unauthorized { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Incorrect username or password");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_list_patients_sends_scope_and_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/patients/list")
        .match_query(scope_query("KBB"))
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [
                    {"patient_id": "PX-2", "label": "Yatak 2", "count_today": 2,
                     "last_visit_ts": "2024-05-01T10:30:00"},
                    {"patient_id": "PX-1", "label": "", "count_today": 1,
                     "last_visit_ts": null}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let items = gateway
        .list_patients(&session(), day(), &DepartmentFilter::Only(Department::new("kbb")))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].patient_id.as_str(), "PX-2");
    assert_eq!(items[0].count_today, 2);
    assert!(items[0].last_visit_ts.is_some());
    assert!(items[1].last_visit_ts.is_none());
}

#[tokio::test]
async fn test_fetch_patient_visits() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/patients/PX-1/visits")
        .match_query(Matcher::UrlEncoded("day".into(), "2024-05-01".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "patient_id": "PX-1",
                "label": "Yatak 4",
                "visits": [{
                    "id": 7,
                    "ts": "2024-05-01T08:15:00",
                    "author": "E. Sude",
                    "text": "Hasta stabil, kontrol planlandı.",
                    "department": "acil",
                    "ops": {"drug": true, "test": false, "consult": false, "critical": false},
                    "edited_at": null
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let detail = gateway
        .fetch_patient_visits(&session(), &PatientId::new("PX-1").unwrap(), day())
        .await
        .unwrap();

    assert_eq!(detail.label, "Yatak 4");
    assert_eq!(detail.visits.len(), 1);
    assert_eq!(detail.visits[0].id, VisitId::Server(7));
    assert_eq!(detail.visits[0].department, Department::emergency());
    assert!(detail.visits[0].ops.drug);
}

#[tokio::test]
async fn test_null_columns_do_not_fail_the_payload() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/patients/list")
        .match_query(scope_query("ALL"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [
                    {"patient_id": "PX-1", "label": null, "count_today": 1,
                     "last_visit_ts": "2024-05-01T08:15:00"},
                    {"patient_id": "PX-2", "label": "Yatak 2", "count_today": 1,
                     "last_visit_ts": null}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _detail = server
        .mock("GET", "/patients/PX-1/visits")
        .match_query(Matcher::UrlEncoded("day".into(), "2024-05-01".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "patient_id": "PX-1",
                "label": null,
                "visits": [
                    {"id": 7, "ts": "2024-05-01T08:15:00", "author": "E. Sude",
                     "text": "Hasta stabil, kontrol planlandı.", "department": null},
                    {"id": 8, "ts": "2024-05-01T09:40:00", "author": null,
                     "text": null, "department": "kbb"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let items = gateway
        .list_patients(&session(), day(), &DepartmentFilter::All)
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].label, "");

    let detail = gateway
        .fetch_patient_visits(&session(), &PatientId::new("PX-1").unwrap(), day())
        .await
        .unwrap();
    assert_eq!(detail.visits.len(), 2);
    assert_eq!(detail.visits[0].department, Department::general());
    assert_eq!(detail.visits[1].department, Department::new("KBB"));
    assert_eq!(detail.visits[1].author, "");
}

#[tokio::test]
async fn test_create_visit_returns_server_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/visits")
        .match_header("authorization", "Bearer tok")
        .match_body(Matcher::PartialJson(json!({
            "patient_id": "PX-1",
            "ops_critical": true,
            "ops_drug": false,
            "department": "ACIL"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": 42, "patient_id": "PX-1"}).to_string())
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let ops = VisitOps {
        critical: true,
        ..VisitOps::default()
    };
    let id = gateway
        .create_visit(
            &session(),
            &PatientId::new("PX-1").unwrap(),
            "Hasta stabil, kontrol planlandı.",
            ops,
            &Department::emergency(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(id, VisitId::Server(42));
}

#[tokio::test]
async fn test_update_and_delete_visit() {
    let mut server = mockito::Server::new_async().await;
    let update = server
        .mock("PUT", "/visits/42")
        .match_body(Matcher::Json(json!({"ops_test": true})))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/visits/42")
        .with_status(204)
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let patch = VisitPatch {
        ops_test: Some(true),
        ..VisitPatch::default()
    };
    gateway.update_visit(&session(), 42, &patch).await.unwrap();
    gateway.delete_visit(&session(), 42).await.unwrap();

    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_forbidden_write_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/visits/9")
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(json!({"detail": "Not your visit"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let err = gateway.delete_visit(&session(), 9).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        RoundsError::Network(NetworkError::Forbidden(ref message)) if message == "Not your visit"
    ));
}

#[tokio::test]
async fn test_derive_and_create_patient() {
    let mut server = mockito::Server::new_async().await;
    let derive = server
        .mock("POST", "/patients/derive")
        .match_body(Matcher::Json(json!({"tc": "12345678901"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"patient_id": "PX-9f2c"}).to_string())
        .create_async()
        .await;
    let create = server
        .mock("POST", "/patients")
        .match_body(Matcher::Json(json!({"patient_id": "PX-9f2c", "label": "Yatak 4"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"patient_id": "PX-9f2c", "label": "Yatak 4"}).to_string())
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let national_id = NationalId::parse("123 456 789 01").unwrap();
    let patient_id = gateway
        .derive_and_create_patient(&session(), &national_id, "Yatak 4")
        .await
        .unwrap();

    derive.assert_async().await;
    create.assert_async().await;
    assert_eq!(patient_id.as_str(), "PX-9f2c");
}

#[tokio::test]
async fn test_daily_report_combines_feed() {
    let mut server = mockito::Server::new_async().await;
    let _report = server
        .mock("GET", "/reports/daily")
        .match_query(scope_query("ALL"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "patients_seen": 1,
                "totals": {"critical": 0, "drugs": 1, "tests": 0, "consults": 0},
                "by_author_detail": {"E. Sude": {"patients": 1, "visits": 1, "critical": 0}},
                "lines": ["1 ilaç"]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let feed = server
        .mock("GET", "/visits/by_department")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("department".into(), "ALL".into()),
            Matcher::UrlEncoded("day".into(), "2024-05-01".into()),
            Matcher::UrlEncoded("limit".into(), "50".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "by_author": {
                    "E. Sude": [{
                        "id": 7,
                        "patient_id": "PX-1",
                        "ts": "2024-05-01T08:15:00",
                        "text": "Hasta stabil, kontrol planlandı.",
                        "department": "ACIL",
                        "ops": {"drug": true, "test": false, "consult": false, "critical": false},
                        "edited_at": null
                    }]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let report = gateway
        .fetch_daily_report(&session(), day(), &DepartmentFilter::All)
        .await
        .unwrap();

    feed.assert_async().await;
    assert_eq!(report.patients_seen, 1);
    assert_eq!(report.totals.drugs, 1);
    assert_eq!(report.lines, vec!["1 ilaç".to_string()]);
    let entries = &report.by_author["E. Sude"];
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].visit.author, "E. Sude");
}

#[tokio::test]
async fn test_download_report_pdf_bytes() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/reports/daily_pdf")
        .match_query(scope_query("ACIL"))
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(b"%PDF-1.4 test".as_slice())
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let bytes = gateway
        .download_report_pdf(&session(), day(), &DepartmentFilter::Only(Department::emergency()))
        .await
        .unwrap();

    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_server_error_is_retried_then_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/patients/list")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("upstream unavailable")
        .expect(2)
        .create_async()
        .await;

    let gateway = gateway(&server.url());
    let err = gateway
        .list_patients(&session(), day(), &DepartmentFilter::All)
        .await
        .unwrap_err();

    mock.assert_async().await;
    match err {
        RoundsError::Network(NetworkError::ServerError { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_connection_failure() {
    // Nothing listens on the discard port
    let gateway = gateway("http://127.0.0.1:9");
    let err = gateway
        .list_patients(&session(), day(), &DepartmentFilter::All)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RoundsError::Network(NetworkError::ConnectionFailed(_))
    ));
}
