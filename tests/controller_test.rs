//! Selection controller against an in-memory Rounds API

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rounds::adapters::api::RemoteGateway;
use rounds::adapters::storage::{KeyValueStore, MemoryStore};
use rounds::config::{secret_string, SecretString};
use rounds::core::clock::{DateProvider, FixedClock};
use rounds::core::selection::{SelectionController, Tab};
use rounds::domain::{
    DailyReport, Department, DepartmentFilter, FilterContext, NationalId, NetworkError,
    PatientDetail, PatientId, Result, Role, RoundsError, ScopeItem, Session, Visit, VisitDraft,
    VisitId, VisitOps, VisitPatch,
};
use std::sync::{Arc, Mutex};

const NOTE: &str = "Hasta stabil, kontrol planlandı.";
const ME: &str = "E. Sude";

#[derive(Default)]
struct FakeServer {
    labels: Vec<(PatientId, String)>,
    visits: Vec<(PatientId, Visit)>,
    next_id: i64,
    reject_login: bool,
    fail_writes: bool,
    calls: Vec<&'static str>,
}

impl FakeServer {
    fn label(&self, id: &PatientId) -> String {
        self.labels
            .iter()
            .find(|(p, _)| p == id)
            .map(|(_, l)| l.clone())
            .unwrap_or_default()
    }

    fn write_failure(&self) -> Result<()> {
        if self.fail_writes {
            return Err(NetworkError::ServerError {
                status: 500,
                message: "database unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

struct FakeGateway {
    server: Mutex<FakeServer>,
    clock: Arc<FixedClock>,
}

impl FakeGateway {
    fn new(clock: Arc<FixedClock>) -> Self {
        Self {
            server: Mutex::new(FakeServer {
                next_id: 100,
                ..FakeServer::default()
            }),
            clock,
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut FakeServer) -> R) -> R {
        f(&mut self.server.lock().unwrap())
    }

    fn seed_visit(&self, patient: &str, author: &str, department: &str, at: NaiveDateTime) -> i64 {
        self.with(|s| {
            let id = PatientId::new(patient).unwrap();
            if !s.labels.iter().any(|(p, _)| p == &id) {
                s.labels.push((id.clone(), format!("Yatak {patient}")));
            }
            s.next_id += 1;
            let visit = Visit::new(
                VisitId::Server(s.next_id),
                at,
                author,
                NOTE,
                Department::new(department),
                VisitOps::default(),
            );
            s.visits.push((id, visit));
            s.next_id
        })
    }

    fn count(&self, call: &str) -> usize {
        self.with(|s| s.calls.iter().filter(|c| **c == call).count())
    }
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn login(&self, username: &str, _password: &SecretString) -> Result<Session> {
        self.with(|s| {
            s.calls.push("login");
            if s.reject_login {
                return Err(NetworkError::Unauthorized {
                    status: 400,
                    message: "Incorrect username or password".to_string(),
                }
                .into());
            }
            Ok(Session::new(username, ME, "tok", Role::Student))
        })
    }

    async fn list_patients(
        &self,
        _session: &Session,
        day: NaiveDate,
        department: &DepartmentFilter,
    ) -> Result<Vec<ScopeItem>> {
        let filter = FilterContext::new(day, department.clone());
        self.with(|s| {
            s.calls.push("list_patients");
            let mut items: Vec<ScopeItem> = Vec::new();
            for (id, label) in &s.labels {
                let matching: Vec<&Visit> = s
                    .visits
                    .iter()
                    .filter(|(p, v)| p == id && filter.matches(v))
                    .map(|(_, v)| v)
                    .collect();
                if matching.is_empty() {
                    continue;
                }
                items.push(ScopeItem {
                    patient_id: id.clone(),
                    label: label.clone(),
                    count_today: matching.len() as u32,
                    last_visit_ts: matching.iter().map(|v| v.ts).max(),
                });
            }
            Ok(items)
        })
    }

    async fn fetch_patient_visits(
        &self,
        _session: &Session,
        patient_id: &PatientId,
        day: NaiveDate,
    ) -> Result<PatientDetail> {
        self.with(|s| {
            s.calls.push("fetch_patient_visits");
            Ok(PatientDetail {
                patient_id: patient_id.clone(),
                label: s.label(patient_id),
                visits: s
                    .visits
                    .iter()
                    .filter(|(p, v)| p == patient_id && v.ts.date() == day)
                    .map(|(_, v)| v.clone())
                    .collect(),
            })
        })
    }

    async fn create_visit(
        &self,
        session: &Session,
        patient_id: &PatientId,
        text: &str,
        ops: VisitOps,
        department: &Department,
    ) -> Result<VisitId> {
        let now = self.clock.now();
        self.with(|s| {
            s.calls.push("create_visit");
            s.write_failure()?;
            s.next_id += 1;
            let id = VisitId::Server(s.next_id);
            let visit = Visit::new(
                id,
                now,
                session.display_name.clone(),
                text,
                department.clone(),
                ops,
            );
            s.visits.push((patient_id.clone(), visit));
            Ok(id)
        })
    }

    async fn update_visit(&self, _session: &Session, visit_id: i64, patch: &VisitPatch) -> Result<()> {
        let now = self.clock.now();
        self.with(|s| {
            s.calls.push("update_visit");
            s.write_failure()?;
            let (_, visit) = s
                .visits
                .iter_mut()
                .find(|(_, v)| v.id == VisitId::Server(visit_id))
                .ok_or_else(|| NetworkError::NotFound("Visit not found".to_string()))?;
            patch.apply_to(visit, now);
            Ok(())
        })
    }

    async fn delete_visit(&self, _session: &Session, visit_id: i64) -> Result<()> {
        self.with(|s| {
            s.calls.push("delete_visit");
            s.write_failure()?;
            s.visits.retain(|(_, v)| v.id != VisitId::Server(visit_id));
            Ok(())
        })
    }

    async fn derive_and_create_patient(
        &self,
        _session: &Session,
        national_id: &NationalId,
        label: &str,
    ) -> Result<PatientId> {
        self.with(|s| {
            s.calls.push("derive_and_create_patient");
            let id = PatientId::new(format!("PX-{}", &national_id.as_str()[7..])).unwrap();
            if !s.labels.iter().any(|(p, _)| p == &id) {
                s.labels.push((id.clone(), label.to_string()));
            }
            Ok(id)
        })
    }

    async fn fetch_daily_report(
        &self,
        _session: &Session,
        day: NaiveDate,
        _department: &DepartmentFilter,
    ) -> Result<DailyReport> {
        self.with(|s| {
            s.calls.push("fetch_daily_report");
            let seen = s
                .labels
                .iter()
                .filter(|(id, _)| s.visits.iter().any(|(p, v)| p == id && v.ts.date() == day))
                .count();
            Ok(DailyReport {
                patients_seen: seen as u32,
                ..DailyReport::default()
            })
        })
    }

    async fn download_report_pdf(
        &self,
        _session: &Session,
        _day: NaiveDate,
        _department: &DepartmentFilter,
    ) -> Result<Vec<u8>> {
        Ok(b"%PDF-1.4".to_vec())
    }
}

struct Harness {
    gateway: Arc<FakeGateway>,
    clock: Arc<FixedClock>,
    storage: Arc<MemoryStore>,
}

impl Harness {
    fn at(now: NaiveDateTime) -> Self {
        let clock = Arc::new(FixedClock::new(now));
        Self {
            gateway: Arc::new(FakeGateway::new(Arc::clone(&clock))),
            clock,
            storage: Arc::new(MemoryStore::new()),
        }
    }

    fn controller(&self, department: DepartmentFilter) -> SelectionController {
        let mut controller = SelectionController::new(
            Arc::clone(&self.gateway) as Arc<dyn RemoteGateway>,
            Arc::clone(&self.clock) as Arc<dyn DateProvider>,
            Arc::clone(&self.storage) as Arc<dyn KeyValueStore>,
            department,
        );
        controller.startup();
        controller
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn morning() -> NaiveDateTime {
    day().and_hms_opt(9, 0, 0).unwrap()
}

fn password() -> SecretString {
    secret_string("pw".to_string())
}

async fn signed_in(harness: &Harness, department: DepartmentFilter) -> SelectionController {
    let mut controller = harness.controller(department);
    controller.login("esude", &password()).await.unwrap();
    controller
}

#[tokio::test]
async fn test_login_loads_todays_patients() {
    let harness = Harness::at(morning());
    harness
        .gateway
        .seed_visit("A", ME, "ACIL", day().and_hms_opt(8, 0, 0).unwrap());
    harness
        .gateway
        .seed_visit("B", ME, "GENEL", day().pred_opt().unwrap().and_hms_opt(8, 0, 0).unwrap());

    let controller = signed_in(&harness, DepartmentFilter::All).await;

    assert_eq!(controller.session().map(|s| s.display_name.as_str()), Some(ME));
    assert!(controller.auto_date());
    assert_eq!(controller.day(), day());
    let rows = controller.patient_list();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id.as_str(), "A");
    assert_eq!(rows[0].count, 1);
}

#[tokio::test]
async fn test_rejected_login_keeps_signed_out() {
    let harness = Harness::at(morning());
    harness.gateway.with(|s| s.reject_login = true);
    let mut controller = harness.controller(DepartmentFilter::All);

    let err = controller.login("esude", &password()).await.unwrap_err();

    assert!(matches!(
        err,
        RoundsError::Network(NetworkError::Unauthorized { .. })
    ));
    assert!(controller.session().is_none());
    assert_eq!(harness.gateway.count("list_patients"), 0);
}

#[tokio::test]
async fn test_refresh_requires_session() {
    let harness = Harness::at(morning());
    let mut controller = harness.controller(DepartmentFilter::All);

    let err = controller.refresh(false).await.unwrap_err();
    assert!(matches!(err, RoundsError::NotSignedIn));
}

#[tokio::test]
async fn test_stale_list_is_discarded() {
    let harness = Harness::at(morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;

    let request = controller.begin_scope_refresh();
    controller
        .set_department(DepartmentFilter::Only(Department::general()))
        .await
        .unwrap();
    assert_ne!(request.token, controller.scope_token());

    let late = vec![ScopeItem {
        patient_id: PatientId::new("Z").unwrap(),
        label: "Yatak Z".to_string(),
        count_today: 1,
        last_visit_ts: Some(morning()),
    }];
    let err = controller
        .complete_scope_refresh(request, Ok(late))
        .unwrap_err();

    assert!(err.is_stale_scope());
    assert!(!controller.store().contains(&PatientId::new("Z").unwrap()));
    assert!(controller.patient_list().is_empty());
}

#[tokio::test]
async fn test_current_list_is_applied() {
    let harness = Harness::at(morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;

    let request = controller.begin_scope_refresh();
    let items = vec![ScopeItem {
        patient_id: PatientId::new("Z").unwrap(),
        label: "Yatak Z".to_string(),
        count_today: 2,
        last_visit_ts: Some(morning()),
    }];
    controller.complete_scope_refresh(request, Ok(items)).unwrap();

    let rows = controller.patient_list();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].count, 2);
}

#[tokio::test]
async fn test_selected_patient_not_listed_under_other_department() {
    let harness = Harness::at(morning());
    harness
        .gateway
        .seed_visit("A", ME, "ACIL", day().and_hms_opt(8, 0, 0).unwrap());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    let a = PatientId::new("A").unwrap();
    controller.select_patient(a.clone()).await.unwrap();
    assert_eq!(controller.patient_list().len(), 1);

    controller
        .set_department(DepartmentFilter::Only(Department::new("KBB")))
        .await
        .unwrap();

    assert!(controller.patient_list().is_empty());
    assert_eq!(controller.selected_patient_id(), Some(&a));
    assert!(controller.store().contains(&a));
}

#[tokio::test]
async fn test_selection_survives_department_change() {
    let harness = Harness::at(morning());
    harness
        .gateway
        .seed_visit("A", ME, "ACIL", day().and_hms_opt(8, 0, 0).unwrap());
    harness
        .gateway
        .seed_visit("B", ME, "KBB", day().and_hms_opt(8, 30, 0).unwrap());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    let a = PatientId::new("A").unwrap();
    controller.select_patient(a.clone()).await.unwrap();

    controller
        .set_department(DepartmentFilter::Only(Department::new("KBB")))
        .await
        .unwrap();

    assert_eq!(controller.selected_patient_id(), Some(&a));
    let kept = controller.store().get(&a).unwrap();
    assert_eq!(kept.label, "Yatak A");
    assert_eq!(kept.visits.len(), 1);
    assert_eq!(controller.selected_visits().len(), 1);
    let rows = controller.patient_list();
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["B"]);
}

#[tokio::test]
async fn test_selection_survives_day_change() {
    let harness = Harness::at(morning());
    harness
        .gateway
        .seed_visit("A", ME, "ACIL", day().and_hms_opt(8, 0, 0).unwrap());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    let a = PatientId::new("A").unwrap();
    controller.select_patient(a.clone()).await.unwrap();

    controller.set_day(day().pred_opt().unwrap()).await.unwrap();

    assert_eq!(controller.selected_patient_id(), Some(&a));
    let kept = controller.store().get(&a).unwrap();
    assert_eq!(kept.visits.len(), 1);
    assert_eq!(kept.visits[0].ts.date(), day());
    assert!(controller.patient_list().is_empty());
}

#[tokio::test]
async fn test_invalid_national_id_never_reaches_server() {
    let harness = Harness::at(morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;

    let err = controller.open_patient("123", "Yatak 4").await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(harness.gateway.count("derive_and_create_patient"), 0);
    assert!(controller.selected_patient_id().is_none());
}

#[tokio::test]
async fn test_add_visit_defaults_to_emergency_under_all() {
    let harness = Harness::at(morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;

    let patient_id = controller
        .open_patient("12345678901", "Yatak 4")
        .await
        .unwrap();
    assert_eq!(controller.tab(), Tab::Note);
    assert_eq!(controller.selected_patient_id(), Some(&patient_id));

    let visit_id = controller.add_visit(VisitDraft::new(NOTE)).await.unwrap();

    assert!(visit_id.is_confirmed());
    assert_eq!(controller.pending_count(), 0);
    let visits = controller.selected_visits();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].id, visit_id);
    assert_eq!(visits[0].department, Department::emergency());
    assert_eq!(visits[0].author, ME);
    assert_eq!(controller.patient_list().len(), 1);
}

#[tokio::test]
async fn test_add_visit_uses_filter_department() {
    let harness = Harness::at(morning());
    let mut controller =
        signed_in(&harness, DepartmentFilter::Only(Department::new("KBB"))).await;
    controller.open_patient("12345678901", "").await.unwrap();

    controller.add_visit(VisitDraft::new(NOTE)).await.unwrap();

    let visits = controller.selected_visits();
    assert_eq!(visits[0].department, Department::new("KBB"));
    assert_eq!(
        controller.selected_patient().map(|p| p.label.as_str()),
        Some("Etiket eklenmedi")
    );
}

#[tokio::test]
async fn test_short_note_is_rejected_locally() {
    let harness = Harness::at(morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    controller.open_patient("12345678901", "Yatak 4").await.unwrap();

    let err = controller
        .add_visit(VisitDraft::new("short"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(harness.gateway.count("create_visit"), 0);
    assert!(controller.selected_visits().is_empty());
}

#[tokio::test]
async fn test_failed_create_leaves_notice_and_resyncs() {
    let harness = Harness::at(morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    controller.open_patient("12345678901", "Yatak 4").await.unwrap();
    harness.gateway.with(|s| s.fail_writes = true);
    let lists_before = harness.gateway.count("list_patients");

    let err = controller.add_visit(VisitDraft::new(NOTE)).await.unwrap_err();

    assert!(matches!(err, RoundsError::Network(_)));
    assert_eq!(controller.notices().len(), 1);
    assert!(controller.notices()[0].message.contains("not saved"));
    assert!(controller.selected_visits().is_empty());
    assert_eq!(controller.pending_count(), 0);
    assert!(harness.gateway.count("list_patients") > lists_before);
    assert_eq!(harness.gateway.count("fetch_daily_report"), 1);

    assert_eq!(controller.take_notices().len(), 1);
    assert!(controller.notices().is_empty());
}

#[tokio::test]
async fn test_failed_delete_is_restored_by_resync() {
    let harness = Harness::at(morning());
    let visit_id = harness.gateway.seed_visit("A", ME, "ACIL", morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    controller
        .select_patient(PatientId::new("A").unwrap())
        .await
        .unwrap();
    harness.gateway.with(|s| s.fail_writes = true);

    let err = controller
        .delete_visit(VisitId::Server(visit_id))
        .await
        .unwrap_err();

    assert!(matches!(err, RoundsError::Network(_)));
    let visits = controller.selected_visits();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].id, VisitId::Server(visit_id));
    assert_eq!(controller.notices().len(), 1);
}

#[tokio::test]
async fn test_update_and_delete_own_visit() {
    let harness = Harness::at(morning());
    let visit_id = harness.gateway.seed_visit("A", ME, "ACIL", morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    controller
        .select_patient(PatientId::new("A").unwrap())
        .await
        .unwrap();

    let patch = VisitPatch {
        text: Some("  Kontrol tetkikleri istendi, sonuç bekleniyor.  ".to_string()),
        ops_test: Some(true),
        ..VisitPatch::default()
    };
    controller
        .update_visit(VisitId::Server(visit_id), patch)
        .await
        .unwrap();

    let visits = controller.selected_visits();
    assert_eq!(visits[0].text, "Kontrol tetkikleri istendi, sonuç bekleniyor.");
    assert!(visits[0].ops.test);
    assert!(visits[0].edited_at.is_some());

    controller
        .delete_visit(VisitId::Server(visit_id))
        .await
        .unwrap();
    assert!(controller.selected_visits().is_empty());
    assert!(controller.notices().is_empty());
}

#[tokio::test]
async fn test_only_author_may_edit() {
    let harness = Harness::at(morning());
    let visit_id = harness.gateway.seed_visit("A", "Dr. Başka", "ACIL", morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    controller
        .select_patient(PatientId::new("A").unwrap())
        .await
        .unwrap();

    let err = controller
        .update_visit(VisitId::Server(visit_id), VisitPatch::full(NOTE, VisitOps::default()))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = controller
        .delete_visit(VisitId::Server(visit_id))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(harness.gateway.count("update_visit"), 0);
    assert_eq!(harness.gateway.count("delete_visit"), 0);
    assert_eq!(controller.selected_visits().len(), 1);
}

#[tokio::test]
async fn test_unsaved_or_unknown_visit_cannot_change() {
    let harness = Harness::at(morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;

    let err = controller
        .delete_visit(VisitId::placeholder())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = controller
        .delete_visit(VisitId::Server(999))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_empty_or_short_patch_is_rejected() {
    let harness = Harness::at(morning());
    let visit_id = harness.gateway.seed_visit("A", ME, "ACIL", morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    controller
        .select_patient(PatientId::new("A").unwrap())
        .await
        .unwrap();

    let err = controller
        .update_visit(VisitId::Server(visit_id), VisitPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let patch = VisitPatch {
        text: Some("short".to_string()),
        ..VisitPatch::default()
    };
    let err = controller
        .update_visit(VisitId::Server(visit_id), patch)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(controller.selected_visits()[0].text, NOTE);
}

#[tokio::test]
async fn test_tick_follows_midnight_with_auto_date() {
    let late = day().and_hms_opt(23, 59, 0).unwrap();
    let harness = Harness::at(late);
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    let token = controller.scope_token();

    assert!(!controller.tick().await.unwrap());

    harness.clock.advance(Duration::minutes(2));
    assert!(controller.tick().await.unwrap());
    assert_eq!(controller.day(), day().succ_opt().unwrap());
    assert_ne!(controller.scope_token(), token);
}

#[tokio::test]
async fn test_manual_day_stops_auto_date() {
    let late = day().and_hms_opt(23, 59, 0).unwrap();
    let harness = Harness::at(late);
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    let earlier = day().pred_opt().unwrap();

    controller.set_day(earlier).await.unwrap();
    assert!(!controller.auto_date());

    harness.clock.advance(Duration::minutes(2));
    assert!(!controller.on_visibility_regained().await.unwrap());
    assert_eq!(controller.day(), earlier);
}

#[tokio::test]
async fn test_report_tab_loads_report() {
    let harness = Harness::at(morning());
    harness.gateway.seed_visit("A", ME, "ACIL", morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    assert!(controller.report().is_none());

    controller.set_tab(Tab::Report).await.unwrap();

    assert_eq!(controller.report().map(|r| r.patients_seen), Some(1));
    assert!(controller.visible_report(None).is_some());
    assert_eq!(
        controller.download_report_pdf().await.unwrap(),
        b"%PDF-1.4".to_vec()
    );
}

#[tokio::test]
async fn test_state_survives_restart() {
    let harness = Harness::at(morning());
    harness.gateway.seed_visit("A", ME, "ACIL", morning());
    let mut first = signed_in(&harness, DepartmentFilter::All).await;
    let manual = day().pred_opt().unwrap();
    first.set_day(manual).await.unwrap();
    first.toggle_favorite_author("Dr. Başka");

    let second = harness.controller(DepartmentFilter::All);

    assert!(second.session().is_some());
    assert_eq!(second.day(), manual);
    assert!(!second.auto_date());
    assert!(second.favorite_authors().contains("Dr. Başka"));
}

#[tokio::test]
async fn test_logout_clears_session_and_cache() {
    let harness = Harness::at(morning());
    harness.gateway.seed_visit("A", ME, "ACIL", morning());
    let mut controller = signed_in(&harness, DepartmentFilter::All).await;
    controller
        .select_patient(PatientId::new("A").unwrap())
        .await
        .unwrap();
    assert!(!controller.store().is_empty());

    controller.logout().unwrap();

    assert!(controller.session().is_none());
    assert!(controller.selected_patient_id().is_none());
    assert!(controller.store().is_empty());
    assert_eq!(controller.tab(), Tab::Home);

    let restarted = harness.controller(DepartmentFilter::All);
    assert!(restarted.session().is_none());
    assert!(restarted.store().is_empty());
}
