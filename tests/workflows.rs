//! End-to-end workflows over the in-memory backend.

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;

use projectdesk::adapters::memory::{FixedClock, MemoryAuth, MemoryBackend, MemorySeed};
use projectdesk::api::{assignments, payments, tasks};
use projectdesk::camelize::camelize;
use projectdesk::cassette::recorder::CassetteRecorder;
use projectdesk::config::ClientSettings;
use projectdesk::context::ServiceContext;
use projectdesk::error::AppError;
use projectdesk::milestones::{plan_milestone_sync, upsert_milestones_for_parent};
use projectdesk::model::{
    AssignmentStatus, ContractPayload, ContractStatus, MilestoneItem, PaymentObjectType, PaymentPayload,
    PaymentStatus,
};
use projectdesk::ports::SessionUser;
use projectdesk::store::AppStore;

const SEED: &str = r"
user: { id: U1, email: dana@site.test }
tables:
  profiles:
    - { id: U1, email: dana@site.test, first_name: Dana }
    - { id: U2, email: omer@site.test, first_name: Omer }
  tasks:
    - { id: T1, title: Kitchen, type: PROJECT, creator_id: U1, status: PENDING,
        start_date: 2025-01-01, end_date: 2025-03-31 }
  wallets:
    - { id: W1, user_id: U1, currency: ILS, balance: 10000 }
";

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn backend() -> MemoryBackend {
    let seed: MemorySeed = serde_yaml::from_str(SEED).unwrap();
    MemoryBackend::from_seed(seed)
}

fn context(backend: &MemoryBackend) -> ServiceContext {
    ServiceContext::memory(backend, ClientSettings::default())
        .with_clock(FixedClock(Utc.with_ymd_and_hms(2025, 1, 5, 8, 0, 0).unwrap()))
}

fn as_user(backend: &MemoryBackend, id: &str) -> ServiceContext {
    let other = MemoryBackend {
        auth: MemoryAuth::signed_in(SessionUser { id: id.into(), email: None, role: None }),
        ..backend.clone()
    };
    context(&other)
}

fn milestone(id: Option<&str>, title: &str, start: &str, end: &str) -> MilestoneItem {
    MilestoneItem {
        id: id.map(String::from),
        title: title.into(),
        description: None,
        start_date: date(start),
        end_date: date(end),
        amount: Some(500.0),
        late_penalty_per_day: None,
    }
}

#[tokio::test]
async fn closed_assignment_round_trips_as_one_interval() {
    let backend = backend();
    let ctx = context(&backend);

    assignments::create_assignment(&ctx, "T1", "U1", date("2025-01-01"), Some(date("2025-01-10")))
        .await
        .unwrap();

    let rows = assignments::fetch_assignment_rows(&ctx, "T1").await.unwrap();
    assert_eq!(rows.len(), 2);
    let active = rows.iter().find(|r| r.status == AssignmentStatus::Active).unwrap();
    let removed = rows.iter().find(|r| r.status == AssignmentStatus::Removed).unwrap();
    assert_eq!(active.assigned_at, date("2025-01-01"));
    assert_eq!(removed.assigned_at, date("2025-01-10"));
    assert_eq!((active.user_id.as_str(), removed.user_id.as_str()), ("U1", "U1"));

    let intervals = assignments::fetch_assignments(&ctx, "T1").await.unwrap();
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].start_date, date("2025-01-01"));
    assert_eq!(intervals[0].end_date, Some(date("2025-01-10")));
}

#[tokio::test]
async fn open_assignment_stores_a_single_active_row() {
    let backend = backend();
    let ctx = context(&backend);

    let interval = assignments::create_assignment(&ctx, "T1", "U2", date("2025-02-01"), None)
        .await
        .unwrap();
    assert!(interval.removed_assignment_id.is_none());

    let rows = backend.tables.rows("task_assignment");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "ACTIVE");
}

#[tokio::test]
async fn inverted_assignment_period_is_rejected_before_any_write() {
    let backend = backend();
    let ctx = context(&backend);

    let result = assignments::create_assignment(&ctx, "T1", "U2", date("2025-02-10"), Some(date("2025-02-01"))).await;
    assert!(result.is_err());
    assert!(backend.tables.rows("task_assignment").is_empty());
}

#[tokio::test]
async fn deleting_one_open_interval_keeps_the_other() {
    let backend = backend();
    let ctx = context(&backend);
    let mut store = AppStore::new();

    store.assignments.create_assignment(&ctx, "T1", "U1", date("2025-01-01"), None).await.unwrap();
    store.assignments.create_assignment(&ctx, "T1", "U2", date("2025-01-03"), None).await.unwrap();
    assert_eq!(store.assignments.intervals("T1").len(), 2);

    let first = store
        .assignments
        .intervals("T1")
        .iter()
        .find(|i| i.user_id == "U1")
        .unwrap()
        .ids();
    let deleted = store.assignments.delete_assignment(&ctx, "T1", &first).await.unwrap();
    assert_eq!(deleted.len(), 1);

    let left = store.assignments.intervals("T1");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].user_id, "U2");
    assert!(left[0].removed_assignment_id.is_none());
    assert_eq!(backend.tables.rows("task_assignment").len(), 1);
}

#[tokio::test]
async fn milestone_sync_converges_to_desired_list() {
    let backend = backend();
    let ctx = context(&backend);

    let first = upsert_milestones_for_parent(
        &ctx,
        "T1",
        "U1",
        &[
            milestone(None, "Demolition", "2025-01-01", "2025-01-10"),
            milestone(None, "Cabinets", "2025-01-11", "2025-02-10"),
        ],
    )
    .await
    .unwrap();
    assert_eq!(first.inserted.len(), 2);

    let cabinets = first.inserted[1].clone();
    let second = upsert_milestones_for_parent(
        &ctx,
        "T1",
        "U1",
        &[
            milestone(Some(&cabinets), "Cabinets and counters", "2025-01-11", "2025-02-20"),
            milestone(None, "Painting", "2025-02-21", "2025-03-01"),
        ],
    )
    .await
    .unwrap();
    assert_eq!(second.updated, vec![cabinets.clone()]);
    assert_eq!(second.inserted.len(), 1);
    assert_eq!(second.deleted, vec![first.inserted[0].clone()]);

    let mut titles: Vec<String> = backend
        .tables
        .rows("tasks")
        .iter()
        .filter(|r| r["parent_id"] == "T1")
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Cabinets and counters", "Painting"]);
}

#[tokio::test]
async fn milestone_sync_clears_optional_columns() {
    let backend = backend();
    let ctx = context(&backend);

    let mut full = milestone(None, "Cabinets", "2025-01-11", "2025-02-10");
    full.description = Some("old".into());
    full.late_penalty_per_day = Some(10.0);
    let id = upsert_milestones_for_parent(&ctx, "T1", "U1", &[full]).await.unwrap().inserted[0].clone();

    let mut bare = milestone(Some(&id), "Cabinets", "2025-01-11", "2025-02-10");
    bare.amount = None;
    let report = upsert_milestones_for_parent(&ctx, "T1", "U1", &[bare.clone()]).await.unwrap();
    assert_eq!(report.updated, vec![id.clone()]);

    let stored = tasks::fetch_milestones(&ctx, "T1").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].description, None);
    assert_eq!(stored[0].amount, None);
    assert_eq!(stored[0].late_penalty_per_day, None);
    assert!(plan_milestone_sync("T1", "U1", &stored, &[bare]).is_noop());
}

#[tokio::test]
async fn negative_milestone_amount_is_rejected_before_any_write() {
    let backend = backend();
    let ctx = context(&backend);

    let mut item = milestone(None, "Demolition", "2025-01-01", "2025-01-10");
    item.amount = Some(-5.0);
    let err = upsert_milestones_for_parent(&ctx, "T1", "U1", &[item]).await.unwrap_err();
    assert!(matches!(err, AppError::Invalid(_)));
    assert_eq!(backend.tables.rows("tasks").len(), 1);
}

#[tokio::test]
async fn failed_milestone_write_reports_applied_changes() {
    let dir = std::env::temp_dir().join("projectdesk_partial_sync");
    let path = dir.join("tables.cassette.yaml");
    let row = |id: &str, title: &str| {
        json!({
            "id": id, "title": title, "creator_id": "U1", "status": "PENDING", "type": "TASK",
            "parent_id": "T1", "start_date": "2025-01-01", "end_date": "2025-01-10", "amount": 500.0
        })
    };
    let mut recorder = CassetteRecorder::new(&path, "partial-sync", "memory");
    recorder.record("tables", "select", json!({}), json!({"Ok": [row("M1", "Demolition")]}));
    recorder.record("tables", "update", json!({}), json!({"Ok": [row("M1", "Demolition and removal")]}));
    recorder.record("tables", "insert", json!({}), json!({"Err": "API error (500): connection reset"}));
    recorder.finish().unwrap();

    let ctx = ServiceContext::replaying(&path, ClientSettings::default()).unwrap();
    let desired = [
        milestone(Some("M1"), "Demolition and removal", "2025-01-01", "2025-01-10"),
        milestone(None, "Painting", "2025-01-11", "2025-01-20"),
    ];
    let err = upsert_milestones_for_parent(&ctx, "T1", "U1", &desired).await.unwrap_err();

    let AppError::PartialSync { report, .. } = &err else {
        panic!("expected a partial sync, got {err}");
    };
    assert_eq!(report.updated, vec!["M1".to_string()]);
    assert!(report.inserted.is_empty() && report.deleted.is_empty());
    assert!(err.to_string().starts_with("milestone sync stopped after 1 change(s)"));
    assert!(err.to_string().contains("connection reset"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn contract_is_signed_by_both_parties_then_paid() {
    let backend = backend();
    let creator = context(&backend);
    let contractor = as_user(&backend, "U2");
    let mut store = AppStore::new();

    let payload = ContractPayload {
        task_id: "T1".into(),
        title: "Kitchen works".into(),
        description: String::new(),
        start_date: date("2025-01-01"),
        end_date: Some(date("2025-03-31")),
        user_a: "U1".into(),
        user_b: "U2".into(),
        file_url: String::new(),
        creator_id: "U1".into(),
        amount: Some(8000.0),
    };
    let id = store.contracts.create(&creator, &payload).await.unwrap().id.clone();
    assert_eq!(store.contracts.list[0].status, ContractStatus::Draft);

    // The contractor cannot sign first.
    assert!(store.contracts.sign_as_party_b(&contractor, &id, "U2").await.is_err());
    assert!(payments::payable_contracts(&store.contracts.list, "T1").is_empty());

    store.contracts.sign_as_party_a(&creator, &id, "U1").await.unwrap();
    let signed = store.contracts.sign_as_party_b(&contractor, &id, "U2").await.unwrap();
    assert_eq!(signed.status, ContractStatus::Signed);
    assert!(signed.date_signed_a.is_some() && signed.date_signed_b.is_some());
    assert_eq!(payments::payable_contracts(&store.contracts.list, "T1").len(), 1);

    let payment = store
        .payments
        .create_payment(
            &creator,
            &PaymentPayload {
                payer_id: "U1".into(),
                payee_id: "U2".into(),
                task_id: "T1".into(),
                object_type: PaymentObjectType::Contract,
                object_id: Some(id.clone()),
                wallet_id: "W1".into(),
                amount: 4000.0,
                description: Some("first half".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.payee.as_ref().map(|p| p.email.as_str()), Some("omer@site.test"));

    let received = payments::fetch_my_payments(&contractor, "U2").await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, payment.id);
}

#[tokio::test]
async fn guest_has_no_wallets() {
    let backend = MemoryBackend { auth: MemoryAuth::anonymous(), ..backend() };
    let ctx = context(&backend);
    let mut store = AppStore::new();

    let user = projectdesk::api::users::current_user(&ctx).await.unwrap();
    assert!(user.is_guest());
    assert!(store.payments.get_wallets(&ctx, &user).await.unwrap().is_empty());
}

#[test]
fn camelize_renames_nested_keys_only() {
    let row = json!({"task_id": "T1", "measurement_units": {"unit_title": "sqm"}, "tags": [{"is_done": false}]});
    assert_eq!(
        camelize(row),
        json!({"taskId": "T1", "measurementUnits": {"unitTitle": "sqm"}, "tags": [{"isDone": false}]})
    );
}
