#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `SqliteSubdomainStore` against the
//! `SubdomainRepository` contract.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use subdomain_orchestrator_app::adapters::SqliteSubdomainStore;
use subdomain_orchestrator_core::error::CoreError;
use subdomain_orchestrator_core::traits::SubdomainRepository;
use subdomain_orchestrator_core::types::{DeleteMode, NewSubdomain, Subdomain, SubdomainStatus};

// ===== Helpers =====

async fn create_test_store() -> (SqliteSubdomainStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = tmp.path().join("nested").join("test.db");
    let store = SqliteSubdomainStore::new(&db_path)
        .await
        .expect("failed to create SqliteSubdomainStore");
    (store, tmp)
}

fn new_sub(name: &str, owner: &str, at: DateTime<Utc>) -> NewSubdomain {
    NewSubdomain {
        name: name.to_string(),
        owner_id: owner.to_string(),
        port: 80,
        created_at: at,
    }
}

fn released(sub: Subdomain, at: DateTime<Utc>, cooldown: TimeDelta) -> Subdomain {
    Subdomain {
        owner_id: None,
        ip_address: None,
        status: SubdomainStatus::Released,
        dns_record_id: None,
        released_at: Some(at),
        cooldown_until: Some(at + cooldown),
        updated_at: at,
        ..sub
    }
}

// ===== create / find =====

#[tokio::test]
async fn create_and_find_round_trip() {
    let (store, _tmp) = create_test_store().await;
    let now = Utc::now();

    let created = store.create(&new_sub("myapp", "alice", now)).await.unwrap();
    assert_eq!(created.status, SubdomainStatus::Reserved);
    assert_eq!(created.owner_id.as_deref(), Some("alice"));
    assert_eq!(created.port, 80);
    assert!(created.ip_address.is_none());

    let by_name = store.find_by_name("myapp").await.unwrap().unwrap();
    assert_eq!(by_name, created);
    let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id, created);

    assert!(store.find_by_name("other").await.unwrap().is_none());
    assert!(store.find_by_id(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn second_live_row_is_a_conflict() {
    let (store, _tmp) = create_test_store().await;
    let now = Utc::now();
    store.create(&new_sub("myapp", "alice", now)).await.unwrap();

    let err = store
        .create(&new_sub("myapp", "bob", now))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_have_one_winner() {
    let (store, _tmp) = create_test_store().await;
    let store = Arc::new(store);
    let now = Utc::now();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .create(&new_sub("racy", &format!("user-{i}"), now))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(CoreError::Conflict(_)) => {}
            Err(other) => panic!("losing claim must see Conflict, got {other:?}"),
        }
    }
    assert_eq!(winners, 1);

    let rows = store
        .list_by_status(SubdomainStatus::Reserved)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "racy");
}

#[tokio::test]
async fn cooldown_blocks_create_until_expiry() {
    let (store, _tmp) = create_test_store().await;
    let t0 = Utc::now();

    let sub = store.create(&new_sub("myapp", "alice", t0)).await.unwrap();
    store
        .update(&released(sub, t0, TimeDelta::days(30)))
        .await
        .unwrap();

    let err = store
        .create(&new_sub("myapp", "bob", t0 + TimeDelta::days(29)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    let reclaimed = store
        .create(&new_sub("myapp", "bob", t0 + TimeDelta::days(31)))
        .await
        .unwrap();
    assert_eq!(reclaimed.owner_id.as_deref(), Some("bob"));

    // the live row wins lookups over the released one
    let found = store.find_by_name("myapp").await.unwrap().unwrap();
    assert_eq!(found.id, reclaimed.id);
}

#[tokio::test]
async fn find_by_name_returns_latest_released_row() {
    let (store, _tmp) = create_test_store().await;
    let t0 = Utc::now();

    let first = store.create(&new_sub("myapp", "alice", t0)).await.unwrap();
    store
        .update(&released(first, t0, TimeDelta::zero()))
        .await
        .unwrap();
    let second = store.create(&new_sub("myapp", "bob", t0)).await.unwrap();
    let second_id = second.id;
    let t1 = t0 + TimeDelta::hours(1);
    store
        .update(&released(second, t1, TimeDelta::days(30)))
        .await
        .unwrap();

    let found = store.find_by_name("myapp").await.unwrap().unwrap();
    assert_eq!(found.id, second_id);
    assert_eq!(found.status, SubdomainStatus::Released);
    assert!(found.in_cooldown(t1));
}

// ===== update =====

#[tokio::test]
async fn update_persists_every_field() {
    let (store, _tmp) = create_test_store().await;
    let now = Utc::now();
    let sub = store.create(&new_sub("myapp", "alice", now)).await.unwrap();

    let active = Subdomain {
        ip_address: Some("203.0.113.7".to_string()),
        port: 8443,
        status: SubdomainStatus::Active,
        dns_record_id: Some("rec-1".to_string()),
        updated_at: now + TimeDelta::minutes(1),
        ..sub
    };
    let saved = store.update(&active).await.unwrap();
    assert_eq!(saved, active);
    assert_eq!(store.find_by_id(active.id).await.unwrap().unwrap(), active);
}

#[tokio::test]
async fn update_unknown_row_is_not_found() {
    let (store, _tmp) = create_test_store().await;
    let now = Utc::now();
    let sub = store.create(&new_sub("myapp", "alice", now)).await.unwrap();
    let ghost = Subdomain { id: 4242, ..sub };
    assert!(matches!(
        store.update(&ghost).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn reviving_a_released_row_over_a_live_one_conflicts() {
    let (store, _tmp) = create_test_store().await;
    let now = Utc::now();

    let old = store.create(&new_sub("myapp", "alice", now)).await.unwrap();
    let old = store
        .update(&released(old, now, TimeDelta::zero()))
        .await
        .unwrap();
    store.create(&new_sub("myapp", "bob", now)).await.unwrap();

    let revived = Subdomain {
        status: SubdomainStatus::Reserved,
        owner_id: Some("alice".to_string()),
        ..old
    };
    assert!(matches!(
        store.update(&revived).await,
        Err(CoreError::Conflict(_))
    ));
}

// ===== delete =====

#[tokio::test]
async fn hard_delete_removes_row() {
    let (store, _tmp) = create_test_store().await;
    let sub = store
        .create(&new_sub("myapp", "alice", Utc::now()))
        .await
        .unwrap();

    store.delete(sub.id, DeleteMode::Hard).await.unwrap();
    assert!(store.find_by_id(sub.id).await.unwrap().is_none());
    assert!(matches!(
        store.delete(sub.id, DeleteMode::Hard).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn soft_delete_releases_without_cooldown() {
    let (store, _tmp) = create_test_store().await;
    let now = Utc::now();
    let sub = store.create(&new_sub("myapp", "alice", now)).await.unwrap();

    store
        .delete(sub.id, DeleteMode::Soft { at: now })
        .await
        .unwrap();

    let row = store.find_by_id(sub.id).await.unwrap().unwrap();
    assert_eq!(row.status, SubdomainStatus::Released);
    assert!(row.owner_id.is_none());
    assert!(row.cooldown_until.is_none());
    assert!(row.released_at.is_some());

    // name is immediately claimable again
    store.create(&new_sub("myapp", "bob", now)).await.unwrap();
}

// ===== queries =====

#[tokio::test]
async fn count_by_owner_ignores_released_rows() {
    let (store, _tmp) = create_test_store().await;
    let now = Utc::now();

    store.create(&new_sub("one-app", "alice", now)).await.unwrap();
    let two = store.create(&new_sub("two-app", "alice", now)).await.unwrap();
    store.create(&new_sub("bob-app", "bob", now)).await.unwrap();
    assert_eq!(store.count_by_owner("alice").await.unwrap(), 2);

    store
        .update(&released(two, now, TimeDelta::days(30)))
        .await
        .unwrap();
    assert_eq!(store.count_by_owner("alice").await.unwrap(), 1);
    assert_eq!(store.count_by_owner("nobody").await.unwrap(), 0);
}

#[tokio::test]
async fn list_by_status_is_sorted_by_name() {
    let (store, _tmp) = create_test_store().await;
    let now = Utc::now();

    for name in ["zeta", "alpha", "mid"] {
        let sub = store.create(&new_sub(name, "alice", now)).await.unwrap();
        store
            .update(&Subdomain {
                status: SubdomainStatus::Active,
                ip_address: Some("10.0.0.1".to_string()),
                ..sub
            })
            .await
            .unwrap();
    }
    store.create(&new_sub("idle", "alice", now)).await.unwrap();

    let active = store
        .list_by_status(SubdomainStatus::Active)
        .await
        .unwrap();
    let names: Vec<_> = active.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);

    let reserved = store
        .list_by_status(SubdomainStatus::Reserved)
        .await
        .unwrap();
    assert_eq!(reserved.len(), 1);
}

#[tokio::test]
async fn data_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("test.db");
    let id = {
        let store = SqliteSubdomainStore::new(&db_path).await.unwrap();
        store
            .create(&new_sub("myapp", "alice", Utc::now()))
            .await
            .unwrap()
            .id
    };

    let store = SqliteSubdomainStore::new(&db_path).await.unwrap();
    let row = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(row.name, "myapp");
}
