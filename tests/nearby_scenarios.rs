// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end behaviour of the activity service over the in-memory store.

use chrono::Duration;
use hearnear::error::AppError;
use hearnear::models::{Profile, UserId};

mod common;
use common::{activity, t0, test_service};

const A: UserId = 1;
const B: UserId = 2;
const C: UserId = 3;
const D: UserId = 4;

fn ids(result: &hearnear::models::NearbyResult) -> Vec<UserId> {
    result.listeners.iter().map(|l| l.record.user_id).collect()
}

#[tokio::test]
async fn test_warsaw_scenario() {
    let (service, _, _) = test_service();

    service.submit_activity(A, &activity(52.20, 21.00, "a")).await.unwrap();
    service.submit_activity(B, &activity(52.21, 21.00, "b")).await.unwrap();
    service.submit_activity(C, &activity(10.0, 10.0, "c")).await.unwrap();

    let result = service.query_nearby(A, Some(50.0), Some(60)).await.unwrap();

    assert_eq!(ids(&result), vec![B]);
    assert_eq!(result.total_count, 1);
    let distance = result.listeners[0].distance_km;
    assert!((distance - 1.1).abs() < 0.05, "got {}", distance);

    assert_eq!(result.max_distance_km, 50.0);
    assert_eq!(result.max_age_minutes, 60);
    assert_eq!(result.origin.y(), 52.20);
    assert_eq!(result.origin.x(), 21.00);
}

#[tokio::test]
async fn test_stale_listener_depends_on_window() {
    let (service, _, clock) = test_service();

    clock.set(t0() - Duration::minutes(90));
    service.submit_activity(D, &activity(52.205, 21.00, "d")).await.unwrap();

    clock.set(t0());
    service.submit_activity(A, &activity(52.20, 21.00, "a")).await.unwrap();

    let result = service.query_nearby(A, None, None).await.unwrap();
    assert!(ids(&result).is_empty());

    let result = service.query_nearby(A, None, Some(120)).await.unwrap();
    assert_eq!(ids(&result), vec![D]);
    assert_eq!(result.listeners[0].minutes_ago, 90);
}

#[tokio::test]
async fn test_defaults_applied() {
    let (service, _, _) = test_service();
    service.submit_activity(A, &activity(0.0, 0.0, "a")).await.unwrap();

    let result = service.query_nearby(A, None, None).await.unwrap();
    assert_eq!(result.max_distance_km, 50.0);
    assert_eq!(result.max_age_minutes, 60);
}

#[tokio::test]
async fn test_requires_own_activity() {
    let (service, _, _) = test_service();
    service.submit_activity(B, &activity(52.21, 21.00, "b")).await.unwrap();

    let err = service.query_nearby(A, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::NoOwnActivity(A)));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_own_record_excluded_and_sorted() {
    let (service, _, _) = test_service();
    service.submit_activity(A, &activity(52.20, 21.00, "a")).await.unwrap();
    service.submit_activity(B, &activity(52.40, 21.00, "b")).await.unwrap();
    service.submit_activity(C, &activity(52.25, 21.00, "c")).await.unwrap();
    service.submit_activity(D, &activity(52.30, 21.00, "d")).await.unwrap();

    let result = service.query_nearby(A, None, None).await.unwrap();

    assert_eq!(ids(&result), vec![C, D, B]);
    assert!(result
        .listeners
        .windows(2)
        .all(|w| w[0].distance_km <= w[1].distance_km));
}

#[tokio::test]
async fn test_freshness_boundary_is_inclusive() {
    let (service, _, clock) = test_service();

    clock.set(t0() - Duration::minutes(60));
    service.submit_activity(B, &activity(52.21, 21.00, "b")).await.unwrap();
    clock.set(t0());
    service.submit_activity(A, &activity(52.20, 21.00, "a")).await.unwrap();

    let result = service.query_nearby(A, None, Some(60)).await.unwrap();
    assert_eq!(ids(&result), vec![B]);

    clock.advance(Duration::seconds(1));
    let result = service.query_nearby(A, None, Some(60)).await.unwrap();
    assert!(ids(&result).is_empty());
}

#[tokio::test]
async fn test_resubmit_overwrites_and_refreshes() {
    let (service, db, clock) = test_service();

    let first = service.submit_activity(A, &activity(52.20, 21.00, "first")).await.unwrap();
    clock.advance(Duration::minutes(5));
    let second = service.submit_activity(A, &activity(50.06, 19.94, "second")).await.unwrap();

    assert!(second.last_updated > first.last_updated);

    let stored = service.get_own_activity(A).await.unwrap();
    assert_eq!(stored, second);
    assert_eq!(stored.track_name, "second");
    assert_eq!(stored.latitude, 50.06);

    match db {
        hearnear::db::Db::Memory(mem) => assert_eq!(mem.activity_count(), 1),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_invalid_update_leaves_record_unchanged() {
    let (service, _, clock) = test_service();

    let original = service.submit_activity(A, &activity(52.20, 21.00, "ok")).await.unwrap();
    clock.advance(Duration::minutes(1));

    let err = service
        .submit_activity(A, &activity(95.0, 21.00, "bad"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = service
        .submit_activity(A, &activity(52.20, 21.00, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(service.get_own_activity(A).await.unwrap(), original);
}

#[tokio::test]
async fn test_remove_activity() {
    let (service, _, _) = test_service();
    service.submit_activity(A, &activity(52.20, 21.00, "a")).await.unwrap();

    assert!(service.remove_activity(A).await.unwrap());
    assert!(!service.remove_activity(A).await.unwrap());

    let err = service.get_own_activity(A).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = service.query_nearby(A, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::NoOwnActivity(A)));
}

#[tokio::test]
async fn test_sweep_twice_deletes_once() {
    let (service, _, clock) = test_service();

    clock.set(t0() - Duration::hours(30));
    service.submit_activity(B, &activity(52.21, 21.00, "b")).await.unwrap();
    clock.set(t0() - Duration::hours(25));
    service.submit_activity(C, &activity(52.22, 21.00, "c")).await.unwrap();
    clock.set(t0());
    service.submit_activity(A, &activity(52.20, 21.00, "a")).await.unwrap();

    assert_eq!(service.sweep_expired(None).await.unwrap(), 2);
    assert_eq!(service.sweep_expired(None).await.unwrap(), 0);
    assert!(service.get_own_activity(A).await.is_ok());
}

#[tokio::test]
async fn test_sweep_custom_threshold() {
    let (service, _, clock) = test_service();

    clock.set(t0() - Duration::hours(3));
    service.submit_activity(B, &activity(52.21, 21.00, "b")).await.unwrap();
    clock.set(t0());

    assert_eq!(service.sweep_expired(Some(4)).await.unwrap(), 0);
    assert_eq!(service.sweep_expired(Some(2)).await.unwrap(), 1);
}

#[tokio::test]
async fn test_sweep_threshold_past_date_range_is_rejected() {
    let (service, _, _) = test_service();
    service.submit_activity(A, &activity(52.20, 21.00, "a")).await.unwrap();

    let err = service.sweep_expired(Some(u32::MAX)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(service.get_own_activity(A).await.is_ok());
}

#[tokio::test]
async fn test_profiles_merged_into_results() {
    let (service, db, _) = test_service();

    db.upsert_profile(Profile {
        user_id: B,
        nick: "anna".to_string(),
        avatar_url: Some("/avatars/2.jpg".to_string()),
        instagram_username: None,
        instagram_url: None,
    })
    .await
    .unwrap();

    service.submit_activity(A, &activity(52.20, 21.00, "a")).await.unwrap();
    service.submit_activity(B, &activity(52.21, 21.00, "b")).await.unwrap();
    service.submit_activity(C, &activity(52.22, 21.00, "c")).await.unwrap();

    let result = service.query_nearby(A, None, None).await.unwrap();

    let b = &result.listeners[0];
    assert_eq!(b.record.user_id, B);
    assert_eq!(b.profile.as_ref().map(|p| p.nick.as_str()), Some("anna"));

    let c = &result.listeners[1];
    assert_eq!(c.record.user_id, C);
    assert!(c.profile.is_none());
}

#[tokio::test]
async fn test_negative_distance_rejected() {
    let (service, _, _) = test_service();
    service.submit_activity(A, &activity(52.20, 21.00, "a")).await.unwrap();

    let err = service.query_nearby(A, Some(-5.0), None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_concurrent_updates_never_mix_fields() {
    let (service, _, _) = test_service();

    let mut handles = vec![];
    for i in 0..20u32 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let lat = f64::from(i);
            service
                .submit_activity(A, &activity(lat, 0.0, &format!("track-{}", i)))
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("Task join failed").expect("Update failed");
    }

    let stored = service.get_own_activity(A).await.unwrap();
    let i = stored.latitude as u32;
    assert_eq!(stored.track_name, format!("track-{}", i));
}
