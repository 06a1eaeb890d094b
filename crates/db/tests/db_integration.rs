//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p vidtube-db --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `vidtube_test`)
//!   `TEST_DB_PASSWORD` (default: `vidtube_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::Set;
use vidtube_db::entities::{subscription, user, video, view};
use vidtube_db::repositories::{
    SubscriptionRepository, UserRepository, VideoRepository, ViewRepository,
};
use vidtube_db::test_utils::{TestDatabase, TestDbConfig};

fn new_user(id: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        firstname: Set("Test".to_string()),
        lastname: Set("User".to_string()),
        username: Set(id.to_string()),
        email: Set(format!("{id}@example.com")),
        password: Set("hash".to_string()),
        token: Set(None),
        channel_description: Set(None),
        avatar: Set(None),
        cover: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

fn new_video(id: &str, user_id: &str) -> video::ActiveModel {
    video::ActiveModel {
        id: Set(id.to_string()),
        title: Set(format!("video {id}")),
        description: Set(None),
        url: Set(format!("https://cdn.example.com/{id}.mp4")),
        thumbnail: Set(format!("https://cdn.example.com/{id}.jpg")),
        user_id: Set(user_id.to_string()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

fn new_view(id: &str, user_id: &str, video_id: &str) -> view::ActiveModel {
    view::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(user_id.to_string()),
        video_id: Set(video_id.to_string()),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_views_are_unique_per_user_and_video() {
    let db = TestDatabase::create().await.unwrap();
    let conn = db.connection();

    let users = UserRepository::new(Arc::clone(&conn));
    let videos = VideoRepository::new(Arc::clone(&conn));
    let views = ViewRepository::new(Arc::clone(&conn));

    for id in ["u1", "u2", "u3"] {
        users.create(new_user(id)).await.unwrap();
    }
    videos.create(new_video("v1", "u1")).await.unwrap();

    assert!(views.record(new_view("w1", "u1", "v1")).await.unwrap());
    assert!(views.record(new_view("w2", "u2", "v1")).await.unwrap());
    assert!(views.record(new_view("w3", "u3", "v1")).await.unwrap());
    assert!(!views.record(new_view("w4", "u1", "v1")).await.unwrap());

    assert_eq!(views.count_by_video("v1").await.unwrap(), 3);
    let counts = views.count_by_videos(&["v1".to_string()]).await.unwrap();
    assert_eq!(counts.get("v1"), Some(&3));

    db.cleanup().await.unwrap();
    assert_eq!(views.count_by_video("v1").await.unwrap(), 0);
    assert!(users.find_by_id("u1").await.unwrap().is_none());

    drop((users, videos, views, conn));
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_subscription_toggle_round_trip() {
    let db = TestDatabase::create().await.unwrap();
    let conn = db.connection();

    let users = UserRepository::new(Arc::clone(&conn));
    let subs = SubscriptionRepository::new(Arc::clone(&conn));

    users.create(new_user("a")).await.unwrap();
    users.create(new_user("b")).await.unwrap();

    let sub = || subscription::ActiveModel {
        id: Set(uuid::Uuid::new_v4().simple().to_string()),
        subscriber: Set("a".to_string()),
        subscribe_to: Set("b".to_string()),
        created_at: Set(Utc::now().into()),
    };

    assert!(subs.subscribe(sub()).await.unwrap());
    assert!(!subs.subscribe(sub()).await.unwrap());
    assert!(subs.is_subscribed("a", "b").await.unwrap());

    assert!(subs.unsubscribe("a", "b").await.unwrap());
    assert!(!subs.is_subscribed("a", "b").await.unwrap());
    assert_eq!(subs.count_subscribers("b").await.unwrap(), 0);

    drop((users, subs, conn));
    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
}
