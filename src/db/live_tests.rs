//! Repository behaviour against a real MySQL.
//! Run with: DB_USER=.. DB_PASSWORD=.. DB_NAME=.. cargo test -- --ignored

use time::OffsetDateTime;

use super::pool::test_config;
use super::{ConnectionManager, RepoError, Repository};
use crate::conversations::repo_types::{Conversation, ConversationPatch, NewConversation};
use crate::exercises::repo_types::{Exercise, ExercisePatch, NewExercise};
use crate::users::repo_types::{NewUser, User, UserPatch};

async fn connect() -> ConnectionManager {
    let db = ConnectionManager::connect(&test_config())
        .await
        .expect("DB_* must point at a reachable MySQL");
    sqlx::migrate!("./migrations")
        .run(db.pool())
        .await
        .expect("migrations apply");
    db
}

fn unique_email(tag: &str) -> String {
    format!(
        "{tag}-{}@example.com",
        OffsetDateTime::now_utc().unix_timestamp_nanos()
    )
}

async fn new_user(users: &Repository<User>, tag: &str) -> u64 {
    users
        .create(NewUser {
            name: "Ana".into(),
            email: unique_email(tag),
            password_hash: "h".into(),
        })
        .await
        .expect("create user")
}

#[tokio::test]
#[ignore = "requires database"]
async fn user_lifecycle() {
    let db = connect().await;
    let users = Repository::<User>::new(db.clone());
    let started = OffsetDateTime::now_utc() - time::Duration::seconds(1);
    let email = unique_email("ana");

    let id = users
        .create(NewUser {
            name: "Ana".into(),
            email: email.clone(),
            password_hash: "h".into(),
        })
        .await
        .expect("create");

    let user = users.get_by_id(id).await.expect("get").expect("present");
    assert_eq!(user.id, id);
    assert_eq!(user.name, "Ana");
    assert_eq!(user.email, email);
    assert_eq!(user.password_hash, "h");
    assert!(user.created_at >= started);

    let by_email = users.find_by_email(&email).await.expect("find").expect("present");
    assert_eq!(by_email.id, id);

    assert!(users.delete(id).await.expect("delete"));
    assert!(users.get_by_id(id).await.expect("get").is_none());
    assert!(!users.delete(id).await.expect("second delete is not an error"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn unknown_id_is_not_found_rather_than_error() {
    let users = Repository::<User>::new(connect().await);
    assert!(users.get_by_id(u64::MAX - 1).await.expect("query ok").is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_changes_only_submitted_fields() {
    let db = connect().await;
    let users = Repository::<User>::new(db.clone());
    let id = new_user(&users, "patch").await;
    let before = users.get_by_id(id).await.unwrap().unwrap();

    let changed = users
        .update(
            id,
            UserPatch {
                name: Some("Bea".into()),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert!(changed);

    let after = users.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(after.name, "Bea");
    assert_eq!(after.id, before.id);
    assert_eq!(after.email, before.email);
    assert_eq!(after.password_hash, before.password_hash);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_of_missing_row_returns_false_and_inserts_nothing() {
    let conversations = Repository::<Conversation>::new(connect().await);
    let missing = u64::MAX - 7;
    let changed = conversations
        .update(
            missing,
            ConversationPatch {
                title: Some("ghost".into()),
            },
        )
        .await
        .expect("update");
    assert!(!changed);
    assert!(conversations.get_by_id(missing).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn children_are_listed_newest_first() {
    let db = connect().await;
    let users = Repository::<User>::new(db.clone());
    let exercises = Repository::<Exercise>::new(db.clone());
    let user_id = new_user(&users, "list").await;
    let other_id = new_user(&users, "other").await;

    let mut ids = Vec::new();
    for (i, kind) in ["run", "swim", "lift"].into_iter().enumerate() {
        ids.push(
            exercises
                .create(NewExercise {
                    user_id,
                    exercise_type: kind.into(),
                    duration: 10.0 * (i as f64 + 1.0),
                    intensity: "medium".into(),
                })
                .await
                .expect("create exercise"),
        );
    }

    let listed = exercises.list_by_parent(user_id).await.expect("list");
    let listed_ids: Vec<u64> = listed.iter().map(|e| e.id).collect();
    ids.reverse();
    assert_eq!(listed_ids, ids);
    assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    assert!(exercises.list_by_parent(other_id).await.expect("list").is_empty());

    let changed = exercises
        .update(
            ids[0],
            ExercisePatch {
                intensity: Some("high".into()),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert!(changed);
    assert_eq!(exercises.get_by_id(ids[0]).await.unwrap().unwrap().intensity, "high");
}

#[tokio::test]
#[ignore = "requires database"]
async fn deleting_a_user_cascades_to_children() {
    let db = connect().await;
    let users = Repository::<User>::new(db.clone());
    let conversations = Repository::<Conversation>::new(db.clone());
    let user_id = new_user(&users, "cascade").await;

    let conv_id = conversations
        .create(NewConversation {
            user_id,
            title: "Morning plan".into(),
        })
        .await
        .expect("create conversation");

    assert!(users.delete(user_id).await.unwrap());
    assert!(conversations.get_by_id(conv_id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn child_of_missing_user_is_a_foreign_key_violation() {
    let conversations = Repository::<Conversation>::new(connect().await);
    let err = conversations
        .create(NewConversation {
            user_id: u64::MAX - 3,
            title: "orphan".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Database(_)));
    assert!(err.violates_foreign_key());
}

#[tokio::test]
#[ignore = "requires database"]
async fn conversation_round_trips_and_lists_newest_first() {
    let db = connect().await;
    let users = Repository::<User>::new(db.clone());
    let conversations = Repository::<Conversation>::new(db.clone());
    let user_id = new_user(&users, "conv").await;
    let started = OffsetDateTime::now_utc() - time::Duration::seconds(1);

    let mut ids = Vec::new();
    for title in ["Warm-up ideas", "Leg day", "Recovery"] {
        ids.push(
            conversations
                .create(NewConversation {
                    user_id,
                    title: title.into(),
                })
                .await
                .expect("create conversation"),
        );
    }

    let first = conversations.get_by_id(ids[0]).await.expect("get").expect("present");
    assert_eq!(first.id, ids[0]);
    assert_eq!(first.user_id, user_id);
    assert_eq!(first.title, "Warm-up ideas");
    assert!(first.created_at >= started);

    let listed = conversations.list_by_parent(user_id).await.expect("list");
    let titles: Vec<&str> = listed.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["Recovery", "Leg day", "Warm-up ideas"]);
    assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    assert!(conversations.delete(ids[1]).await.expect("delete"));
    assert_eq!(conversations.list_by_parent(user_id).await.expect("list").len(), 2);
}

#[tokio::test]
#[ignore = "requires database"]
async fn exercise_round_trips_every_field() {
    let db = connect().await;
    let users = Repository::<User>::new(db.clone());
    let exercises = Repository::<Exercise>::new(db.clone());
    let user_id = new_user(&users, "exercise").await;
    let started = OffsetDateTime::now_utc() - time::Duration::seconds(1);

    let id = exercises
        .create(NewExercise {
            user_id,
            exercise_type: "rowing".into(),
            duration: 27.75,
            intensity: "moderate".into(),
        })
        .await
        .expect("create exercise");

    let exercise = exercises.get_by_id(id).await.expect("get").expect("present");
    assert_eq!(exercise.id, id);
    assert_eq!(exercise.user_id, user_id);
    assert_eq!(exercise.exercise_type, "rowing");
    assert_eq!(exercise.duration, 27.75);
    assert_eq!(exercise.intensity, "moderate");
    assert!(exercise.created_at >= started);

    let changed = exercises
        .update(
            id,
            ExercisePatch {
                duration: Some(0.5),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert!(changed);
    let after = exercises.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(after.duration, 0.5);
    assert_eq!(after.exercise_type, "rowing");
    assert_eq!(after.created_at, exercise.created_at);
}
