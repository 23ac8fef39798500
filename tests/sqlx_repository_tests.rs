//! Repository tests against a real Postgres database.
//!
//! `#[sqlx::test]` creates a fresh database per test from `DATABASE_URL` and
//! applies `./migrations` before the test body runs.

use chrono::{Duration, Utc};
use photomap_backend::{
    entities::{photo::PhotoInsert, user::UserInsert},
    errors::AppError,
    repositories::{
        follow::FollowRepository,
        photo::PhotoRepository,
        sqlx_repo::{SqlxFollowRepo, SqlxPhotoRepo, SqlxUserRepo},
        user::UserRepository,
    },
};
use sqlx::PgPool;
use uuid::Uuid;

async fn insert_user(pool: &PgPool, email: &str, age_minutes: i64) -> Uuid {
    SqlxUserRepo::new(pool.clone())
        .create_user(&UserInsert {
            email: email.to_string(),
            name: None,
            password_hash: "$argon2id$stub".to_string(),
            created_at: Utc::now() - Duration::minutes(age_minutes),
        })
        .await
        .unwrap()
}

fn photo(owner: Uuid, title: &str, coords: (Option<f64>, Option<f64>)) -> PhotoInsert {
    PhotoInsert {
        user_id: owner,
        title: title.to_string(),
        image_url: format!("https://img.test/{title}.jpg"),
        location: None,
        latitude: coords.0,
        longitude: coords.1,
        created_at: Utc::now(),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn second_follow_is_already_exists_and_one_edge_remains(pool: PgPool) {
    let follows = SqlxFollowRepo::new(pool.clone());
    let ana = insert_user(&pool, "ana@photomap.test", 2).await;
    let ben = insert_user(&pool, "ben@photomap.test", 1).await;

    follows.create_follow(&ana, &ben).await.unwrap();
    let again = follows.create_follow(&ana, &ben).await;
    assert!(matches!(again, Err(AppError::AlreadyExists(_))));

    assert_eq!(follows.count_following(&ana).await.unwrap(), 1);
    assert_eq!(follows.count_followers(&ben).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_duplicate_follows_leave_one_edge(pool: PgPool) {
    let follows = SqlxFollowRepo::new(pool.clone());
    let ana = insert_user(&pool, "ana@photomap.test", 2).await;
    let ben = insert_user(&pool, "ben@photomap.test", 1).await;

    let (first, second) = tokio::join!(
        follows.create_follow(&ana, &ben),
        follows.create_follow(&ana, &ben),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(r, Err(AppError::AlreadyExists(_)))));
    assert_eq!(follows.count_following(&ana).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn following_a_missing_user_is_not_found(pool: PgPool) {
    let follows = SqlxFollowRepo::new(pool.clone());
    let ana = insert_user(&pool, "ana@photomap.test", 1).await;

    let result = follows.create_follow(&ana, &Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn schema_rejects_self_follow(pool: PgPool) {
    let follows = SqlxFollowRepo::new(pool.clone());
    let ana = insert_user(&pool, "ana@photomap.test", 1).await;

    let result = follows.create_follow(&ana, &ana).await;
    assert!(matches!(result, Err(AppError::InternalError(_))));
    assert_eq!(follows.count_following(&ana).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn unfollow_removes_edge_from_both_listings(pool: PgPool) {
    let follows = SqlxFollowRepo::new(pool.clone());
    let ana = insert_user(&pool, "ana@photomap.test", 2).await;
    let ben = insert_user(&pool, "ben@photomap.test", 1).await;

    assert!(!follows.delete_follow(&ana, &ben).await.unwrap());

    follows.create_follow(&ana, &ben).await.unwrap();
    let following: Vec<Uuid> = follows.list_following(&ana).await.unwrap().iter().map(|u| u.id).collect();
    let followers: Vec<Uuid> = follows.list_followers(&ben).await.unwrap().iter().map(|u| u.id).collect();
    assert_eq!(following, vec![ben]);
    assert_eq!(followers, vec![ana]);

    assert!(follows.delete_follow(&ana, &ben).await.unwrap());
    assert!(follows.list_following(&ana).await.unwrap().is_empty());
    assert!(follows.list_followers(&ben).await.unwrap().is_empty());
    assert!(follows.find_follow(&ana, &ben).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn discover_skips_actor_and_followed_users_and_honours_limit(pool: PgPool) {
    let follows = SqlxFollowRepo::new(pool.clone());
    let ana = insert_user(&pool, "ana@photomap.test", 40).await;
    let ben = insert_user(&pool, "ben@photomap.test", 30).await;
    let cleo = insert_user(&pool, "cleo@photomap.test", 20).await;
    let dora = insert_user(&pool, "dora@photomap.test", 10).await;
    follows.create_follow(&ana, &ben).await.unwrap();
    // An edge pointing at the actor must not hide anyone
    follows.create_follow(&cleo, &ana).await.unwrap();

    let found: Vec<Uuid> = follows.discover_users(&ana, 50).await.unwrap().iter().map(|u| u.id).collect();
    assert_eq!(found, vec![dora, cleo]);

    let limited = follows.discover_users(&ana, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, dora);
}

#[sqlx::test(migrations = "./migrations")]
async fn geotagged_feed_is_exactly_the_photos_with_both_coordinates(pool: PgPool) {
    let photos = SqlxPhotoRepo::new(pool.clone());
    let ana = insert_user(&pool, "ana@photomap.test", 1).await;

    let porto = photos.create_photo(&photo(ana, "porto", (Some(41.15), Some(-8.61)))).await.unwrap();
    photos.create_photo(&photo(ana, "untagged", (None, None))).await.unwrap();
    let equator = photos.create_photo(&photo(ana, "equator", (Some(0.0), Some(0.0)))).await.unwrap();

    let mut feed: Vec<Uuid> = photos.list_geotagged_photos().await.unwrap().iter().map(|p| p.id).collect();
    feed.sort();
    let mut expected = vec![porto.id, equator.id];
    expected.sort();
    assert_eq!(feed, expected);
    assert_eq!(photos.list_photos_by_owner(&ana).await.unwrap().len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn schema_rejects_unpaired_or_out_of_range_coordinates(pool: PgPool) {
    let photos = SqlxPhotoRepo::new(pool.clone());
    let ana = insert_user(&pool, "ana@photomap.test", 1).await;

    for coords in [(Some(38.7), None), (None, Some(-9.1)), (Some(91.0), Some(0.0)), (Some(0.0), Some(181.0))] {
        let result = photos.create_photo(&photo(ana, "bad", coords)).await;
        assert!(matches!(result, Err(AppError::InternalError(_))), "{coords:?}");
    }
    assert!(photos.list_photos_by_owner(&ana).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_a_user_cascades_to_photos_and_edges(pool: PgPool) {
    let users = SqlxUserRepo::new(pool.clone());
    let follows = SqlxFollowRepo::new(pool.clone());
    let photos = SqlxPhotoRepo::new(pool.clone());
    let ana = insert_user(&pool, "ana@photomap.test", 2).await;
    let ben = insert_user(&pool, "ben@photomap.test", 1).await;

    let harbour = photos.create_photo(&photo(ben, "harbour", (Some(38.7), Some(-9.1)))).await.unwrap();
    follows.create_follow(&ana, &ben).await.unwrap();
    follows.create_follow(&ben, &ana).await.unwrap();

    users.delete_user(&ben).await.unwrap();

    assert!(!users.user_exists(&ben).await.unwrap());
    assert!(photos.get_photo_by_id(&harbour.id).await.unwrap().is_none());
    assert_eq!(follows.count_following(&ana).await.unwrap(), 0);
    assert_eq!(follows.count_followers(&ana).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_email_is_already_exists(pool: PgPool) {
    insert_user(&pool, "ana@photomap.test", 1).await;

    let result = SqlxUserRepo::new(pool.clone())
        .create_user(&UserInsert {
            email: "ana@photomap.test".to_string(),
            name: None,
            password_hash: "$argon2id$stub".to_string(),
            created_at: Utc::now(),
        })
        .await;
    assert!(matches!(result, Err(AppError::AlreadyExists(_))));
}
