//! Integration tests for registration, login and profile updates.

use gymcoach_core::CoachError;
use gymcoach_core::token::{SessionConfig, verify_token};
use gymcoach_core::user::{
    ProfileInput, RegisterInput, fetch_user, login, register, update_profile,
};
use gymcoach_db::queries::users;
use gymcoach_test_utils::{create_test_db, drop_test_db, unreachable_pool};

fn sessions() -> SessionConfig {
    SessionConfig::new(b"user-service-test-secret".to_vec())
}

fn registration(email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        email: email.to_string(),
        password: password.to_string(),
        name: Some("Ada".to_string()),
        goal: Some("hypertrophy".to_string()),
        frequency: Some(4),
        ..RegisterInput::default()
    }
}

#[tokio::test]
async fn register_hashes_password_and_issues_token() {
    let (pool, db_name) = create_test_db().await;
    let config = sessions();

    let auth = register(&pool, &config, registration("Ada@Example.com", "s3cret"))
        .await
        .unwrap();
    assert_eq!(auth.user.email, "ada@example.com");
    assert_eq!(auth.user.name, "Ada");
    assert_eq!(auth.user.frequency, 4);
    assert_ne!(auth.user.password_hash, "s3cret");
    assert!(auth.user.password_hash.starts_with("$2"));

    let claims = verify_token(&config, &auth.token).unwrap();
    assert_eq!(claims.user_id, auth.user.id);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn duplicate_registration_conflicts_without_new_row() {
    let (pool, db_name) = create_test_db().await;
    let config = sessions();

    register(&pool, &config, registration("dup@example.com", "one"))
        .await
        .unwrap();
    let err = register(&pool, &config, registration("DUP@example.com", "two"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoachError::Conflict(_)), "got {err:?}");

    let count = users::count_users_with_email(&pool, "dup@example.com")
        .await
        .unwrap();
    assert_eq!(count, 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn register_requires_email_and_password() {
    let (pool, db_name) = create_test_db().await;
    let config = sessions();

    let err = register(&pool, &config, registration("", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoachError::Validation(_)));

    let err = register(&pool, &config, registration("x@example.com", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, CoachError::Validation(_)));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn login_with_correct_credentials() {
    let (pool, db_name) = create_test_db().await;
    let config = sessions();

    let registered = register(&pool, &config, registration("grace@example.com", "pw1"))
        .await
        .unwrap();
    let auth = login(&pool, &config, " grace@example.com", "pw1")
        .await
        .unwrap();
    assert_eq!(auth.user.id, registered.user.id);
    assert!(verify_token(&config, &auth.token).is_ok());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (pool, db_name) = create_test_db().await;
    let config = sessions();

    register(&pool, &config, registration("grace@example.com", "right"))
        .await
        .unwrap();

    let err = login(&pool, &config, "grace@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, CoachError::Unauthorized(_)), "got {err:?}");

    let err = login(&pool, &config, "nobody@example.com", "right")
        .await
        .unwrap_err();
    assert!(matches!(err, CoachError::Unauthorized(_)), "got {err:?}");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn unknown_email_costs_a_password_check() {
    let (pool, db_name) = create_test_db().await;
    let config = sessions();

    register(&pool, &config, registration("ada@example.com", "right"))
        .await
        .unwrap();
    // Warm up the throwaway hash so both timings cover one verification.
    let _ = login(&pool, &config, "ghost@example.com", "x").await;

    let started = std::time::Instant::now();
    let wrong = login(&pool, &config, "ada@example.com", "wrong")
        .await
        .unwrap_err();
    let wrong_password = started.elapsed();

    let started = std::time::Instant::now();
    let unknown = login(&pool, &config, "ghost@example.com", "wrong")
        .await
        .unwrap_err();
    let unknown_email = started.elapsed();

    assert_eq!(wrong.to_string(), unknown.to_string());
    assert!(
        unknown_email * 3 >= wrong_password,
        "unknown email answered in {unknown_email:?}, wrong password in {wrong_password:?}"
    );

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_overwrites_profile_and_can_change_password() {
    let (pool, db_name) = create_test_db().await;
    let config = sessions();

    let auth = register(&pool, &config, registration("lin@example.com", "old"))
        .await
        .unwrap();

    let updated = update_profile(
        &pool,
        auth.user.id,
        ProfileInput {
            email: "lin@example.com".to_string(),
            password: Some("new".to_string()),
            name: Some("Lin".to_string()),
            goal: None,
            restrictions: Some("vegan".to_string()),
            frequency: Some(2),
            image_url: Some("https://img.example.com/lin.png".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Lin");
    assert_eq!(updated.goal, "", "absent fields are overwritten with empty values");
    assert_eq!(updated.restrictions, "vegan");
    assert_eq!(updated.frequency, 2);

    assert!(login(&pool, &config, "lin@example.com", "old").await.is_err());
    assert!(login(&pool, &config, "lin@example.com", "new").await.is_ok());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_to_taken_email_conflicts() {
    let (pool, db_name) = create_test_db().await;
    let config = sessions();

    let a = register(&pool, &config, registration("a@example.com", "pw"))
        .await
        .unwrap();
    register(&pool, &config, registration("b@example.com", "pw"))
        .await
        .unwrap();

    let err = update_profile(
        &pool,
        a.user.id,
        ProfileInput {
            email: "b@example.com".to_string(),
            ..ProfileInput::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoachError::Conflict(_)));

    let err = update_profile(
        &pool,
        uuid::Uuid::new_v4(),
        ProfileInput {
            email: "c@example.com".to_string(),
            ..ProfileInput::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoachError::NotFound(_)));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn fetch_missing_user_is_none() {
    let (pool, db_name) = create_test_db().await;

    assert!(fetch_user(&pool, uuid::Uuid::new_v4()).await.unwrap().is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn fetch_with_storage_down_is_storage_error() {
    let pool = unreachable_pool();
    let err = fetch_user(&pool, uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_storage());
}
