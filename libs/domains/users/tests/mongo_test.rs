//! MongoDB integration tests for the Users domain
//!
//! These start a MongoDB container and are ignored by default:
//! `cargo test -p domain_users -- --ignored`

use axum_helpers::PageOptions;
use domain_users::*;
use test_utils::{TestDataBuilder, TestMongo, assertions::assert_some};

async fn repository(mongo: &TestMongo, name: &str) -> MongoUserRepository {
    let repo = MongoUserRepository::new(&mongo.database(name));
    repo.create_indexes().await.unwrap();
    repo
}

fn input(email: String, name: String) -> CreateUser {
    CreateUser {
        email,
        name,
        roles: None,
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_mongo_crud_round_trip() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "users_crud").await;
    let builder = TestDataBuilder::from_test_name("mongo_crud");

    let user = User::new(input(builder.email("ada"), builder.name("user", "ada")));
    let created = repo.create(user.clone()).await.unwrap();
    assert_eq!(created, user);

    let fetched = assert_some(repo.get_by_id(user.id).await.unwrap(), "get_by_id");
    assert_eq!(fetched, user);

    let mut changed = fetched;
    changed.apply_update(UpdateUser {
        name: Some("Renamed".into()),
        ..Default::default()
    });
    let updated = repo.update(changed.clone()).await.unwrap();
    assert_eq!(updated.name, "Renamed");

    let removed = assert_some(repo.delete(user.id).await.unwrap(), "delete");
    assert_eq!(removed, changed);
    assert!(repo.get_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_mongo_unique_email_index() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "users_unique").await;

    repo.create(User::new(input("Ada@Example.com".into(), "Ada".into())))
        .await
        .unwrap();
    let result = repo
        .create(User::new(input("ada@example.com".into(), "Ada again".into())))
        .await;

    assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    assert!(repo.email_exists("ADA@example.com").await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_mongo_paginated_service() {
    let mongo = TestMongo::new().await;
    let service = UserManager::new(repository(&mongo, "users_paged").await);

    for i in 0..5 {
        service
            .create(input(format!("user{i}@example.com"), format!("User {i}")))
            .await
            .unwrap();
    }

    let page = service
        .find_paginated(
            UserFilter {
                email: Some("USER".into()),
                ..Default::default()
            },
            PageOptions::new(2, 2).with_sort("-email"),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 3);
    let emails: Vec<_> = page.items.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, ["user2@example.com", "user1@example.com"]);
}
