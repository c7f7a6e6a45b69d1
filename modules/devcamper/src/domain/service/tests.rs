use std::sync::Arc;

use async_trait::async_trait;
use docstore::MemoryStore;
use query_core::ParamMap;
use serde_json::Value;
use tracing_test::traced_test;

use super::*;
use crate::contract::model::{
    BootcampLink, BootcampPatch, Credentials, GeoLocation, NewBootcamp, NewCourse, NewReview, NewUser,
    ReviewPatch,
};
use crate::infra::storage::repositories;

struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoLocation, DomainError> {
        if address == "nowhere" {
            return Err(DomainError::AddressNotFound {
                address: address.to_string(),
            });
        }
        let mut loc = GeoLocation::point(-71.104, 42.350);
        loc.city = Some("Boston".into());
        loc.formatted_address = Some(format!("{address}, Boston, MA"));
        Ok(loc)
    }
}

struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        Ok(hash == format!("hashed:{password}"))
    }
}

struct PrefixTokens;

impl TokenIssuer for PrefixTokens {
    fn issue(&self, user_id: &str) -> Result<String, DomainError> {
        Ok(format!("tok-{user_id}"))
    }

    fn verify(&self, token: &str) -> Result<String, DomainError> {
        token
            .strip_prefix("tok-")
            .map(str::to_string)
            .ok_or(DomainError::Unauthenticated)
    }
}

fn service() -> Service {
    let repos = repositories(&MemoryStore::new()).unwrap();
    Service::new(
        repos,
        Arc::new(FixedGeocoder),
        Arc::new(PlainHasher),
        Arc::new(PrefixTokens),
        ServiceConfig::default(),
    )
}

async fn account(svc: &Service, name: &str, role: Role) -> User {
    svc.create_user(NewUser {
        name: name.into(),
        email: format!("{name}@gmail.com"),
        password: "123456".into(),
        role: Some(role.as_str().into()),
    })
    .await
    .unwrap()
}

fn new_bootcamp(name: &str) -> NewBootcamp {
    NewBootcamp {
        name: name.into(),
        description: "Full stack web development".into(),
        website: Some("https://devworks.com".into()),
        address: "233 Bay State Rd".into(),
        careers: vec!["Web Development".into(), "UI/UX".into()],
        ..Default::default()
    }
}

fn new_course(tuition: f64) -> NewCourse {
    NewCourse {
        title: "Front End".into(),
        description: "HTML and CSS".into(),
        weeks: "8".into(),
        tuition: Some(tuition),
        minimum_skill: "beginner".into(),
        scholarship_available: false,
    }
}

fn new_review(rating: f64) -> NewReview {
    NewReview {
        title: "Learned a ton".into(),
        text: "Great instructors".into(),
        rating: Some(rating),
    }
}

#[tokio::test]
#[traced_test]
async fn create_bootcamp_geocodes_and_slugifies() {
    let svc = service();
    let publisher = account(&svc, "pub", Role::Publisher).await;

    let b = svc
        .create_bootcamp(&publisher, new_bootcamp("Devworks Bootcamp"))
        .await
        .unwrap();

    assert_eq!(b.slug, "devworks-bootcamp");
    assert_eq!(b.user.as_deref(), Some(publisher.id.as_str()));
    let loc = b.location.unwrap();
    assert_eq!(loc.lng_lat(), Some((-71.104, 42.350)));
    assert_eq!(loc.city.as_deref(), Some("Boston"));
    assert!(logs_contain("Creating new bootcamp"));
}

#[tokio::test]
async fn create_bootcamp_reports_every_violation() {
    let svc = service();
    let publisher = account(&svc, "pub", Role::Publisher).await;

    let err = svc
        .create_bootcamp(
            &publisher,
            NewBootcamp {
                website: Some("devworks.com".into()),
                careers: vec!["Cooking".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    match err {
        DomainError::Validation { errors } => {
            let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
            assert!(fields.contains(&"name"));
            assert!(fields.contains(&"description"));
            assert!(fields.contains(&"address"));
            assert!(fields.contains(&"website"));
            assert!(fields.contains(&"careers"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn unknown_address_is_rejected() {
    let svc = service();
    let publisher = account(&svc, "pub", Role::Publisher).await;
    let mut input = new_bootcamp("Devworks");
    input.address = "nowhere".into();

    let err = svc.create_bootcamp(&publisher, input).await.unwrap_err();
    assert!(matches!(err, DomainError::AddressNotFound { .. }));
}

#[tokio::test]
async fn duplicate_bootcamp_name_is_a_store_error() {
    let svc = service();
    let publisher = account(&svc, "pub", Role::Publisher).await;
    svc.create_bootcamp(&publisher, new_bootcamp("Devworks"))
        .await
        .unwrap();

    let err = svc
        .create_bootcamp(&publisher, new_bootcamp("Devworks"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Store(docstore::StoreError::Duplicate { .. })
    ));
}

#[tokio::test]
async fn only_owner_or_admin_may_update() {
    let svc = service();
    let owner = account(&svc, "owner", Role::Publisher).await;
    let other = account(&svc, "other", Role::Publisher).await;
    let admin = account(&svc, "admin", Role::Admin).await;
    let b = svc
        .create_bootcamp(&owner, new_bootcamp("Devworks"))
        .await
        .unwrap();

    let patch = BootcampPatch {
        name: Some("Devworks Academy".into()),
        ..Default::default()
    };
    let err = svc
        .update_bootcamp(&other, &b.id, patch.clone())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("User {} is not authorized to update this bootcamp", other.id)
    );

    let updated = svc.update_bootcamp(&admin, &b.id, patch).await.unwrap();
    assert_eq!(updated.name, "Devworks Academy");
    assert_eq!(updated.slug, "devworks-academy");
    assert_eq!(updated.created_at, b.created_at);
}

#[tokio::test]
async fn course_changes_refresh_average_cost() {
    let svc = service();
    let owner = account(&svc, "owner", Role::Publisher).await;
    let b = svc
        .create_bootcamp(&owner, new_bootcamp("Devworks"))
        .await
        .unwrap();

    let c1 = svc
        .create_course(&owner, &b.id, new_course(10000.0))
        .await
        .unwrap();
    svc.create_course(&owner, &b.id, new_course(12500.0))
        .await
        .unwrap();
    let camp = svc.get_bootcamp(&b.id).await.unwrap();
    assert_eq!(camp.average_cost, Some(11250.0));

    svc.delete_course(&owner, &c1.id).await.unwrap();
    let camp = svc.get_bootcamp(&b.id).await.unwrap();
    assert_eq!(camp.average_cost, Some(12500.0));

    let courses = svc.bootcamp_courses(&b.id).await.unwrap();
    assert_eq!(courses.len(), 1);
}

#[tokio::test]
async fn stranger_cannot_add_courses() {
    let svc = service();
    let owner = account(&svc, "owner", Role::Publisher).await;
    let other = account(&svc, "other", Role::Publisher).await;
    let b = svc
        .create_bootcamp(&owner, new_bootcamp("Devworks"))
        .await
        .unwrap();

    let err = svc
        .create_course(&other, &b.id, new_course(100.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotOwner { .. }));
}

#[tokio::test]
async fn single_course_embeds_bootcamp_summary() {
    let svc = service();
    let owner = account(&svc, "owner", Role::Publisher).await;
    let b = svc
        .create_bootcamp(&owner, new_bootcamp("Devworks"))
        .await
        .unwrap();
    let c = svc
        .create_course(&owner, &b.id, new_course(100.0))
        .await
        .unwrap();

    let got = svc.get_course(&c.id).await.unwrap();
    match got.bootcamp {
        BootcampLink::Summary(s) => {
            assert_eq!(s.id, b.id);
            assert_eq!(s.name.as_deref(), Some("Devworks"));
        }
        other => panic!("expected populated bootcamp, got {other:?}"),
    }
}

#[tokio::test]
async fn one_review_per_user_and_rating_average() {
    let svc = service();
    let owner = account(&svc, "owner", Role::Publisher).await;
    let alice = account(&svc, "alice", Role::User).await;
    let bob = account(&svc, "bob", Role::User).await;
    let b = svc
        .create_bootcamp(&owner, new_bootcamp("Devworks"))
        .await
        .unwrap();

    let r = svc.create_review(&alice, &b.id, new_review(8.0)).await.unwrap();
    svc.create_review(&bob, &b.id, new_review(9.0)).await.unwrap();
    assert_eq!(svc.get_bootcamp(&b.id).await.unwrap().average_rating, Some(8.5));

    let err = svc
        .create_review(&alice, &b.id, new_review(5.0))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User already reviewed this bootcamp before");

    let err = svc
        .update_review(&bob, &r.id, ReviewPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotOwner { .. }));

    svc.update_review(
        &alice,
        &r.id,
        ReviewPatch {
            rating: Some(10.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(svc.get_bootcamp(&b.id).await.unwrap().average_rating, Some(9.5));
}

#[tokio::test]
async fn rating_out_of_range_is_invalid() {
    let svc = service();
    let owner = account(&svc, "owner", Role::Publisher).await;
    let alice = account(&svc, "alice", Role::User).await;
    let b = svc
        .create_bootcamp(&owner, new_bootcamp("Devworks"))
        .await
        .unwrap();

    let err = svc
        .create_review(&alice, &b.id, new_review(11.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn deleting_bootcamp_cascades() {
    let svc = service();
    let owner = account(&svc, "owner", Role::Publisher).await;
    let alice = account(&svc, "alice", Role::User).await;
    let b = svc
        .create_bootcamp(&owner, new_bootcamp("Devworks"))
        .await
        .unwrap();
    let c = svc
        .create_course(&owner, &b.id, new_course(100.0))
        .await
        .unwrap();
    let r = svc.create_review(&alice, &b.id, new_review(7.0)).await.unwrap();

    svc.delete_bootcamp(&owner, &b.id).await.unwrap();

    assert!(matches!(
        svc.get_bootcamp(&b.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        svc.get_course(&c.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        svc.get_review(&r.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn listing_bootcamps_embeds_courses() {
    let svc = service();
    let owner = account(&svc, "owner", Role::Publisher).await;
    let b = svc
        .create_bootcamp(&owner, new_bootcamp("Devworks"))
        .await
        .unwrap();
    svc.create_course(&owner, &b.id, new_course(100.0))
        .await
        .unwrap();

    let page = svc.list_bootcamps(&ParamMap::new()).await.unwrap();
    assert_eq!(page.count, 1);
    let courses = page.data[0]["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["tuition"], Value::from(100.0));
}

#[tokio::test]
async fn radius_search_validates_distance() {
    let svc = service();
    let owner = account(&svc, "owner", Role::Publisher).await;
    svc.create_bootcamp(&owner, new_bootcamp("Devworks"))
        .await
        .unwrap();

    let found = svc.bootcamps_in_radius("02215", "10").await.unwrap();
    assert_eq!(found.len(), 1);

    let err = svc.bootcamps_in_radius("02215", "far").await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn register_login_and_authenticate() {
    let svc = service();
    let (user, token) = svc
        .register(NewUser {
            name: "John".into(),
            email: "john@gmail.com".into(),
            password: "123456".into(),
            role: Some("publisher".into()),
        })
        .await
        .unwrap();
    assert_eq!(user.role, Role::Publisher);
    assert_eq!(svc.authenticate(&token).await.unwrap().id, user.id);

    let (_, token) = svc
        .login(Credentials {
            email: "john@gmail.com".into(),
            password: "123456".into(),
        })
        .await
        .unwrap();
    assert_eq!(token, format!("tok-{}", user.id));

    let err = svc
        .login(Credentials {
            email: "john@gmail.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidCredentials));

    let err = svc
        .login(Credentials {
            email: "".into(),
            password: "".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::MissingCredentials));

    let err = svc.authenticate("tok-ghost").await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthenticated));
}

#[tokio::test]
async fn registration_rules() {
    let svc = service();
    let err = svc
        .register(NewUser {
            name: "Eve".into(),
            email: "eve@gmail.com".into(),
            password: "123456".into(),
            role: Some("admin".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let err = svc
        .register(NewUser {
            name: "Eve".into(),
            email: "eve@gmail.com".into(),
            password: "123".into(),
            role: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    account(&svc, "eve", Role::User).await;
    let err = svc
        .register(NewUser {
            name: "Eve".into(),
            email: "eve@gmail.com".into(),
            password: "123456".into(),
            role: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailTaken { .. }));
}

#[tokio::test]
async fn admin_user_management() {
    let svc = service();
    let u = account(&svc, "john", Role::User).await;
    account(&svc, "jane", Role::User).await;

    let updated = svc
        .update_user(
            &u.id,
            crate::contract::model::UserPatch {
                name: Some("Johnny".into()),
                email: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Johnny");
    assert_eq!(updated.email, "john@gmail.com");

    let err = svc
        .update_user(
            &u.id,
            crate::contract::model::UserPatch {
                name: None,
                email: Some("jane@gmail.com".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailTaken { .. }));

    svc.delete_user(&u.id).await.unwrap();
    assert!(matches!(
        svc.delete_user(&u.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[test]
fn role_gate() {
    let user = User {
        id: "u1".into(),
        name: "n".into(),
        email: "n@gmail.com".into(),
        role: Role::User,
        created_at: chrono::Utc::now(),
    };
    assert!(require_role(&user, &[Role::User, Role::Admin]).is_ok());
    assert!(matches!(
        require_role(&user, &[Role::Publisher]),
        Err(DomainError::RoleNotAllowed { role: Role::User })
    ));
}
