//! Integration tests for registration, sign-in and sign-out.
//!
//! Tests the flow: AuthService → UserRegistry / SessionStore → storage

use aegis_auth::{AuthError, Entitlement, Role, SubscriptionTier};
use aegis_runtime::config::{AegisConfig, StorageBackend};
use aegis_runtime::storage::{DisabledStore, KeyValueStore, MemoryStore, SESSION_KEY, USERS_KEY};
use aegis_runtime::{Origin, SignUpForm, Tab};
use std::sync::Arc;

fn instant_config() -> AegisConfig {
    let mut config = AegisConfig::default();
    config.latency.enabled = false;
    config
}

fn origin() -> (Origin, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Origin::new(store.clone(), instant_config()), store)
}

/// Registration scenario: duplicate detection is case-insensitive and
/// authentication compares the password exactly.
#[test]
fn ana_registration_scenario() {
    let (origin, _) = origin();
    let tab = origin.open_tab();
    let registry = tab.registry();

    registry
        .register("Ana", "ana@x.com", "secret1")
        .expect("first registration should succeed");

    let duplicate = registry.register("Ana2", "ANA@X.COM", "other");
    assert!(matches!(duplicate, Err(AuthError::DuplicateEmail { .. })));

    assert!(registry.authenticate("ana@x.com", "secret1").is_some());
    assert!(registry.authenticate("ana@x.com", "wrong").is_none());
}

#[tokio::test]
async fn registration_is_visible_to_every_tab() {
    let (origin, _) = origin();
    let a = origin.open_tab();
    let b = origin.open_tab();

    a.auth()
        .sign_up("Ana", "ana@x.com", "secret1")
        .await
        .expect("sign-up should succeed");

    let session = b
        .auth()
        .sign_in("ana@x.com", "secret1")
        .await
        .expect("other tab should sign in");
    assert_eq!(session.role, Role::User);
    assert!(a.is_authenticated(), "session is origin-wide");
}

#[tokio::test]
async fn session_exists_iff_authenticated() {
    let (origin, store) = origin();
    let tab = origin.open_tab();
    let check = |tab: &Tab| {
        assert_eq!(
            tab.is_authenticated(),
            store.get(SESSION_KEY).unwrap().is_some()
        );
    };

    check(&tab);
    tab.auth().sign_up("Ana", "ana@x.com", "secret1").await.unwrap();
    check(&tab);
    tab.auth().sign_in("ana@x.com", "secret1").await.unwrap();
    check(&tab);
    tab.auth().sign_out();
    check(&tab);
}

#[tokio::test]
async fn sign_out_twice_matches_sign_out_once() {
    let (origin, store) = origin();
    let tab = origin.open_tab();
    tab.auth().sign_up("Ana", "ana@x.com", "secret1").await.unwrap();
    tab.auth().sign_in("ana@x.com", "secret1").await.unwrap();

    tab.auth().sign_out();
    let users_after_one = store.get(USERS_KEY).unwrap();
    let session_after_one = store.get(SESSION_KEY).unwrap();

    tab.auth().sign_out();
    assert_eq!(store.get(USERS_KEY).unwrap(), users_after_one);
    assert_eq!(store.get(SESSION_KEY).unwrap(), session_after_one);
    assert!(!tab.is_authenticated());
}

#[tokio::test]
async fn new_sign_in_replaces_session() {
    let (origin, _) = origin();
    let tab = origin.open_tab();
    tab.auth().sign_up("Ana", "ana@x.com", "secret1").await.unwrap();
    tab.auth().sign_up("Bob", "bob@x.com", "hunter2").await.unwrap();

    tab.auth().sign_in("ana@x.com", "secret1").await.unwrap();
    tab.auth().sign_in("bob@x.com", "hunter2").await.unwrap();

    let session = tab.sessions().current_session().expect("signed in");
    assert_eq!(session.name, "Bob");
}

#[tokio::test]
async fn validated_form_feeds_sign_up() {
    let (origin, _) = origin();
    let tab = origin.open_tab();

    let form = SignUpForm::new("Ana", "ana@x.com", "secret1", "secret1");
    form.validate().expect("form is valid");
    tab.auth()
        .sign_up(&form.name, &form.email, &form.password)
        .await
        .unwrap();

    assert!(tab.registry().contains("ana@x.com").unwrap());
}

#[tokio::test]
async fn blocked_storage_degrades_to_signed_out() {
    let origin = Origin::new(Arc::new(DisabledStore), instant_config());
    let tab = origin.open_tab();

    assert!(matches!(
        tab.auth().sign_up("Ana", "ana@x.com", "secret1").await,
        Err(AuthError::StorageUnavailable(_))
    ));
    assert!(tab.sessions().current_session().is_none());
    assert!(!tab.is_authenticated());
    tab.auth().sign_out();
}

#[test]
fn origin_from_disabled_config() {
    let mut config = instant_config();
    config.storage.backend = StorageBackend::Disabled;
    let origin = Origin::from_config(config).expect("disabled backend needs no setup");

    let tab = origin.open_tab();
    assert!(tab.registry().users().is_err());
}

#[test]
fn file_backend_persists_across_origins() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut config = instant_config();
    config.storage.backend = StorageBackend::File;
    config.storage.dir = Some(temp.path().to_path_buf());

    {
        let origin = Origin::from_config(config.clone()).unwrap();
        origin
            .open_tab()
            .registry()
            .register("Ana", "ana@x.com", "secret1")
            .unwrap();
    }

    let reopened = Origin::from_config(config).unwrap();
    assert!(reopened
        .open_tab()
        .registry()
        .authenticate("ANA@X.COM", "secret1")
        .is_some());
}

#[tokio::test]
async fn file_backend_stores_tier_for_any_registered_email() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut config = instant_config();
    config.storage.backend = StorageBackend::File;
    config.storage.dir = Some(temp.path().to_path_buf());

    let origin = Origin::from_config(config).unwrap();
    let tab = origin.open_tab();
    tab.auth()
        .sign_up("Obi", "o'brien@x.com", "secret1")
        .await
        .unwrap();
    tab.auth().sign_in("o'brien@x.com", "secret1").await.unwrap();

    tab.set_current_tier(SubscriptionTier::Shield).unwrap();

    assert_eq!(tab.current_tier().unwrap(), Some(SubscriptionTier::Shield));
    assert_eq!(
        origin.open_tab().current_entitlements().unwrap(),
        Entitlement::ALL
    );
}
