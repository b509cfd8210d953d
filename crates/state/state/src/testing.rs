use std::time::Duration;

use crate::error::StateError;
use crate::key::MetaKey;
use crate::store::MetaStore;

/// Run the full metadata store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_store_conformance_tests(store: &dyn MetaStore) -> Result<(), StateError> {
    test_get_missing(store).await?;
    test_set_and_get(store).await?;
    test_set_overwrites(store).await?;
    test_exists(store).await?;
    test_delete_multiple(store).await?;
    test_decrement(store).await?;
    test_decrement_missing(store).await?;
    test_decrement_goes_negative(store).await?;
    test_ttl_set(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn MetaStore) -> Result<(), StateError> {
    let key = MetaKey::meta("conformance-missing");
    let val = store.get(&key).await?;
    assert!(val.is_none(), "get on missing key should return None");
    Ok(())
}

async fn test_set_and_get(store: &dyn MetaStore) -> Result<(), StateError> {
    let key = MetaKey::meta("conformance-set-get");
    store.set(&key, "hello", None).await?;
    let val = store.get(&key).await?;
    assert_eq!(val.as_deref(), Some("hello"));
    Ok(())
}

async fn test_set_overwrites(store: &dyn MetaStore) -> Result<(), StateError> {
    let key = MetaKey::meta("conformance-overwrite");
    store.set(&key, "v1", None).await?;
    store.set(&key, "v2", None).await?;
    let val = store.get(&key).await?;
    assert_eq!(val.as_deref(), Some("v2"), "set should overwrite");
    Ok(())
}

async fn test_exists(store: &dyn MetaStore) -> Result<(), StateError> {
    let key = MetaKey::limit("conformance-exists");
    assert!(!store.exists(&key).await?, "missing key should not exist");
    store.set(&key, "3", None).await?;
    assert!(store.exists(&key).await?, "set key should exist");
    Ok(())
}

async fn test_delete_multiple(store: &dyn MetaStore) -> Result<(), StateError> {
    let meta = MetaKey::meta("conformance-delete");
    let limit = MetaKey::limit("conformance-delete");
    store.set(&meta, "record", None).await?;
    store.set(&limit, "1", None).await?;

    let deleted = store.delete(&[meta.clone(), limit.clone()]).await?;
    assert_eq!(deleted, 2, "both keys should be deleted");
    assert!(store.get(&meta).await?.is_none());
    assert!(store.get(&limit).await?.is_none());

    let deleted = store.delete(&[meta]).await?;
    assert_eq!(deleted, 0, "deleting a missing key should count zero");
    Ok(())
}

async fn test_decrement(store: &dyn MetaStore) -> Result<(), StateError> {
    let key = MetaKey::limit("conformance-decr");
    store.set(&key, "3", None).await?;
    assert_eq!(store.decrement(&key).await?, 2);
    assert_eq!(store.decrement(&key).await?, 1);
    assert_eq!(store.decrement(&key).await?, 0);
    Ok(())
}

async fn test_decrement_missing(store: &dyn MetaStore) -> Result<(), StateError> {
    let key = MetaKey::limit("conformance-decr-missing");
    let result = store.decrement(&key).await;
    assert!(
        matches!(result, Err(StateError::NotFound(_))),
        "decrement on a missing key must fail distinctly, not create it"
    );
    assert!(
        !store.exists(&key).await?,
        "failed decrement must not create the key"
    );
    Ok(())
}

async fn test_decrement_goes_negative(store: &dyn MetaStore) -> Result<(), StateError> {
    let key = MetaKey::limit("conformance-decr-negative");
    store.set(&key, "1", None).await?;
    assert_eq!(store.decrement(&key).await?, 0);
    assert_eq!(
        store.decrement(&key).await?,
        -1,
        "decrement past zero is not clamped; refusal is the caller's job"
    );
    Ok(())
}

async fn test_ttl_set(store: &dyn MetaStore) -> Result<(), StateError> {
    let key = MetaKey::meta("conformance-ttl");
    store
        .set(&key, "ephemeral", Some(Duration::from_secs(3600)))
        .await?;
    let val = store.get(&key).await?;
    assert_eq!(val.as_deref(), Some("ephemeral"));
    Ok(())
}
