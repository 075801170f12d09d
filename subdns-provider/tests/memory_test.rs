//! Exercises the `DnsProvider` contract through the in-memory provider,
//! using only the crate's public API.

use subdns_provider::{
    DnsProvider, MemoryProvider, ProviderError, RecordData, RecordSpec,
};

fn spec(name: &str, data: RecordData) -> RecordSpec {
    RecordSpec {
        zone_id: "zone-1".to_string(),
        name: name.to_string(),
        ttl: 3600,
        data,
        proxied: None,
        comment: None,
    }
}

fn a(address: &str) -> RecordData {
    RecordData::A {
        address: address.to_string(),
    }
}

#[tokio::test]
async fn record_lifecycle() {
    let provider = MemoryProvider::new();

    let created = provider
        .create_record(&spec("app.example.com", a("1.2.3.4")))
        .await
        .unwrap();
    assert_eq!(created.zone_id, "zone-1");

    let listed = provider.list_records("zone-1", None).await.unwrap();
    assert_eq!(listed.len(), 1);

    let updated = provider
        .update_record(&created.id, &spec("app.example.com", a("5.6.7.8")))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.data.display_value(), "5.6.7.8");

    provider.delete_record(&created.id, "zone-1").await.unwrap();
    assert!(provider.list_records("zone-1", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn scoped_listing_excludes_sibling_labels() {
    let provider = MemoryProvider::new();
    for name in ["app.example.com", "www.app.example.com", "myapp.example.com"] {
        provider.create_record(&spec(name, a("1.1.1.1"))).await.unwrap();
    }

    let scoped = provider
        .list_records("zone-1", Some("app.example.com"))
        .await
        .unwrap();
    let names: Vec<&str> = scoped.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["app.example.com", "www.app.example.com"]);
}

#[tokio::test]
async fn duplicate_create_and_missing_ids_error() {
    let provider = MemoryProvider::new();
    provider
        .create_record(&spec("app.example.com", a("1.2.3.4")))
        .await
        .unwrap();

    let dup = provider
        .create_record(&spec("app.example.com", a("1.2.3.4")))
        .await
        .unwrap_err();
    assert!(matches!(dup, ProviderError::RecordExists { .. }));

    let missing = provider
        .update_record("mem-404", &spec("app.example.com", a("9.9.9.9")))
        .await
        .unwrap_err();
    assert!(matches!(missing, ProviderError::RecordNotFound { .. }));

    let missing = provider.delete_record("mem-404", "zone-1").await.unwrap_err();
    assert!(matches!(missing, ProviderError::RecordNotFound { .. }));
}
