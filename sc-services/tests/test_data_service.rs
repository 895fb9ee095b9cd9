//! Integration tests for DataService record and media operations.
//!
//! Covers offering CRUD and ordering, contact messages, media upload and
//! delete including compensation and the reconciliation log, and the
//! per-call timeout.

mod common;

use std::sync::atomic::Ordering;

use chrono::{TimeZone, Utc};
use serde_json::json;

use common::{TestBackend, PUBLIC_BASE};
use sc_api::SortOrder;
use sc_core::error::{ErrorKind, ScError};
use sc_models::{ContactFields, OfferingFields};
use sc_services::ReconciliationEntry;

fn consultation() -> OfferingFields {
    OfferingFields::new("Consultation", "30-minute session", "$50", None)
}

// ---- Offerings ----

#[tokio::test]
async fn create_offering_then_list_returns_exactly_that_record() {
    let backend = TestBackend::new();
    let service = backend.service();

    let created = service.create_offering(consultation()).await.unwrap();
    let listed = service.list_offerings().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], created);
    assert!(listed[0].matches_fields(&consultation()));
    assert!(!listed[0].id.is_empty());
}

#[tokio::test]
async fn list_offerings_is_newest_first() {
    let backend = TestBackend::new();
    let service = backend.service();

    for title in ["First", "Second", "Third"] {
        service
            .create_offering(OfferingFields::new(title, "desc", "$10", None))
            .await
            .unwrap();
    }

    let titles: Vec<String> = service
        .list_offerings()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.title)
        .collect();
    assert_eq!(titles, vec!["Third", "Second", "First"]);

    let requested = backend.records.last_order.lock().unwrap().clone();
    assert_eq!(requested, Some(("created_at".to_string(), SortOrder::Descending)));
}

#[tokio::test]
async fn list_offerings_sorts_rows_the_store_returns_out_of_order() {
    let backend = TestBackend::new();
    let t = |s| Utc.timestamp_opt(s, 0).unwrap();
    backend.records.seed("services", json!({"title": "old", "description": "d", "price": "1"}), t(100));
    backend.records.seed("services", json!({"title": "new", "description": "d", "price": "1"}), t(300));
    backend.records.seed("services", json!({"title": "mid", "description": "d", "price": "1"}), t(200));

    let titles: Vec<String> = backend
        .service()
        .list_offerings()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.title)
        .collect();
    assert_eq!(titles, vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn list_offerings_empty() {
    let backend = TestBackend::new();
    assert!(backend.service().list_offerings().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_offerings_store_failure_is_store_error() {
    let backend = TestBackend::new();
    backend.records.fail_select.store(true, Ordering::SeqCst);

    let err = backend.service().list_offerings().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
}

#[tokio::test]
async fn create_offering_rejects_missing_title_before_any_call() {
    let backend = TestBackend::new();
    let service = backend.service();

    let err = service
        .create_offering(OfferingFields::new("   ", "desc", "$5", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ScError::Validation(_)));
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(backend.records.bearers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_offering_trims_fields() {
    let backend = TestBackend::new();
    let created = backend
        .service()
        .create_offering(OfferingFields::new("  Portrait ", "Studio", " $120 ", Some("  ".into())))
        .await
        .unwrap();
    assert_eq!(created.title, "Portrait");
    assert_eq!(created.price, "$120");
    assert_eq!(created.image_ref, None);
}

#[tokio::test]
async fn update_offering_replaces_fields() {
    let backend = TestBackend::new();
    let service = backend.service();
    let created = service.create_offering(consultation()).await.unwrap();

    let fields = OfferingFields::new("Consultation", "60-minute session", "$90", None);
    let updated = service.update_offering(&created.id, fields.clone()).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert!(updated.matches_fields(&fields));
    assert_eq!(service.list_offerings().await.unwrap()[0].price, "$90");
}

#[tokio::test]
async fn update_missing_offering_is_not_found() {
    let backend = TestBackend::new();
    let err = backend
        .service()
        .update_offering("999", consultation())
        .await
        .unwrap_err();
    assert!(matches!(err, ScError::NotFound(_)));
    assert_eq!(err.kind(), ErrorKind::Store);
}

#[tokio::test]
async fn delete_offering_removes_it_from_listing() {
    let backend = TestBackend::new();
    let service = backend.service();
    let keep = service.create_offering(consultation()).await.unwrap();
    let gone = service
        .create_offering(OfferingFields::new("Workshop", "Half day", "$300", None))
        .await
        .unwrap();

    service.delete_offering(&gone.id).await.unwrap();

    let ids: Vec<String> = service
        .list_offerings()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, vec![keep.id]);
}

#[tokio::test]
async fn delete_missing_offering_is_not_found() {
    let backend = TestBackend::new();
    let service = backend.service();
    assert!(matches!(
        service.delete_offering("42").await,
        Err(ScError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_offering("").await,
        Err(ScError::Validation(_))
    ));
}

#[tokio::test]
async fn signed_in_writes_carry_the_access_token() {
    let backend = TestBackend::new();
    let service = backend.service();
    service.list_offerings().await.unwrap();
    let session = service
        .sign_in(common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await
        .unwrap();
    service.create_offering(consultation()).await.unwrap();

    let bearers = backend.records.bearers.lock().unwrap().clone();
    assert_eq!(bearers, vec![None, Some(session.access_token)]);
}

#[tokio::test]
async fn write_refused_by_access_rules_is_store_error() {
    let backend = TestBackend::new();
    let service = backend.service();
    service
        .sign_in(common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await
        .unwrap();
    backend.records.deny_writes.store(true, Ordering::SeqCst);

    let err = service.create_offering(consultation()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(matches!(err, ScError::Forbidden { status: 403, .. }));
    assert!(err.to_string().contains("row-level security"));
    assert!(service.session().is_some());
}

// ---- Contact messages ----

#[tokio::test]
async fn contact_message_is_listed_first() {
    let backend = TestBackend::new();
    let service = backend.service();
    service
        .create_contact_message(ContactFields::new("Sam", "sam@example.com", "Earlier"))
        .await
        .unwrap();

    service
        .create_contact_message(ContactFields::new("Alex", "a@example.com", "Hi"))
        .await
        .unwrap();

    let messages = service.list_contact_messages().await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].name, "Alex");
    assert_eq!(messages[0].email, "a@example.com");
    assert_eq!(messages[0].message, "Hi");
}

#[tokio::test]
async fn contact_message_validation() {
    let backend = TestBackend::new();
    let service = backend.service();

    for fields in [
        ContactFields::new("", "a@example.com", "Hi"),
        ContactFields::new("Alex", "not-an-email", "Hi"),
        ContactFields::new("Alex", "a@example.com", "   "),
    ] {
        let err = service.create_contact_message(fields).await.unwrap_err();
        assert!(matches!(err, ScError::Validation(_)), "got {err:?}");
    }
    assert!(backend.records.rows("contacts").is_empty());
}

// ---- Media upload ----

#[tokio::test]
async fn upload_stores_object_and_record() {
    let backend = TestBackend::new();
    let service = backend.service();

    let item = service
        .upload_media_item(vec![1, 2, 3], "Sunset.PNG")
        .await
        .unwrap();

    let keys = backend.objects.keys("images");
    assert_eq!(keys.len(), 1);
    let key = &keys[0];
    assert!(key.ends_with(".png"));
    assert_eq!(item.image_ref, format!("{PUBLIC_BASE}/images/{key}"));
    assert_eq!(item.storage_key().as_deref(), Some(key.as_str()));

    let (bytes, content_type) = backend.objects.get("images", key).unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
    assert_eq!(content_type, "image/png");

    let listed = service.list_media_items().await.unwrap();
    assert_eq!(listed, vec![item]);
}

#[tokio::test]
async fn upload_without_extension_uses_bin() {
    let backend = TestBackend::new();
    backend
        .service()
        .upload_media_item(b"raw".to_vec(), "blob")
        .await
        .unwrap();
    let keys = backend.objects.keys("images");
    assert!(keys[0].ends_with(".bin"));
    assert_eq!(backend.objects.get("images", &keys[0]).unwrap().1, "application/octet-stream");
}

#[tokio::test]
async fn upload_keys_are_unique() {
    let backend = TestBackend::new();
    let service = backend.service();
    service.upload_media_item(vec![1], "a.jpg").await.unwrap();
    service.upload_media_item(vec![2], "a.jpg").await.unwrap();
    assert_eq!(backend.objects.keys("images").len(), 2);
}

#[tokio::test]
async fn upload_rejects_empty_content() {
    let backend = TestBackend::new();
    let err = backend
        .service()
        .upload_media_item(Vec::new(), "a.png")
        .await
        .unwrap_err();
    assert!(matches!(err, ScError::Validation(_)));
    assert!(backend.objects.keys("images").is_empty());
}

#[tokio::test]
async fn upload_object_failure_writes_no_record() {
    let backend = TestBackend::new();
    backend.objects.fail_put.store(true, Ordering::SeqCst);

    let err = backend
        .service()
        .upload_media_item(vec![1], "a.png")
        .await
        .unwrap_err();
    assert!(matches!(err, ScError::Storage(_)));
    assert!(backend.records.rows("gallery").is_empty());
}

#[tokio::test]
async fn upload_insert_failure_removes_object() {
    let backend = TestBackend::new();
    backend.records.fail_insert.store(true, Ordering::SeqCst);
    let service = backend.service();

    let err = service.upload_media_item(vec![1], "a.png").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(backend.records.rows("gallery").is_empty());
    assert!(backend.objects.keys("images").is_empty());
    assert!(service.reconciliation().is_empty());
}

#[tokio::test]
async fn upload_failed_compensation_records_orphan() {
    let backend = TestBackend::new();
    backend.records.fail_insert.store(true, Ordering::SeqCst);
    backend.objects.fail_remove.store(true, Ordering::SeqCst);
    let service = backend.service();

    service.upload_media_item(vec![1], "a.webp").await.unwrap_err();

    let keys = backend.objects.keys("images");
    assert_eq!(keys.len(), 1);
    let pending = service.reconciliation().pending();
    assert_eq!(pending.len(), 1);
    match &pending[0].entry {
        ReconciliationEntry::OrphanedObject { bucket, key, .. } => {
            assert_eq!(bucket, "images");
            assert_eq!(key, &keys[0]);
        }
        other => panic!("expected orphaned object, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_insert_timeout_keeps_object_and_logs_it() {
    let backend = TestBackend::new();
    backend.records.stall_after_insert_ms.store(2_000, Ordering::SeqCst);
    let service = backend.service();

    let err = service.upload_media_item(vec![1], "a.png").await.unwrap_err();
    assert!(matches!(err, ScError::Timeout(_)));

    // The row committed before the call gave up; its object must survive.
    let keys = backend.objects.keys("images");
    assert_eq!(keys.len(), 1);
    let rows = backend.records.rows("gallery");
    assert_eq!(rows.len(), 1);
    let image_ref = format!("{PUBLIC_BASE}/images/{}", keys[0]);
    assert_eq!(rows[0]["image_url"], json!(image_ref));

    let pending = service.reconciliation().pending();
    assert_eq!(pending.len(), 1);
    match &pending[0].entry {
        ReconciliationEntry::UnconfirmedRecord {
            table,
            bucket,
            key,
            image_ref: logged_ref,
            ..
        } => {
            assert_eq!(table, "gallery");
            assert_eq!(bucket, "images");
            assert_eq!(key, &keys[0]);
            assert_eq!(logged_ref, &image_ref);
        }
        other => panic!("expected unconfirmed record, got {other:?}"),
    }
}

// ---- Media delete ----

#[tokio::test]
async fn delete_media_removes_object_and_record() {
    let backend = TestBackend::new();
    let service = backend.service();
    let item = service.upload_media_item(vec![9], "x.gif").await.unwrap();

    service.delete_media_item(&item.id, &item.image_ref).await.unwrap();

    assert!(backend.objects.keys("images").is_empty());
    assert!(service.list_media_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_media_decodes_key_from_reference() {
    let backend = TestBackend::new();
    backend.objects.put_direct("images", "my photo.jpg", b"x");
    let id = backend.records.seed(
        "gallery",
        json!({"image_url": format!("{PUBLIC_BASE}/images/my%20photo.jpg")}),
        Utc::now(),
    );

    backend
        .service()
        .delete_media_item(&id, &format!("{PUBLIC_BASE}/images/my%20photo.jpg?t=1#top"))
        .await
        .unwrap();
    assert!(backend.objects.keys("images").is_empty());
    assert!(backend.records.rows("gallery").is_empty());
}

#[tokio::test]
async fn delete_media_object_failure_keeps_record() {
    let backend = TestBackend::new();
    let service = backend.service();
    let item = service.upload_media_item(vec![9], "x.gif").await.unwrap();
    backend.objects.fail_remove.store(true, Ordering::SeqCst);

    let err = service
        .delete_media_item(&item.id, &item.image_ref)
        .await
        .unwrap_err();
    assert!(matches!(err, ScError::Storage(_)));
    assert_eq!(service.list_media_items().await.unwrap(), vec![item]);
    assert!(service.reconciliation().is_empty());
}

#[tokio::test]
async fn delete_media_record_failure_records_dangling_record() {
    let backend = TestBackend::new();
    let service = backend.service();
    let item = service.upload_media_item(vec![9], "x.gif").await.unwrap();
    backend.records.fail_delete.store(true, Ordering::SeqCst);

    service
        .delete_media_item(&item.id, &item.image_ref)
        .await
        .unwrap_err();

    assert!(backend.objects.keys("images").is_empty());
    let pending = service.reconciliation().pending();
    assert_eq!(
        pending[0].entry,
        ReconciliationEntry::DanglingRecord {
            table: "gallery".into(),
            id: item.id.clone(),
            image_ref: item.image_ref.clone(),
            reason: "server error (status 500): delete failed".into(),
        }
    );
    assert_eq!(service.reconciliation().clear().len(), 1);
}

#[tokio::test]
async fn delete_media_with_unmatched_id_logs_the_reference() {
    let backend = TestBackend::new();
    let service = backend.service();
    let item = service.upload_media_item(vec![9], "x.gif").await.unwrap();

    let err = service
        .delete_media_item("999", &item.image_ref)
        .await
        .unwrap_err();

    assert!(matches!(err, ScError::NotFound(_)));
    assert!(backend.objects.keys("images").is_empty());
    assert_eq!(backend.records.rows("gallery").len(), 1);
    let pending = service.reconciliation().pending();
    assert_eq!(pending.len(), 1);
    match &pending[0].entry {
        ReconciliationEntry::DanglingRecord { id, image_ref, .. } => {
            assert_eq!(id, "999");
            assert_eq!(image_ref, &item.image_ref);
        }
        other => panic!("expected dangling record, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_media_rejects_reference_without_key() {
    let backend = TestBackend::new();
    let err = backend
        .service()
        .delete_media_item("1", "https://test.local/")
        .await
        .unwrap_err();
    assert!(matches!(err, ScError::Validation(_)));
}

// ---- Timeouts ----

#[tokio::test]
async fn slow_store_call_times_out() {
    let backend = TestBackend::new();
    backend.records.delay_ms.store(2_000, Ordering::SeqCst);

    let err = backend.service().list_offerings().await.unwrap_err();
    assert!(matches!(err, ScError::Timeout(_)));
    assert_eq!(err.kind(), ErrorKind::Store);
}
