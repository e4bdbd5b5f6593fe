use std::sync::Arc;

use serde_json::json;

use orderly::{OpLog, OrderedKeyValue, operation::Operation};

use crate::helpers::*;

#[tokio::test]
async fn test_get_returns_latest_value() {
    let (_log, kv) = test_store_with_log();

    assert_eq!(kv.get("k1").await.unwrap(), None);
    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.put("k1", "v2".to_string()).await.unwrap();
    kv.move_to("k1", 0).await.unwrap();

    assert_eq!(kv.get("k1").await.unwrap(), Some("v2".to_string()));
}

#[tokio::test]
async fn test_get_after_delete() {
    let (_log, kv) = test_store_with_log();

    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.delete("k1").await.unwrap();
    assert_eq!(kv.get("k1").await.unwrap(), None);

    kv.put("k1", "v3".to_string()).await.unwrap();
    assert_eq!(kv.get("k1").await.unwrap(), Some("v3".to_string()));
}

#[tokio::test]
async fn test_delete_absent_key_appends_tombstone() {
    let (log, kv) = test_store_with_log();

    kv.delete("ghost").await.unwrap();

    assert_eq!(log.len().await, 1);
    assert!(kv.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_iter_is_newest_first() {
    let (_log, kv) = test_store_with_log();

    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.put_at("k2", "v2".to_string(), 0).await.unwrap();
    kv.put("k3", "v3".to_string()).await.unwrap();

    let mut iter = kv.iter(None).await.unwrap();
    let mut keys = Vec::new();
    let mut recencies = Vec::new();
    while let Some(entry) = iter.next().await.unwrap() {
        assert!(entry.position.is_some());
        keys.push(entry.key);
        recencies.push(entry.recency);
    }
    assert_eq!(keys, ["k3", "k2", "k1"]);
    assert!(recencies.windows(2).all(|w| w[0] > w[1]));
}

#[tokio::test]
async fn test_iter_limit_counts_live_keys_only() {
    let (_log, kv) = test_store_with_log();

    for key in ["k1", "k2", "k3", "k4"] {
        kv.put(key, key.to_string()).await.unwrap();
    }
    kv.delete("k4").await.unwrap();
    kv.put("k3", "k3b".to_string()).await.unwrap();

    let entries = kv.iter(Some(2)).await.unwrap().collect_all().await.unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, ["k3", "k2"]);
    assert_eq!(entries[0].value, "k3b");

    let none = kv.iter(Some(0)).await.unwrap().collect_all().await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_empty_register() {
    let (_log, kv) = test_store_with_log();

    assert!(kv.all().await.unwrap().is_empty());
    assert!(kv.keys().await.unwrap().is_empty());
    assert!(kv.iter(None).await.unwrap().next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_key_is_rejected() {
    let (log, kv) = test_store_with_log();

    let err = kv.put("", "v".to_string()).await.unwrap_err();
    assert!(err.is_invalid_key());
    assert_eq!(err.module(), "store");
    assert!(kv.put_at("", "v".to_string(), 0).await.unwrap_err().is_invalid_key());
    assert!(kv.move_to("", 0).await.unwrap_err().is_invalid_key());
    assert!(kv.delete("").await.unwrap_err().is_invalid_key());

    assert!(log.is_empty().await);
}

#[tokio::test]
async fn test_malformed_records_are_skipped() {
    let log = test_log();
    let kv: OrderedKeyValue = OrderedKeyValue::with_seed(log.clone(), 3);

    kv.put("k1", json!({"n": 1})).await.unwrap();
    log.append("not json".to_string()).await.unwrap();
    log.append(r#"{"op":"PUT"}"#.to_string()).await.unwrap();
    log.append(r#"{"op":"RENAME","key":"k1"}"#.to_string()).await.unwrap();
    log.append(r#"{"op":"DELETE","key":""}"#.to_string()).await.unwrap();
    kv.put("k2", json!([1, 2])).await.unwrap();

    let all = kv.all().await.unwrap();
    let keys: Vec<&str> = all.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, ["k1", "k2"]);
    assert_eq!(all[0].value, json!({"n": 1}));
    assert_eq!(kv.get("k1").await.unwrap(), Some(json!({"n": 1})));
}

#[tokio::test]
async fn test_legacy_del_tag_is_understood() {
    let log = test_log();
    let kv: OrderedKeyValue = OrderedKeyValue::with_seed(log.clone(), 3);

    kv.put("k1", json!("v1")).await.unwrap();
    log.append(r#"{"op":"DEL","key":"k1"}"#.to_string())
        .await
        .unwrap();

    assert_eq!(kv.get("k1").await.unwrap(), None);
    assert!(kv.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_put_without_position_sorts_last() {
    let log = test_log();
    let kv = test_store(&log, 5);

    let raw = Operation::Put {
        key: "tail".to_string(),
        value: json!("T"),
        position: None,
    };
    log.append(raw.encode().unwrap()).await.unwrap();
    kv.put("a", "A".to_string()).await.unwrap();
    kv.put_at("b", "B".to_string(), 0).await.unwrap();

    assert_all(&kv, &[("b", "B"), ("a", "A"), ("tail", "T")]).await;
}

#[tokio::test]
async fn test_put_without_position_follows_huge_position() {
    let log = test_log();
    let kv = test_store(&log, 6);

    for op in [
        Operation::Put {
            key: "big".to_string(),
            value: json!("B"),
            position: Some(1e300),
        },
        Operation::Put {
            key: "tail".to_string(),
            value: json!("T"),
            position: None,
        },
    ] {
        log.append(op.encode().unwrap()).await.unwrap();
    }

    assert_eq!(kv.keys().await.unwrap(), ["big", "tail"]);
}

#[tokio::test]
async fn test_undecodable_value_falls_back_to_older_put() {
    let log = test_log();
    let numbers: OrderedKeyValue<u32> = OrderedKeyValue::with_seed(log.clone(), 9);
    let strings = test_store(&log, 10);

    numbers.put("n", 5).await.unwrap();
    strings.put("n", "five".to_string()).await.unwrap();

    assert_eq!(numbers.get("n").await.unwrap(), Some(5));
    let all = numbers.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].value, 5);

    assert_eq!(strings.get("n").await.unwrap(), Some("five".to_string()));
}

#[tokio::test]
async fn test_handles_share_one_log() {
    let log = test_log();
    let first = test_store(&log, 1);
    let second = first.clone();

    first.put("k1", "v1".to_string()).await.unwrap();
    second.put_at("k2", "v2".to_string(), 0).await.unwrap();

    assert_eq!(first.keys().await.unwrap(), second.keys().await.unwrap());
    assert!(Arc::ptr_eq(first.log(), second.log()));
}

#[tokio::test]
async fn test_type_identifier() {
    assert_eq!(OrderedKeyValue::<String>::TYPE, "ordered-keyvalue");
}
