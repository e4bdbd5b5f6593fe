use crate::helpers::*;

use orderly::OrderedKeyValue;

/// Register holding `a`, `b`, `c` in that order.
async fn abc() -> OrderedKeyValue<String> {
    let (_log, kv) = test_store_with_log();
    for key in ["a", "b", "c"] {
        kv.put(key, key.to_uppercase()).await.unwrap();
    }
    kv
}

#[tokio::test]
async fn test_put_at_middle() {
    let kv = abc().await;
    kv.put_at("x", "X".to_string(), 2).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["a", "b", "x", "c"]);
}

#[tokio::test]
async fn test_put_at_past_end_clamps() {
    let kv = abc().await;
    kv.put_at("x", "X".to_string(), 99).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["a", "b", "c", "x"]);
}

#[tokio::test]
async fn test_put_at_negative_one_appends() {
    let kv = abc().await;
    kv.put_at("x", "X".to_string(), -1).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["a", "b", "c", "x"]);
}

#[tokio::test]
async fn test_put_at_negative_counts_from_end() {
    let kv = abc().await;
    kv.put_at("x", "X".to_string(), -2).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["a", "b", "x", "c"]);
}

#[tokio::test]
async fn test_put_at_far_negative_clamps_to_front() {
    let kv = abc().await;
    kv.put_at("x", "X".to_string(), -4).await.unwrap();
    kv.put_at("y", "Y".to_string(), -100).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["y", "x", "a", "b", "c"]);
}

#[tokio::test]
async fn test_put_at_repositions_existing_key() {
    let kv = abc().await;
    kv.put_at("c", "C2".to_string(), 0).await.unwrap();
    assert_all(&kv, &[("c", "C2"), ("a", "A"), ("b", "B")]).await;
}

#[tokio::test]
async fn test_move_to_front() {
    let kv = abc().await;
    kv.move_to("c", 0).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["c", "a", "b"]);
}

#[tokio::test]
async fn test_move_to_last() {
    let kv = abc().await;
    kv.move_to("a", -1).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["b", "c", "a"]);
}

#[tokio::test]
async fn test_move_past_end_clamps() {
    let kv = abc().await;
    kv.move_to("a", 10).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["b", "c", "a"]);
}

#[tokio::test]
async fn test_move_down_lands_on_target_index() {
    let kv = abc().await;
    kv.move_to("a", 1).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["b", "a", "c"]);
}

#[tokio::test]
async fn test_move_up_lands_on_target_index() {
    let kv = abc().await;
    kv.move_to("c", 1).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["a", "c", "b"]);
}

#[tokio::test]
async fn test_move_to_current_index_keeps_order() {
    let kv = abc().await;
    kv.move_to("b", 1).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["a", "b", "c"]);
}

#[tokio::test]
async fn test_repeated_inserts_into_one_gap() {
    let (_log, kv) = test_store_with_log();
    kv.put("first", "F".to_string()).await.unwrap();
    kv.put("last", "L".to_string()).await.unwrap();

    // Each insert goes directly after "first", pushing earlier ones down.
    for i in 0..12 {
        kv.put_at(format!("k{i:02}"), i.to_string(), 1).await.unwrap();
    }

    let keys = kv.keys().await.unwrap();
    assert_eq!(keys.len(), 14);
    assert_eq!(keys[0], "first");
    assert_eq!(keys[1], "k11");
    assert_eq!(keys[12], "k00");
    assert_eq!(keys[13], "last");
}

#[tokio::test]
async fn test_move_to_largest_index_appends() {
    let kv = abc().await;
    kv.move_to("a", i64::MAX).await.unwrap();
    kv.put_at("x", "X".to_string(), i64::MAX).await.unwrap();
    kv.put_at("b", "B2".to_string(), i64::MIN).await.unwrap();
    assert_eq!(kv.keys().await.unwrap(), ["b", "c", "a", "x"]);
}
