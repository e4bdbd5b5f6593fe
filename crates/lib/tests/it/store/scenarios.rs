use crate::helpers::*;

#[tokio::test]
async fn test_puts_append_in_order() {
    let (_log, kv) = test_store_with_log();

    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.put("k2", "v2".to_string()).await.unwrap();

    assert_all(&kv, &[("k1", "v1"), ("k2", "v2")]).await;
}

#[tokio::test]
async fn test_put_at_front() {
    let (_log, kv) = test_store_with_log();

    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.put_at("k2", "v2".to_string(), 0).await.unwrap();

    assert_all(&kv, &[("k2", "v2"), ("k1", "v1")]).await;
}

#[tokio::test]
async fn test_move_past_neighbour() {
    let (_log, kv) = test_store_with_log();

    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.put("k2", "v2".to_string()).await.unwrap();
    kv.move_to("k1", 1).await.unwrap();

    assert_all(&kv, &[("k2", "v2"), ("k1", "v1")]).await;
}

#[tokio::test]
async fn test_delete_then_put_uses_new_entry() {
    let (_log, kv) = test_store_with_log();

    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.delete("k1").await.unwrap();
    let second = kv.put("k1", "v1".to_string()).await.unwrap();

    let all = kv.all().await.unwrap();
    assert_eq!(pairs(&all), expected(&[("k1", "v1")]));
    assert_eq!(all[0].hash, second);
}

#[tokio::test]
async fn test_put_after_move_keeps_moved_position() {
    let (_log, kv) = test_store_with_log();

    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.put("k2", "v2".to_string()).await.unwrap();
    kv.put("k3", "v3".to_string()).await.unwrap();
    kv.move_to("k1", 1).await.unwrap();
    kv.put("k2", "v2a".to_string()).await.unwrap();

    assert_all(&kv, &[("k2", "v2a"), ("k1", "v1"), ("k3", "v3")]).await;
}

#[tokio::test]
async fn test_move_preserves_value_and_hash() {
    let (_log, kv) = test_store_with_log();

    let hash = kv.put("k1", "v1".to_string()).await.unwrap();
    kv.put("k2", "v2".to_string()).await.unwrap();
    kv.move_to("k1", -1).await.unwrap();

    let all = kv.all().await.unwrap();
    assert_eq!(pairs(&all), expected(&[("k2", "v2"), ("k1", "v1")]));
    assert_eq!(all[1].hash, hash);
}

#[tokio::test]
async fn test_moves_before_put_apply_newest() {
    let (_log, kv) = test_store_with_log();

    kv.put("a", "1".to_string()).await.unwrap();
    kv.put("b", "2".to_string()).await.unwrap();
    kv.put("c", "3".to_string()).await.unwrap();
    kv.move_to("a", -1).await.unwrap();
    kv.move_to("a", 1).await.unwrap();

    assert_all(&kv, &[("b", "2"), ("a", "1"), ("c", "3")]).await;
}

#[tokio::test]
async fn test_move_of_deleted_key_has_no_effect() {
    let (_log, kv) = test_store_with_log();

    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.put("k2", "v2".to_string()).await.unwrap();
    kv.delete("k1").await.unwrap();
    kv.move_to("k1", 0).await.unwrap();
    kv.move_to("never", 0).await.unwrap();

    assert_all(&kv, &[("k2", "v2")]).await;
}

#[tokio::test]
async fn test_put_after_move_of_absent_key() {
    let (_log, kv) = test_store_with_log();

    kv.put("k1", "v1".to_string()).await.unwrap();
    kv.put("k2", "v2".to_string()).await.unwrap();
    kv.delete("k1").await.unwrap();
    kv.move_to("k1", 0).await.unwrap();
    kv.put("k1", "v1b".to_string()).await.unwrap();

    // The move predates the new put, so it does not apply.
    assert_all(&kv, &[("k2", "v2"), ("k1", "v1b")]).await;
}

#[tokio::test]
async fn test_all_is_idempotent() {
    let (_log, kv) = test_store_with_log();

    for (i, key) in ["d", "a", "c", "b"].iter().enumerate() {
        kv.put_at(*key, i.to_string(), 1).await.unwrap();
    }
    kv.move_to("d", 0).await.unwrap();

    let first = kv.all().await.unwrap();
    let second = kv.all().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[tokio::test]
async fn test_set_is_put() {
    let (_log, kv) = test_store_with_log();

    kv.set("k1", "v1".to_string()).await.unwrap();
    kv.put("k2", "v2".to_string()).await.unwrap();
    kv.set("k1", "v1b".to_string()).await.unwrap();

    assert_all(&kv, &[("k1", "v1b"), ("k2", "v2")]).await;
}

#[tokio::test]
async fn test_keys() {
    let (_log, kv) = test_store_with_log();

    kv.put("x", "1".to_string()).await.unwrap();
    kv.put_at("y", "2".to_string(), 0).await.unwrap();

    assert_eq!(kv.keys().await.unwrap(), ["y", "x"]);
}
