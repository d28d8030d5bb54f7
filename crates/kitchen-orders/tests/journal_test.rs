use kitchen_orders::config::{ConfigError, Settings};
use kitchen_orders::lifecycle::OrderSystem;
use kitchen_orders::model::{LineItem, OrderFilter, OrderId};
use kitchen_orders::order_actor::OrderError;
use std::path::Path;
use store_actor::ActorClient;

fn settings_for(dir: &Path) -> Settings {
    let dir = dir.display().to_string();
    Settings::from_sources(None, |key: &str| {
        (key == "KITCHEN_DATA_DIR").then(|| dir.clone())
    })
    .unwrap()
}

#[tokio::test]
async fn test_orders_survive_restart() {
    let data = tempfile::tempdir().unwrap();
    let settings = settings_for(data.path());

    let system = OrderSystem::start(&settings).await.unwrap();
    let client = &system.order_client;
    let burger = client
        .create("5", vec![LineItem::new("Burger").with_quantity(2), LineItem::new("Coke")])
        .await
        .unwrap();
    let salad = client.create("3", vec![LineItem::new("Salad")]).await.unwrap();
    let soup = client.create("1", vec![LineItem::new("Soup")]).await.unwrap();
    let burger = client.complete(burger.id).await.unwrap();
    client.delete(soup.id).await.unwrap();
    system.shutdown().await.unwrap();

    let record = data.path().join(format!("{}.json", burger.id));
    let stored: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&record).unwrap()).unwrap();
    assert_eq!(stored["status"], "completed");
    assert_eq!(stored["items"], serde_json::json!(["2x Burger", "Coke"]));
    assert!(!data.path().join(format!("{}.json", soup.id)).exists());

    let system = OrderSystem::start(&settings).await.unwrap();
    let client = &system.order_client;
    let reloaded = client.list(OrderFilter::All).await.unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(client.get(burger.id).await.unwrap(), Some(burger.clone()));
    assert_eq!(client.get(salad.id).await.unwrap(), Some(salad));
    assert_eq!(client.get(soup.id).await.unwrap(), None);

    // Completion time survives the restart
    let again = client.complete(burger.id).await.unwrap();
    assert_eq!(again.completed_at(), burger.completed_at());
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_every_accepted_order_reloads_unchanged() {
    let data = tempfile::tempdir().unwrap();
    let settings = settings_for(data.path());

    let system = OrderSystem::start(&settings).await.unwrap();
    let client = &system.order_client;
    assert!(matches!(
        client.create("1", vec![LineItem::new("Soup").with_quantity(0)]).await,
        Err(OrderError::Validation(_))
    ));
    assert!(matches!(
        client.create("2", vec![LineItem::new("(chef special)")]).await,
        Err(OrderError::Validation(_))
    ));
    let soup = client
        .create("3", vec![LineItem::new("Soup (of the day)")])
        .await
        .unwrap();
    let wings = client
        .create("4", vec![LineItem::new("Wings").with_note("extra (hot)")])
        .await
        .unwrap();
    let before = client.list(OrderFilter::All).await.unwrap();
    assert_eq!(before.len(), 2);
    system.shutdown().await.unwrap();

    let stored: serde_json::Value = serde_json::from_slice(
        &std::fs::read(data.path().join(format!("{}.json", soup.id))).unwrap(),
    )
    .unwrap();
    assert_eq!(stored["items"], serde_json::json!([{"name": "Soup (of the day)"}]));

    let system = OrderSystem::start(&settings).await.unwrap();
    let client = &system.order_client;
    assert_eq!(client.list(OrderFilter::All).await.unwrap(), before);
    let soup = client.get(soup.id).await.unwrap().unwrap();
    assert_eq!(soup.items[0].name, "Soup (of the day)");
    assert_eq!(soup.items[0].note, None);
    let wings = client.get(wings.id).await.unwrap().unwrap();
    assert_eq!(wings.items[0].name, "Wings");
    assert_eq!(wings.items[0].note.as_deref(), Some("extra (hot)"));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_startup_reads_legacy_and_skips_bad_files() {
    let data = tempfile::tempdir().unwrap();
    let legacy = OrderId::new();
    std::fs::write(
        data.path().join(format!("{}.json", legacy)),
        r#"{"type": "Dine-In", "table": 7, "items": "2x Cheeseburger\n1x Caesar Salad",
            "status": "Pending", "timestamp": "2024-05-17 12:00:00", "completed_at": null}"#,
    )
    .unwrap();
    std::fs::write(data.path().join(format!("{}.json", OrderId::new())), "not json").unwrap();
    std::fs::write(data.path().join("menu.json"), "{}").unwrap();
    std::fs::write(data.path().join("notes.txt"), "table 4 is reserved").unwrap();

    let system = OrderSystem::start(&settings_for(data.path())).await.unwrap();
    let orders = system.order_client.list(OrderFilter::All).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, legacy);
    assert_eq!(orders[0].table, "7");
    assert_eq!(orders[0].items[0].quantity, Some(2));
    assert!(orders[0].is_pending());

    // Completing rewrites the record in the current shape
    system.order_client.complete(legacy).await.unwrap();
    system.shutdown().await.unwrap();
    let stored: serde_json::Value = serde_json::from_slice(
        &std::fs::read(data.path().join(format!("{}.json", legacy))).unwrap(),
    )
    .unwrap();
    assert_eq!(stored["status"], "completed");
    assert_eq!(stored["table"], "7");
    assert!(stored.get("timestamp").is_none());
}

#[tokio::test]
async fn test_failed_write_leaves_store_unchanged() {
    let root = tempfile::tempdir().unwrap();
    let data = root.path().join("orders");
    let system = OrderSystem::start(&settings_for(&data)).await.unwrap();
    let client = &system.order_client;
    let order = client.create("2", vec![LineItem::new("Tea")]).await.unwrap();

    std::fs::remove_dir_all(&data).unwrap();

    assert!(matches!(
        client.complete(order.id).await,
        Err(OrderError::StoreUnavailable(_))
    ));
    assert!(client.get(order.id).await.unwrap().unwrap().is_pending());

    assert!(matches!(
        client.create("3", vec![LineItem::new("Scone")]).await,
        Err(OrderError::StoreUnavailable(_))
    ));
    assert_eq!(client.list(OrderFilter::All).await.unwrap().len(), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unusable_data_dir_fails_startup() {
    let root = tempfile::tempdir().unwrap();
    let blocker = root.path().join("orders");
    std::fs::write(&blocker, "a file, not a directory").unwrap();

    let result = OrderSystem::start(&settings_for(&blocker)).await;
    assert!(matches!(result, Err(ConfigError::DataDir { .. })));
}
