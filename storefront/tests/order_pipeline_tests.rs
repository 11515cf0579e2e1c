// tests/order_pipeline_tests.rs
mod common;

use common::flows::{add_to_cart, create_order, set_status};
use common::{insert_product, product, setup_tracing, stock_of, test_app, test_app_with_policy, user};
use storeflow::PipelineResult;
use storefront::config::StatusPolicy;
use storefront::errors::AppError;
use storefront::models::OrderStatus;
use storefront::services::{cart, orders};
use storefront::store::OrderRepository;

#[tokio::test]
async fn test_empty_cart_creates_no_order() {
  setup_tracing();
  let app = test_app();
  let alice = user("user_alice");

  let err = create_order(&app, &alice).await.unwrap_err();
  assert!(matches!(err, AppError::EmptyCart));
  assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn test_order_scenario_confirm_commits_stock_and_clears_cart() {
  setup_tracing();
  let app = test_app();
  let a = product("Product A", 10_000, 5, Some("home"), 0);
  insert_product(&app.store, &a).await;
  let alice = user("user_alice");

  add_to_cart(&app, &alice, a.id, 2).await.unwrap();
  let order_id = create_order(&app, &alice).await.unwrap();

  let placed = orders::get_order(app.store.as_ref(), &alice, order_id).await.unwrap();
  assert_eq!(placed.order.total_amount, 20_000);
  assert_eq!(placed.order.status, OrderStatus::Pending);
  assert_eq!(placed.items.len(), 1);
  assert_eq!(placed.items[0].product_name, "Product A");
  assert_eq!(placed.items[0].quantity, 2);
  assert_eq!(placed.items[0].price, 10_000);

  // Creation alone neither reserves stock nor empties the cart.
  assert_eq!(stock_of(&app.store, a.id).await, 5);
  assert_eq!(cart::cart_count(app.store.as_ref(), &alice).await, 1);

  let (result, changed) = set_status(&app, &alice, order_id, OrderStatus::Confirmed).await.unwrap();
  assert_eq!(result, PipelineResult::Completed);
  assert!(changed);
  assert_eq!(stock_of(&app.store, a.id).await, 3);
  assert_eq!(cart::cart_count(app.store.as_ref(), &alice).await, 0);
}

#[tokio::test]
async fn test_total_is_fixed_at_creation() {
  setup_tracing();
  let app = test_app();
  let mut p = product("Wireless Earbuds", 129_000, 10, Some("electronics"), 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");

  add_to_cart(&app, &alice, p.id, 1).await.unwrap();
  let order_id = create_order(&app, &alice).await.unwrap();

  p.price = 99_000;
  insert_product(&app.store, &p).await;

  let placed = orders::get_order(app.store.as_ref(), &alice, order_id).await.unwrap();
  assert_eq!(placed.order.total_amount, 129_000);
  assert_eq!(placed.items[0].price, 129_000);
}

#[tokio::test]
async fn test_checkout_rechecks_live_stock_and_activity() {
  setup_tracing();
  let app = test_app();
  let mut p = product("Denim Jacket", 89_000, 3, None, 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");
  add_to_cart(&app, &alice, p.id, 3).await.unwrap();

  p.stock_quantity = 2;
  insert_product(&app.store, &p).await;
  assert!(matches!(
    create_order(&app, &alice).await.unwrap_err(),
    AppError::InsufficientStock { available: 2, .. }
  ));

  p.stock_quantity = 3;
  p.is_active = false;
  insert_product(&app.store, &p).await;
  assert!(matches!(create_order(&app, &alice).await.unwrap_err(), AppError::Inactive(_)));
  assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn test_multi_line_order_totals_and_commits_per_product() {
  setup_tracing();
  let app = test_app();
  let a = product("Product A", 10_000, 5, Some("home"), 0);
  let b = product("Product B", 3_000, 9, Some("home"), 0);
  insert_product(&app.store, &a).await;
  insert_product(&app.store, &b).await;
  let alice = user("user_alice");
  let bob = user("user_bob");

  add_to_cart(&app, &alice, a.id, 2).await.unwrap();
  add_to_cart(&app, &alice, b.id, 4).await.unwrap();
  add_to_cart(&app, &bob, b.id, 1).await.unwrap();

  let order_id = create_order(&app, &alice).await.unwrap();
  let placed = orders::get_order(app.store.as_ref(), &alice, order_id).await.unwrap();
  assert_eq!(placed.order.total_amount, 32_000);
  let mut lines: Vec<(String, i32, i64)> = placed
    .items
    .iter()
    .map(|i| (i.product_name.clone(), i.quantity, i.price))
    .collect();
  lines.sort();
  assert_eq!(
    lines,
    vec![("Product A".to_string(), 2, 10_000), ("Product B".to_string(), 4, 3_000)]
  );

  set_status(&app, &alice, order_id, OrderStatus::Confirmed).await.unwrap();
  assert_eq!(stock_of(&app.store, a.id).await, 3);
  assert_eq!(stock_of(&app.store, b.id).await, 5);
  assert_eq!(cart::cart_count(app.store.as_ref(), &alice).await, 0);
  assert_eq!(cart::cart_count(app.store.as_ref(), &bob).await, 1);
}

#[tokio::test]
async fn test_deleted_product_blocks_checkout() {
  setup_tracing();
  let app = test_app();
  let a = product("Product A", 10_000, 5, None, 0);
  let b = product("Product B", 3_000, 9, None, 0);
  insert_product(&app.store, &a).await;
  insert_product(&app.store, &b).await;
  let alice = user("user_alice");
  add_to_cart(&app, &alice, a.id, 1).await.unwrap();
  add_to_cart(&app, &alice, b.id, 1).await.unwrap();

  app.store.remove_product(b.id).await;

  // The line survives the product; listings skip it.
  assert_eq!(cart::cart_count(app.store.as_ref(), &alice).await, 2);
  let summary = cart::cart_summary(app.store.as_ref(), &alice).await;
  assert_eq!(summary.items.len(), 1);
  assert_eq!(summary.total_amount, 10_000);

  match create_order(&app, &alice).await.unwrap_err() {
    AppError::NotFound(message) => assert!(message.contains(&b.id.to_string())),
    other => panic!("expected NotFound, got {:?}", other),
  }
  assert_eq!(app.store.order_count().await, 0);
  assert_eq!(app.store.order_item_count().await, 0);
}

#[tokio::test]
async fn test_line_insert_failure_leaves_no_order() {
  setup_tracing();
  let app = test_app();
  let p = product("Ceramic Mug", 12_000, 10, None, 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");
  add_to_cart(&app, &alice, p.id, 1).await.unwrap();

  app.store.set_fail_on_order_items(true).await;
  let err = create_order(&app, &alice).await.unwrap_err();

  assert!(matches!(err, AppError::OrderItemsCreationFailed));
  assert_eq!(app.store.order_count().await, 0);
  assert_eq!(app.store.order_item_count().await, 0);
  assert_eq!(cart::cart_count(app.store.as_ref(), &alice).await, 1);
}

#[tokio::test]
async fn test_invalid_address_is_rejected_before_reading_cart() {
  setup_tracing();
  let app = test_app();
  let alice = user("user_alice");
  let mut bad = common::address();
  bad.phone = "call me".to_string();

  let ctx = storeflow::ContextData::new(storefront::pipelines::contexts::CreateOrderCtxData::new(
    app.state.clone(),
    alice,
    bad,
    None,
  ));
  let err = app.state.flows.run(ctx).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_reconfirm_does_not_decrement_twice() {
  setup_tracing();
  let app = test_app();
  let p = product("Yoga Mat", 27_000, 5, None, 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");

  add_to_cart(&app, &alice, p.id, 2).await.unwrap();
  let order_id = create_order(&app, &alice).await.unwrap();
  set_status(&app, &alice, order_id, OrderStatus::Confirmed).await.unwrap();

  add_to_cart(&app, &alice, p.id, 1).await.unwrap();
  let (result, changed) = set_status(&app, &alice, order_id, OrderStatus::Confirmed).await.unwrap();

  assert_eq!(result, PipelineResult::Stopped);
  assert!(!changed);
  assert_eq!(stock_of(&app.store, p.id).await, 3);
  assert_eq!(cart::cart_count(app.store.as_ref(), &alice).await, 1);
}

#[tokio::test]
async fn test_illegal_transition_changes_nothing() {
  setup_tracing();
  let app = test_app();
  let p = product("Ceramic Mug", 12_000, 10, None, 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");

  add_to_cart(&app, &alice, p.id, 1).await.unwrap();
  let order_id = create_order(&app, &alice).await.unwrap();
  for status in [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered] {
    set_status(&app, &alice, order_id, status).await.unwrap();
  }

  let err = set_status(&app, &alice, order_id, OrderStatus::Pending).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));
  let order = app.store.get_order(&alice, order_id).await.unwrap().unwrap();
  assert_eq!(order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn test_permissive_policy_keeps_confirmation_gate() {
  setup_tracing();
  let app = test_app_with_policy(StatusPolicy::Permissive);
  let p = product("Ceramic Mug", 12_000, 10, None, 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");

  add_to_cart(&app, &alice, p.id, 4).await.unwrap();
  let order_id = create_order(&app, &alice).await.unwrap();

  // pending -> shipped skips confirmation, so no stock moves.
  set_status(&app, &alice, order_id, OrderStatus::Shipped).await.unwrap();
  assert_eq!(stock_of(&app.store, p.id).await, 10);

  // shipped -> confirmed is not pending -> confirmed either.
  set_status(&app, &alice, order_id, OrderStatus::Confirmed).await.unwrap();
  assert_eq!(stock_of(&app.store, p.id).await, 10);
  assert_eq!(cart::cart_count(app.store.as_ref(), &alice).await, 1);
}

#[tokio::test]
async fn test_stock_decrement_floors_at_zero() {
  setup_tracing();
  let app = test_app();
  let mut p = product("Denim Jacket", 89_000, 3, None, 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");

  add_to_cart(&app, &alice, p.id, 3).await.unwrap();
  let order_id = create_order(&app, &alice).await.unwrap();

  p.stock_quantity = 1;
  insert_product(&app.store, &p).await;
  set_status(&app, &alice, order_id, OrderStatus::Confirmed).await.unwrap();
  assert_eq!(stock_of(&app.store, p.id).await, 0);
}

#[tokio::test]
async fn test_foreign_order_is_not_found() {
  setup_tracing();
  let app = test_app();
  let p = product("Ceramic Mug", 12_000, 10, None, 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");
  let bob = user("user_bob");

  add_to_cart(&app, &alice, p.id, 1).await.unwrap();
  let order_id = create_order(&app, &alice).await.unwrap();

  assert!(orders::get_order(app.store.as_ref(), &bob, order_id).await.is_none());
  assert!(orders::list_orders(app.store.as_ref(), &bob).await.is_empty());
  assert!(matches!(
    set_status(&app, &bob, order_id, OrderStatus::Confirmed).await.unwrap_err(),
    AppError::NotFound(_)
  ));
  assert_eq!(stock_of(&app.store, p.id).await, 10);
}

#[tokio::test]
async fn test_failed_status_write_surfaces_and_changes_nothing() {
  setup_tracing();
  let app = test_app();
  let p = product("Ceramic Mug", 12_000, 10, None, 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");

  add_to_cart(&app, &alice, p.id, 2).await.unwrap();
  let order_id = create_order(&app, &alice).await.unwrap();

  app.store.set_fail_on_status_change(true).await;
  let err = set_status(&app, &alice, order_id, OrderStatus::Confirmed).await.unwrap_err();
  assert!(matches!(err, AppError::Store(_)));
  assert_eq!(stock_of(&app.store, p.id).await, 10);
  assert_eq!(cart::cart_count(app.store.as_ref(), &alice).await, 1);
}

#[tokio::test]
async fn test_concurrent_confirmations_commit_stock_once() {
  setup_tracing();
  let app = test_app();
  let p = product("Product A", 10_000, 5, None, 0);
  insert_product(&app.store, &p).await;
  let alice = user("user_alice");

  add_to_cart(&app, &alice, p.id, 2).await.unwrap();
  let order_id = create_order(&app, &alice).await.unwrap();

  let (first, second) = tokio::join!(
    set_status(&app, &alice, order_id, OrderStatus::Confirmed),
    set_status(&app, &alice, order_id, OrderStatus::Confirmed),
  );
  let writes = [first, second]
    .into_iter()
    .filter(|outcome| match outcome {
      Ok((_, changed)) => *changed,
      Err(e) => {
        assert!(matches!(e, AppError::Conflict(_)), "unexpected error {:?}", e);
        false
      }
    })
    .count();

  assert_eq!(writes, 1);
  assert_eq!(stock_of(&app.store, p.id).await, 3);
}
