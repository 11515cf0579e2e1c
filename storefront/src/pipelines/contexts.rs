// storefront/src/pipelines/contexts.rs

//! Data carried through each pipeline run. Handlers receive these wrapped in
//! `storeflow::ContextData`.

use crate::models::{CartItem, NewOrderItem, Order, OrderStatus, Product, ShippingAddress, UserId};
use crate::state::AppState;
use uuid::Uuid;

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub owner_id: UserId,
  pub product_id: Uuid,
  pub quantity: i32,
  pub product: Option<Product>,
  /// The owner's existing line for this product, if any.
  pub existing_line: Option<CartItem>,
  pub cart_item: Option<CartItem>,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, owner_id: UserId, product_id: Uuid, quantity: i32) -> Self {
    Self {
      app_state,
      owner_id,
      product_id,
      quantity,
      product: None,
      existing_line: None,
      cart_item: None,
    }
  }
}

#[derive(Clone)]
pub struct UpdateCartQuantityCtxData {
  pub app_state: AppState,
  pub owner_id: UserId,
  pub line_id: Uuid,
  pub quantity: i32,
  pub line: Option<CartItem>,
  pub product: Option<Product>,
  pub cart_item: Option<CartItem>,
}

impl UpdateCartQuantityCtxData {
  pub fn new(app_state: AppState, owner_id: UserId, line_id: Uuid, quantity: i32) -> Self {
    Self {
      app_state,
      owner_id,
      line_id,
      quantity,
      line: None,
      product: None,
      cart_item: None,
    }
  }
}

#[derive(Clone)]
pub struct CreateOrderCtxData {
  pub app_state: AppState,
  pub owner_id: UserId,
  pub shipping_address: ShippingAddress,
  pub order_note: Option<String>,
  pub cart: Vec<CartItem>,
  pub order_lines: Vec<NewOrderItem>,
  pub total_amount: i64,
  pub order: Option<Order>,
}

impl CreateOrderCtxData {
  pub fn new(
    app_state: AppState,
    owner_id: UserId,
    shipping_address: ShippingAddress,
    order_note: Option<String>,
  ) -> Self {
    Self {
      app_state,
      owner_id,
      shipping_address,
      order_note,
      cart: Vec::new(),
      order_lines: Vec::new(),
      total_amount: 0,
      order: None,
    }
  }
}

#[derive(Clone)]
pub struct OrderStatusCtxData {
  pub app_state: AppState,
  pub owner_id: UserId,
  pub order_id: Uuid,
  pub new_status: OrderStatus,
  /// Status read before the write; the compare-and-set guard.
  pub previous_status: Option<OrderStatus>,
  pub changed: bool,
}

impl OrderStatusCtxData {
  pub fn new(app_state: AppState, owner_id: UserId, order_id: Uuid, new_status: OrderStatus) -> Self {
    Self {
      app_state,
      owner_id,
      order_id,
      new_status,
      previous_status: None,
      changed: false,
    }
  }
}

/// A gateway success report waiting to be checked and applied.
#[derive(Clone)]
pub struct PaymentSettlementCtxData {
  pub app_state: AppState,
  pub owner_id: UserId,
  pub external_order_id: String,
  pub payment_key: String,
  pub reported_amount: i64,
  pub order_id: Option<Uuid>,
  pub order: Option<Order>,
  pub confirmed: bool,
}

impl PaymentSettlementCtxData {
  pub fn new(
    app_state: AppState,
    owner_id: UserId,
    external_order_id: String,
    payment_key: String,
    reported_amount: i64,
  ) -> Self {
    Self {
      app_state,
      owner_id,
      external_order_id,
      payment_key,
      reported_amount,
      order_id: None,
      order: None,
      confirmed: false,
    }
  }
}
