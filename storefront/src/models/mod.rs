// storefront/src/models/mod.rs

//! Data structures for catalog, cart and order records.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use cart_item::{CartItem, CartItemWithProduct, CartSummary};
pub use order::{NewOrder, Order, OrderStatus, OrderWithItems, ShippingAddress, StatusChange};
pub use order_item::{NewOrderItem, OrderItem};
pub use product::{Product, ProductPage, ProductQuery, ProductSort, StockStatus};
pub use user::UserId;
