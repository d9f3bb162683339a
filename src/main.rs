use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_lifecycle::config::AppConfig;
use order_lifecycle::domain::buyer::{BuyerRef, UserId};
use order_lifecycle::domain::currency::{Currency, CurrencyConverter};
use order_lifecycle::domain::notification::NotificationInbox;
use order_lifecycle::domain::order::DeliveryAddress;
use order_lifecycle::domain::product::{Product, ProductRepository};
use order_lifecycle::store::{
    InMemoryIdentityDirectory, InMemoryNotificationStore, InMemoryOrderStore, InMemoryProductStore,
};
use order_lifecycle::{LifecycleMetrics, LineRequest, NewOrder, OrderLifecycle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Default filter comes from ORDERS_LOG_FILTER, RUST_LOG overrides it
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    tracing::info!("🚀 Starting order lifecycle demo");

    // === 1. Currency conversion ===
    let rates = config.exchange_rates()?;
    tracing::info!(base = %rates.base(), "💱 Exchange rates loaded");
    let converter = CurrencyConverter::new(rates);

    // === 2. Stores ===
    let products = Arc::new(InMemoryProductStore::new());
    let orders = Arc::new(InMemoryOrderStore::new());
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let directory = Arc::new(InMemoryIdentityDirectory::new());

    let mate = Product::new("Mate gourd", 25.0, Currency::Usd, 10);
    let yerba = Product::new("Yerba 1kg", 6_500.0, Currency::Ars, 3);
    products.insert(mate.clone()).await;
    products.insert(yerba.clone()).await;

    let ana = UserId::new();
    directory.add_user(ana).await;
    directory.link("auth0|ana", ana).await;

    // === 3. Metrics ===
    let metrics = Arc::new(LifecycleMetrics::new()?);

    // === 4. Lifecycle service ===
    let lifecycle = OrderLifecycle::new(
        products.clone(),
        orders.clone(),
        notifications.clone(),
        directory.clone(),
        converter,
        metrics.clone(),
    );

    // === 5. Place, confirm, ship and deliver an order ===
    let placed = lifecycle
        .create(NewOrder {
            buyer: BuyerRef::external("auth0|ana"),
            items: vec![LineRequest::new(mate.id, 2), LineRequest::new(yerba.id, 1)],
            currency: Currency::Brl,
            delivery_address: demo_address(),
        })
        .await?;
    let order_id = placed.order.id();

    lifecycle.confirm(&order_id, "seller-7", None).await?;
    lifecycle.ship(&order_id, "seller-7", Some("tracking AR-5521".to_string())).await?;
    let delivered = lifecycle.deliver(&order_id, "courier-2", None).await?;
    println!("{}", serde_json::to_string_pretty(&delivered)?);

    // === 6. Place and cancel a second order ===
    let second = lifecycle
        .create(NewOrder {
            buyer: BuyerRef::internal(ana),
            items: vec![LineRequest::new(yerba.id, 2)],
            currency: Currency::Ars,
            delivery_address: demo_address(),
        })
        .await?;
    let cancelled = lifecycle
        .cancel(&second.order.id(), "auth0|ana", Some("ordered twice".to_string()))
        .await?;
    tracing::info!(
        order_id = %cancelled.order.id(),
        notification = cancelled.notification.outcome(),
        "🛑 Second order cancelled"
    );

    // === 7. Rejected order: not enough stock ===
    if let Err(e) = lifecycle
        .create(NewOrder {
            buyer: BuyerRef::external("auth0|ana"),
            items: vec![LineRequest::new(yerba.id, 50)],
            currency: Currency::Ars,
            delivery_address: demo_address(),
        })
        .await
    {
        tracing::warn!(error = %e, "Order rejected");
    }

    // === 8. Buyer view ===
    let history = lifecycle.history_for_buyer("auth0|ana").await?;
    tracing::info!(orders = history.len(), "📦 Order history for auth0|ana");

    let inbox = NotificationInbox::new(notifications.clone(), directory.clone());
    for notification in inbox.unread("auth0|ana").await? {
        println!("🔔 {}", notification.message);
    }
    let marked = inbox.mark_all_read("auth0|ana").await?;
    tracing::info!(marked, "Notifications marked as read");

    if let Some(product) = products.find_by_id(&yerba.id).await? {
        tracing::info!(
            product = %product.name,
            stock = product.stock_quantity,
            units_sold = product.units_sold,
            "Stock after demo"
        );
    }

    // === 9. Metrics snapshot ===
    println!("{}", metrics.render()?);

    tracing::info!("✅ Demo finished");
    Ok(())
}

fn demo_address() -> DeliveryAddress {
    DeliveryAddress {
        street: "Av. Santa Fe".to_string(),
        number: 3253,
        postal_code: "C1425".to_string(),
        city: "Buenos Aires".to_string(),
        province: "CABA".to_string(),
        country: "Argentina".to_string(),
        floor: Some(4),
        unit: Some("C".to_string()),
        lat: Some("-34.5875".to_string()),
        lon: Some("-58.4104".to_string()),
    }
}
