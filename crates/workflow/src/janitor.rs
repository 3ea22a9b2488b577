//! Background sweep that ages stale in-process orders to done.

use std::time::Duration;

use chrono::Utc;
use store::{OrderStore, Result as StoreResult};

/// Periodically completes orders that have sat `in process` beyond a
/// staleness threshold. One bulk store update per tick; failures are logged
/// and the loop keeps going, since there is no caller to report to.
pub struct StatusJanitor<S> {
    stores: S,
    interval: Duration,
    stale_after: chrono::Duration,
}

impl<S> StatusJanitor<S>
where
    S: OrderStore,
{
    /// Creates a janitor with the default cadence: sweep every 60 seconds,
    /// completing orders older than 15 minutes.
    pub fn new(stores: S) -> Self {
        Self {
            stores,
            interval: Duration::from_secs(60),
            stale_after: chrono::Duration::minutes(15),
        }
    }

    /// Sets the sweep interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets how long an order may stay `in process` before the sweep
    /// completes it.
    pub fn with_stale_after(mut self, stale_after: chrono::Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Runs one sweep, returning how many orders were completed.
    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self) -> StoreResult<u64> {
        let cutoff = Utc::now() - self.stale_after;
        let transitioned = self.stores.complete_stale_orders(cutoff).await?;
        if transitioned > 0 {
            metrics::counter!("janitor_orders_completed_total").increment(transitioned);
            tracing::info!(transitioned, "aged stale orders to done");
        }
        Ok(transitioned)
    }

    /// Sweeps forever at the configured interval. Spawn this on the runtime
    /// alongside the HTTP server.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(error) = self.sweep().await {
                tracing::error!(%error, "stale order sweep failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use common::{CustomerId, Money, OrderId};
    use domain::{DeliveryMethod, Order, OrderStatus, PaymentMethod, PaymentStatus};
    use store::InMemoryStores;

    async fn seed_order(stores: &InMemoryStores, order_id: &str, age_minutes: i64) {
        let order = Order {
            order_id: OrderId::new(order_id),
            customer_id: CustomerId::new("CUST-1"),
            customer_name: "Rahim".to_string(),
            phone: "01700000000".to_string(),
            address: "Hall 3".to_string(),
            items: vec![],
            total_price: Money::new(100),
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            order_status: OrderStatus::InProcess,
            delivery_method: DeliveryMethod::TakeAway,
            delivery_charge: Money::zero(),
            deliveryman: None,
            created_at: Utc::now() - ChronoDuration::minutes(age_minutes),
        };
        stores.insert_order(&order).await.unwrap();
    }

    #[tokio::test]
    async fn sweep_completes_only_stale_orders() {
        let stores = InMemoryStores::new();
        seed_order(&stores, "100001", 20).await;
        seed_order(&stores, "100002", 5).await;

        let janitor = StatusJanitor::new(stores.clone());
        assert_eq!(janitor.sweep().await.unwrap(), 1);

        let stale = stores
            .find_order(&OrderId::new("100001"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stale.order_status, OrderStatus::Done);

        let fresh = stores
            .find_order(&OrderId::new("100002"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fresh.order_status, OrderStatus::InProcess);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let stores = InMemoryStores::new();
        seed_order(&stores, "100001", 20).await;

        let janitor = StatusJanitor::new(stores.clone());
        assert_eq!(janitor.sweep().await.unwrap(), 1);
        assert_eq!(janitor.sweep().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn threshold_is_configurable() {
        let stores = InMemoryStores::new();
        seed_order(&stores, "100001", 5).await;

        let janitor = StatusJanitor::new(stores.clone())
            .with_stale_after(ChronoDuration::minutes(1));
        assert_eq!(janitor.sweep().await.unwrap(), 1);
    }
}
