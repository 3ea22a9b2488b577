//! PostgreSQL-backed store implementation.
//!
//! Scalar fields live in typed columns so the conditional updates and the
//! janitor sweep can run as single statements; item snapshots are stored as
//! JSONB documents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, DeliverymanId, Money, OrderId, PaymentId};
use domain::{
    AssignedDeliveryman, Cart, CartItem, Deliveryman, DeliverymanStatus, LineItem, Order,
    OrderStatus, Payment, PaymentStatus, Student,
};
use serde::de::DeserializeOwned;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::traits::{CartStore, DeliverymanStore, OrderStore, PaymentStore, StudentStore};
use crate::{Result, StoreError};

const ORDER_COLUMNS: &str = "order_id, customer_id, customer_name, phone, address, items, \
     total_price, payment_method, payment_status, order_status, delivery_method, \
     delivery_charge, deliveryman_id, deliveryman_name, created_at";

const DELIVERYMAN_COLUMNS: &str = "id, name, email, phone, employee_id, approved, status";

/// PostgreSQL implementation of all five store traits, sharing one pool.
#[derive(Clone)]
pub struct PostgresStores {
    pool: PgPool,
}

impl PostgresStores {
    /// Creates a new store set over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_student(row: PgRow) -> Result<Student> {
        Ok(Student {
            customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            student_id: row.try_get("student_id")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            wallet: Money::new(row.try_get("wallet")?),
        })
    }

    fn row_to_cart(row: PgRow) -> Result<Cart> {
        Ok(Cart {
            customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
            items: row.try_get::<Json<Vec<CartItem>>, _>("items")?.0,
            total_price: Money::new(row.try_get("total_price")?),
        })
    }

    fn row_to_payment(row: PgRow) -> Result<Payment> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
            method: enum_from_text(row.try_get("method")?)?,
            amount: Money::new(row.try_get("amount")?),
            payment_status: enum_from_text(row.try_get("payment_status")?)?,
            delivery_method: enum_from_text(row.try_get("delivery_method")?)?,
            delivery_charge: Money::new(row.try_get("delivery_charge")?),
            items: row.try_get::<Json<Vec<LineItem>>, _>("items")?.0,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let deliveryman_id: Option<Uuid> = row.try_get("deliveryman_id")?;
        let deliveryman_name: Option<String> = row.try_get("deliveryman_name")?;
        let deliveryman = match (deliveryman_id, deliveryman_name) {
            (Some(id), Some(name)) => Some(AssignedDeliveryman {
                id: DeliverymanId::from_uuid(id),
                name,
            }),
            _ => None,
        };

        Ok(Order {
            order_id: OrderId::new(row.try_get::<String, _>("order_id")?),
            customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
            customer_name: row.try_get("customer_name")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            items: row.try_get::<Json<Vec<LineItem>>, _>("items")?.0,
            total_price: Money::new(row.try_get("total_price")?),
            payment_method: enum_from_text(row.try_get("payment_method")?)?,
            payment_status: enum_from_text(row.try_get("payment_status")?)?,
            order_status: enum_from_text(row.try_get("order_status")?)?,
            delivery_method: enum_from_text(row.try_get("delivery_method")?)?,
            delivery_charge: Money::new(row.try_get("delivery_charge")?),
            deliveryman,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_deliveryman(row: PgRow) -> Result<Deliveryman> {
        Ok(Deliveryman {
            id: DeliverymanId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            employee_id: row.try_get("employee_id")?,
            approved: row.try_get("approved")?,
            status: enum_from_text(row.try_get("status")?)?,
        })
    }
}

/// Parses an enum column stored as its wire literal (`"Home Delivery"`,
/// `"in process"`, ...) back through serde.
fn enum_from_text<T: DeserializeOwned>(text: String) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::String(text))?)
}

#[async_trait]
impl StudentStore for PostgresStores {
    async fn insert_student(&self, student: &Student) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO students (customer_id, name, email, student_id, phone, address, wallet)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(student.customer_id.as_str())
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.student_id)
        .bind(&student.phone)
        .bind(&student.address)
        .bind(student.wallet.amount())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_student(&self, customer_id: &CustomerId) -> Result<Option<Student>> {
        let row = sqlx::query(
            "SELECT customer_id, name, email, student_id, phone, address, wallet \
             FROM students WHERE customer_id = $1",
        )
        .bind(customer_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_student).transpose()
    }

    async fn drain_wallet_if_below(
        &self,
        customer_id: &CustomerId,
        charge: Money,
    ) -> Result<Option<Money>> {
        // The offset rule only ever drains the whole balance, so the update
        // zeroes the wallet and reports what was there. The locked subquery
        // keeps the check and the write in one statement.
        let drained: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE students s
            SET wallet = 0
            FROM (
                SELECT customer_id, wallet FROM students
                WHERE customer_id = $1
                FOR UPDATE
            ) prev
            WHERE s.customer_id = prev.customer_id
              AND prev.wallet > 0
              AND prev.wallet < $2
            RETURNING prev.wallet
            "#,
        )
        .bind(customer_id.as_str())
        .bind(charge.amount())
        .fetch_optional(&self.pool)
        .await?;

        Ok(drained.map(Money::new))
    }

    async fn credit_wallet(
        &self,
        customer_id: &CustomerId,
        amount: Money,
    ) -> Result<Option<Money>> {
        let balance: Option<i64> = sqlx::query_scalar(
            "UPDATE students SET wallet = wallet + $2 WHERE customer_id = $1 RETURNING wallet",
        )
        .bind(customer_id.as_str())
        .bind(amount.amount())
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance.map(Money::new))
    }
}

#[async_trait]
impl CartStore for PostgresStores {
    async fn upsert_cart(&self, cart: &Cart) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO carts (customer_id, items, total_price)
            VALUES ($1, $2, $3)
            ON CONFLICT (customer_id)
            DO UPDATE SET items = EXCLUDED.items, total_price = EXCLUDED.total_price
            "#,
        )
        .bind(cart.customer_id.as_str())
        .bind(Json(&cart.items))
        .bind(cart.total_price.amount())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_cart(&self, customer_id: &CustomerId) -> Result<Option<Cart>> {
        let row = sqlx::query("SELECT customer_id, items, total_price FROM carts WHERE customer_id = $1")
            .bind(customer_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_cart).transpose()
    }

    async fn delete_cart(&self, customer_id: &CustomerId) -> Result<()> {
        sqlx::query("DELETE FROM carts WHERE customer_id = $1")
            .bind(customer_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for PostgresStores {
    async fn insert_payment(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments
                (id, customer_id, method, amount, payment_status, delivery_method,
                 delivery_charge, items, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.customer_id.as_str())
        .bind(payment.method.to_string())
        .bind(payment.amount.amount())
        .bind(payment.payment_status.to_string())
        .bind(payment.delivery_method.to_string())
        .bind(payment.delivery_charge.amount())
        .bind(Json(&payment.items))
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_payment(&self, customer_id: &CustomerId) -> Result<Option<Payment>> {
        let row = sqlx::query(
            "SELECT id, customer_id, method, amount, payment_status, delivery_method, \
             delivery_charge, items, created_at \
             FROM payments WHERE customer_id = $1 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(customer_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_payment).transpose()
    }
}

#[async_trait]
impl OrderStore for PostgresStores {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders
                (order_id, customer_id, customer_name, phone, address, items, total_price,
                 payment_method, payment_status, order_status, delivery_method,
                 delivery_charge, deliveryman_id, deliveryman_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(order.order_id.as_str())
        .bind(order.customer_id.as_str())
        .bind(&order.customer_name)
        .bind(&order.phone)
        .bind(&order.address)
        .bind(Json(&order.items))
        .bind(order.total_price.amount())
        .bind(order.payment_method.to_string())
        .bind(order.payment_status.to_string())
        .bind(order.order_status.to_string())
        .bind(order.delivery_method.to_string())
        .bind(order.delivery_charge.amount())
        .bind(order.deliveryman.as_ref().map(|d| d.id.as_uuid()))
        .bind(order.deliveryman.as_ref().map(|d| d.name.clone()))
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_pkey")
            {
                return StoreError::DuplicateOrderId(order.order_id.clone());
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1");
        let row = sqlx::query(&sql)
            .bind(order_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn orders_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(customer_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn orders_for_deliveryman(&self, deliveryman_id: DeliverymanId) -> Result<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE deliveryman_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(deliveryman_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn set_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET order_status = $2 WHERE order_id = $1 RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(order_id.as_str())
            .bind(status.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn set_payment_status(
        &self,
        order_id: &OrderId,
        status: PaymentStatus,
    ) -> Result<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET payment_status = $2 WHERE order_id = $1 RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(order_id.as_str())
            .bind(status.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn set_deliveryman(
        &self,
        order_id: &OrderId,
        deliveryman: &AssignedDeliveryman,
    ) -> Result<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET deliveryman_id = $2, deliveryman_name = $3 \
             WHERE order_id = $1 RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(order_id.as_str())
            .bind(deliveryman.id.as_uuid())
            .bind(&deliveryman.name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn complete_stale_orders(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE orders SET order_status = $1 \
             WHERE order_status = $2 AND created_at <= $3",
        )
        .bind(OrderStatus::Done.to_string())
        .bind(OrderStatus::InProcess.to_string())
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        let transitioned = result.rows_affected();
        if transitioned > 0 {
            tracing::debug!(transitioned, "completed stale orders");
        }
        Ok(transitioned)
    }
}

#[async_trait]
impl DeliverymanStore for PostgresStores {
    async fn insert_deliveryman(&self, deliveryman: &Deliveryman) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO deliverymen (id, name, email, phone, employee_id, approved, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(deliveryman.id.as_uuid())
        .bind(&deliveryman.name)
        .bind(&deliveryman.email)
        .bind(&deliveryman.phone)
        .bind(&deliveryman.employee_id)
        .bind(deliveryman.approved)
        .bind(deliveryman.status.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_deliveryman(&self, id: DeliverymanId) -> Result<Option<Deliveryman>> {
        let sql = format!("SELECT {DELIVERYMAN_COLUMNS} FROM deliverymen WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_deliveryman).transpose()
    }

    async fn claim_available(&self, id: DeliverymanId) -> Result<Option<Deliveryman>> {
        let sql = format!(
            "UPDATE deliverymen SET status = $2 \
             WHERE id = $1 AND approved AND status = $3 \
             RETURNING {DELIVERYMAN_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(DeliverymanStatus::PickingUp.to_string())
            .bind(DeliverymanStatus::Available.to_string())
            .fetch_optional(&self.pool)
            .await?;

        if row.is_some() {
            tracing::debug!(%id, "claimed deliveryman");
        }
        row.map(Self::row_to_deliveryman).transpose()
    }

    async fn set_status(
        &self,
        id: DeliverymanId,
        status: DeliverymanStatus,
    ) -> Result<Option<Deliveryman>> {
        let sql = format!(
            "UPDATE deliverymen SET status = $2 WHERE id = $1 RETURNING {DELIVERYMAN_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(status.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_deliveryman).transpose()
    }
}
