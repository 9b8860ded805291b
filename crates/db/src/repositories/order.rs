use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use portside_core::domain::order::{ContainerNumber, OrderId, ShipmentOrder};

use super::{OrderRepository, RepositoryError};
use crate::DbPool;

const SELECT_COLUMNS: &str = "order_id, customer_name, container_number, status, origin_port, \
                              destination_port, shipped_date, estimated_delivery";

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(1) FROM shipment_order")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn find_by_order_id(
        &self,
        id: &OrderId,
    ) -> Result<Option<ShipmentOrder>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM shipment_order WHERE order_id = ?1"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| order_from_row(&row)).transpose()
    }

    async fn find_by_container(
        &self,
        container: &ContainerNumber,
    ) -> Result<Option<ShipmentOrder>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM shipment_order WHERE container_number = ?1"
        ))
        .bind(&container.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| order_from_row(&row)).transpose()
    }

    async fn save(&self, order: ShipmentOrder) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO shipment_order (
                order_id, customer_name, container_number, status, origin_port,
                destination_port, shipped_date, estimated_delivery
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(order_id) DO UPDATE SET
                customer_name = excluded.customer_name,
                container_number = excluded.container_number,
                status = excluded.status,
                origin_port = excluded.origin_port,
                destination_port = excluded.destination_port,
                shipped_date = excluded.shipped_date,
                estimated_delivery = excluded.estimated_delivery,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(&order.order_id.0)
        .bind(&order.customer_name)
        .bind(&order.container_number.0)
        .bind(&order.status)
        .bind(&order.origin_port)
        .bind(&order.destination_port)
        .bind(&order.shipped_date)
        .bind(&order.estimated_delivery)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn order_from_row(row: &SqliteRow) -> Result<ShipmentOrder, RepositoryError> {
    let text = |column: &str| {
        row.try_get::<String, _>(column)
            .map_err(|error| RepositoryError::Decode(format!("shipment_order.{column}: {error}")))
    };

    Ok(ShipmentOrder {
        order_id: OrderId(text("order_id")?),
        customer_name: text("customer_name")?,
        container_number: ContainerNumber(text("container_number")?),
        status: text("status")?,
        origin_port: text("origin_port")?,
        destination_port: text("destination_port")?,
        shipped_date: text("shipped_date")?,
        estimated_delivery: text("estimated_delivery")?,
    })
}
