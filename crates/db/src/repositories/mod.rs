use async_trait::async_trait;
use thiserror::Error;

use portside_core::domain::order::{ContainerNumber, OrderId, ShipmentOrder};

pub mod memory;
pub mod order;

pub use memory::InMemoryOrderRepository;
pub use order::SqlOrderRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Key lookups over shipment orders, used by the support tools.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_order_id(&self, id: &OrderId)
        -> Result<Option<ShipmentOrder>, RepositoryError>;

    async fn find_by_container(
        &self,
        container: &ContainerNumber,
    ) -> Result<Option<ShipmentOrder>, RepositoryError>;

    async fn save(&self, order: ShipmentOrder) -> Result<(), RepositoryError>;
}
