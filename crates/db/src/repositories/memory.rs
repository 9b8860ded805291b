use std::collections::HashMap;

use tokio::sync::RwLock;

use portside_core::domain::order::{ContainerNumber, OrderId, ShipmentOrder};

use super::{OrderRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, ShipmentOrder>>,
}

impl InMemoryOrderRepository {
    pub fn with_orders(orders: impl IntoIterator<Item = ShipmentOrder>) -> Self {
        let orders =
            orders.into_iter().map(|order| (order.order_id.0.clone(), order)).collect::<HashMap<_, _>>();
        Self { orders: RwLock::new(orders) }
    }
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_order_id(
        &self,
        id: &OrderId,
    ) -> Result<Option<ShipmentOrder>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id.0).cloned())
    }

    async fn find_by_container(
        &self,
        container: &ContainerNumber,
    ) -> Result<Option<ShipmentOrder>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.values().find(|order| order.container_number == *container).cloned())
    }

    async fn save(&self, order: ShipmentOrder) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        orders.insert(order.order_id.0.clone(), order);
        Ok(())
    }
}
