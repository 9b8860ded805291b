//! Order status and container tracking tools backed by an [`OrderRepository`].

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use portside_core::domain::order::{ContainerNumber, OrderId};
use portside_core::domain::outcome::ToolOutcome;
use portside_db::repositories::OrderRepository;

use crate::tools::{
    required_str, ParameterKind, ParameterSpec, Tool, ToolDescriptor, ToolRegistry,
    ToolRegistryError,
};

pub const CHECK_ORDER_STATUS: &str = "check_order_status";
pub const GET_TRACKING_INFO: &str = "get_tracking_info";

pub struct CheckOrderStatusTool {
    orders: Arc<dyn OrderRepository>,
}

impl CheckOrderStatusTool {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl Tool for CheckOrderStatusTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            CHECK_ORDER_STATUS,
            "Look up detailed information about a customer's order using their order ID. Use \
             this when the customer asks about order status, delivery date, or order details. \
             Order IDs follow the format ORD-XXXX.",
        )
        .with_parameter(
            "order_id",
            ParameterSpec::required(
                ParameterKind::String,
                "The order ID provided by the customer (e.g., ORD-1001)",
            ),
        )
    }

    async fn execute(&self, arguments: &Value) -> Result<ToolOutcome> {
        let order_id = OrderId(required_str(arguments, "order_id")?.to_string());
        let order = self
            .orders
            .find_by_order_id(&order_id)
            .await
            .with_context(|| format!("order lookup for {} failed", order_id.0))?;

        let Some(order) = order else {
            return Ok(ToolOutcome::not_found(format!(
                "Order {} not found in our system. Please verify the order ID.",
                order_id.0
            )));
        };

        Ok(ToolOutcome::found(json!({
            "order_id": order.order_id.0,
            "customer_name": order.customer_name,
            "container_number": order.container_number.0,
            "status": order.status,
            "origin_port": order.origin_port,
            "destination_port": order.destination_port,
            "shipped_date": order.shipped_date,
            "estimated_delivery": order.estimated_delivery,
        })))
    }
}

pub struct GetTrackingInfoTool {
    orders: Arc<dyn OrderRepository>,
}

impl GetTrackingInfoTool {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl Tool for GetTrackingInfoTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            GET_TRACKING_INFO,
            "Track a shipment using the container number. Use this when the customer provides \
             a container or tracking number or asks to track their shipment. Container numbers \
             follow the format MAEU + 7 digits (e.g., MAEU7654321).",
        )
        .with_parameter(
            "container_number",
            ParameterSpec::required(
                ParameterKind::String,
                "The container number to track (e.g., MAEU7654321)",
            ),
        )
    }

    async fn execute(&self, arguments: &Value) -> Result<ToolOutcome> {
        let container = ContainerNumber(required_str(arguments, "container_number")?.to_string());
        let order = self
            .orders
            .find_by_container(&container)
            .await
            .with_context(|| format!("tracking lookup for {} failed", container.0))?;

        let Some(order) = order else {
            return Ok(ToolOutcome::not_found(format!(
                "Container {} not found. Please verify the container number.",
                container.0
            )));
        };

        Ok(ToolOutcome::found(json!({
            "container_number": order.container_number.0,
            "order_id": order.order_id.0,
            "status": order.status,
            "current_location": order.current_location(),
            "origin_port": order.origin_port,
            "destination_port": order.destination_port,
            "shipped_date": order.shipped_date,
            "estimated_delivery": order.estimated_delivery,
        })))
    }
}

/// Registry holding both support tools over the same order source.
pub fn support_registry(orders: Arc<dyn OrderRepository>) -> Result<ToolRegistry, ToolRegistryError> {
    let mut registry = ToolRegistry::default();
    registry.register(CheckOrderStatusTool::new(Arc::clone(&orders)))?;
    registry.register(GetTrackingInfoTool::new(orders))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use portside_core::domain::order::{ContainerNumber, OrderId, ShipmentOrder};
    use portside_core::domain::outcome::{FailureKind, ToolOutcome};
    use portside_db::repositories::{InMemoryOrderRepository, OrderRepository, RepositoryError};
    use portside_db::DemoOrderDataset;

    use super::{support_registry, CHECK_ORDER_STATUS, GET_TRACKING_INFO};

    fn demo_registry() -> crate::tools::ToolRegistry {
        let orders = Arc::new(InMemoryOrderRepository::with_orders(DemoOrderDataset::orders()));
        support_registry(orders).expect("registry")
    }

    struct OfflineRepository;

    #[async_trait]
    impl OrderRepository for OfflineRepository {
        async fn find_by_order_id(
            &self,
            _id: &OrderId,
        ) -> Result<Option<ShipmentOrder>, RepositoryError> {
            Err(RepositoryError::Decode("connection refused".to_string()))
        }

        async fn find_by_container(
            &self,
            _container: &ContainerNumber,
        ) -> Result<Option<ShipmentOrder>, RepositoryError> {
            Err(RepositoryError::Decode("connection refused".to_string()))
        }

        async fn save(&self, _order: ShipmentOrder) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn order_status_returns_full_order_payload() {
        let outcome =
            demo_registry().dispatch(CHECK_ORDER_STATUS, &json!({"order_id": "ORD-1005"})).await;

        let ToolOutcome::Found { payload } = outcome else {
            panic!("expected found outcome, got {outcome:?}");
        };
        assert_eq!(payload["order_id"], "ORD-1005");
        assert_eq!(payload["container_number"], "MAEU7654321");
        assert!(payload.get("current_location").is_none());
    }

    #[tokio::test]
    async fn unknown_order_is_not_found_with_guidance() {
        let outcome =
            demo_registry().dispatch(CHECK_ORDER_STATUS, &json!({"order_id": "ORD-9999"})).await;

        assert_eq!(
            outcome,
            ToolOutcome::not_found(
                "Order ORD-9999 not found in our system. Please verify the order ID."
            )
        );
    }

    #[tokio::test]
    async fn tracking_adds_current_location() {
        let outcome = demo_registry()
            .dispatch(GET_TRACKING_INFO, &json!({"container_number": "MAEU7654321"}))
            .await;

        let ToolOutcome::Found { payload } = outcome else {
            panic!("expected found outcome, got {outcome:?}");
        };
        assert_eq!(payload["order_id"], "ORD-1005");
        assert_eq!(payload["current_location"], "En route from Singapore to Felixstowe");
    }

    #[tokio::test]
    async fn unknown_container_is_not_found() {
        let outcome = demo_registry()
            .dispatch(GET_TRACKING_INFO, &json!({"container_number": "MAEU0000000"}))
            .await;

        assert_eq!(
            outcome.failure_message(),
            Some("Container MAEU0000000 not found. Please verify the container number.")
        );
    }

    #[tokio::test]
    async fn missing_argument_and_repository_errors_are_execution_failures() {
        let missing = demo_registry().dispatch(CHECK_ORDER_STATUS, &json!({})).await;
        assert!(matches!(missing, ToolOutcome::Failed { kind: FailureKind::ExecutionError, .. }));

        let offline = support_registry(Arc::new(OfflineRepository)).expect("registry");
        let failed = offline.dispatch(GET_TRACKING_INFO, &json!({"container_number": "MAEU1"})).await;
        let message = failed.failure_message().unwrap_or_default().to_string();
        assert!(matches!(failed, ToolOutcome::Failed { kind: FailureKind::ExecutionError, .. }));
        assert!(message.contains("tracking lookup for MAEU1 failed"));
        assert!(message.contains("connection refused"));
    }
}
