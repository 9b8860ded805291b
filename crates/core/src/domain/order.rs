use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerNumber(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentOrder {
    pub order_id: OrderId,
    pub customer_name: String,
    pub container_number: ContainerNumber,
    pub status: String,
    pub origin_port: String,
    pub destination_port: String,
    pub shipped_date: String,
    pub estimated_delivery: String,
}

impl ShipmentOrder {
    pub fn current_location(&self) -> String {
        format!("En route from {} to {}", self.origin_port, self.destination_port)
    }
}
