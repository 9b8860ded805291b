use portside_core::domain::order::{ContainerNumber, OrderId, ShipmentOrder};

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

struct DemoOrder {
    order_id: &'static str,
    customer_name: &'static str,
    container_number: &'static str,
    status: &'static str,
    origin_port: &'static str,
    destination_port: &'static str,
    shipped_date: &'static str,
    estimated_delivery: &'static str,
}

const DEMO_ORDERS: &[DemoOrder] = &[
    DemoOrder {
        order_id: "ORD-1001",
        customer_name: "Acme Imports",
        container_number: "MAEU1234567",
        status: "In Transit",
        origin_port: "Shanghai",
        destination_port: "Los Angeles",
        shipped_date: "2026-01-05",
        estimated_delivery: "2026-01-28",
    },
    DemoOrder {
        order_id: "ORD-1002",
        customer_name: "Nordic Furnishings",
        container_number: "MAEU2345678",
        status: "Delivered",
        origin_port: "Gothenburg",
        destination_port: "New York",
        shipped_date: "2025-12-12",
        estimated_delivery: "2026-01-02",
    },
    DemoOrder {
        order_id: "ORD-1003",
        customer_name: "Sunrise Electronics",
        container_number: "MAEU3456789",
        status: "Customs Clearance",
        origin_port: "Busan",
        destination_port: "Hamburg",
        shipped_date: "2026-01-08",
        estimated_delivery: "2026-02-10",
    },
    DemoOrder {
        order_id: "ORD-1004",
        customer_name: "Global Foods Trading",
        container_number: "MAEU4567890",
        status: "In Transit",
        origin_port: "Mumbai",
        destination_port: "Rotterdam",
        shipped_date: "2026-01-15",
        estimated_delivery: "2026-02-12",
    },
    DemoOrder {
        order_id: "ORD-1005",
        customer_name: "PharmaCorp Ltd",
        container_number: "MAEU7654321",
        status: "Processing",
        origin_port: "Singapore",
        destination_port: "Felixstowe",
        shipped_date: "2026-01-20",
        estimated_delivery: "2026-02-24",
    },
    DemoOrder {
        order_id: "ORD-1006",
        customer_name: "Ocean Harvest Exports",
        container_number: "MAEU5678901",
        status: "Delayed",
        origin_port: "Chennai",
        destination_port: "Dubai",
        shipped_date: "2026-01-11",
        estimated_delivery: "2026-01-30",
    },
    DemoOrder {
        order_id: "ORD-1007",
        customer_name: "Andes Coffee Co",
        container_number: "MAEU6789012",
        status: "Delivered",
        origin_port: "Callao",
        destination_port: "Valencia",
        shipped_date: "2025-12-01",
        estimated_delivery: "2025-12-29",
    },
    DemoOrder {
        order_id: "ORD-1008",
        customer_name: "Pacific Auto Parts",
        container_number: "MAEU7890123",
        status: "In Transit",
        origin_port: "Yokohama",
        destination_port: "Long Beach",
        shipped_date: "2026-01-18",
        estimated_delivery: "2026-02-05",
    },
    DemoOrder {
        order_id: "ORD-1009",
        customer_name: "Cape Textiles",
        container_number: "MAEU8901234",
        status: "Awaiting Pickup",
        origin_port: "Durban",
        destination_port: "Antwerp",
        shipped_date: "2025-12-20",
        estimated_delivery: "2026-01-22",
    },
    DemoOrder {
        order_id: "ORD-1010",
        customer_name: "Lagos Agro Supplies",
        container_number: "MAEU9012345",
        status: "In Transit",
        origin_port: "Lagos",
        destination_port: "Le Havre",
        shipped_date: "2026-01-22",
        estimated_delivery: "2026-02-18",
    },
    DemoOrder {
        order_id: "ORD-1011",
        customer_name: "Baltic Timber",
        container_number: "MAEU0123456",
        status: "Processing",
        origin_port: "Gdansk",
        destination_port: "Montreal",
        shipped_date: "2026-01-25",
        estimated_delivery: "2026-02-27",
    },
    DemoOrder {
        order_id: "ORD-1012",
        customer_name: "Red Sea Minerals",
        container_number: "MAEU1357924",
        status: "Customs Hold",
        origin_port: "Jeddah",
        destination_port: "Piraeus",
        shipped_date: "2026-01-09",
        estimated_delivery: "2026-02-01",
    },
];

/// Deterministic order and tracking data for demos and end-to-end tests.
pub struct DemoOrderDataset;

impl DemoOrderDataset {
    pub fn orders() -> Vec<ShipmentOrder> {
        DEMO_ORDERS.iter().map(DemoOrder::to_order).collect()
    }

    /// Upserts every demo order in one transaction; safe to run repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        for order in DEMO_ORDERS {
            sqlx::query(
                "INSERT OR REPLACE INTO shipment_order (
                    order_id, customer_name, container_number, status, origin_port,
                    destination_port, shipped_date, estimated_delivery
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(order.order_id)
            .bind(order.customer_name)
            .bind(order.container_number)
            .bind(order.status)
            .bind(order.origin_port)
            .bind(order.destination_port)
            .bind(order.shipped_date)
            .bind(order.estimated_delivery)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let orders_seeded = DEMO_ORDERS.iter().map(|order| order.order_id).collect::<Vec<_>>();
        tracing::info!(
            event_name = "db.seed.completed",
            orders = orders_seeded.len(),
            "demo order dataset loaded"
        );
        Ok(SeedResult { orders_seeded })
    }

    /// Checks every demo order is present with its container number and status.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(DEMO_ORDERS.len());

        for order in DEMO_ORDERS {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM shipment_order
                 WHERE order_id = ?1 AND container_number = ?2 AND status = ?3)",
            )
            .bind(order.order_id)
            .bind(order.container_number)
            .bind(order.status)
            .fetch_one(pool)
            .await?;
            checks.push((order.order_id, exists == 1));
        }

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }
}

impl DemoOrder {
    fn to_order(&self) -> ShipmentOrder {
        ShipmentOrder {
            order_id: OrderId(self.order_id.to_string()),
            customer_name: self.customer_name.to_string(),
            container_number: ContainerNumber(self.container_number.to_string()),
            status: self.status.to_string(),
            origin_port: self.origin_port.to_string(),
            destination_port: self.destination_port.to_string(),
            shipped_date: self.shipped_date.to_string(),
            estimated_delivery: self.estimated_delivery.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedResult {
    pub orders_seeded: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use portside_core::domain::order::{ContainerNumber, OrderId};

    use super::DemoOrderDataset;
    use crate::repositories::{OrderRepository, SqlOrderRepository};
    use crate::{connect_with_settings, migrations};

    #[test]
    fn demo_keys_are_unique_and_well_formed() {
        let orders = DemoOrderDataset::orders();
        assert_eq!(orders.len(), 12);

        let ids = orders.iter().map(|order| order.order_id.0.as_str()).collect::<HashSet<_>>();
        let containers =
            orders.iter().map(|order| order.container_number.0.as_str()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), 12);
        assert_eq!(containers.len(), 12);
        assert!(!ids.contains("ORD-9999"));
        assert!(orders.iter().all(|order| {
            let digits = order.container_number.0.strip_prefix("MAEU").unwrap_or_default();
            digits.len() == 7 && digits.chars().all(|c| c.is_ascii_digit())
        }));
    }

    #[tokio::test]
    async fn load_then_verify_reports_all_present() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let seeded = DemoOrderDataset::load(&pool).await.expect("load");
        assert_eq!(seeded.orders_seeded.len(), 12);

        // a second load is an upsert, not a conflict
        DemoOrderDataset::load(&pool).await.expect("reload");

        let verification = DemoOrderDataset::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "checks: {:?}", verification.checks);

        let repo = SqlOrderRepository::new(pool);
        let order = repo
            .find_by_order_id(&OrderId("ORD-1005".to_string()))
            .await
            .expect("lookup")
            .expect("seeded order");
        assert_eq!(order.container_number, ContainerNumber("MAEU7654321".to_string()));
        assert_eq!(repo.count().await.expect("count"), 12);
    }

    #[tokio::test]
    async fn verify_on_empty_database_reports_missing_orders() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let verification = DemoOrderDataset::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.checks.iter().all(|(_, present)| !present));
    }
}
