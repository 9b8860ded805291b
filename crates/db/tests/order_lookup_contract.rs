use portside_core::domain::order::{ContainerNumber, OrderId};
use portside_db::{
    connect_with_settings, migrations, DemoOrderDataset, InMemoryOrderRepository,
    OrderRepository, SqlOrderRepository,
};

type ContractResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

async fn seeded_sql_repository() -> ContractResult<SqlOrderRepository> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate: {error}"))?;
    DemoOrderDataset::load(&pool).await.map_err(|error| format!("seed: {error}"))?;
    Ok(SqlOrderRepository::new(pool))
}

async fn check_contract(repo: &dyn OrderRepository, label: &str) -> ContractResult {
    for expected in DemoOrderDataset::orders() {
        let by_id = repo
            .find_by_order_id(&expected.order_id)
            .await
            .map_err(|error| format!("{label}: lookup {}: {error}", expected.order_id.0))?;
        require!(
            by_id.as_ref() == Some(&expected),
            "{label}: order {} should round-trip",
            expected.order_id.0
        );

        let by_container = repo
            .find_by_container(&expected.container_number)
            .await
            .map_err(|error| format!("{label}: lookup {}: {error}", expected.container_number.0))?;
        require!(
            by_container.as_ref() == Some(&expected),
            "{label}: container {} should resolve to its order",
            expected.container_number.0
        );
    }

    let missing = repo
        .find_by_order_id(&OrderId("ORD-9999".to_string()))
        .await
        .map_err(|error| format!("{label}: lookup ORD-9999: {error}"))?;
    require!(missing.is_none(), "{label}: ORD-9999 must never exist");

    let missing = repo
        .find_by_container(&ContainerNumber("MAEU0000000".to_string()))
        .await
        .map_err(|error| format!("{label}: lookup MAEU0000000: {error}"))?;
    require!(missing.is_none(), "{label}: unknown container must be absent");

    Ok(())
}

#[tokio::test]
async fn sql_and_memory_repositories_honour_the_same_lookup_contract() -> ContractResult {
    let sql = seeded_sql_repository().await?;
    let memory = InMemoryOrderRepository::with_orders(DemoOrderDataset::orders());

    check_contract(&sql, "sql").await?;
    check_contract(&memory, "memory").await
}
