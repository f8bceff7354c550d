//! Database seeder for Salesdesk development and testing.
//!
//! Seeds a handful of demo sales through the sale service, so every row
//! goes through the same rules as API traffic. Skips seeding when the
//! database already holds sales.
//!
//! Usage: cargo run --bin seeder

use rust_decimal::Decimal;
use salesdesk_core::sales::{
    AddSaleItemInput, CreateSaleInput, QuantityTierDiscountPolicy, SaleService, SaleStore,
};
use salesdesk_db::SaleRepository;
use salesdesk_shared::types::{BranchId, CustomerId, PageRequest, ProductId};
use std::sync::Arc;

/// Demo line: product name, quantity, unit price in cents.
type DemoItem = (&'static str, u32, i64);

/// Demo sales: number, customer, branch, items.
const DEMO_SALES: &[(&str, &str, &str, &[DemoItem])] = &[
    (
        "S0001",
        "Alice Martin",
        "Downtown",
        &[("Espresso Beans 1kg", 2, 2_450), ("Paper Filters", 12, 399)],
    ),
    (
        "S0002",
        "Bruno Costa",
        "Downtown",
        &[("Ceramic Mug", 6, 1_200)],
    ),
    (
        "S0003",
        "Chen Wei",
        "Harbour",
        &[("Cold Brew Kit", 1, 5_900), ("Oat Milk 1L", 20, 275)],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set in environment"))?;

    println!("Connecting to database...");
    let db = salesdesk_db::connect(&database_url).await?;

    let service = SaleService::new(
        SaleRepository::new(db),
        Some(Arc::new(QuantityTierDiscountPolicy)),
    );

    let existing = service.store().list_sales(PageRequest::new(1, 1)).await?;
    if existing.meta.total > 0 {
        println!("  Sales already present, skipping...");
        return Ok(());
    }

    println!("Seeding demo sales...");
    seed_sales(&service).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_sales(service: &SaleService<SaleRepository>) -> anyhow::Result<()> {
    let downtown = BranchId::new();
    let harbour = BranchId::new();

    for (number, customer, branch, items) in DEMO_SALES {
        let branch_id = if *branch == "Downtown" { downtown } else { harbour };

        let sale = service
            .create_sale(CreateSaleInput {
                sale_number: (*number).to_string(),
                customer_id: CustomerId::new(),
                customer_name: (*customer).to_string(),
                branch_id,
                branch_name: (*branch).to_string(),
                sale_date: None,
            })
            .await?;

        for (product_name, quantity, cents) in *items {
            service
                .add_item(AddSaleItemInput {
                    sale_id: sale.id(),
                    product_id: ProductId::new(),
                    product_name: (*product_name).to_string(),
                    quantity: *quantity,
                    unit_price: Decimal::new(*cents, 2),
                })
                .await?;
        }

        println!("  Seeded sale {number} for {customer}");
    }

    // One completed and one cancelled sale so every status is represented
    let page = service.list_sales(PageRequest::new(1, 10)).await?;
    if let Some(summary) = page.data.iter().find(|s| s.sale_number == "S0001") {
        service.complete_sale(summary.id).await?;
    }
    if let Some(summary) = page.data.iter().find(|s| s.sale_number == "S0002") {
        service.cancel_sale(summary.id).await?;
    }

    Ok(())
}
