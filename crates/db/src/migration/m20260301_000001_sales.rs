//! Sales migration.
//!
//! Creates the sales and sale_items tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SALES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const SALES_SQL: &str = r"
-- Sales (aggregate root)
CREATE TABLE sales (
    id UUID PRIMARY KEY,
    sale_number VARCHAR(20) NOT NULL,
    sale_date TIMESTAMPTZ NOT NULL,
    customer_id UUID NOT NULL,
    customer_name VARCHAR(100) NOT NULL,
    branch_id UUID NOT NULL,
    branch_name VARCHAR(100) NOT NULL,
    total_amount NUMERIC(18, 2) NOT NULL DEFAULT 0,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    CONSTRAINT chk_sales_status CHECK (status IN ('unknown', 'pending', 'completed', 'cancelled')),
    CONSTRAINT chk_sales_total CHECK (total_amount >= 0)
);

-- Listing is newest first
CREATE INDEX idx_sales_created ON sales(created_at DESC);

CREATE INDEX idx_sales_customer ON sales(customer_id);

-- Sale line items
CREATE TABLE sale_items (
    id UUID PRIMARY KEY,
    sale_id UUID NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
    product_id UUID NOT NULL,
    product_name VARCHAR(200) NOT NULL,
    quantity INTEGER NOT NULL,
    unit_price NUMERIC(18, 2) NOT NULL,
    discount NUMERIC(5, 4) NOT NULL DEFAULT 0,
    status VARCHAR(16) NOT NULL DEFAULT 'confirmed',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ,
    CONSTRAINT chk_sale_items_quantity CHECK (quantity > 0),
    CONSTRAINT chk_sale_items_price CHECK (unit_price > 0),
    CONSTRAINT chk_sale_items_discount CHECK (discount >= 0 AND discount <= 1),
    CONSTRAINT chk_sale_items_status CHECK (status IN ('unknown', 'confirmed', 'cancelled'))
);

-- Items of a sale in insertion order
CREATE INDEX idx_sale_items_sale ON sale_items(sale_id, created_at);

-- At most one confirmed item per product on a sale
CREATE UNIQUE INDEX idx_sale_items_active_product ON sale_items(sale_id, product_id)
    WHERE status = 'confirmed';
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS sale_items CASCADE;
DROP TABLE IF EXISTS sales CASCADE;
";
