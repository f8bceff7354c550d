//! Sale repository for database operations.
//!
//! Sales are loaded and saved whole: the sale row plus every item row,
//! cancelled ones included. Saves run in a single transaction.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, error, warn};

use salesdesk_core::sales::{
    Sale, SaleError, SaleItem, SaleItemRecord, SaleItemStatus, SaleRecord, SaleStatus, SaleStore,
    SaleSummary,
};
use salesdesk_shared::types::{
    BranchId, CustomerId, PageRequest, PageResponse, ProductId, SaleId, SaleItemId,
};

use crate::entities::{sale_items, sales};

/// Sale repository backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    db: DatabaseConnection,
}

impl SaleRepository {
    /// Creates a new sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_items<C: ConnectionTrait>(
        db: &C,
        sale_id: SaleId,
    ) -> Result<Vec<SaleItemRecord>, SaleError> {
        sale_items::Entity::find()
            .filter(sale_items::Column::SaleId.eq(sale_id.into_inner()))
            .order_by_asc(sale_items::Column::CreatedAt)
            .order_by_asc(sale_items::Column::Id)
            .all(db)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(item_record)
            .collect()
    }

    async fn upsert_items<C: ConnectionTrait>(db: &C, sale: &Sale) -> Result<(), SaleError> {
        if sale.items().is_empty() {
            return Ok(());
        }

        let models = sale
            .items()
            .iter()
            .map(item_active_model)
            .collect::<Result<Vec<_>, _>>()?;

        sale_items::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(sale_items::Column::Id)
                    .update_columns([
                        sale_items::Column::ProductName,
                        sale_items::Column::Quantity,
                        sale_items::Column::UnitPrice,
                        sale_items::Column::Discount,
                        sale_items::Column::Status,
                        sale_items::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await
            .map_err(storage_error)?;

        Ok(())
    }
}

#[async_trait]
impl SaleStore for SaleRepository {
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>, SaleError> {
        let Some(model) = sales::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage_error)?
        else {
            return Ok(None);
        };

        let items = Self::load_items(&self.db, id).await?;
        Ok(Some(Sale::restore(sale_record(model), items)))
    }

    async fn exists(&self, id: SaleId) -> Result<bool, SaleError> {
        let count = sales::Entity::find_by_id(id.into_inner())
            .count(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(count > 0)
    }

    async fn create(&self, sale: &Sale) -> Result<(), SaleError> {
        let txn = self.db.begin().await.map_err(storage_error)?;

        sale_active_model(sale)
            .insert(&txn)
            .await
            .map_err(storage_error)?;
        Self::upsert_items(&txn, sale).await?;

        txn.commit().await.map_err(storage_error)?;

        debug!(sale_id = %sale.id(), sale_number = sale.sale_number(), "Sale inserted");
        Ok(())
    }

    async fn update(&self, sale: &Sale) -> Result<(), SaleError> {
        let txn = self.db.begin().await.map_err(storage_error)?;

        match sale_active_model(sale).update(&txn).await {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => return Err(SaleError::SaleNotFound(sale.id())),
            Err(e) => return Err(storage_error(e)),
        }
        Self::upsert_items(&txn, sale).await?;

        txn.commit().await.map_err(storage_error)?;

        debug!(
            sale_id = %sale.id(),
            status = %sale.status(),
            items = sale.items().len(),
            "Sale saved"
        );
        Ok(())
    }

    async fn delete(&self, id: SaleId) -> Result<bool, SaleError> {
        let result = sales::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected > 0)
    }

    async fn list_sales(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<SaleSummary>, SaleError> {
        let page = page.normalized();

        let total = sales::Entity::find()
            .count(&self.db)
            .await
            .map_err(storage_error)?;

        let rows = sales::Entity::find()
            .order_by_desc(sales::Column::CreatedAt)
            .order_by_desc(sales::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        let data = rows.into_iter().map(sale_summary).collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn list_sale_items(
        &self,
        sale_id: SaleId,
        page: PageRequest,
    ) -> Result<PageResponse<SaleItem>, SaleError> {
        let page = page.normalized();
        let filter = sale_items::Column::SaleId.eq(sale_id.into_inner());

        let total = sale_items::Entity::find()
            .filter(filter.clone())
            .count(&self.db)
            .await
            .map_err(storage_error)?;

        let rows = sale_items::Entity::find()
            .filter(filter)
            .order_by_asc(sale_items::Column::CreatedAt)
            .order_by_asc(sale_items::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        let data = rows
            .into_iter()
            .map(|row| item_record(row).map(SaleItem::restore))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }
}

fn storage_error(err: DbErr) -> SaleError {
    error!(error = %err, "Sale storage operation failed");
    SaleError::Storage(err.to_string())
}

fn parse_sale_status(id: uuid::Uuid, raw: &str) -> SaleStatus {
    SaleStatus::parse(raw).unwrap_or_else(|| {
        warn!(sale_id = %id, status = raw, "Unrecognized sale status");
        SaleStatus::Unknown
    })
}

fn parse_item_status(id: uuid::Uuid, raw: &str) -> SaleItemStatus {
    SaleItemStatus::parse(raw).unwrap_or_else(|| {
        warn!(item_id = %id, status = raw, "Unrecognized sale item status");
        SaleItemStatus::Unknown
    })
}

pub(crate) fn sale_record(model: sales::Model) -> SaleRecord {
    SaleRecord {
        id: SaleId::from_uuid(model.id),
        status: parse_sale_status(model.id, &model.status),
        sale_number: model.sale_number,
        sale_date: model.sale_date.with_timezone(&Utc),
        customer_id: CustomerId::from_uuid(model.customer_id),
        customer_name: model.customer_name,
        branch_id: BranchId::from_uuid(model.branch_id),
        branch_name: model.branch_name,
        total_amount: model.total_amount,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.map(|t| t.with_timezone(&Utc)),
        completed_at: model.completed_at.map(|t| t.with_timezone(&Utc)),
    }
}

pub(crate) fn sale_summary(model: sales::Model) -> SaleSummary {
    SaleSummary {
        id: SaleId::from_uuid(model.id),
        status: parse_sale_status(model.id, &model.status),
        sale_number: model.sale_number,
        sale_date: model.sale_date.with_timezone(&Utc),
        customer_name: model.customer_name,
        branch_name: model.branch_name,
        total_amount: model.total_amount,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn item_record(model: sale_items::Model) -> Result<SaleItemRecord, SaleError> {
    let quantity = u32::try_from(model.quantity).map_err(|_| {
        SaleError::Storage(format!(
            "sale item {} has invalid quantity {}",
            model.id, model.quantity
        ))
    })?;

    Ok(SaleItemRecord {
        id: SaleItemId::from_uuid(model.id),
        sale_id: SaleId::from_uuid(model.sale_id),
        product_id: ProductId::from_uuid(model.product_id),
        status: parse_item_status(model.id, &model.status),
        product_name: model.product_name,
        quantity,
        unit_price: model.unit_price,
        discount: model.discount,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.map(|t| t.with_timezone(&Utc)),
    })
}

pub(crate) fn sale_active_model(sale: &Sale) -> sales::ActiveModel {
    sales::ActiveModel {
        id: Set(sale.id().into_inner()),
        sale_number: Set(sale.sale_number().to_string()),
        sale_date: Set(sale.sale_date().into()),
        customer_id: Set(sale.customer_id().into_inner()),
        customer_name: Set(sale.customer_name().to_string()),
        branch_id: Set(sale.branch_id().into_inner()),
        branch_name: Set(sale.branch_name().to_string()),
        total_amount: Set(sale.total_amount().round_dp(2)),
        status: Set(sale.status().as_str().to_string()),
        created_at: Set(sale.created_at().into()),
        updated_at: Set(sale.updated_at().map(Into::into)),
        completed_at: Set(sale.completed_at().map(Into::into)),
    }
}

pub(crate) fn item_active_model(item: &SaleItem) -> Result<sale_items::ActiveModel, SaleError> {
    let quantity = i32::try_from(item.quantity()).map_err(|_| {
        SaleError::Storage(format!(
            "sale item {} quantity {} does not fit the quantity column",
            item.id(),
            item.quantity()
        ))
    })?;

    Ok(sale_items::ActiveModel {
        id: Set(item.id().into_inner()),
        sale_id: Set(item.sale_id().into_inner()),
        product_id: Set(item.product_id().into_inner()),
        product_name: Set(item.product_name().to_string()),
        quantity: Set(quantity),
        unit_price: Set(item.unit_price()),
        discount: Set(item.discount()),
        status: Set(item.status().as_str().to_string()),
        created_at: Set(item.created_at().into()),
        updated_at: Set(item.updated_at().map(Into::into)),
    })
}
