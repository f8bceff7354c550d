//! Storage boundary for sales.
//!
//! The aggregate is always loaded and saved whole. Implemented by the
//! database crate; mocked in service tests.

use async_trait::async_trait;

use salesdesk_shared::types::{PageRequest, PageResponse, SaleId};

use crate::sales::error::SaleError;
use crate::sales::item::SaleItem;
use crate::sales::sale::Sale;
use crate::sales::types::SaleSummary;

/// Persistence operations needed by [`SaleService`](crate::sales::SaleService).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Loads a sale with all of its items.
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>, SaleError>;

    /// Returns true if the sale exists.
    async fn exists(&self, id: SaleId) -> Result<bool, SaleError>;

    /// Inserts a new sale and its items.
    async fn create(&self, sale: &Sale) -> Result<(), SaleError>;

    /// Saves the sale row and upserts every item.
    async fn update(&self, sale: &Sale) -> Result<(), SaleError>;

    /// Deletes a sale and its items. Returns false if nothing was deleted.
    async fn delete(&self, id: SaleId) -> Result<bool, SaleError>;

    /// Lists sales, newest first.
    async fn list_sales(&self, page: PageRequest)
    -> Result<PageResponse<SaleSummary>, SaleError>;

    /// Lists the items of a sale in insertion order, all statuses included.
    async fn list_sale_items(
        &self,
        sale_id: SaleId,
        page: PageRequest,
    ) -> Result<PageResponse<SaleItem>, SaleError>;
}
