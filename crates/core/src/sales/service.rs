//! Sale commands.
//!
//! Each command validates its input, loads the aggregate, calls exactly one
//! aggregate method and saves the result.

use std::sync::Arc;

use salesdesk_shared::ValidationResult;
use salesdesk_shared::types::{PageRequest, PageResponse, ProductId, SaleId};

use crate::sales::error::SaleError;
use crate::sales::item::SaleItem;
use crate::sales::policy::DiscountPolicy;
use crate::sales::sale::Sale;
use crate::sales::store::SaleStore;
use crate::sales::types::{AddSaleItemInput, CreateSaleInput, SaleSummary};
use crate::sales::validation::validate_quantity;

/// Application service for sales.
///
/// Every sale it creates or loads gets the configured discount policy
/// attached before any command runs.
#[derive(Debug)]
pub struct SaleService<S> {
    store: S,
    discount_policy: Option<Arc<dyn DiscountPolicy>>,
}

impl<S: SaleStore> SaleService<S> {
    /// Creates a service over `store`.
    pub fn new(store: S, discount_policy: Option<Arc<dyn DiscountPolicy>>) -> Self {
        Self {
            store,
            discount_policy,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Opens a new sale.
    pub async fn create_sale(&self, input: CreateSaleInput) -> Result<Sale, SaleError> {
        ensure_valid(input.validate())?;

        let mut sale = Sale::create(
            input.sale_number,
            input.customer_id,
            input.customer_name,
            input.branch_id,
            input.branch_name,
        );
        if let Some(sale_date) = input.sale_date {
            sale = sale.with_sale_date(sale_date);
        }
        sale.attach_discount_policy(self.discount_policy.clone());

        self.store.create(&sale).await?;
        Ok(sale)
    }

    /// Loads a sale.
    pub async fn get_sale(&self, id: SaleId) -> Result<Sale, SaleError> {
        self.load(id).await
    }

    /// Adds a line item to a sale.
    pub async fn add_item(&self, input: AddSaleItemInput) -> Result<SaleItem, SaleError> {
        ensure_valid(input.validate())?;

        let mut sale = self.load(input.sale_id).await?;
        let item = sale.add_item(
            input.product_id,
            input.product_name,
            input.quantity,
            input.unit_price,
        )?;

        self.store.update(&sale).await?;
        Ok(item)
    }

    /// Changes the quantity of a product on a sale.
    pub async fn set_item_quantity(
        &self,
        sale_id: SaleId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Sale, SaleError> {
        ensure_valid(validate_quantity(quantity))?;

        let mut sale = self.load(sale_id).await?;
        sale.update_item_quantity(product_id, quantity)?;

        self.store.update(&sale).await?;
        Ok(sale)
    }

    /// Cancels the active item for a product.
    pub async fn cancel_item(
        &self,
        sale_id: SaleId,
        product_id: ProductId,
    ) -> Result<Sale, SaleError> {
        let mut sale = self.load(sale_id).await?;
        sale.cancel_item(product_id)?;

        self.store.update(&sale).await?;
        Ok(sale)
    }

    /// Completes a sale. Returns false if it was already completed.
    pub async fn complete_sale(&self, id: SaleId) -> Result<bool, SaleError> {
        let mut sale = self.load(id).await?;
        let changed = sale.complete()?;

        if changed {
            self.store.update(&sale).await?;
        }
        Ok(changed)
    }

    /// Cancels a sale. Returns false if it was already cancelled.
    pub async fn cancel_sale(&self, id: SaleId) -> Result<bool, SaleError> {
        let mut sale = self.load(id).await?;
        let changed = sale.cancel();

        if changed {
            self.store.update(&sale).await?;
        }
        Ok(changed)
    }

    /// Deletes a sale and its items.
    pub async fn delete_sale(&self, id: SaleId) -> Result<(), SaleError> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(SaleError::SaleNotFound(id))
        }
    }

    /// Lists sales, newest first.
    pub async fn list_sales(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<SaleSummary>, SaleError> {
        self.store.list_sales(page.normalized()).await
    }

    /// Lists every item on a sale.
    pub async fn list_sale_items(
        &self,
        sale_id: SaleId,
        page: PageRequest,
    ) -> Result<PageResponse<SaleItem>, SaleError> {
        if !self.store.exists(sale_id).await? {
            return Err(SaleError::SaleNotFound(sale_id));
        }
        self.store.list_sale_items(sale_id, page.normalized()).await
    }

    async fn load(&self, id: SaleId) -> Result<Sale, SaleError> {
        let mut sale = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(SaleError::SaleNotFound(id))?;
        sale.attach_discount_policy(self.discount_policy.clone());
        Ok(sale)
    }
}

fn ensure_valid(result: ValidationResult) -> Result<(), SaleError> {
    if result.is_valid {
        Ok(())
    } else {
        Err(SaleError::InvalidInput(result.errors))
    }
}
