//! Sale management routes.
//!
//! Handlers validate the request body, run one `SaleService` command and
//! render the result.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::AppState;
use crate::error::{map_sale_error, map_validation_errors};
use salesdesk_core::sales::{
    AddSaleItemInput, CreateSaleInput, PRICE_MAX_SCALE, Sale, SaleItem, SaleItemStatus,
    SaleStatus,
};
use salesdesk_shared::types::{BranchId, CustomerId, PageRequest, ProductId, SaleId};

/// Creates the sale routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales))
        .route("/sales", post(create_sale))
        .route("/sales/{sale_id}", get(get_sale))
        .route("/sales/{sale_id}", delete(delete_sale))
        .route("/sales/{sale_id}/complete", post(complete_sale))
        .route("/sales/{sale_id}/cancel", post(cancel_sale))
        .route("/sales/{sale_id}/items", get(list_sale_items))
        .route("/sales/{sale_id}/items", post(add_item))
        .route(
            "/sales/{sale_id}/items/{product_id}",
            put(update_item_quantity),
        )
        .route("/sales/{sale_id}/items/{product_id}", delete(cancel_item))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for opening a sale.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleRequest {
    /// Human-facing sale number.
    #[validate(length(
        min = 3,
        max = 20,
        message = "Sale number must be between 3 and 20 characters."
    ))]
    pub sale_number: String,
    /// Customer ID.
    #[validate(custom(function = "not_nil", message = "Customer ID is required."))]
    pub customer_id: Uuid,
    /// Customer display name.
    #[validate(length(
        min = 1,
        max = 100,
        message = "Customer name must be between 1 and 100 characters."
    ))]
    pub customer_name: String,
    /// Branch ID.
    #[validate(custom(function = "not_nil", message = "Branch ID is required."))]
    pub branch_id: Uuid,
    /// Branch display name.
    #[validate(length(
        min = 1,
        max = 100,
        message = "Branch name must be between 1 and 100 characters."
    ))]
    pub branch_name: String,
    /// Sale date; defaults to now.
    pub sale_date: Option<DateTime<Utc>>,
}

impl CreateSaleRequest {
    fn into_input(self) -> CreateSaleInput {
        CreateSaleInput {
            sale_number: self.sale_number,
            customer_id: CustomerId::from_uuid(self.customer_id),
            customer_name: self.customer_name,
            branch_id: BranchId::from_uuid(self.branch_id),
            branch_name: self.branch_name,
            sale_date: self.sale_date,
        }
    }
}

/// Request body for adding an item.
#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    /// Product ID.
    #[validate(custom(function = "not_nil", message = "Product ID is required."))]
    pub product_id: Uuid,
    /// Product display name.
    #[validate(length(
        min = 1,
        max = 200,
        message = "Product name must be between 1 and 200 characters."
    ))]
    pub product_name: String,
    /// Units to sell.
    #[validate(range(
        min = 1,
        max = 20,
        message = "Quantity must be between 1 and 20."
    ))]
    pub quantity: u32,
    /// Price per unit.
    #[validate(custom(function = "valid_unit_price"))]
    pub unit_price: Decimal,
}

/// Request body for changing an item's quantity.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemQuantityRequest {
    /// New quantity.
    #[validate(range(
        min = 1,
        max = 20,
        message = "Quantity must be between 1 and 20."
    ))]
    pub quantity: u32,
}

/// Query parameters for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn page_request(&self, default_page_size: u32) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(default_page_size),
        )
    }
}

/// Response for a sale line item.
#[derive(Debug, Serialize)]
pub struct SaleItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// Product ID.
    pub product_id: Uuid,
    /// Product display name.
    pub product_name: String,
    /// Units sold.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Discount rate.
    pub discount: Decimal,
    /// Amount taken off by the discount.
    pub discount_amount: Decimal,
    /// Line total after discount.
    pub total_price: Decimal,
    /// Item status.
    pub status: SaleItemStatus,
    /// When the item was added.
    pub created_at: DateTime<Utc>,
    /// When the item was last modified.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&SaleItem> for SaleItemResponse {
    fn from(item: &SaleItem) -> Self {
        Self {
            id: item.id().into_inner(),
            product_id: item.product_id().into_inner(),
            product_name: item.product_name().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            discount: item.discount(),
            discount_amount: item.discount_amount(),
            total_price: item.total_price(),
            status: item.status(),
            created_at: item.created_at(),
            updated_at: item.updated_at(),
        }
    }
}

/// Response for a sale with its items.
#[derive(Debug, Serialize)]
pub struct SaleResponse {
    /// Sale ID.
    pub id: Uuid,
    /// Human-facing sale number.
    pub sale_number: String,
    /// Date of the sale.
    pub sale_date: DateTime<Utc>,
    /// Customer ID.
    pub customer_id: Uuid,
    /// Customer display name.
    pub customer_name: String,
    /// Branch ID.
    pub branch_id: Uuid,
    /// Branch display name.
    pub branch_name: String,
    /// Sum over active items.
    pub total_amount: Decimal,
    /// Sale status.
    pub status: SaleStatus,
    /// Every item, cancelled ones included.
    pub items: Vec<SaleItemResponse>,
    /// When the sale was created.
    pub created_at: DateTime<Utc>,
    /// When the sale was last modified.
    pub updated_at: Option<DateTime<Utc>>,
    /// When the sale was completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Sale> for SaleResponse {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id().into_inner(),
            sale_number: sale.sale_number().to_string(),
            sale_date: sale.sale_date(),
            customer_id: sale.customer_id().into_inner(),
            customer_name: sale.customer_name().to_string(),
            branch_id: sale.branch_id().into_inner(),
            branch_name: sale.branch_name().to_string(),
            total_amount: sale.total_amount(),
            status: sale.status(),
            items: sale.items().iter().map(SaleItemResponse::from).collect(),
            created_at: sale.created_at(),
            updated_at: sale.updated_at(),
            completed_at: sale.completed_at(),
        }
    }
}

// ============================================================================
// Validators
// ============================================================================

fn not_nil(value: &Uuid) -> Result<(), ValidationError> {
    if value.is_nil() {
        return Err(ValidationError::new("not_nil"));
    }
    Ok(())
}

fn valid_unit_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("greater_than")
            .with_message("Unit price must be greater than zero.".into()));
    }
    if value.normalize().scale() > PRICE_MAX_SCALE {
        return Err(ValidationError::new("precision")
            .with_message("Unit price must have at most 2 decimal places.".into()));
    }
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/sales` - List sales, newest first.
async fn list_sales(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let page = query.page_request(state.default_page_size);

    match state.sale_service().list_sales(page).await {
        Ok(sales) => (StatusCode::OK, Json(sales)).into_response(),
        Err(e) => map_sale_error(e),
    }
}

/// POST `/sales` - Open a new sale.
async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return map_validation_errors(errors);
    }

    match state.sale_service().create_sale(payload.into_input()).await {
        Ok(sale) => {
            info!(
                sale_id = %sale.id(),
                sale_number = sale.sale_number(),
                "Sale created"
            );
            (StatusCode::CREATED, Json(SaleResponse::from(&sale))).into_response()
        }
        Err(e) => map_sale_error(e),
    }
}

/// GET `/sales/{sale_id}` - Get a sale with its items.
async fn get_sale(State(state): State<AppState>, Path(sale_id): Path<Uuid>) -> Response {
    match state.sale_service().get_sale(SaleId::from_uuid(sale_id)).await {
        Ok(sale) => (StatusCode::OK, Json(SaleResponse::from(&sale))).into_response(),
        Err(e) => map_sale_error(e),
    }
}

/// DELETE `/sales/{sale_id}` - Delete a sale and its items.
async fn delete_sale(State(state): State<AppState>, Path(sale_id): Path<Uuid>) -> Response {
    match state
        .sale_service()
        .delete_sale(SaleId::from_uuid(sale_id))
        .await
    {
        Ok(()) => {
            info!(sale_id = %sale_id, "Sale deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => map_sale_error(e),
    }
}

/// POST `/sales/{sale_id}/complete` - Complete a sale.
async fn complete_sale(State(state): State<AppState>, Path(sale_id): Path<Uuid>) -> Response {
    match state
        .sale_service()
        .complete_sale(SaleId::from_uuid(sale_id))
        .await
    {
        Ok(changed) => {
            info!(sale_id = %sale_id, changed, "Sale completed");
            (StatusCode::OK, Json(json!({ "changed": changed }))).into_response()
        }
        Err(e) => map_sale_error(e),
    }
}

/// POST `/sales/{sale_id}/cancel` - Cancel a sale.
async fn cancel_sale(State(state): State<AppState>, Path(sale_id): Path<Uuid>) -> Response {
    match state
        .sale_service()
        .cancel_sale(SaleId::from_uuid(sale_id))
        .await
    {
        Ok(changed) => {
            info!(sale_id = %sale_id, changed, "Sale cancelled");
            (StatusCode::OK, Json(json!({ "changed": changed }))).into_response()
        }
        Err(e) => map_sale_error(e),
    }
}

/// GET `/sales/{sale_id}/items` - List every item on a sale.
async fn list_sale_items(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Response {
    let page = query.page_request(state.default_page_size);

    match state
        .sale_service()
        .list_sale_items(SaleId::from_uuid(sale_id), page)
        .await
    {
        Ok(items) => {
            let items = items.map(|item| SaleItemResponse::from(&item));
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => map_sale_error(e),
    }
}

/// POST `/sales/{sale_id}/items` - Add an item to a sale.
async fn add_item(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return map_validation_errors(errors);
    }

    let input = AddSaleItemInput {
        sale_id: SaleId::from_uuid(sale_id),
        product_id: ProductId::from_uuid(payload.product_id),
        product_name: payload.product_name,
        quantity: payload.quantity,
        unit_price: payload.unit_price,
    };

    match state.sale_service().add_item(input).await {
        Ok(item) => {
            info!(
                sale_id = %sale_id,
                product_id = %item.product_id(),
                quantity = item.quantity(),
                "Sale item added"
            );
            (StatusCode::CREATED, Json(SaleItemResponse::from(&item))).into_response()
        }
        Err(e) => map_sale_error(e),
    }
}

/// PUT `/sales/{sale_id}/items/{product_id}` - Change an item's quantity.
async fn update_item_quantity(
    State(state): State<AppState>,
    Path((sale_id, product_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateItemQuantityRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return map_validation_errors(errors);
    }

    match state
        .sale_service()
        .set_item_quantity(
            SaleId::from_uuid(sale_id),
            ProductId::from_uuid(product_id),
            payload.quantity,
        )
        .await
    {
        Ok(sale) => {
            info!(
                sale_id = %sale_id,
                product_id = %product_id,
                quantity = payload.quantity,
                "Sale item quantity updated"
            );
            (StatusCode::OK, Json(SaleResponse::from(&sale))).into_response()
        }
        Err(e) => map_sale_error(e),
    }
}

/// DELETE `/sales/{sale_id}/items/{product_id}` - Cancel an item.
async fn cancel_item(
    State(state): State<AppState>,
    Path((sale_id, product_id)): Path<(Uuid, Uuid)>,
) -> Response {
    match state
        .sale_service()
        .cancel_item(SaleId::from_uuid(sale_id), ProductId::from_uuid(product_id))
        .await
    {
        Ok(sale) => {
            info!(sale_id = %sale_id, product_id = %product_id, "Sale item cancelled");
            (StatusCode::OK, Json(SaleResponse::from(&sale))).into_response()
        }
        Err(e) => map_sale_error(e),
    }
}
