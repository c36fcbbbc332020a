//! Catalog endpoints: filtered listing, detail, and catalog-managed writes.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Principal;
use crate::domain::{Category, CategorySummary, NewProduct, Product, ProductLite, ProductType, Review};
use crate::error::{ApiError, ApiResult};
use crate::filters::{total_pages, CatalogFilter, CatalogParams};
use crate::http::{check_payload, success, AppJson, AppState};
use crate::sanitize;

const SIMILAR_PRODUCTS_LIMIT: i64 = 5;

#[derive(Serialize)]
pub struct TypeSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    pub products: Vec<Product>,
    pub total_pages: u32,
    pub total_products: i64,
    pub categories: Vec<CategorySummary>,
    #[serde(rename = "type")]
    pub type_info: TypeSummary,
}

/// `GET /products?type=&keyword=&category=&price[gt]=&price[lt]=&ratings[gte]=&page=`
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> ApiResult<impl IntoResponse> {
    let type_name = params
        .type_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            ApiError::validation("VALIDATION_ERROR", "type parameter is required (men or women)")
        })?;
    let ptype = state.store.find_active_type(type_name).await?;
    let categories = state.store.active_categories(ptype.id).await?;
    let filter = CatalogFilter::from_params(&params, ptype.id)?;
    let per_page = state.config.per_page;
    let (products, total) = state.store.catalog_page(&filter, per_page).await?;

    let data = CatalogData {
        products,
        total_pages: total_pages(total, per_page),
        total_products: total,
        categories,
        type_info: TypeSummary { id: ptype.id, name: ptype.name },
    };

    // Read-mostly endpoint; let the CDN soak up repeat traffic.
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=300, stale-while-revalidate=600"),
    );
    headers.insert(
        HeaderName::from_static("cdn-cache-control"),
        HeaderValue::from_static("max-age=600"),
    );
    Ok((headers, success(data)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    pub reviews: Vec<Review>,
    pub similar_products: Vec<ProductLite>,
}

/// `GET /products/{id}`: inactive products are invisible to shoppers.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = sanitize::parse_id(&id)?;
    let product = state.store.find_product(id).await?;
    if !product.is_active {
        return Err(ApiError::ProductNotFound);
    }
    let reviews = state.store.product_reviews(id).await?;
    let similar = state
        .store
        .similar_products(product.category_id, id, SIMILAR_PRODUCTS_LIMIT)
        .await?;
    Ok(success(ProductDetail { product, reviews, similar_products: similar }))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 2000, message = "description must be 1-2000 characters"))]
    pub description: String,
    pub price: Decimal,
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: i32,
    pub type_id: Uuid,
    pub category_id: Uuid,
    #[serde(default)]
    pub is_active: bool,
}

/// `POST /products`: catalog management write.
pub async fn create_product(
    State(state): State<AppState>,
    _user: Principal,
    AppJson(req): AppJson<CreateProductRequest>,
) -> ApiResult<(StatusCode, axum::Json<serde_json::Value>)> {
    check_payload(&req)?;
    if req.price < Decimal::ZERO {
        return Err(ApiError::validation("VALIDATION_ERROR", "price cannot be negative"));
    }
    let new = NewProduct {
        name: req.name.trim().to_string(),
        description: req.description.trim().to_string(),
        price: req.price,
        stock: req.stock,
        type_id: req.type_id,
        category_id: req.category_id,
        is_active: req.is_active,
    };
    let product = state.store.create_product(&new).await?;
    Ok((StatusCode::CREATED, success(product)))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTypeRequest {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

/// `POST /types`: capped at three concurrent types.
pub async fn create_type(
    State(state): State<AppState>,
    _user: Principal,
    AppJson(req): AppJson<CreateTypeRequest>,
) -> ApiResult<(StatusCode, axum::Json<serde_json::Value>)> {
    check_payload(&req)?;
    let ptype: ProductType = state.store.create_type(req.name.trim(), req.is_active).await?;
    Ok((StatusCode::CREATED, success(ptype)))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: String,
    pub type_id: Uuid,
    #[serde(default)]
    pub is_active: bool,
}

/// `POST /categories`: only under an active type.
pub async fn create_category(
    State(state): State<AppState>,
    _user: Principal,
    AppJson(req): AppJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, axum::Json<serde_json::Value>)> {
    check_payload(&req)?;
    let category: Category =
        state.store.create_category(req.name.trim(), req.type_id, req.is_active).await?;
    Ok((StatusCode::CREATED, success(category)))
}
