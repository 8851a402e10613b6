use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Tenant photo gallery entry, optionally tied to a listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub title: Option<String>,
    pub image_url: String,
    pub caption: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryItemRequest {
    pub listing_id: Option<Uuid>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(url(message = "Image URL must be valid"))]
    pub image_url: String,
    #[validate(length(max = 1000))]
    pub caption: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGalleryItemRequest {
    pub listing_id: Option<Uuid>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(url(message = "Image URL must be valid"))]
    pub image_url: Option<String>,
    #[validate(length(max = 1000))]
    pub caption: Option<String>,
    pub sort_order: Option<i32>,
}
