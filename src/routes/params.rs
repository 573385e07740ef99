use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::listings::ListingStatus;

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

// Query strings go through serde_urlencoded, which cannot parse numbers inside
// `#[serde(flatten)]`, so page fields are repeated on each query type.

/// Buyer feed of bookable listings.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AvailableListingQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category_id: Option<Uuid>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SellerListingQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<ListingStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort_order: Option<SortOrder>,
}

macro_rules! paginated {
    ($($query:ty),*) => {
        $(impl $query {
            pub fn pagination(&self) -> Pagination {
                Pagination {
                    page: self.page,
                    per_page: self.per_page,
                }
            }
        })*
    };
}

paginated!(AvailableListingQuery, SellerListingQuery, OrderListQuery);
