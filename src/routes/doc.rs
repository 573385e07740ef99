use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            BuyerAccount, LoginRequest, LoginResponse, RegisterBuyerRequest,
            RegisterSellerRequest, SellerAccount,
        },
        listings::{ListingFields, ListingList, SellerDashboard},
        orders::{BookListingRequest, BookingReceipt, OrderList, UpdateOrderStatusRequest},
    },
    entity::{
        bids::BidStatus, listings::ListingStatus, pickup_orders::OrderStatus, users::Role,
    },
    models::{Bid, BuyerProfile, Category, Listing, PickupOrder, SellerProfile, User},
    response::{ApiResponse, Meta},
    routes::{auth, buyer, categories, health, listings, params, seller},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register_buyer,
        auth::login_buyer,
        auth::register_seller,
        auth::login_seller,
        categories::list_categories,
        listings::list_available,
        listings::book_listing,
        buyer::list_orders,
        buyer::cancel_order,
        seller::dashboard,
        seller::list_listings,
        seller::create_listing,
        seller::get_listing,
        seller::update_listing,
        seller::list_orders,
        seller::update_order_status,
        seller::cancel_order
    ),
    components(
        schemas(
            User,
            Role,
            BuyerProfile,
            SellerProfile,
            Category,
            Listing,
            ListingStatus,
            Bid,
            BidStatus,
            PickupOrder,
            OrderStatus,
            RegisterBuyerRequest,
            RegisterSellerRequest,
            LoginRequest,
            LoginResponse,
            BuyerAccount,
            SellerAccount,
            ListingFields,
            ListingList,
            SellerDashboard,
            BookListingRequest,
            BookingReceipt,
            UpdateOrderStatusRequest,
            OrderList,
            params::SortOrder,
            Meta,
            ApiResponse<Listing>,
            ApiResponse<ListingList>,
            ApiResponse<PickupOrder>,
            ApiResponse<OrderList>,
            ApiResponse<BookingReceipt>,
            ApiResponse<SellerDashboard>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Buyer and seller registration and login"),
        (name = "Listings", description = "Categories, the buyer listing feed and booking"),
        (name = "Buyer", description = "Buyer pickup orders"),
        (name = "Seller", description = "Seller listings, dashboard and order fulfilment"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
