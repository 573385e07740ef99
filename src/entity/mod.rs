pub mod audit_logs;
pub mod bids;
pub mod buyer_profiles;
pub mod categories;
pub mod listings;
pub mod pickup_orders;
pub mod seller_profiles;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use bids::Entity as Bids;
pub use buyer_profiles::Entity as BuyerProfiles;
pub use categories::Entity as Categories;
pub use listings::Entity as Listings;
pub use pickup_orders::Entity as PickupOrders;
pub use seller_profiles::Entity as SellerProfiles;
pub use users::Entity as Users;
