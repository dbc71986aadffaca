pub mod dashboard;
pub mod products;
pub mod shipments;
