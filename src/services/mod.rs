pub mod customers;
pub mod documents;
pub mod exports;
pub mod partial_shipments;
pub mod shipments;
