pub mod customer;
pub mod item;
pub mod package;
pub mod partial_shipment;
pub mod shipment;

pub use partial_shipment::{PaymentResponsibility, PaymentStatus};
