pub mod close_shipment_command;

pub use close_shipment_command::{CloseShipmentCommand, CloseShipmentRequest};
