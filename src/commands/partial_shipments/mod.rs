pub mod create_partial_shipment_command;
pub mod delete_partial_shipment_command;

pub use create_partial_shipment_command::{
    charges_customer_balance, outstanding_amount, package_totals, CreatePartialShipmentCommand,
    CreatePartialShipmentRequest, ItemInput, PackageDims, PackageInput,
};
pub use delete_partial_shipment_command::DeletePartialShipmentCommand;
