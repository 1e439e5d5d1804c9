pub mod update_customer_command;

pub use update_customer_command::{UpdateCustomerCommand, UpdateCustomerRequest};
