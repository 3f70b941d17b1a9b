pub mod address;
pub mod admin;
pub mod orders;
pub mod payments;
