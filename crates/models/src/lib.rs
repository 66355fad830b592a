pub mod errors;
pub mod db;
pub mod enums;
pub mod validation;
pub mod codes;

pub mod user;
pub mod vendor;
pub mod vendor_service;
pub mod admin;
pub mod category;
pub mod subcategory;
pub mod offering;
pub mod booking;
pub mod booking_item;
pub mod lead_response;
pub mod feedback;
pub mod dispute;
pub mod audit_log;
pub mod notification;
pub mod banner;
pub mod service_section;

#[cfg(test)]
mod tests;
