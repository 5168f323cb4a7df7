pub mod company_service;

pub use company_service::{CompanyProfileView, CompanyService};
