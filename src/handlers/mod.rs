// handlers/mod.rs - HTTP handlers
//
// crud      generic create/read/update/delete/count for every resource
// auth      sign-up, sign-in, sign-out
// customers customer reporting (totals)
// invoices  invoice reporting (latest)
// health    banner and liveness probe

pub mod auth;
pub mod crud;
pub mod customers;
pub mod health;
pub mod invoices;
