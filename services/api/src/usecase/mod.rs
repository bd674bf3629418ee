pub mod admin;
pub mod auth;
pub mod blood_bank;
pub mod donor;
pub mod emergency;
pub mod hospital;
