use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

pub mod admin;
pub mod auth;
pub mod blood_bank;
pub mod donor;
pub mod emergency;
pub mod hospital;
pub mod realtime;

/// `axum::Json` whose rejection renders as an [`ApiError`] body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` whose rejection renders as an [`ApiError`] body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `axum::extract::Path` whose rejection renders as an [`ApiError`] body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
