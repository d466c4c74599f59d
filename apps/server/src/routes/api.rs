//! Read-only JSON API over the transition log.

use actix_web::{HttpResponse, get, web};
use netpinger_service::database::RecordStore;
use serde::Serialize;

use crate::error::RouteError;

macros_utils::routes! {
    scope "/api";
    route list_records,
    route last_failure,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    error: &'static str,
}

/// All transitions, oldest first
#[get("/records")]
pub async fn list_records(store: web::Data<dyn RecordStore>) -> Result<HttpResponse, RouteError> {
    let records = store.list_records().await?;
    Ok(HttpResponse::Ok().json(records))
}

/// The most recent down-transition, or 404 if connectivity never failed
#[get("/records/last-failure")]
pub async fn last_failure(store: web::Data<dyn RecordStore>) -> Result<HttpResponse, RouteError> {
    match store.most_recent_failure().await? {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::NotFound().json(ApiMessage { error: "no failure recorded" })),
    }
}
