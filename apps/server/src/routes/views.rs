use actix_web::{HttpResponse, get, web};
use askama::Template;
use netpinger_service::database::{Record, RecordStore};

use crate::error::RouteError;

macros_utils::routes! {
    route index,
}

struct RecordRow {
    id: String,
    timestamp: String,
    failure: bool,
    description: String,
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.to_string(),
            timestamp: record.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            failure: record.failure,
            description: record.description.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    status: String,
    last_failed: String,
    records: Vec<RecordRow>,
}

/// Status page: current state from the newest record, last failure, history
#[get("/")]
pub async fn index(store: web::Data<dyn RecordStore>) -> Result<HttpResponse, RouteError> {
    let records = store.list_records().await?;

    let last_failed = match store.most_recent_failure().await? {
        Some(record) => serde_json::to_string(&record)?,
        None => "No last error".to_string(),
    };

    let status = match records.last() {
        Some(record) => record.state().to_string(),
        None => "no transitions recorded".to_string(),
    };

    let page = IndexTemplate {
        status,
        last_failed,
        records: records.iter().map(RecordRow::from).collect(),
    }
    .render()?;

    Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(page))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use chrono::{Duration, Utc};

    use super::*;
    use crate::routes::test_support::test_store;

    async fn render_index(store: std::sync::Arc<dyn RecordStore>) -> String {
        let app =
            test::init_service(App::new().app_data(web::Data::from(store)).configure(routes)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[actix_web::test]
    async fn test_empty_history() {
        let (store, _dir) = test_store().await;
        let page = render_index(store).await;

        assert!(page.contains("No last error"));
        assert!(page.contains("no transitions recorded"));
    }

    #[actix_web::test]
    async fn test_page_shows_latest_state_and_failure() {
        let (store, _dir) = test_store().await;
        let now = Utc::now();
        let down = Record::new(now, true, "wrong status code returned from google.com: 302 Found");
        let up = Record::new(now + Duration::seconds(4), false, "successfully reached google.com");
        store.create_record(&down).await.unwrap();
        store.create_record(&up).await.unwrap();

        let page = render_index(store).await;

        assert!(page.contains("<strong>up</strong>"));
        assert!(page.contains("302 Found"));
        assert!(page.contains(&down.id.to_string()));
        assert!(page.contains(&up.id.to_string()));
        assert!(!page.contains("No last error"));
    }
}
