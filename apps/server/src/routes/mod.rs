use actix_web::web::ServiceConfig;

mod api;
mod health;
mod views;

/// Register every route of the front end.
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.configure(health::routes).configure(views::routes).configure(api::routes);
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use netpinger_service::database::{self, RecordStore};
    use tempfile::TempDir;

    /// A migrated store in a temporary directory that must outlive it.
    pub async fn test_store() -> (Arc<dyn RecordStore>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server-test.db");
        let store = database::connect(&path.to_string_lossy()).await.unwrap();
        (Arc::new(store), dir)
    }
}
