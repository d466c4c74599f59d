//! Small declarative helpers shared by the HTTP front end.

#[cfg(feature = "actix")]
#[doc(hidden)]
pub mod __private {
    pub use actix_web;
}

/// Generate a `routes` function that registers the listed handlers.
///
/// Every handler must be an actix service factory, usually a function
/// annotated with `#[get(..)]` or a sibling macro. A leading `scope "/path";`
/// mounts all of them below that path.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
/// }
///
/// macros_utils::routes! {
///     scope "/api";
///     route list_records,
///     route last_failure,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    (scope $path:literal; $(route $handler:ident),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::__private::actix_web::web::ServiceConfig) {
            cfg.service(
                $crate::__private::actix_web::web::scope($path)
                    $(.service($handler))*
            );
        }
    };
    ($(route $handler:ident),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::__private::actix_web::web::ServiceConfig) {
            $(cfg.service($handler);)*
        }
    };
}
