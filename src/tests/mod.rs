//! tests/mod.rs
//! Pruebas del servicio. `support` tiene los dobles de prueba.

/// App completa (rutas reales) con la config y el servicio dados.
macro_rules! init_test_app {
    ($config:expr, $service:expr) => {
        init_test_app!(
            $config,
            $service,
            crate::services::site_auth_service::SiteAuthService::new(None)
        )
    };
    ($config:expr, $service:expr, $auth:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($config))
                .app_data(actix_web::web::Data::new($service))
                .app_data(actix_web::web::Data::new($auth))
                .configure(crate::app::init_app),
        )
        .await
    };
}

mod support;
