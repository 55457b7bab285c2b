//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;
#[cfg(feature = "metrics")]
use metrics::make_metrics;
use state_builders::build_http_state;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::badges::{create_badge, delete_badge, list_catalog, update_badge};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::leaderboard::get_leaderboard;
use backend::inbound::http::ledger::record_chip_event;
use backend::inbound::http::referrals::{attribute_referral, complete_referral};
use backend::inbound::http::users::{get_balance, get_rank};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Build and bind the HTTP server from configuration.
///
/// The returned [`Server`] must be awaited; callers mark the shared
/// [`HealthState`] ready once the bind succeeded.
pub fn create_server(
    config: ServerConfig,
    health_state: web::Data<HealthState>,
) -> std::io::Result<Server> {
    let state = build_http_state(&config);

    #[cfg(feature = "metrics")]
    let prometheus = match config.prometheus.clone() {
        Some(prometheus) => prometheus,
        None => make_metrics()?,
    };

    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(same_site)
            .build();

        let api = web::scope("/api/v1")
            .wrap(session)
            .service(record_chip_event)
            .service(get_balance)
            .service(get_rank)
            .service(get_leaderboard)
            .service(list_catalog)
            .service(create_badge)
            .service(update_badge)
            .service(delete_badge)
            .service(attribute_referral)
            .service(complete_referral);

        let mut app = App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(health_state.clone())
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        {
            app = app
                .service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
        }

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?;

    Ok(server.run())
}
