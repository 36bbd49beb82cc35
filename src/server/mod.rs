use crate::conf::Conf;
use crate::liquefaction_zone::{self, SpatialZoneStore, SqliteZoneStore};
use crate::rest::error;
use crate::{db, log, Result};
use actix_web::middleware::from_fn;
use actix_web::web::{scope, Data, QueryConfig, ServiceConfig};
use actix_web::{
    middleware::{Compress, NormalizePath},
    App, HttpServer,
};
use std::sync::Arc;
use tracing::info;

pub async fn run(conf: &Conf) -> Result<()> {
    // All the worker threads are sharing a single connection pool
    let pool = Arc::new(db::pool(conf)?);
    let store: Arc<dyn SpatialZoneStore> = Arc::new(SqliteZoneStore::new(&pool));

    info!(host = conf.host, port = conf.port, "Starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(log::middleware::handle_request))
            .wrap(NormalizePath::trim())
            .wrap(Compress::default())
            .app_data(Data::from(store.clone()))
            .app_data(QueryConfig::default().error_handler(error::query_error_handler))
            .configure(routes)
    })
    .bind((conf.host.as_str(), conf.port))?
    .run()
    .await?;

    Ok(())
}

pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("api").service(
            scope("liquefaction-zones")
                .service(liquefaction_zone::rest::get)
                .service(liquefaction_zone::rest::is_in_liquefaction_zone),
        ),
    );
}
