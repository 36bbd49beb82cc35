use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    Error, HttpMessage,
};
use std::time::Instant;
use tracing::info;

/// Attached by handlers to report how many entities a response carries.
pub struct RequestExtension {
    pub entities: i64,
}

impl RequestExtension {
    pub fn new(entities: usize) -> Self {
        RequestExtension {
            entities: i64::try_from(entities).unwrap_or(i64::MAX),
        }
    }
}

pub async fn handle_request(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let started_at = Instant::now();
    let method = req.method().to_string();
    let path = req.path().to_string();
    let query = req.query_string().to_string();
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or_default()
        .to_string();
    let res = next.call(req).await?;
    let entities = res
        .request()
        .extensions()
        .get::<RequestExtension>()
        .map(|it| it.entities);
    let status = res.status().as_u16();
    let time_ms = started_at.elapsed().as_millis();
    info!(method, path, query, ip, status, entities, time_ms, "Handled request");
    Ok(res)
}

#[cfg(test)]
mod test {
    use super::RequestExtension;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::test::TestRequest;
    use actix_web::web::get;
    use actix_web::{test, App, HttpMessage, HttpRequest, HttpResponse};

    #[test]
    async fn passes_response_through() {
        let app = test::init_service(App::new().wrap(from_fn(super::handle_request)).route(
            "/",
            get().to(|req: HttpRequest| async move {
                req.extensions_mut().insert(RequestExtension::new(3));
                HttpResponse::Ok().body("ok")
            }),
        ))
        .await;
        let res = test::call_service(&app, TestRequest::get().uri("/?a=1").to_request()).await;
        assert_eq!(StatusCode::OK, res.status());
        assert_eq!(test::read_body(res).await, "ok");
    }

    #[test]
    async fn passes_errors_through() {
        let app = test::init_service(App::new().wrap(from_fn(super::handle_request))).await;
        let res = test::call_service(&app, TestRequest::get().uri("/missing").to_request()).await;
        assert_eq!(StatusCode::NOT_FOUND, res.status());
    }
}
