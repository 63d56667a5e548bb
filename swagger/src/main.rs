use std::{error::Error, net::Ipv4Addr};

use actix_web::{middleware::Logger, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::{SwaggerUi, Url};

use common::services::SWAGGER_PORT;

#[derive(OpenApi)]
#[openapi(
    paths(
        issues::get_issues,
        issues::post_issue,
        issues::put_issue,
        issues::delete_issue,
    ),
    components(schemas(
        issues::CreateIssue,
        issues::ChangeIssue,
        issues::DeleteIssue,
        common::api::issue::PublicIssue,
        common::api::issue::IssueResponse,
    ))
)]
struct IssuesServiceDoc;

#[actix_web::main]
async fn main() -> Result<(), impl Error> {
    dotenv::dotenv().ok();
    env_logger::init();

    log::info!("Swagger UI listening on port {}", *SWAGGER_PORT);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").urls(vec![(
                Url::new("issues", "/api-doc/issues.json"),
                IssuesServiceDoc::openapi(),
            )]))
    })
    .bind((Ipv4Addr::UNSPECIFIED, *SWAGGER_PORT))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::IssuesServiceDoc;

    #[test]
    fn document_lists_every_issue_route() {
        let doc = serde_json::to_value(IssuesServiceDoc::openapi()).unwrap();
        let route = &doc["paths"]["/issues/{project}"];

        for method in ["get", "post", "put", "delete"] {
            assert!(route.get(method).is_some(), "missing {}", method);
        }
        assert!(doc["components"]["schemas"].get("PublicIssue").is_some());
    }
}
