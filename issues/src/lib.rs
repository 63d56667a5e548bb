pub mod handlers;
pub mod migrations;
pub mod service;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware, web, App,
};
use mongodb::bson::oid::ObjectId;

use common::{
    context::effectfull_context::ServiceState,
    entities::issue::Issue,
    repository::test_repository::TestRepository,
    services::API_PREFIX,
};

pub use handlers::issue::*;
pub use service::issue::{ChangeIssue, CreateIssue, DeleteIssue, IssueFilter};

pub fn create_app(
    state: Arc<ServiceState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let cors = Cors::permissive();

    App::new()
        .wrap(cors)
        .wrap(middleware::Logger::default())
        .app_data(web::Data::new(state))
        .service(
            web::scope(&API_PREFIX)
                .service(get_issues)
                .service(post_issue)
                .service(put_issue)
                .service(delete_issue),
        )
}

/// Same routes as [`create_app`], backed by an in-memory issue store.
pub fn create_test_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let mut state = ServiceState::new();
    state.insert::<Issue<ObjectId>>(Arc::new(TestRepository::new()));

    create_app(Arc::new(state))
}
