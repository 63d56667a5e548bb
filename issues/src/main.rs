use std::{io, sync::Arc};

use actix_web::HttpServer;
use mongodb::bson::oid::ObjectId;

use common::{
    context::effectfull_context::ServiceState,
    entities::issue::Issue,
    repository::mongo_repository::MongoRepository,
    services::{ISSUES_COLLECTION, ISSUES_DATABASE, MONGO_URI, PORT},
    verification::verify,
};
use issues::{create_app, migrations::up_migrations};

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let Some(mongo_uri) = MONGO_URI.as_deref() else {
        return Err(startup_error("MONGOURI is not set"));
    };

    up_migrations(mongo_uri, &ISSUES_DATABASE)
        .await
        .map_err(startup_error)?;

    verify::<Issue<ObjectId>>(mongo_uri, &ISSUES_DATABASE, ISSUES_COLLECTION, false)
        .await
        .map_err(startup_error)?;

    let issue_repo: MongoRepository<Issue<ObjectId>> =
        MongoRepository::new(mongo_uri, &ISSUES_DATABASE, ISSUES_COLLECTION)
            .await
            .map_err(startup_error)?;

    let mut state = ServiceState::new();
    state.insert::<Issue<ObjectId>>(Arc::new(issue_repo));
    let state = Arc::new(state);

    log::info!("Issues service listening on port {}", *PORT);

    HttpServer::new(move || create_app(state.clone()))
        .bind(("0.0.0.0", *PORT))?
        .run()
        .await
}
