use std::sync::Arc;

use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use anyhow::anyhow;

use crate::{
    error::{self, AddCode, ServiceError},
    repository::RepositoryObject,
};

use self::effectfull_context::ServiceState;

pub mod effectfull_context;

/// Per-request handle on the injected [`ServiceState`].
#[derive(Clone)]
pub struct GeneralContext(pub Arc<ServiceState>);

impl FromRequest for GeneralContext {
    type Error = ServiceError;

    type Future = futures_util::future::LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        fn from_request_inner(
            req: &HttpRequest,
            _payload: &mut Payload,
        ) -> error::Result<GeneralContext> {
            let Some(state) = req.app_data::<Data<Arc<ServiceState>>>() else {
                return Err(anyhow!("No state provided").code(500));
            };

            Ok(GeneralContext(Arc::clone(state)))
        }
        let result = from_request_inner(req, payload);

        Box::pin(async move { result })
    }
}

impl GeneralContext {
    pub fn get_repository<T: 'static>(&self) -> Option<RepositoryObject<T>> {
        self.0.repositories.get::<RepositoryObject<T>>().cloned()
    }

    pub fn try_get_repository<T: 'static>(&self) -> error::Result<RepositoryObject<T>> {
        self.get_repository::<T>().ok_or(
            anyhow!(
                "Repository for type {} not found",
                std::any::type_name::<T>()
            )
            .code(500),
        )
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use crate::{entities::issue::Issue, repository::test_repository::TestRepository};
    use mongodb::bson::oid::ObjectId;

    use super::*;

    #[actix_web::test]
    async fn context_resolves_registered_repositories() {
        let mut state = ServiceState::new();
        state.insert::<Issue<ObjectId>>(Arc::new(TestRepository::new()));

        let req = TestRequest::default()
            .app_data(Data::new(Arc::new(state)))
            .to_http_request();
        let context = GeneralContext::extract(&req).await.ok().unwrap();

        assert!(context.try_get_repository::<Issue<ObjectId>>().is_ok());
        assert!(context.get_repository::<String>().is_none());
    }

    #[actix_web::test]
    async fn context_requires_state() {
        let req = TestRequest::default().to_http_request();
        let err = GeneralContext::extract(&req).await.err().unwrap();
        assert_eq!(err.code, 500);
    }
}
