use anyhow::anyhow;
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::handlers::payload::{lenient_bool, lenient_string};
use common::{
    api::issue::{CreateIssueResponse, IssueMessage, IssueResponse, PublicIssue},
    context::GeneralContext,
    entities::issue::{now, Issue, IssueChange},
    error::{self, AddCode},
};

// Request bodies are read field by field: a value of the wrong type is
// dropped instead of rejecting the whole body.

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateIssue {
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChangeIssue {
    #[serde(rename = "_id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub open: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DeleteIssue {
    #[serde(rename = "_id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
}

/// Equality filters accepted on listing. Keys outside this list are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IssueFilter {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssueFilter {
    /// `None` when the filter can match nothing, i.e. a malformed `_id`.
    fn to_document(&self, project: String) -> Option<Document> {
        let mut filter = doc! {"project": project};

        if let Some(id) = &self.id {
            filter.insert("_id", id.parse::<ObjectId>().ok()?);
        }

        let fields = [
            ("issue_title", &self.issue_title),
            ("issue_text", &self.issue_text),
            ("created_by", &self.created_by),
            ("assigned_to", &self.assigned_to),
            ("status_text", &self.status_text),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                filter.insert(key, value.as_str());
            }
        }

        if let Some(open) = self.open {
            filter.insert("open", open);
        }

        Some(filter)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|x| !x.is_empty())
}

pub struct IssueService {
    context: GeneralContext,
}

impl IssueService {
    pub fn new(context: GeneralContext) -> Self {
        Self { context }
    }

    pub async fn find_all(
        &self,
        project: String,
        filter: IssueFilter,
    ) -> error::Result<Vec<PublicIssue>> {
        let issues = self.context.try_get_repository::<Issue<ObjectId>>()?;

        let Some(filter) = filter.to_document(project) else {
            return Ok(vec![]);
        };

        let result = issues.find_many(filter).await?;
        Ok(result.into_iter().map(PublicIssue::from).collect())
    }

    pub async fn create(
        &self,
        project: String,
        issue: CreateIssue,
    ) -> error::Result<CreateIssueResponse> {
        let (Some(issue_title), Some(issue_text), Some(created_by)) = (
            non_empty(issue.issue_title),
            non_empty(issue.issue_text),
            non_empty(issue.created_by),
        ) else {
            log::warn!("Rejected issue for project {}: required field(s) missing", project);
            return Ok(CreateIssueResponse::Rejected(IssueResponse::new(
                IssueMessage::RequiredFieldsMissing,
                None,
            )));
        };

        let issues = self.context.try_get_repository::<Issue<ObjectId>>()?;

        let issue = Issue::new(
            project,
            issue_title,
            issue_text,
            created_by,
            issue.assigned_to.unwrap_or_default(),
            issue.status_text.unwrap_or_default(),
        );

        if !issues.insert(&issue).await? {
            return Err(anyhow!("Issue {} already exists", issue.id).code(500));
        }
        log::info!("Issue {} created in project {}", issue.id, issue.project);

        Ok(CreateIssueResponse::Created(issue.into()))
    }

    pub async fn change(&self, change: ChangeIssue) -> error::Result<IssueResponse> {
        let Some(id) = non_empty(change.id) else {
            log::warn!("Rejected issue update: missing _id");
            return Ok(IssueResponse::new(IssueMessage::MissingId, None));
        };

        let issue_change = IssueChange {
            issue_title: change.issue_title,
            issue_text: change.issue_text,
            created_by: change.created_by,
            assigned_to: change.assigned_to,
            status_text: change.status_text,
            open: change.open,
        };

        if !issue_change.has_changes() {
            log::warn!("Rejected update of issue {}: no update field(s) sent", id);
            return Ok(IssueResponse::new(IssueMessage::NoUpdateFields, Some(id)));
        }

        let Ok(object_id) = id.parse::<ObjectId>() else {
            return Ok(IssueResponse::new(IssueMessage::CouldNotUpdate, Some(id)));
        };

        let issues = self.context.try_get_repository::<Issue<ObjectId>>()?;

        if !issues
            .update_one(&object_id, issue_change.to_document(now()))
            .await?
        {
            return Ok(IssueResponse::new(IssueMessage::CouldNotUpdate, Some(id)));
        }

        log::info!("Issue {} updated", id);
        Ok(IssueResponse::new(IssueMessage::Updated, Some(id)))
    }

    pub async fn delete(&self, delete: DeleteIssue) -> error::Result<IssueResponse> {
        let Some(id) = non_empty(delete.id) else {
            log::warn!("Rejected issue deletion: missing _id");
            return Ok(IssueResponse::new(IssueMessage::MissingId, None));
        };

        let Ok(object_id) = id.parse::<ObjectId>() else {
            return Ok(IssueResponse::new(IssueMessage::CouldNotDelete, Some(id)));
        };

        let issues = self.context.try_get_repository::<Issue<ObjectId>>()?;

        if issues.delete(&object_id).await?.is_none() {
            return Ok(IssueResponse::new(IssueMessage::CouldNotDelete, Some(id)));
        }

        log::info!("Issue {} deleted", id);
        Ok(IssueResponse::new(IssueMessage::Deleted, Some(id)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::{
        context::effectfull_context::ServiceState,
        repository::{test_repository::TestRepository, Repository},
    };

    use super::*;

    fn service() -> (IssueService, Arc<TestRepository<Issue<ObjectId>>>) {
        let repo = Arc::new(TestRepository::new());
        let mut state = ServiceState::new();
        state.insert::<Issue<ObjectId>>(repo.clone());
        (IssueService::new(GeneralContext(Arc::new(state))), repo)
    }

    fn create_issue(title: &str, created_by: &str) -> CreateIssue {
        CreateIssue {
            issue_title: Some(title.to_string()),
            issue_text: Some("text".to_string()),
            created_by: Some(created_by.to_string()),
            ..Default::default()
        }
    }

    async fn created(service: &IssueService, project: &str, issue: CreateIssue) -> PublicIssue {
        match service.create(project.to_string(), issue).await.unwrap() {
            CreateIssueResponse::Created(issue) => issue,
            CreateIssueResponse::Rejected(response) => panic!("rejected: {:?}", response),
        }
    }

    #[actix_web::test]
    async fn create_rejects_empty_required_fields_without_storing() {
        let (service, repo) = service();
        let mut issue = create_issue("title", "Foo");
        issue.issue_text = Some(String::new());

        let response = service.create("apitest".to_string(), issue).await.unwrap();
        assert_eq!(
            response,
            CreateIssueResponse::Rejected(IssueResponse::new(
                IssueMessage::RequiredFieldsMissing,
                None
            ))
        );
        assert!(repo.db.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn create_stores_the_project() {
        let (service, repo) = service();
        let issue = created(&service, "apitest", create_issue("title", "Foo")).await;

        let stored = repo.find_many(doc! {"project": "apitest"}).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id.to_hex(), issue.id);
        assert_eq!(stored[0].assigned_to, "");
    }

    #[actix_web::test]
    async fn find_all_is_scoped_to_the_project() {
        let (service, _) = service();
        let mine = created(&service, "apitest", create_issue("a", "Foo")).await;
        created(&service, "other", create_issue("b", "Foo")).await;

        let found = service
            .find_all("apitest".to_string(), IssueFilter::default())
            .await
            .unwrap();
        assert_eq!(found, vec![mine.clone()]);

        let by_id = IssueFilter {
            id: Some(mine.id.clone()),
            ..Default::default()
        };
        let found = service.find_all("apitest".to_string(), by_id).await.unwrap();
        assert_eq!(found, vec![mine]);
    }

    #[actix_web::test]
    async fn find_all_with_malformed_id_is_empty() {
        let (service, _) = service();
        created(&service, "apitest", create_issue("a", "Foo")).await;

        let filter = IssueFilter {
            id: Some("not-an-object-id".to_string()),
            ..Default::default()
        };
        let found = service.find_all("apitest".to_string(), filter).await.unwrap();
        assert!(found.is_empty());
    }

    #[actix_web::test]
    async fn change_applies_open_with_a_text_field() {
        let (service, repo) = service();
        let issue = created(&service, "apitest", create_issue("a", "Foo")).await;

        let response = service
            .change(ChangeIssue {
                id: Some(issue.id.clone()),
                status_text: Some("Closed".to_string()),
                created_by: Some(String::new()),
                open: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            response,
            IssueResponse::new(IssueMessage::Updated, Some(issue.id.clone()))
        );

        let stored = repo.find_many(doc! {"open": false}).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status_text, "Closed");
        assert_eq!(stored[0].created_by, "Foo");
    }

    #[actix_web::test]
    async fn change_with_malformed_id_could_not_update() {
        let (service, _) = service();
        let response = service
            .change(ChangeIssue {
                id: Some("xyz".to_string()),
                issue_text: Some("error".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            response,
            IssueResponse::new(IssueMessage::CouldNotUpdate, Some("xyz".to_string()))
        );
    }

    #[actix_web::test]
    async fn delete_with_empty_id_is_missing() {
        let (service, _) = service();
        let response = service
            .delete(DeleteIssue {
                id: Some(String::new()),
            })
            .await
            .unwrap();
        assert_eq!(response, IssueResponse::new(IssueMessage::MissingId, None));
    }

    #[actix_web::test]
    async fn store_must_be_registered() {
        let service = IssueService::new(GeneralContext(Arc::new(ServiceState::new())));
        let err = service
            .find_all("apitest".to_string(), IssueFilter::default())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code, 500);
    }
}
