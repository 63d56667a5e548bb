use chrono::{DateTime, Utc};
use derive_more::Display;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::issue::Issue;

/// The shape every caller sees. The owning project and any other stored
/// field stay inside the service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct PublicIssue {
    #[serde(rename = "_id")]
    pub id: String,
    pub assigned_to: String,
    pub status_text: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub open: bool,
}

impl From<Issue<ObjectId>> for PublicIssue {
    fn from(issue: Issue<ObjectId>) -> Self {
        let issue = issue.stringify();
        PublicIssue {
            id: issue.id,
            assigned_to: issue.assigned_to,
            status_text: issue.status_text,
            issue_title: issue.issue_title,
            issue_text: issue.issue_text,
            created_by: issue.created_by,
            created_on: issue.created_on,
            updated_on: issue.updated_on,
            open: issue.open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IssueMessage {
    #[display(fmt = "required field(s) missing")]
    RequiredFieldsMissing,
    #[display(fmt = "missing _id")]
    MissingId,
    #[display(fmt = "no update field(s) sent")]
    NoUpdateFields,
    #[display(fmt = "successfully updated")]
    Updated,
    #[display(fmt = "could not update")]
    CouldNotUpdate,
    #[display(fmt = "successfully deleted")]
    Deleted,
    #[display(fmt = "could not delete")]
    CouldNotDelete,
}

impl IssueMessage {
    pub fn is_error(&self) -> bool {
        !matches!(self, IssueMessage::Updated | IssueMessage::Deleted)
    }
}

/// `{result, _id}` on success, `{error, _id?}` otherwise.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct IssueResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl IssueResponse {
    pub fn new(message: IssueMessage, id: Option<String>) -> Self {
        let text = Some(message.to_string());
        let (result, error) = if message.is_error() {
            (None, text)
        } else {
            (text, None)
        };
        IssueResponse { result, error, id }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CreateIssueResponse {
    Created(PublicIssue),
    Rejected(IssueResponse),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn responses_carry_the_contract_messages() {
        let missing = IssueResponse::new(IssueMessage::MissingId, None);
        assert_eq!(
            serde_json::to_value(missing).unwrap(),
            json!({"error": "missing _id"})
        );

        let updated = IssueResponse::new(IssueMessage::Updated, Some("abc".to_string()));
        assert_eq!(
            serde_json::to_value(updated).unwrap(),
            json!({"result": "successfully updated", "_id": "abc"})
        );

        let rejected = CreateIssueResponse::Rejected(IssueResponse::new(
            IssueMessage::RequiredFieldsMissing,
            None,
        ));
        assert_eq!(
            serde_json::to_value(rejected).unwrap(),
            json!({"error": "required field(s) missing"})
        );
    }

    #[test]
    fn public_issue_hides_the_project() {
        let issue = Issue::new(
            "apitest".to_string(),
            "Button shadow".to_string(),
            "Button shadow must be blue".to_string(),
            "Foo".to_string(),
            "Bar".to_string(),
            "Ongoing".to_string(),
        );
        let id = issue.id.to_hex();
        let value = serde_json::to_value(PublicIssue::from(issue)).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 9);
        assert!(!object.contains_key("project"));
        assert_eq!(object["_id"], json!(id));
        assert_eq!(object["open"], json!(true));
    }
}
