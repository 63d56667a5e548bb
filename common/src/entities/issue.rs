use chrono::{DateTime, Utc};
use mongodb::bson::{
    self, oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime, Bson, Document,
};
use serde::{Deserialize, Serialize};

use crate::repository::Entity;

/// Current time truncated to what the store keeps (milliseconds), so an
/// issue returned from a handler compares equal to the one read back later.
pub fn now() -> DateTime<Utc> {
    bson::DateTime::now().to_chrono()
}

pub fn to_bson_datetime(timestamp: DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_chrono(timestamp))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Issue<Id> {
    #[serde(rename = "_id")]
    pub id: Id,
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub status_text: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_on: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_on: DateTime<Utc>,
    pub open: bool,
}

impl Issue<ObjectId> {
    pub fn new(
        project: String,
        issue_title: String,
        issue_text: String,
        created_by: String,
        assigned_to: String,
        status_text: String,
    ) -> Self {
        let created_on = now();
        Issue {
            id: ObjectId::new(),
            project,
            issue_title,
            issue_text,
            created_by,
            assigned_to,
            status_text,
            created_on,
            updated_on: created_on,
            open: true,
        }
    }

    pub fn stringify(self) -> Issue<String> {
        Issue {
            id: self.id.to_hex(),
            project: self.project,
            issue_title: self.issue_title,
            issue_text: self.issue_text,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            status_text: self.status_text,
            created_on: self.created_on,
            updated_on: self.updated_on,
            open: self.open,
        }
    }
}

impl Entity for Issue<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}

/// Fields an update may carry. Only non-empty strings survive into the
/// `$set` document, so an empty value never clears a stored field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueChange {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssueChange {
    fn text_fields(&self) -> [(&'static str, &Option<String>); 5] {
        [
            ("issue_title", &self.issue_title),
            ("issue_text", &self.issue_text),
            ("created_by", &self.created_by),
            ("assigned_to", &self.assigned_to),
            ("status_text", &self.status_text),
        ]
    }

    pub fn has_changes(&self) -> bool {
        self.text_fields()
            .iter()
            .any(|(_, value)| value.as_deref().map_or(false, |x| !x.is_empty()))
    }

    pub fn to_document(&self, updated_on: DateTime<Utc>) -> Document {
        let mut document = Document::new();
        for (key, value) in self.text_fields() {
            if let Some(value) = value.as_deref().filter(|x| !x.is_empty()) {
                document.insert(key, value);
            }
        }
        if let Some(open) = self.open {
            document.insert("open", open);
        }
        document.insert("updated_on", to_bson_datetime(updated_on));
        document
    }
}
