//! Stored shape of a template document.

use labelsheet_core::template::{Template, TemplateSpec};
use labelsheet_core::types::{TemplateId, UserId};
use serde::{Deserialize, Serialize};

/// Template fields as persisted. The id is the document key and is not
/// part of the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    #[serde(flatten)]
    pub spec: TemplateSpec,
    pub user_id: UserId,
    pub created_at: String,
}

impl TemplateDocument {
    /// Stamp a validated payload with its owner and the current time.
    pub fn stamp(spec: TemplateSpec, owner: &UserId) -> Self {
        Self {
            spec,
            user_id: owner.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn into_template(self, id: TemplateId) -> Template {
        Template {
            id,
            spec: self.spec,
            owner_id: self.user_id,
            created_at: self.created_at,
        }
    }
}
