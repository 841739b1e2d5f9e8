//! Template entity and its validated payload.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::PageSize;
use crate::types::{TemplateId, UserId};

/// Page margins in millimeters. All sides are `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Size of one label cell in millimeters. Both sides are `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelDimensions {
    pub width: f64,
    pub height: f64,
}

/// The user-editable part of a template, as produced by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    pub name: String,
    pub page_size: PageSize,
    pub margins: Margins,
    pub label_dimensions: LabelDimensions,
    pub gap_horizontal: f64,
    pub gap_vertical: f64,
}

/// A persisted template.
///
/// `owner_id` and `created_at` are stamped by the repository at write time;
/// the form never edits them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    #[serde(flatten)]
    pub spec: TemplateSpec,
    #[serde(rename = "userId")]
    pub owner_id: UserId,
    pub created_at: String,
}

impl Template {
    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.spec;
        let m = &s.margins;
        write!(
            f,
            "{} [{}]\n  page: {} | label: {}x{}mm\n  margins: top {}, right {}, bottom {}, left {}mm\n  gaps: horizontal {}, vertical {}mm",
            s.name,
            self.id,
            s.page_size,
            s.label_dimensions.width,
            s.label_dimensions.height,
            m.top,
            m.right,
            m.bottom,
            m.left,
            s.gap_horizontal,
            s.gap_vertical,
        )
    }
}
