//! Template validation: raw form strings in, a [`TemplateSpec`] out.
//!
//! Numeric rules are declared with `validator` on a flat struct of parsed
//! values. Fields that do not parse as numbers are reported as
//! `not_a_number` and skipped by the range rules. Custom page geometry is
//! only checked once every other field passes.

use validator::Validate;

use crate::error::{CoreError, FieldViolation};
use crate::form::FormFields;
use crate::geometry::{parse_mm, resolve_page_size};
use crate::template::{LabelDimensions, Margins, TemplateSpec};

/// Maximum length of a template name, in characters.
pub const MAX_TEMPLATE_NAME_LEN: usize = 200;

#[derive(Debug, Validate)]
struct ParsedFields {
    // Keep `max` equal to MAX_TEMPLATE_NAME_LEN.
    #[validate(length(min = 1, max = 200))]
    name: String,
    #[validate(range(min = 0.0))]
    margin_top: Option<f64>,
    #[validate(range(min = 0.0))]
    margin_right: Option<f64>,
    #[validate(range(min = 0.0))]
    margin_bottom: Option<f64>,
    #[validate(range(min = 0.0))]
    margin_left: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    label_width: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    label_height: Option<f64>,
    #[validate(range(min = 0.0))]
    gap_horizontal: Option<f64>,
    #[validate(range(min = 0.0))]
    gap_vertical: Option<f64>,
}

/// Validate the raw form fields and produce the normalized payload.
///
/// Every failing field is reported in one [`CoreError::ValidationFailed`],
/// sorted by field name. A bad custom page size yields
/// [`CoreError::InvalidDimension`].
pub fn validate_template(fields: &FormFields) -> Result<TemplateSpec, CoreError> {
    let mut violations = Vec::new();
    let mut number = |field: &str, raw: &str| {
        let parsed = parse_mm(raw);
        if parsed.is_none() {
            violations.push(FieldViolation::not_a_number(field));
        }
        parsed
    };

    let parsed = ParsedFields {
        name: fields.name.trim().to_string(),
        margin_top: number("margin_top", &fields.margin_top),
        margin_right: number("margin_right", &fields.margin_right),
        margin_bottom: number("margin_bottom", &fields.margin_bottom),
        margin_left: number("margin_left", &fields.margin_left),
        label_width: number("label_width", &fields.label_width),
        label_height: number("label_height", &fields.label_height),
        gap_horizontal: number("gap_horizontal", &fields.gap_horizontal),
        gap_vertical: number("gap_vertical", &fields.gap_vertical),
    };

    if let Err(errors) = parsed.validate() {
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                violations.push(FieldViolation::new(field.to_string(), err.code.to_string()));
            }
        }
    }

    if !violations.is_empty() {
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        return Err(CoreError::ValidationFailed(violations));
    }

    let page_size = resolve_page_size(fields.page_size, &fields.page_width, &fields.page_height)?;

    Ok(TemplateSpec {
        name: parsed.name,
        page_size,
        margins: Margins {
            top: present(parsed.margin_top, "margin_top")?,
            right: present(parsed.margin_right, "margin_right")?,
            bottom: present(parsed.margin_bottom, "margin_bottom")?,
            left: present(parsed.margin_left, "margin_left")?,
        },
        label_dimensions: LabelDimensions {
            width: present(parsed.label_width, "label_width")?,
            height: present(parsed.label_height, "label_height")?,
        },
        gap_horizontal: present(parsed.gap_horizontal, "gap_horizontal")?,
        gap_vertical: present(parsed.gap_vertical, "gap_vertical")?,
    })
}

fn present(value: Option<f64>, field: &str) -> Result<f64, CoreError> {
    value.ok_or_else(|| CoreError::ValidationFailed(vec![FieldViolation::not_a_number(field)]))
}
