//! The template form and its create/edit state machine.
//!
//! ```text
//!   Creating --edit(t)--------------------> Editing(t)
//!   Creating --submit ok (create)---------> Creating   (fields reset)
//!   Editing(t) --submit ok (update t.id)--> Creating   (fields reset)
//!   Editing(t) --cancel-------------------> Creating   (fields reset)
//!   Editing(t) --deleted(t.id)------------> Creating   (fields reset)
//!   any --submit invalid------------------> unchanged
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::CoreError;
use crate::geometry::{PageSize, PageSizeKind};
use crate::template::{Template, TemplateSpec};
use crate::types::TemplateId;
use crate::validation::validate_template;

/* --------------------------------------------------------------------------
   Defaults
   -------------------------------------------------------------------------- */

pub const DEFAULT_MARGIN: &str = "10";
pub const DEFAULT_LABEL_WIDTH: &str = "50";
pub const DEFAULT_LABEL_HEIGHT: &str = "30";
pub const DEFAULT_GAP: &str = "5";

/* --------------------------------------------------------------------------
   Fields
   -------------------------------------------------------------------------- */

/// Current input values, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub page_size: PageSizeKind,
    pub page_width: String,
    pub page_height: String,
    pub margin_top: String,
    pub margin_right: String,
    pub margin_bottom: String,
    pub margin_left: String,
    pub label_width: String,
    pub label_height: String,
    pub gap_horizontal: String,
    pub gap_vertical: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            page_size: PageSizeKind::A4,
            page_width: String::new(),
            page_height: String::new(),
            margin_top: DEFAULT_MARGIN.to_string(),
            margin_right: DEFAULT_MARGIN.to_string(),
            margin_bottom: DEFAULT_MARGIN.to_string(),
            margin_left: DEFAULT_MARGIN.to_string(),
            label_width: DEFAULT_LABEL_WIDTH.to_string(),
            label_height: DEFAULT_LABEL_HEIGHT.to_string(),
            gap_horizontal: DEFAULT_GAP.to_string(),
            gap_vertical: DEFAULT_GAP.to_string(),
        }
    }
}

impl FormFields {
    /// Render a stored template back into editable strings.
    ///
    /// Custom page sizes repopulate width/height; fixed sizes clear them.
    pub fn from_spec(spec: &TemplateSpec) -> Self {
        let (page_width, page_height) = match spec.page_size {
            PageSize::Custom { width, height } => (width.to_string(), height.to_string()),
            _ => (String::new(), String::new()),
        };
        Self {
            name: spec.name.clone(),
            page_size: spec.page_size.kind(),
            page_width,
            page_height,
            margin_top: spec.margins.top.to_string(),
            margin_right: spec.margins.right.to_string(),
            margin_bottom: spec.margins.bottom.to_string(),
            margin_left: spec.margins.left.to_string(),
            label_width: spec.label_dimensions.width.to_string(),
            label_height: spec.label_dimensions.height.to_string(),
            gap_horizontal: spec.gap_horizontal.to_string(),
            gap_vertical: spec.gap_vertical.to_string(),
        }
    }

    pub fn get(&self, field: FormField) -> String {
        match field {
            FormField::PageSize => self.page_size.to_string(),
            other => self.text(other).cloned().unwrap_or_default(),
        }
    }

    fn text(&self, field: FormField) -> Option<&String> {
        Some(match field {
            FormField::Name => &self.name,
            FormField::PageSize => return None,
            FormField::PageWidth => &self.page_width,
            FormField::PageHeight => &self.page_height,
            FormField::MarginTop => &self.margin_top,
            FormField::MarginRight => &self.margin_right,
            FormField::MarginBottom => &self.margin_bottom,
            FormField::MarginLeft => &self.margin_left,
            FormField::LabelWidth => &self.label_width,
            FormField::LabelHeight => &self.label_height,
            FormField::GapHorizontal => &self.gap_horizontal,
            FormField::GapVertical => &self.gap_vertical,
        })
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        Some(match field {
            FormField::Name => &mut self.name,
            FormField::PageSize => return None,
            FormField::PageWidth => &mut self.page_width,
            FormField::PageHeight => &mut self.page_height,
            FormField::MarginTop => &mut self.margin_top,
            FormField::MarginRight => &mut self.margin_right,
            FormField::MarginBottom => &mut self.margin_bottom,
            FormField::MarginLeft => &mut self.margin_left,
            FormField::LabelWidth => &mut self.label_width,
            FormField::LabelHeight => &mut self.label_height,
            FormField::GapHorizontal => &mut self.gap_horizontal,
            FormField::GapVertical => &mut self.gap_vertical,
        })
    }
}

/// Addressable form inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    PageSize,
    PageWidth,
    PageHeight,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    LabelWidth,
    LabelHeight,
    GapHorizontal,
    GapVertical,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        Self::Name,
        Self::PageSize,
        Self::PageWidth,
        Self::PageHeight,
        Self::MarginTop,
        Self::MarginRight,
        Self::MarginBottom,
        Self::MarginLeft,
        Self::LabelWidth,
        Self::LabelHeight,
        Self::GapHorizontal,
        Self::GapVertical,
    ];

    /// Field name used in violations and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PageSize => "page_size",
            Self::PageWidth => "page_width",
            Self::PageHeight => "page_height",
            Self::MarginTop => "margin_top",
            Self::MarginRight => "margin_right",
            Self::MarginBottom => "margin_bottom",
            Self::MarginLeft => "margin_left",
            Self::LabelWidth => "label_width",
            Self::LabelHeight => "label_height",
            Self::GapHorizontal => "gap_horizontal",
            Self::GapVertical => "gap_vertical",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| CoreError::violation(s.trim(), "unknown_field"))
    }
}

/* --------------------------------------------------------------------------
   State machine
   -------------------------------------------------------------------------- */

/// Whether a submit creates a new template or overwrites an existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Creating,
    Editing(Template),
}

/// What a valid submit should do with the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAction {
    Create(TemplateSpec),
    Update(TemplateId, TemplateSpec),
}

#[derive(Debug)]
pub struct TemplateForm {
    fields: FormFields,
    mode: FormMode,
    in_flight: Arc<AtomicBool>,
}

impl Default for TemplateForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateForm {
    pub fn new() -> Self {
        Self {
            fields: FormFields::default(),
            mode: FormMode::Creating,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Editing(_))
    }

    /// Id of the edit target, if any.
    pub fn editing_id(&self) -> Option<&TemplateId> {
        match &self.mode {
            FormMode::Editing(target) => Some(&target.id),
            FormMode::Creating => None,
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.is_editing() {
            "Edit template"
        } else {
            "New template"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update template"
        } else {
            "Save template"
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Store a raw value. Only the page-size selector can fail to parse.
    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), CoreError> {
        match self.fields.text_mut(field) {
            Some(slot) => *slot = value.to_string(),
            None => self.fields.page_size = value.parse()?,
        }
        Ok(())
    }

    /// Enter `Editing(target)` with the fields populated from it.
    pub fn edit(&mut self, target: Template) {
        self.fields = FormFields::from_spec(&target.spec);
        self.mode = FormMode::Editing(target);
    }

    /// Leave edit mode without persisting anything.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Back to `Creating` with default values.
    pub fn reset(&mut self) {
        self.fields = FormFields::default();
        self.mode = FormMode::Creating;
    }

    /// Validate the current fields into the store call a submit should make.
    ///
    /// On error the form is left exactly as it was.
    pub fn prepare_submit(&self) -> Result<SubmitAction, CoreError> {
        let spec = validate_template(&self.fields)?;
        Ok(match &self.mode {
            FormMode::Creating => SubmitAction::Create(spec),
            FormMode::Editing(target) => SubmitAction::Update(target.id.clone(), spec),
        })
    }

    /// A submit was persisted.
    pub fn on_saved(&mut self) {
        self.reset();
    }

    /// A template was deleted. Resets only if it was the edit target;
    /// returns whether it did.
    pub fn on_deleted(&mut self, id: &TemplateId) -> bool {
        if self.editing_id() == Some(id) {
            self.reset();
            true
        } else {
            false
        }
    }

    /// Claim the form for one outstanding submission.
    ///
    /// The claim is released when the returned guard drops.
    pub fn begin_submit(&self) -> Result<SubmitGuard, CoreError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CoreError::SubmissionInFlight)?;
        Ok(SubmitGuard {
            flag: Arc::clone(&self.in_flight),
        })
    }
}

/// Held while a submission is outstanding.
#[derive(Debug)]
#[must_use = "the submission claim is released as soon as the guard drops"]
pub struct SubmitGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
