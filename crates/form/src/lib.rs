//! Form data for claimdesk detail pages.
//!
//! Values are compared after empty-field normalization: `""`, whitespace,
//! empty lists and missing keys all mean "not filled in", so clearing an
//! already-empty field does not count as an unsaved change.

mod diff;
mod section;
mod value;

pub use diff::{changed_fields, is_form_changed, FormData};
pub use section::{FieldKind, FieldSpec, FormSection, SectionId};
pub use value::{normalize, values_equal, FieldValue};
