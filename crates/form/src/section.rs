//! Editable form section with a saved snapshot and a working draft.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diff::{changed_fields, is_form_changed, FormData};
use crate::value::FieldValue;

/// Stable identifier of a form section on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a field is edited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    /// Non-negative integer typed digit by digit
    Number,
    /// Yes/no toggle
    Flag,
}

impl FieldKind {
    /// Whether a stored value fits this kind. Empty is always allowed.
    pub fn accepts(self, value: &FieldValue) -> bool {
        match (self, value) {
            (_, FieldValue::Null) => true,
            (FieldKind::Text, FieldValue::Text(_)) => true,
            (FieldKind::Number, FieldValue::Number(n)) => *n >= 0,
            (FieldKind::Flag, FieldValue::Flag(_)) => true,
            _ => false,
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    /// Must be filled in before the section can be saved
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

static NULL: FieldValue = FieldValue::Null;

/// Form section edit buffer.
///
/// `saved` is the last committed state; `draft` is what the user is typing.
/// Outside edit mode both are equal.
#[derive(Debug, Clone)]
pub struct FormSection {
    id: SectionId,
    title: String,
    fields: Vec<FieldSpec>,
    saved: FormData,
    draft: FormData,
    /// Index of the field under the cursor
    cursor: usize,
}

impl FormSection {
    pub fn new(id: SectionId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            fields: Vec::new(),
            saved: FormData::new(),
            draft: FormData::new(),
            cursor: 0,
        }
    }

    /// Add a field with its saved value
    pub fn with_field(mut self, spec: FieldSpec, value: FieldValue) -> Self {
        self.saved.insert(spec.key.clone(), value.clone());
        self.draft.insert(spec.key.clone(), value);
        self.fields.push(spec);
        self
    }

    pub fn id(&self) -> &SectionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_field(&self) -> Option<&FieldSpec> {
        self.fields.get(self.cursor)
    }

    pub fn saved_value(&self, key: &str) -> &FieldValue {
        self.saved.get(key).unwrap_or(&NULL)
    }

    pub fn draft_value(&self, key: &str) -> &FieldValue {
        self.draft.get(key).unwrap_or(&NULL)
    }

    /// Start a fresh draft from the saved values
    pub fn begin_edit(&mut self) {
        self.draft = self.saved.clone();
        self.cursor = 0;
    }

    pub fn set_draft(&mut self, key: impl Into<String>, value: FieldValue) {
        self.draft.insert(key.into(), value);
    }

    // ===== Cursor =====

    pub fn next_field(&mut self) {
        if self.cursor + 1 < self.fields.len() {
            self.cursor += 1;
        }
    }

    pub fn prev_field(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    // ===== Editing the field under the cursor =====

    /// Type a character into the current field.
    ///
    /// Returns `false` when the field does not accept it (a letter in a
    /// number field, an overflowing number, any character in a flag).
    pub fn push_char(&mut self, c: char) -> bool {
        let Some(spec) = self.fields.get(self.cursor) else {
            return false;
        };
        let key = spec.key.clone();
        let current = self.draft_value(&key).clone();

        let updated = match spec.kind {
            FieldKind::Text => {
                let mut text = current.to_string();
                text.push(c);
                Some(FieldValue::Text(text))
            }
            FieldKind::Number => {
                let base = match current {
                    FieldValue::Number(n) => n,
                    _ => 0,
                };
                c.to_digit(10)
                    .and_then(|digit| base.checked_mul(10)?.checked_add(i64::from(digit)))
                    .map(FieldValue::Number)
            }
            FieldKind::Flag => None,
        };

        match updated {
            Some(value) => {
                self.draft.insert(key, value);
                true
            }
            None => false,
        }
    }

    /// Delete the last character of the current field
    pub fn pop_char(&mut self) {
        let Some(spec) = self.fields.get(self.cursor) else {
            return;
        };
        let key = spec.key.clone();

        let updated = match (spec.kind, self.draft_value(&key)) {
            (FieldKind::Text, value) => {
                let mut text = value.to_string();
                text.pop();
                FieldValue::Text(text)
            }
            (FieldKind::Number, FieldValue::Number(n)) if *n >= 10 => FieldValue::Number(n / 10),
            (FieldKind::Number, _) => FieldValue::Null,
            (FieldKind::Flag, _) => FieldValue::Null,
        };
        self.draft.insert(key, updated);
    }

    /// Flip a flag field. Other kinds are left alone.
    pub fn toggle_flag(&mut self) -> bool {
        let Some(spec) = self.fields.get(self.cursor) else {
            return false;
        };
        if spec.kind != FieldKind::Flag {
            return false;
        }
        let key = spec.key.clone();
        let flipped = !matches!(self.draft_value(&key), FieldValue::Flag(true));
        self.draft.insert(key, FieldValue::Flag(flipped));
        true
    }

    // ===== Change tracking =====

    /// Whether the draft differs from the saved values
    pub fn is_dirty(&self) -> bool {
        is_form_changed(&self.saved, &self.draft)
    }

    pub fn changed_fields(&self) -> Vec<String> {
        changed_fields(&self.saved, &self.draft)
    }

    /// Labels of required fields that are empty in the draft
    pub fn missing_required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|spec| spec.required && self.draft_value(&spec.key).is_empty())
            .map(|spec| spec.label.as_str())
            .collect()
    }

    /// Accept the draft. Returns the keys that changed.
    pub fn commit(&mut self) -> Vec<String> {
        let changed = self.changed_fields();
        self.saved = self.draft.clone();
        changed
    }

    /// Throw the draft away
    pub fn revert(&mut self) {
        self.draft = self.saved.clone();
    }
}
