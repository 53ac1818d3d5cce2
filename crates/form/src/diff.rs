//! Change detection between two snapshots of a form.

use std::collections::{BTreeMap, BTreeSet};

use crate::value::{values_equal, FieldValue};

/// Form contents keyed by field key. A missing key reads as `Null`.
pub type FormData = BTreeMap<String, FieldValue>;

static NULL: FieldValue = FieldValue::Null;

/// Keys whose normalized values differ, sorted.
pub fn changed_fields(original: &FormData, current: &FormData) -> Vec<String> {
    let keys: BTreeSet<&String> = original.keys().chain(current.keys()).collect();
    keys.into_iter()
        .filter(|key| {
            let before = original.get(*key).unwrap_or(&NULL);
            let after = current.get(*key).unwrap_or(&NULL);
            !values_equal(before, after)
        })
        .cloned()
        .collect()
}

pub fn is_form_changed(original: &FormData, current: &FormData) -> bool {
    !changed_fields(original, current).is_empty()
}
