//! Claim records shown on the detail page.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use claimdesk_form::{FieldKind, FieldSpec, FieldValue, FormSection, SectionId};

const DEMO_CLAIM_TOML: &str = include_str!("../fixtures/demo-claim.toml");

/// Claim record as stored in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct Claim {
    pub claim_number: String,
    #[serde(default)]
    pub status: String,
    pub tabs: Vec<ClaimTab>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimTab {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<ClaimSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimSection {
    pub id: SectionId,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<ClaimField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimField {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: FieldValue,
}

impl Claim {
    /// Built-in demo claim
    pub fn demo() -> Result<Self> {
        Self::from_toml(DEMO_CLAIM_TOML).context("Built-in demo claim is invalid")
    }

    /// Load a claim from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read claim {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid claim {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let claim: Claim = toml::from_str(content)?;
        claim.validate()?;
        Ok(claim)
    }

    /// Reject claims the page cannot show: no tabs, duplicate section ids,
    /// or values that do not fit their field kind.
    fn validate(&self) -> Result<()> {
        if self.tabs.is_empty() {
            bail!("Claim {} has no tabs", self.claim_number);
        }
        let mut seen = HashSet::new();
        for section in self.tabs.iter().flat_map(|tab| &tab.sections) {
            if !seen.insert(&section.id) {
                bail!("Duplicate section id '{}'", section.id);
            }
            for field in &section.fields {
                if !field.kind.accepts(&field.value) {
                    bail!(
                        "Field '{}.{}' is {:?} but holds {:?}",
                        section.id,
                        field.key,
                        field.kind,
                        field.value
                    );
                }
            }
        }
        Ok(())
    }
}

impl ClaimSection {
    /// Build the edit buffer for this section
    pub fn to_form_section(&self) -> FormSection {
        self.fields.iter().fold(
            FormSection::new(self.id.clone(), self.title.clone()),
            |section, field| {
                let spec = FieldSpec {
                    key: field.key.clone(),
                    label: field.label.clone(),
                    kind: field.kind,
                    required: field.required,
                };
                section.with_field(spec, field.value.clone())
            },
        )
    }
}
