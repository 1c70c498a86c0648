use serde::{Deserialize, Serialize};
use std::fmt;

/// Scenario category used to pick a reference template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ArchetypeLabel {
    Login,
    Ecommerce,
    Form,
    Responsive,
    Generic,
}

impl ArchetypeLabel {
    /// Labels that have a stored template (`Generic` has none).
    pub const TEMPLATED: [ArchetypeLabel; 4] = [
        ArchetypeLabel::Login,
        ArchetypeLabel::Ecommerce,
        ArchetypeLabel::Form,
        ArchetypeLabel::Responsive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchetypeLabel::Login => "login",
            ArchetypeLabel::Ecommerce => "ecommerce",
            ArchetypeLabel::Form => "form",
            ArchetypeLabel::Responsive => "responsive",
            ArchetypeLabel::Generic => "generic",
        }
    }

    /// File name of the stored template, if this label has one.
    pub fn template_file(&self) -> Option<String> {
        match self {
            ArchetypeLabel::Generic => None,
            other => Some(format!("{}-archetype.js", other.as_str())),
        }
    }
}

impl fmt::Display for ArchetypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static code sample attached to a case to ground the generation prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchetypeTemplate {
    pub label: ArchetypeLabel,
    pub code: String,
}
