use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::model::ids::ProjectId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProjectError {
    #[error("project name cannot be empty")]
    EmptyName,

    #[error("project blurb cannot be empty")]
    EmptyBlurb,

    #[error("invalid category code: {0:?}")]
    InvalidCategory(String),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

const MAX_CATEGORY_LEN: usize = 32;

/// Classification code attached to every project (e.g. `WEB`, `GAME`).
///
/// Codes are trimmed and upper-cased so that comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryCode(String);

impl CategoryCode {
    /// Parse and normalize a category code.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidCategory` if the code is blank, too long, or
    /// contains whitespace.
    pub fn parse(raw: &str) -> Result<Self, ProjectError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.chars().count() > MAX_CATEGORY_LEN
            || trimmed.chars().any(char::is_whitespace)
        {
            return Err(ProjectError::InvalidCategory(raw.to_owned()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Normalize a code served by the catalog without validating it.
    ///
    /// Server data is shown as-is; a code [`CategoryCode::parse`] would reject
    /// simply never matches a category constraint.
    #[must_use]
    pub fn from_catalog(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// True if [`CategoryCode::parse`] would accept this code.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        Self::parse(&self.0).is_ok()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn deserialize_catalog_category<'de, D>(deserializer: D) -> Result<CategoryCode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(CategoryCode::from_catalog(raw.as_deref().unwrap_or_default()))
}

impl TryFrom<String> for CategoryCode {
    type Error = ProjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CategoryCode> for String {
    fn from(code: CategoryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── PROJECT ───────────────────────────────────────────────────────────────────
//

/// A showcased project as served by the catalog endpoint.
///
/// Records are read-only once fetched; the filter engine only selects subsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    #[serde(default)]
    blurb: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "deserialize_catalog_category")]
    category: CategoryCode,
    #[serde(default)]
    likes: u32,
    #[serde(default)]
    logo: Option<String>,
}

impl Project {
    #[must_use]
    pub fn new(
        id: ProjectId,
        name: impl Into<String>,
        blurb: impl Into<String>,
        description: impl Into<String>,
        category: CategoryCode,
        likes: u32,
        logo: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            blurb: blurb.into(),
            description: description.into(),
            category,
            likes,
            logo,
        }
    }

    #[must_use]
    pub fn id(&self) -> ProjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn blurb(&self) -> &str {
        &self.blurb
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &CategoryCode {
        &self.category
    }

    #[must_use]
    pub fn likes(&self) -> u32 {
        self.likes
    }

    /// Logo file name relative to the logo base path, if one was uploaded.
    #[must_use]
    pub fn logo_ref(&self) -> Option<&str> {
        self.logo.as_deref().filter(|logo| !logo.trim().is_empty())
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated input from the create/edit project form.
#[derive(Clone, Debug, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub blurb: String,
    pub description: String,
    pub category: String,
    pub logo: Option<String>,
}

/// Validated request body for creating or updating a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectFields {
    name: String,
    blurb: String,
    description: String,
    category: CategoryCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo: Option<String>,
}

impl ProjectDraft {
    /// Trim and validate the form input.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError` if the name or blurb is empty or the category is invalid.
    pub fn validate(self) -> Result<ProjectFields, ProjectError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ProjectError::EmptyName);
        }
        let blurb = self.blurb.trim().to_owned();
        if blurb.is_empty() {
            return Err(ProjectError::EmptyBlurb);
        }
        let category = CategoryCode::parse(&self.category)?;
        let logo = self
            .logo
            .map(|logo| logo.trim().to_owned())
            .filter(|logo| !logo.is_empty());

        Ok(ProjectFields {
            name,
            blurb,
            description: self.description.trim().to_owned(),
            category,
            logo,
        })
    }
}

impl ProjectFields {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> &CategoryCode {
        &self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_code_is_normalized() {
        let code = CategoryCode::parse("  web ").unwrap();
        assert_eq!(code.as_str(), "WEB");
        assert_eq!(code, CategoryCode::parse("WEB").unwrap());
    }

    #[test]
    fn category_code_rejects_blank_and_spaced() {
        assert!(CategoryCode::parse("   ").is_err());
        assert!(CategoryCode::parse("two words").is_err());
        assert!(CategoryCode::parse(&"X".repeat(33)).is_err());
    }

    #[test]
    fn project_deserializes_with_missing_optional_fields() {
        let json = r#"{"id": 4, "name": "Gamma", "category": "data"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id(), ProjectId::new(4));
        assert_eq!(project.blurb(), "");
        assert_eq!(project.likes(), 0);
        assert_eq!(project.category().as_str(), "DATA");
        assert_eq!(project.logo_ref(), None);
    }

    #[test]
    fn catalog_keeps_projects_with_malformed_categories() {
        let json = r#"[
            {"id": 1, "name": "Alpha", "category": "web"},
            {"id": 2, "name": "Beta", "category": " Data Science "},
            {"id": 3, "name": "Gamma", "category": ""},
            {"id": 4, "name": "Delta", "category": null},
            {"id": 5, "name": "Epsilon"}
        ]"#;
        let projects: Vec<Project> = serde_json::from_str(json).unwrap();
        assert_eq!(projects.len(), 5);
        assert_eq!(projects[0].category().as_str(), "WEB");
        assert!(projects[0].category().is_well_formed());
        assert_eq!(projects[1].category().as_str(), "DATA SCIENCE");
        assert!(!projects[1].category().is_well_formed());
        assert_eq!(projects[2].category().as_str(), "");
        assert_eq!(projects[3].category().as_str(), "");
        assert_eq!(projects[4].category().as_str(), "");
    }

    #[test]
    fn project_rejects_negative_likes() {
        let json = r#"{"id": 4, "name": "Gamma", "category": "X", "likes": -1}"#;
        assert!(serde_json::from_str::<Project>(json).is_err());
    }

    #[test]
    fn blank_logo_is_treated_as_absent() {
        let json = r#"{"id": 1, "name": "A", "category": "X", "logo": " "}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.logo_ref(), None);
    }

    #[test]
    fn draft_validation_trims_and_checks_fields() {
        let fields = ProjectDraft {
            name: "  Alpha ".into(),
            blurb: "A tool".into(),
            description: " longer text ".into(),
            category: "web".into(),
            logo: Some("  ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(fields.name(), "Alpha");
        assert_eq!(fields.category().as_str(), "WEB");

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["description"], "longer text");
        assert!(json.get("logo").is_none());
    }

    #[test]
    fn draft_with_empty_name_is_rejected() {
        let err = ProjectDraft {
            name: " ".into(),
            blurb: "b".into(),
            category: "X".into(),
            ..ProjectDraft::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ProjectError::EmptyName);
    }

    #[test]
    fn draft_with_empty_blurb_is_rejected() {
        let err = ProjectDraft {
            name: "n".into(),
            category: "X".into(),
            ..ProjectDraft::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ProjectError::EmptyBlurb);
    }
}
