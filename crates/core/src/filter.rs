//! In-memory search and category filtering over the fetched catalog.
//!
//! `CatalogFilter` owns the catalog and recomputes the visible subset from
//! scratch on every state change. It performs no I/O and never fails: raw user
//! input is normalized (trimmed, case-folded) and anything it cannot interpret
//! falls back to "no constraint".

use crate::model::{CategoryCode, Project, ProjectId};

/// Sentinel accepted by [`CategoryConstraint::parse`] to lift the category constraint.
pub const ALL_CATEGORIES: &str = "ALL";

//
// ─── QUERY TERMS ───────────────────────────────────────────────────────────────
//

/// Lower-cased search tokens. A project matches if any term is a substring of
/// its name, blurb, or description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms(Vec<String>);

impl QueryTerms {
    /// Split on whitespace and lower-case each token, dropping duplicates.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut terms: Vec<String> = Vec::new();
        for token in raw.split_whitespace() {
            let token = token.to_lowercase();
            if !terms.contains(&token) {
                terms.push(token);
            }
        }
        Self(terms)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.0
    }

    fn matches(&self, haystack: &Haystack) -> bool {
        self.0.is_empty() || self.0.iter().any(|term| haystack.contains(term))
    }
}

//
// ─── CATEGORY CONSTRAINT ───────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryConstraint {
    #[default]
    All,
    Only(CategoryCode),
}

impl CategoryConstraint {
    /// Interpret a raw selector value. The `ALL` sentinel, blank input and
    /// malformed codes all mean "no constraint".
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return Self::All;
        }
        CategoryCode::parse(trimmed).map_or(Self::All, Self::Only)
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

//
// ─── FILTER STATE ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    query: QueryTerms,
    category: CategoryConstraint,
}

impl FilterState {
    #[must_use]
    pub fn query(&self) -> &QueryTerms {
        &self.query
    }

    #[must_use]
    pub fn category(&self) -> &CategoryConstraint {
        &self.category
    }

    /// True if any constraint narrows the catalog.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || !self.category.is_all()
    }
}

//
// ─── VISIBLE SET ───────────────────────────────────────────────────────────────
//

/// The projects to render, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibleSet<'a> {
    /// The catalog has not been fetched yet. Distinct from an empty result.
    Loading,
    Ready(Vec<&'a Project>),
}

impl<'a> VisibleSet<'a> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, VisibleSet::Loading)
    }

    #[must_use]
    pub fn projects(&self) -> &[&'a Project] {
        match self {
            VisibleSet::Loading => &[],
            VisibleSet::Ready(projects) => projects,
        }
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ProjectId> {
        self.projects().iter().map(|project| project.id()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.projects().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects().is_empty()
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Lower-cased searchable fields of one project, built once per catalog.
#[derive(Debug, Clone)]
struct Haystack {
    name: String,
    blurb: String,
    description: String,
}

impl Haystack {
    fn of(project: &Project) -> Self {
        Self {
            name: project.name().to_lowercase(),
            blurb: project.blurb().to_lowercase(),
            description: project.description().to_lowercase(),
        }
    }

    fn contains(&self, term: &str) -> bool {
        self.name.contains(term) || self.blurb.contains(term) || self.description.contains(term)
    }
}

#[derive(Debug, Clone)]
struct Catalog {
    projects: Vec<Project>,
    haystacks: Vec<Haystack>,
}

/// Owns the fetched catalog and the current filter state.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    catalog: Option<Catalog>,
    state: FilterState,
    visible: Vec<usize>,
}

impl CatalogFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog and reapply the current filter state to it.
    pub fn set_catalog(&mut self, projects: Vec<Project>) {
        let haystacks = projects.iter().map(Haystack::of).collect();
        self.catalog = Some(Catalog {
            projects,
            haystacks,
        });
        self.recompute();
    }

    /// Forget the catalog (back to loading) while keeping the filter state.
    pub fn reset(&mut self) {
        self.catalog = None;
        self.visible.clear();
    }

    /// Update the free-text query. Whitespace-only input clears it.
    pub fn apply_text_query(&mut self, raw: &str) {
        self.state.query = QueryTerms::parse(raw);
        self.recompute();
    }

    /// Update the category constraint from a raw selector value.
    pub fn apply_category_constraint(&mut self, raw: &str) {
        self.apply_category(CategoryConstraint::parse(raw));
    }

    pub fn apply_category(&mut self, constraint: CategoryConstraint) {
        self.state.category = constraint;
        self.recompute();
    }

    /// Drop every constraint.
    pub fn clear(&mut self) {
        self.state = FilterState::default();
        self.recompute();
    }

    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&[Project]> {
        self.catalog.as_ref().map(|catalog| catalog.projects.as_slice())
    }

    #[must_use]
    pub fn visible(&self) -> VisibleSet<'_> {
        match &self.catalog {
            None => VisibleSet::Loading,
            Some(catalog) => VisibleSet::Ready(
                self.visible
                    .iter()
                    .map(|&index| &catalog.projects[index])
                    .collect(),
            ),
        }
    }

    /// Distinct selectable category codes in first-seen catalog order.
    #[must_use]
    pub fn categories(&self) -> Vec<&CategoryCode> {
        let mut seen: Vec<&CategoryCode> = Vec::new();
        for project in self.catalog().unwrap_or_default() {
            if project.category().is_well_formed() && !seen.contains(&project.category()) {
                seen.push(project.category());
            }
        }
        seen
    }

    fn recompute(&mut self) {
        self.visible.clear();
        let Some(catalog) = &self.catalog else {
            return;
        };

        // A code no project carries is unrecognized and does not constrain.
        let category = match &self.state.category {
            CategoryConstraint::Only(code)
                if catalog.projects.iter().any(|p| p.category() == code) =>
            {
                Some(code)
            }
            _ => None,
        };

        for (index, (project, haystack)) in
            catalog.projects.iter().zip(&catalog.haystacks).enumerate()
        {
            let in_category = category.is_none_or(|code| project.category() == code);
            if in_category && self.state.query.matches(haystack) {
                self.visible.push(index);
            }
        }
    }
}
