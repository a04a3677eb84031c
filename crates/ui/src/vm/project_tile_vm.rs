use showcase_core::model::{Project, ProjectId};

/// Logo file shown for projects that never uploaded one.
pub const DEFAULT_LOGO: &str = "default.png";

/// UI-ready summary of a project for the index grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectTileVm {
    pub id: ProjectId,
    pub name: String,
    pub category: String,
    pub blurb: String,
    pub href: String,
    pub logo_src: String,
}

impl ProjectTileVm {
    #[must_use]
    pub fn from_project(project: &Project, logo_base: &str) -> Self {
        Self {
            id: project.id(),
            name: project.name().to_owned(),
            category: project.category().to_string(),
            blurb: project.blurb().to_owned(),
            href: project_href(project.id()),
            logo_src: logo_src(logo_base, project.logo_ref()),
        }
    }
}

/// Map visible projects into tiles, keeping their order.
#[must_use]
pub fn map_project_tiles(projects: &[&Project], logo_base: &str) -> Vec<ProjectTileVm> {
    projects
        .iter()
        .map(|project| ProjectTileVm::from_project(project, logo_base))
        .collect()
}

#[must_use]
pub fn project_href(id: ProjectId) -> String {
    format!("/projects/{id}")
}

/// Join the logo base path and a logo file name, falling back to [`DEFAULT_LOGO`].
#[must_use]
pub fn logo_src(logo_base: &str, logo: Option<&str>) -> String {
    let file = logo.unwrap_or(DEFAULT_LOGO).trim_start_matches('/');
    let base = logo_base.trim_end_matches('/');
    format!("{base}/{file}")
}
