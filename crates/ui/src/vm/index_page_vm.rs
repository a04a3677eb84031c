use services::{ShowcaseController, ShowcaseView};
use showcase_core::filter::{ALL_CATEGORIES, VisibleSet};
use showcase_core::model::CategoryCode;

use crate::vm::project_tile_vm::{ProjectTileVm, map_project_tiles};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexBodyVm {
    Loading,
    Tiles(Vec<ProjectTileVm>),
}

/// Everything the index page needs to render, with no domain types left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexPageVm {
    pub body: IndexBodyVm,
    pub search_enabled: bool,
    pub create_enabled: bool,
    pub signed_in_as: Option<String>,
    /// `ALL` first, then every category present in the catalog.
    pub category_options: Vec<String>,
}

impl IndexPageVm {
    #[must_use]
    pub fn from_controller(controller: &ShowcaseController, logo_base: &str) -> Self {
        let categories = controller.filter().categories();
        Self::from_view(&controller.view(), logo_base).with_category_options(&categories)
    }

    #[must_use]
    pub fn from_view(view: &ShowcaseView<'_>, logo_base: &str) -> Self {
        let body = match &view.visible {
            VisibleSet::Loading => IndexBodyVm::Loading,
            VisibleSet::Ready(projects) => {
                IndexBodyVm::Tiles(map_project_tiles(projects, logo_base))
            }
        };
        Self {
            body,
            search_enabled: view.search_enabled,
            create_enabled: view.create_enabled,
            signed_in_as: view
                .session
                .as_ref()
                .map(|session| session.display_name().to_owned()),
            category_options: vec![ALL_CATEGORIES.to_owned()],
        }
    }

    #[must_use]
    pub fn with_category_options(mut self, categories: &[&CategoryCode]) -> Self {
        self.category_options = std::iter::once(ALL_CATEGORIES.to_owned())
            .chain(categories.iter().map(|code| code.to_string()))
            .collect();
        self
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.body, IndexBodyVm::Loading)
    }

    #[must_use]
    pub fn tiles(&self) -> &[ProjectTileVm] {
        match &self.body {
            IndexBodyVm::Loading => &[],
            IndexBodyVm::Tiles(tiles) => tiles,
        }
    }
}
