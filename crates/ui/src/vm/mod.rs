mod index_page_vm;
mod project_tile_vm;

pub use index_page_vm::{IndexBodyVm, IndexPageVm};
pub use project_tile_vm::{
    DEFAULT_LOGO, ProjectTileVm, logo_src, map_project_tiles, project_href,
};
