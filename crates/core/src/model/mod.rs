mod ids;
mod project;
mod session;

pub use ids::{ParseIdError, ProjectId, UserId};
pub use project::{CategoryCode, Project, ProjectDraft, ProjectError, ProjectFields};
pub use session::{AccessToken, RefreshToken, Session, SessionDataError, SessionPhase};
