use thiserror::Error;

use crate::model::{ProjectError, SessionDataError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Session(#[from] SessionDataError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessToken, CategoryCode};

    fn parse_both(category: &str, token: &str) -> Result<(), Error> {
        CategoryCode::parse(category)?;
        AccessToken::new(token)?;
        Ok(())
    }

    #[test]
    fn model_errors_convert_into_the_crate_error() {
        assert!(matches!(parse_both("X", " "), Err(Error::Session(_))));
        assert!(matches!(parse_both("two words", "t"), Err(Error::Project(_))));
        assert!(parse_both("X", "t").is_ok());
    }
}
