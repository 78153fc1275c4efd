use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} {key} does not exist")]
    NotFound { entity: &'static str, key: i32 },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("{entity} has no relation named '{include}'")]
    UnknownInclude {
        entity: &'static str,
        include: String,
    },

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

// Postgres SQLSTATE codes the repository turns into domain errors.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &error {
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return Self::Conflict(db.message().to_string()),
                Some(FOREIGN_KEY_VIOLATION) => {
                    return Self::InvalidReference(db.message().to_string())
                }
                _ => {}
            }
        }
        Self::Database(error)
    }
}
