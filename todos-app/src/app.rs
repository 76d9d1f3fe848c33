use error_stack::{Report, ResultExt};
use std::env::{self, VarError};

const SEED_VAR: &str = "TODOS_SEED";
const DEFAULT_SEED: usize = 6;

#[derive(Debug, thiserror::Error)]
#[error("the todos app exited with an error")]
pub struct AppError;

pub type AppResult<T> = Result<T, Report<AppError>>;

#[derive(Debug, PartialEq, Eq)]
pub struct AppProperties {
    /// How many todos to generate on startup.
    pub seed: usize,
}

impl AppProperties {
    pub fn from_env() -> AppResult<Self> {
        let seed = match env::var(SEED_VAR) {
            Ok(value) => Some(value),
            Err(VarError::NotPresent) => None,
            Err(e) => {
                return Err(e)
                    .change_context(AppError)
                    .attach_with(|| format!("{SEED_VAR} could not be read"));
            }
        };

        Ok(Self {
            seed: parse_seed(seed.as_deref())?,
        })
    }
}

fn parse_seed(value: Option<&str>) -> AppResult<usize> {
    match value {
        None => Ok(DEFAULT_SEED),
        Some(value) => value
            .trim()
            .parse()
            .change_context(AppError)
            .attach_with(|| format!("{SEED_VAR} must be a number of todos, got {value:?}")),
    }
}
