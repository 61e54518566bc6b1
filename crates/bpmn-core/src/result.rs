use crate::error::ModelerError;

pub type ModelerResult<T> = Result<T, ModelerError>;
