#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// `any_of` distinguishes "one of these is required" from "all of these
    /// are required".
    #[error("{} required", join_names(.names, .any_of))]
    MissingParameter { names: Vec<String>, any_of: bool },

    #[error("invalid number for {param}: {raw:?}")]
    InvalidNumber { param: String, raw: String },

    #[error("invalid date for {param}: {raw:?}")]
    InvalidDate { param: String, raw: String },
}

impl QueryError {
    pub fn missing(names: &[&str]) -> Self {
        QueryError::MissingParameter {
            names: names.iter().map(|n| n.to_string()).collect(),
            any_of: false,
        }
    }

    pub fn missing_any(names: &[&str]) -> Self {
        QueryError::MissingParameter {
            names: names.iter().map(|n| n.to_string()).collect(),
            any_of: true,
        }
    }
}

fn join_names(names: &[String], any_of: &bool) -> String {
    names.join(if *any_of { " or " } else { " and " })
}
