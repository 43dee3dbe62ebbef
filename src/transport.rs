use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Put { key: String, value: String },
    Get { key: String },
    Del { key: String },
    Walk,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Success. Carries the value for `Get`, nothing otherwise.
    Ok(Option<String>),
    /// Every entry in key order, answer to `Walk`.
    Entries(Vec<(String, String)>),
    NotFound,
    Err(String),
}
