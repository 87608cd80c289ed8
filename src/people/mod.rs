//! People registry
//!
//! Demo handlers served through the adapter: `add_new_person` behind a POST and
//! `list_people` behind a GET. Each call opens the store and is done with it by
//! the time it returns.

mod store;

pub use store::{FileStore, StoreError};

use chrono::{SecondsFormat, Utc};
use restez::QueryParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    pub age: i64,
    pub favorite_food: String,
}

/// Body of `POST /new`
///
/// Absent fields decode to their zero values and are caught by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPersonRequest {
    pub name: String,
    pub age: i64,
    pub favorite_food: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersonResponse {
    pub message: String,
    /// RFC 3339, UTC
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PersonError {
    #[error("the request was invalid. one or more values missing: {0:?}")]
    Invalid(NewPersonRequest),

    #[error("failed to insert into people table: {0}")]
    Insert(#[source] StoreError),

    #[error("failed to execute query on people table: {0}")]
    Query(#[source] StoreError),
}

impl NewPersonRequest {
    fn is_complete(&self) -> bool {
        !self.name.is_empty() && self.age != 0 && !self.favorite_food.is_empty()
    }
}

impl From<NewPersonRequest> for Person {
    fn from(req: NewPersonRequest) -> Self {
        Self {
            name: req.name,
            age: req.age,
            favorite_food: req.favorite_food,
        }
    }
}

pub async fn add_new_person(
    store: FileStore,
    req: NewPersonRequest,
) -> Result<NewPersonResponse, PersonError> {
    restez::logger::log_info("handling /new request");

    if !req.is_complete() {
        return Err(PersonError::Invalid(req));
    }

    store.insert(req.into()).await.map_err(PersonError::Insert)?;

    Ok(NewPersonResponse {
        message: "your post was received".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

pub async fn list_people(store: FileStore, _params: QueryParams) -> Result<Vec<Person>, PersonError> {
    restez::logger::log_info("handling /list request");

    store.all().await.map_err(PersonError::Query)
}
