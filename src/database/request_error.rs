use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::{json::Json, Serialize};
use rocket::Request;

use super::StoreError;

#[derive(Debug)]
pub enum RequestError {
    Unauthorized,
    MissingPassword,
    InvalidRecord { reason: String },
    InvalidQuery { reason: String },
    Store(StoreError),
}

impl RequestError {
    pub fn status(&self) -> Status {
        match self {
            Self::Unauthorized => Status::Unauthorized,
            Self::MissingPassword => Status::BadRequest,
            Self::InvalidRecord { .. } | Self::InvalidQuery { .. } => {
                Status::UnprocessableEntity
            }
            Self::Store(_) => Status::ServiceUnavailable,
        }
    }
}

impl std::error::Error for RequestError {}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "incorrect admin password"),
            Self::MissingPassword => write!(f, "admin password is missing"),
            Self::InvalidRecord { reason } => write!(f, "invalid game record: {}", reason),
            Self::InvalidQuery { reason } => write!(f, "invalid query: {}", reason),
            Self::Store(error) => write!(f, "failed to reach the leaderboard: {}", error),
        }
    }
}

impl From<StoreError> for RequestError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
struct ErrorBody {
    error: String,
}

impl<'r> Responder<'r, 'static> for RequestError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (self.status(), body).respond_to(request)
    }
}

pub type RequestResult<T, E = RequestError> = std::result::Result<T, E>;
