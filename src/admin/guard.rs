use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};

/// Header carrying the admin password on `DELETE /records`.
pub const ADMIN_KEY_HEADER: &str = "api-key";

/// Admin password candidate sent by the client. Checked by the clear flow.
pub struct AdminKey<'r>(pub &'r str);

#[derive(Debug)]
pub enum AdminKeyError {
    Missing,
}

impl std::fmt::Display for AdminKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminKeyError::Missing => write!(f, "the admin key header is missing"),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminKey<'r> {
    type Error = AdminKeyError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match request.headers().get_one(ADMIN_KEY_HEADER) {
            None => Outcome::Error((Status::BadRequest, AdminKeyError::Missing)),
            Some(key) => Outcome::Success(AdminKey(key)),
        }
    }
}
