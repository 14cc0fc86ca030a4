use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures::future::{Ready, ready};

use crate::error::AppError;
use crate::model::Caller;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Identity asserted by the authenticating proxy in front of this service.
impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        let caller = header(USER_ID_HEADER)
            .map(|user_id| Caller {
                user_id: user_id.to_string(),
                is_admin: header(USER_ROLE_HEADER).is_some_and(|r| r.eq_ignore_ascii_case("admin")),
            })
            .ok_or(AppError::Unauthorized);
        ready(caller)
    }
}
