use std::future::{ready, Ready};

use actix_web::{dev::Payload, error::ErrorUnauthorized, FromRequest, HttpRequest};

pub const USER_COOKIE: &str = "user_id";

/// The logged in user, identified by the session cookie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentUser {
    pub id: i64,
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .cookie(USER_COOKIE)
            .and_then(|cookie| cookie.value().parse::<i64>().ok())
            .map(|id| CurrentUser { id });

        ready(user.ok_or_else(|| ErrorUnauthorized("Login required")))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{cookie::Cookie, test::TestRequest, FromRequest};

    use super::{CurrentUser, USER_COOKIE};

    #[actix_web::test]
    async fn reads_user_from_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(USER_COOKIE, "42"))
            .to_http_request();

        let user = CurrentUser::extract(&req).await.unwrap();

        assert_eq!(user, CurrentUser { id: 42 });
    }

    #[actix_web::test]
    async fn missing_or_malformed_cookie_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        assert!(CurrentUser::extract(&req).await.is_err());

        let req = TestRequest::default()
            .cookie(Cookie::new(USER_COOKIE, "admin"))
            .to_http_request();
        assert!(CurrentUser::extract(&req).await.is_err());
    }
}
