use std::convert::Infallible;

use rocket::{
    http::{Cookie, CookieJar},
    request::{FromRequest, Outcome},
    Request,
};
use shared::{UserKey, ANONYMOUS};

pub const SESSION_COOKIE: &str = "player";

/// The acting user: the name stored in the private session cookie, or
/// `anonymous` when there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player(pub UserKey);

impl Player {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn from_cookies(cookies: &CookieJar<'_>) -> Self {
        let name = cookies
            .get_private(SESSION_COOKIE)
            .map(|cookie| cookie.value().trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());
        Self(name)
    }

    pub fn sign_in(cookies: &CookieJar<'_>, name: &str) {
        cookies.add_private(Cookie::new(SESSION_COOKIE, name.to_string()));
    }

    pub fn sign_out(cookies: &CookieJar<'_>) {
        cookies.remove_private(Cookie::from(SESSION_COOKIE));
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Player {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(Player::from_cookies(req.cookies()))
    }
}
