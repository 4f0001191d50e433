//! Cookies: the [`Cookie`] record, the [`CookieSink`] response contract and the in-memory [`CookieJar`].

mod cookies;
mod cookie_jar;

pub use cookies::Cookie;
pub use cookies::CookieSinkHandle;
pub use cookies::SameSite;

pub use cookie_jar::CookieJar;
pub use cookie_jar::CookieSink;
