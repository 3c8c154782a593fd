//! Cookie transport for the sealed session token.
//!
//! Works directly on [`http::HeaderMap`] so it plugs into any framework
//! built on the `http` crate.  Reading follows RFC 6265 section 5.4: every
//! `Cookie` header is scanned and the first pair with a matching name wins.

use ::cookie::time::Duration;
use ::cookie::Cookie;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};

use ig_domain::config::{CookieConfig, SameSite};

use crate::error::{Result, SessionError};

/// Largest `Set-Cookie` value (name, value and attributes) written.
/// RFC 6265 section 6.1 only obliges browsers to keep cookies up to this size.
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Attributes written alongside a cookie value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub max_age_secs: Option<u64>,
}

impl CookieAttributes {
    /// The same attributes with an immediate expiry, for deleting the cookie.
    pub fn expired(&self) -> Self {
        Self {
            max_age_secs: Some(0),
            ..self.clone()
        }
    }

    fn build<'c>(&self, name: &'c str, value: &'c str) -> Cookie<'c> {
        let mut builder = Cookie::build((name, value))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        let mut cookie = builder.build();
        match self.max_age_secs {
            Some(0) => cookie.make_removal(),
            Some(secs) => {
                cookie.set_max_age(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)))
            }
            None => {}
        }
        cookie
    }
}

impl From<&CookieConfig> for CookieAttributes {
    fn from(cfg: &CookieConfig) -> Self {
        Self {
            path: cfg.path.clone(),
            domain: cfg.domain.clone(),
            secure: cfg.secure,
            http_only: cfg.http_only,
            same_site: cfg.same_site,
            max_age_secs: cfg.max_age_secs,
        }
    }
}

/// Reads a named cookie from a request and writes one onto a response.
pub trait CookieTransport: Send + Sync {
    /// `Ok(None)` when the request carries no cookie with that name.
    fn get_cookie(&self, request: &HeaderMap, name: &str) -> Result<Option<String>>;

    fn set_cookie(
        &self,
        response: &mut HeaderMap,
        name: &str,
        value: &str,
        attrs: &CookieAttributes,
    ) -> Result<()>;
}

/// [`CookieTransport`] over raw `Cookie` / `Set-Cookie` headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderCookieTransport;

impl CookieTransport for HeaderCookieTransport {
    fn get_cookie(&self, request: &HeaderMap, name: &str) -> Result<Option<String>> {
        for header in request.get_all(COOKIE) {
            let header = header
                .to_str()
                .map_err(|_| SessionError::CookieRead("Cookie header is not visible ASCII".into()))?;

            // Malformed pairs are skipped, like a browser would.
            let found = Cookie::split_parse(header)
                .filter_map(|c| c.ok())
                .find(|c| c.name() == name)
                .map(|c| c.value_trimmed().to_owned());
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }

    fn set_cookie(
        &self,
        response: &mut HeaderMap,
        name: &str,
        value: &str,
        attrs: &CookieAttributes,
    ) -> Result<()> {
        let cookie = attrs.build(name, value);
        let rendered = cookie.to_string();

        // Whatever a browser would parse back has to be exactly what was
        // asked for; anything else means a separator leaked into a field.
        let reparsed = Cookie::parse(rendered.as_str())
            .map_err(|e| SessionError::CookieWrite(e.to_string()))?;
        if reparsed.name() != cookie.name()
            || reparsed.value() != cookie.value()
            || reparsed.path() != cookie.path()
            || reparsed.domain() != cookie.domain()
        {
            return Err(SessionError::CookieWrite(format!(
                "cookie {name} does not survive rendering; check value, path and domain"
            )));
        }

        if rendered.len() > MAX_COOKIE_BYTES {
            return Err(SessionError::CookieWrite(format!(
                "cookie {name} is {} bytes, above the {MAX_COOKIE_BYTES} byte limit",
                rendered.len()
            )));
        }

        let header = HeaderValue::from_str(&rendered)
            .map_err(|e| SessionError::CookieWrite(e.to_string()))?;
        response.append(SET_COOKIE, header);
        Ok(())
    }
}
