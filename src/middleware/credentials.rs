use axum::http::HeaderMap;

use super::auth::AuthError;

pub const ACCESS_TOKEN_HEADER: &str = "access-token";
pub const EMAIL_HEADER: &str = "email";
pub const USER_ROLE_HEADER: &str = "user-role";

/// Caller-presented credentials for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub token: String,
    /// Client-supplied role claim. Only the observed self-or-admin mode reads it.
    pub role_hint: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("token", &"***")
            .field("role_hint", &self.role_hint)
            .finish()
    }
}

impl Credentials {
    /// Absent, empty, or non-text `email` / `access-token` headers fail closed.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        let email = required_header(headers, EMAIL_HEADER)?;
        let token = required_header(headers, ACCESS_TOKEN_HEADER)?;
        let role_hint = headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            email,
            token,
            role_hint,
        })
    }
}

fn required_header(headers: &HeaderMap, name: &'static str) -> Result<String, AuthError> {
    let value = headers
        .get(name)
        .ok_or(AuthError::MissingCredentials(name))?
        .to_str()
        .map_err(|_| AuthError::MissingCredentials(name))?
        .trim();

    if value.is_empty() {
        return Err(AuthError::MissingCredentials(name));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn extracts_all_headers() {
        let creds = Credentials::from_headers(&headers(&[
            ("email", "a@x.com"),
            ("access-token", "tok"),
            ("user-role", "ADMIN"),
        ]))
        .unwrap();
        assert_eq!(creds.email, "a@x.com");
        assert_eq!(creds.token, "tok");
        assert_eq!(creds.role_hint.as_deref(), Some("ADMIN"));
    }

    #[test]
    fn role_header_is_optional() {
        let creds =
            Credentials::from_headers(&headers(&[("email", "a@x.com"), ("access-token", "tok")]))
                .unwrap();
        assert_eq!(creds.role_hint, None);
    }

    #[test]
    fn missing_email_fails_closed() {
        let err = Credentials::from_headers(&headers(&[("access-token", "tok")])).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials("email")));
    }

    #[test]
    fn missing_token_fails_closed() {
        let err = Credentials::from_headers(&headers(&[("email", "a@x.com")])).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials("access-token")));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = Credentials::from_headers(&headers(&[("email", "  "), ("access-token", "tok")]))
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials("email")));
    }

    #[test]
    fn non_text_values_count_as_missing() {
        let mut map = headers(&[("email", "a@x.com")]);
        map.insert("access-token", HeaderValue::from_bytes(&[0xFF, 0xFE]).unwrap());
        let err = Credentials::from_headers(&map).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials("access-token")));
    }

    #[test]
    fn debug_hides_token() {
        let creds =
            Credentials::from_headers(&headers(&[("email", "a@x.com"), ("access-token", "secret")]))
                .unwrap();
        assert!(!format!("{:?}", creds).contains("secret"));
    }
}
