use axum::http::{header::COOKIE, HeaderMap};

const SESSION_COOKIE: &str = "next-auth.session-token";
const CSRF_COOKIE: &str = "next-auth.csrf-token";
const STATE_COOKIE: &str = "next-auth.state";

/// OAuth `state` cookies outlive a slow login at the provider, not much more.
pub const STATE_MAX_AGE_SECS: u64 = 15 * 60;

pub fn session_cookie_name(secure: bool) -> String {
    if secure {
        format!("__Secure-{SESSION_COOKIE}")
    } else {
        SESSION_COOKIE.to_string()
    }
}

pub fn csrf_cookie_name(secure: bool) -> String {
    if secure {
        format!("__Host-{CSRF_COOKIE}")
    } else {
        CSRF_COOKIE.to_string()
    }
}

pub fn state_cookie_name(secure: bool) -> String {
    if secure {
        format!("__Secure-{STATE_COOKIE}")
    } else {
        STATE_COOKIE.to_string()
    }
}

/// `max_age_secs` of `None` makes a browser-session cookie.
pub fn build_cookie(name: &str, value: &str, max_age_secs: Option<u64>, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };

    let mut cookie = format!(
        "{}={}; HttpOnly{}; SameSite=Lax; Path=/",
        name, value, secure_flag
    );

    if let Some(max_age) = max_age_secs {
        cookie.push_str(&format!("; Max-Age={}", max_age));
    }

    cookie
}

pub fn build_clear_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", Some(0), secure)
}

pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    for header in headers.get_all(COOKIE) {
        let Ok(header) = header.to_str() else {
            continue;
        };
        for part in header.split(';') {
            let trimmed = part.trim();
            if let Some(value) = trimmed.strip_prefix(prefix.as_str()) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}
