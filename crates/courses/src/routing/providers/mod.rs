//! HTTP clients for external directions services.

mod google;
mod tmap;

pub use google::GoogleDirections;
pub use tmap::TmapPedestrian;

use crate::errors::ProviderError;

/// Maps a non-success HTTP status onto a provider failure class.
fn status_error(status: reqwest::StatusCode) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::InvalidCredentials,
        429 => ProviderError::QuotaExceeded,
        _ => ProviderError::Unavailable(format!("HTTP {status}")),
    }
}

/// Removes markup from provider instruction text.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(reqwest::StatusCode::TOO_MANY_REQUESTS),
            ProviderError::QuotaExceeded
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::FORBIDDEN),
            ProviderError::InvalidCredentials
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::BAD_GATEWAY),
            ProviderError::Unavailable(_)
        ));
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("Head <b>north</b> on <b>Olympic-daero</b>"),
            "Head north on Olympic-daero"
        );
        assert_eq!(strip_tags("Turn right<div>Destination on left</div>"), "Turn right Destination on left");
    }
}
