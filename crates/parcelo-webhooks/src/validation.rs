//! URL validation and SSRF protection for webhook delivery endpoints.
//!
//! Subscriptions must point at an encrypted-transport endpoint on a public
//! host; outbound delivery happens from inside the platform network, so
//! private and metadata addresses are rejected at registration time.

use std::net::IpAddr;

use crate::error::WebhookError;

/// Validate a webhook delivery URL.
///
/// Checks:
/// 1. URL is parseable
/// 2. Scheme is HTTPS (or HTTP if `allow_http` is true for dev/test)
/// 3. Host is not a private/internal address (SSRF protection)
pub fn validate_webhook_url(url: &str, allow_http: bool) -> Result<(), WebhookError> {
    let parsed = url::Url::parse(url)
        .map_err(|e| WebhookError::InvalidUrl(format!("Invalid URL format: {e}")))?;

    match parsed.scheme() {
        "https" => {}
        "http" if allow_http => {}
        "http" => {
            return Err(WebhookError::InvalidUrl(
                "Webhook URLs must use HTTPS".to_string(),
            ));
        }
        scheme => {
            return Err(WebhookError::InvalidUrl(format!(
                "Unsupported URL scheme: {scheme}"
            )));
        }
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| WebhookError::InvalidUrl("URL must have a host".to_string()))?;

    validate_host_not_internal(host)?;

    Ok(())
}

/// Validate that a host is not a private/internal address.
///
/// Blocks loopback, RFC 1918 ranges, link-local (cloud metadata endpoints),
/// CGNAT, unspecified addresses, and well-known internal hostnames.
pub fn validate_host_not_internal(host: &str) -> Result<(), WebhookError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_internal_ip(&ip) {
            return Err(WebhookError::SsrfDetected(format!(
                "Destination host {host} is a private/internal address"
            )));
        }
    }

    let lower = host.to_ascii_lowercase();
    if lower == "localhost"
        || lower == "metadata.google.internal"
        || lower.ends_with(".internal")
        || lower.ends_with(".local")
    {
        return Err(WebhookError::SsrfDetected(format!(
            "Destination host {host} is a restricted internal hostname"
        )));
    }

    Ok(())
}

/// Check if an IP address belongs to a private/internal range.
fn is_internal_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()                // 127.0.0.0/8
                || v4.is_private()          // 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
                || v4.is_link_local()       // 169.254.0.0/16
                || v4.is_broadcast()
                || v4.is_unspecified()
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64) // 100.64.0.0/10 (CGNAT)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_https_url() {
        assert!(validate_webhook_url("https://hooks.example.com/shipments", false).is_ok());
        assert!(validate_webhook_url("https://example.com:8443/cb", false).is_ok());
    }

    #[test]
    fn test_http_rejected_unless_allowed() {
        let result = validate_webhook_url("http://example.com/hook", false);
        assert!(matches!(result.unwrap_err(), WebhookError::InvalidUrl(_)));

        assert!(validate_webhook_url("http://example.com/hook", true).is_ok());
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        assert!(validate_webhook_url("ftp://example.com/hook", false).is_err());
        assert!(validate_webhook_url("not-a-url", false).is_err());
    }

    #[test]
    fn test_private_ranges_rejected() {
        for host in [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.1",
            "192.168.1.1",
            "169.254.169.254",
            "100.64.0.1",
            "::1",
            "::",
        ] {
            assert!(validate_host_not_internal(host).is_err(), "{host}");
        }
    }

    #[test]
    fn test_internal_hostnames_rejected() {
        for host in [
            "localhost",
            "LOCALHOST",
            "metadata.google.internal",
            "db.internal",
            "printer.local",
        ] {
            assert!(validate_host_not_internal(host).is_err(), "{host}");
        }
    }

    #[test]
    fn test_public_hosts_allowed() {
        assert!(validate_host_not_internal("hooks.example.com").is_ok());
        assert!(validate_host_not_internal("8.8.8.8").is_ok());
        assert!(validate_host_not_internal("203.0.113.50").is_ok());
    }

    #[test]
    fn test_ssrf_error_variant_from_url() {
        let result = validate_webhook_url("https://10.0.0.1/hook", false);
        assert!(matches!(result.unwrap_err(), WebhookError::SsrfDetected(_)));
    }
}
