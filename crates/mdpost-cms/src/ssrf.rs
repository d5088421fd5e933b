//! SSRF (Server-Side Request Forgery) guard for image downloads
//!
//! Image URLs come from uploaded documents, so the server must not be turned into a proxy
//! for internal addresses:
//! - Only http and https are fetched
//! - Private, loopback, link-local and multicast addresses are rejected
//! - Localhost and internal host names are rejected
//! - Host names are resolved and every resolved address is checked
//! - The HTTP client connects only to public addresses ([`PublicAddrResolver`]), which also
//!   covers redirects and DNS answers that change after validation

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::error::Error;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use tokio::net::lookup_host;

/// DNS resolver for the download client that drops private and internal addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicAddrResolver;

impl Resolve for PublicAddrResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_string();
        Box::pin(async move {
            let addrs: Addrs = Box::new(resolve_public_addrs(&host).await?.into_iter());
            Ok::<_, Box<dyn Error + Send + Sync>>(addrs)
        })
    }
}

/// Resolve `host` and keep only public addresses. Fails when none are left.
pub async fn resolve_public_addrs(
    host: &str,
) -> Result<Vec<SocketAddr>, Box<dyn Error + Send + Sync>> {
    let public: Vec<SocketAddr> = lookup_host((host, 0))
        .await?
        .filter(|addr| !is_private_ip(&addr.ip()))
        .collect();

    if public.is_empty() {
        tracing::warn!(host = %host, "Host resolves only to private or internal addresses");
        return Err(format!("{} resolves only to private or internal addresses", host).into());
    }
    Ok(public)
}

/// Validate an image URL before it is fetched.
///
/// * `allow_private_ips` - skip the private address checks (local development only)
/// * `allowlist` - if set, only these hosts and their subdomains are accepted
pub async fn validate_url_for_ssrf(
    url: &str,
    allow_private_ips: bool,
    allowlist: Option<&[String]>,
) -> Result<(), String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }

    let parsed_url = reqwest::Url::parse(url).map_err(|e| format!("Invalid URL format: {}", e))?;

    let host = parsed_url
        .host_str()
        .ok_or_else(|| "URL must have a host".to_string())?;
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Some(allowed_domains) = allowlist {
        if !is_allowlisted(host, allowed_domains) {
            return Err(format!(
                "URL hostname '{}' is not in the allowed list. Allowed domains: {}",
                host,
                allowed_domains.join(", ")
            ));
        }
    }

    if !allow_private_ips && is_blocked_host(host) {
        return Err("Private or internal hosts are not allowed".to_string());
    }

    let port = parsed_url.port_or_known_default().unwrap_or(80);
    let resolved_ips: Vec<IpAddr> = match lookup_host((host, port)).await {
        Ok(addrs) => addrs.map(|addr| addr.ip()).collect(),
        Err(e) => {
            // The fetch itself will fail and be reported as a download error.
            tracing::warn!(host = %host, error = %e, "Failed to resolve hostname for SSRF validation");
            Vec::new()
        }
    };

    if !allow_private_ips {
        if let Some(ip) = resolved_ips.iter().find(|ip| is_private_ip(ip)) {
            return Err(format!(
                "Hostname resolves to private/internal IP address: {}",
                ip
            ));
        }
    }

    Ok(())
}

fn is_allowlisted(host: &str, allowed_domains: &[String]) -> bool {
    let host = host.to_lowercase();
    allowed_domains.iter().any(|allowed| {
        let allowed = allowed.to_lowercase();
        host == allowed || host.ends_with(&format!(".{}", allowed))
    })
}

/// Host check that needs no DNS: IP literals in private ranges, localhost and internal
/// naming conventions.
pub fn is_blocked_host(host: &str) -> bool {
    let host = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_lowercase();

    if let Ok(ip) = host.parse::<IpAddr>() {
        return is_private_ip(&ip);
    }

    host == "localhost"
        || host.ends_with(".localhost")
        || host.ends_with(".local")
        || host.contains(".internal")
        || host.contains(".corp")
        || host.starts_with("0.")
}

/// Check if an IP address is private/internal
///
/// Returns true for:
/// - IPv4 private ranges: 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
/// - IPv4 localhost: 127.0.0.0/8
/// - IPv4 link-local: 169.254.0.0/16
/// - IPv4 shared address space: 100.64.0.0/10
/// - IPv4 multicast and reserved: 224.0.0.0/3
/// - IPv4 "this network": 0.0.0.0/8
/// - IPv6 loopback, unspecified and multicast
/// - IPv6 link-local (fe80::/10) and unique local (fc00::/7)
/// - IPv4-mapped IPv6 addresses of any of the above
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            octets[0] == 10
                || (octets[0] == 172 && (16..=31).contains(&octets[1]))
                || (octets[0] == 192 && octets[1] == 168)
                || octets[0] == 127
                || (octets[0] == 169 && octets[1] == 254)
                || (octets[0] == 100 && (64..=127).contains(&octets[1]))
                || octets[0] >= 224
                || octets[0] == 0
        }
        IpAddr::V6(ipv6) => {
            if let Some(mapped) = ipv6.to_ipv4_mapped() {
                return is_private_ip(&IpAddr::V4(mapped));
            }
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                || ipv6.is_multicast()
                || is_ipv6_link_local(ipv6)
                || is_ipv6_unique_local(ipv6)
        }
    }
}

/// fe80::/10
fn is_ipv6_link_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xffc0 == 0xfe80
}

/// fc00::/7
fn is_ipv6_unique_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xfe00 == 0xfc00
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_validate_url_rejects_localhost() {
        for url in [
            "http://localhost/image.jpg",
            "http://127.0.0.1/image.jpg",
            "http://[::1]/image.jpg",
            "http://[::ffff:127.0.0.1]/image.jpg",
        ] {
            assert!(validate_url_for_ssrf(url, false, None).await.is_err(), "{url}");
        }
    }

    #[tokio::test]
    async fn test_validate_url_rejects_private_ips() {
        for url in [
            "http://192.168.1.1/image.jpg",
            "http://10.0.0.1/image.jpg",
            "http://172.16.0.1/image.jpg",
            "http://169.254.169.254/latest/meta-data",
            "http://[fd00::1]/image.jpg",
        ] {
            assert!(validate_url_for_ssrf(url, false, None).await.is_err(), "{url}");
        }
    }

    #[tokio::test]
    async fn test_validate_url_rejects_internal_hostnames() {
        for url in [
            "http://internal.service.local/image.jpg",
            "http://service.corp/image.jpg",
            "http://service.internal/image.jpg",
        ] {
            assert!(validate_url_for_ssrf(url, false, None).await.is_err(), "{url}");
        }
    }

    #[tokio::test]
    async fn test_validate_url_rejects_invalid_schemes() {
        for url in [
            "file:///etc/passwd",
            "ftp://example.com/file",
            "gopher://example.com",
            "/relative/cat.png",
        ] {
            assert!(validate_url_for_ssrf(url, false, None).await.is_err(), "{url}");
        }
    }

    #[tokio::test]
    async fn test_validate_url_accepts_public_ip_literals() {
        assert!(validate_url_for_ssrf("https://8.8.8.8/image.jpg", false, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_private_hosts_allowed_when_configured() {
        assert!(validate_url_for_ssrf("http://127.0.0.1:8080/cat.png", true, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_validate_url_allowlist() {
        let allowlist = vec!["8.8.8.8".to_string(), "example.com".to_string()];

        assert!(
            validate_url_for_ssrf("https://8.8.8.8/image.jpg", false, Some(&allowlist))
                .await
                .is_ok()
        );
        assert!(
            validate_url_for_ssrf("https://evil.com/image.jpg", false, Some(&allowlist))
                .await
                .is_err()
        );
        assert!(
            validate_url_for_ssrf("https://notexample.com/image.jpg", false, Some(&allowlist))
                .await
                .is_err()
        );
    }

    #[test]
    fn test_allowlist_matches_subdomains() {
        let allowlist = vec!["example.com".to_string()];
        assert!(is_allowlisted("cdn.example.com", &allowlist));
        assert!(is_allowlisted("EXAMPLE.com", &allowlist));
        assert!(!is_allowlisted("example.com.evil.net", &allowlist));
    }

    #[test]
    fn test_is_private_ip() {
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(172, 16, 0, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(169, 254, 1, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(100, 64, 0, 1))));
        assert!(is_private_ip(&IpAddr::V4(Ipv4Addr::new(239, 255, 255, 250))));

        assert!(!is_private_ip(&IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))));
        assert!(!is_private_ip(&IpAddr::V4(Ipv4Addr::new(172, 32, 0, 1))));

        assert!(is_private_ip(&IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert!(is_private_ip(&IpAddr::V6(Ipv6Addr::UNSPECIFIED)));
        assert!(is_private_ip(&"fe80::1".parse().unwrap()));
        assert!(is_private_ip(&"::ffff:10.0.0.1".parse().unwrap()));
        assert!(!is_private_ip(&"2606:4700::1111".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_resolver_drops_loopback_addresses() {
        assert!(resolve_public_addrs("localhost").await.is_err());
    }

    #[tokio::test]
    async fn test_resolver_keeps_public_addresses() {
        let addrs = resolve_public_addrs("8.8.8.8").await.unwrap();
        assert_eq!(addrs[0].ip(), IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)));
    }

    #[test]
    fn test_is_blocked_host() {
        assert!(is_blocked_host("LOCALHOST"));
        assert!(is_blocked_host("localhost."));
        assert!(is_blocked_host("[::1]"));
        assert!(is_blocked_host("printer.local"));
        assert!(!is_blocked_host("example.com"));
        assert!(!is_blocked_host("93.184.216.34"));
    }
}
