use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;
use ipnet::IpNet;
use pickadrive_domain::RequestContext;

/// Extracts the caller's network origin and agent string.
///
/// `X-Forwarded-For` is only honored when the direct peer is a trusted proxy;
/// otherwise the peer address is the origin.
pub fn extract_request_context(
    peer: SocketAddr,
    headers: &HeaderMap,
    trusted_proxies: &[IpNet],
) -> RequestContext {
    let peer_ip = peer.ip().to_canonical();

    let forwarded_ip = trusted_proxies
        .iter()
        .any(|network| network.contains(&peer_ip))
        .then(|| forwarded_client_ip(headers))
        .flatten();

    let user_agent = headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    RequestContext::new(
        Some(forwarded_ip.unwrap_or(peer_ip).to_string()),
        user_agent,
    )
}

fn forwarded_client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|value| value.parse::<IpAddr>().ok())
        .map(|address| address.to_canonical())
}
