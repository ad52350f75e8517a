use std::collections::HashSet;

use actix_web::HttpRequest;
use anyhow::Result;
use log::warn;

use super::{Authenticator, AuthnResponse, AuthnUserInfo};

/// Restricts global admins to the configured client addresses. Other users
/// pass through untouched.
pub struct AdminAuthenticator {
    allow_list: HashSet<String>,
}

impl AdminAuthenticator {
    pub fn new(allow_list: HashSet<String>) -> Self {
        Self { allow_list }
    }

    pub fn is_allowed(allow_list: &HashSet<String>, addr: Option<&str>) -> bool {
        if allow_list.contains("*") {
            return true;
        }
        match addr {
            Some(addr) => allow_list.contains(addr),
            None => false,
        }
    }
}

impl Authenticator for AdminAuthenticator {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse> {
        let user = match user {
            Some(user) => user,
            None => return Ok(AuthnResponse::Continue),
        };

        if !user.rank.is_global_admin() {
            return Ok(AuthnResponse::Ok(user));
        }

        let conn_info = req.connection_info();
        let addr = conn_info.peer_addr().map(peer_host);
        if Self::is_allowed(&self.allow_list, addr) {
            return Ok(AuthnResponse::Ok(user));
        }

        warn!(
            "Reject admin '{}' from address {:?}, not in allow list",
            user.name, addr
        );
        Ok(AuthnResponse::Unauthenticated)
    }
}

/// Strips the port from a peer address, keeping IPv6 hosts intact.
pub fn peer_host(addr: &str) -> &str {
    if let Some(rest) = addr.strip_prefix('[') {
        if let Some((host, _)) = rest.split_once(']') {
            return host;
        }
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => host,
        _ => addr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_host() {
        assert_eq!(peer_host("127.0.0.1:8080"), "127.0.0.1");
        assert_eq!(peer_host("127.0.0.1"), "127.0.0.1");
        assert_eq!(peer_host("[::1]:8080"), "::1");
        assert_eq!(peer_host("::1"), "::1");
    }

    #[test]
    fn test_is_allowed() {
        let all: HashSet<String> = [String::from("*")].into_iter().collect();
        assert!(AdminAuthenticator::is_allowed(&all, None));
        assert!(AdminAuthenticator::is_allowed(&all, Some("10.0.0.1")));

        let local: HashSet<String> = [String::from("127.0.0.1")].into_iter().collect();
        assert!(AdminAuthenticator::is_allowed(&local, Some("127.0.0.1")));
        assert!(!AdminAuthenticator::is_allowed(&local, Some("10.0.0.1")));
        assert!(!AdminAuthenticator::is_allowed(&local, None));

        let none = HashSet::new();
        assert!(!AdminAuthenticator::is_allowed(&none, Some("127.0.0.1")));
    }
}
