// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage address parsing
//!
//! Addresses are scheme-prefixed URLs: `file://<path>` for local
//! single-process storage, `net://host:port` for a storage server over
//! TCP, and `net:///abs/path` for one behind a local socket.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// Local single-process database directory.
    File(PathBuf),
    /// Storage server reached over TCP.
    Tcp(String, u16),
    /// Storage server behind a local socket.
    Socket(PathBuf),
}

impl Address {
    pub fn parse(s: &str) -> StoreResult<Self> {
        if s.matches("://").count() != 1 {
            return Err(StoreError::BadAddress(format!(
                "bad connection string: '{}'",
                s
            )));
        }
        let (scheme, loc) = s
            .split_once("://")
            .ok_or_else(|| StoreError::BadAddress(format!("bad connection string: '{}'", s)))?;
        match scheme {
            "file" => {
                if loc.is_empty() {
                    return Err(StoreError::BadAddress("empty file path".to_string()));
                }
                Ok(Address::File(PathBuf::from(loc)))
            }
            "net" => {
                if let Some((host, port)) = loc.rsplit_once(':') {
                    if host.is_empty() || host.contains(':') {
                        return Err(StoreError::BadAddress(format!(
                            "malformed host:port address: '{}'",
                            loc
                        )));
                    }
                    let port: u16 = port.parse().map_err(|_| {
                        StoreError::BadAddress(format!("bad port number: '{}'", port))
                    })?;
                    Ok(Address::Tcp(host.to_string(), port))
                } else {
                    if !loc.starts_with('/') {
                        return Err(StoreError::BadAddress(format!(
                            "socket path not absolute: '{}'",
                            loc
                        )));
                    }
                    Ok(Address::Socket(PathBuf::from(loc)))
                }
            }
            other => Err(StoreError::BadAddress(format!(
                "unsupported connection type: '{}'",
                other
            ))),
        }
    }
}

impl FromStr for Address {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::File(path) => write!(f, "file://{}", path.display()),
            Address::Tcp(host, port) => write!(f, "net://{}:{}", host, port),
            Address::Socket(path) => write!(f, "net://{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_addresses() {
        assert_eq!(
            Address::parse("file:///tmp/db").unwrap(),
            Address::File(PathBuf::from("/tmp/db"))
        );
        assert_eq!(
            Address::parse("file://catalog.db").unwrap(),
            Address::File(PathBuf::from("catalog.db"))
        );
    }

    #[test]
    fn net_addresses() {
        assert_eq!(
            Address::parse("net://localhost:9100").unwrap(),
            Address::Tcp("localhost".to_string(), 9100)
        );
        assert_eq!(
            Address::parse("net:///var/run/store.sock").unwrap(),
            Address::Socket(PathBuf::from("/var/run/store.sock"))
        );
    }

    #[test]
    fn rejects_malformed() {
        assert!(Address::parse("/tmp/db").is_err());
        assert!(Address::parse("zeo://x").is_err());
        assert!(Address::parse("net://host:notaport").is_err());
        assert!(Address::parse("net://host:99999").is_err());
        assert!(Address::parse("net://relative/sock").is_err());
        assert!(Address::parse("file://a://b").is_err());
    }
}
