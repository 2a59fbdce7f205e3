//! Dual-stack listening socket and connection accept.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use anyhow::{Context, anyhow};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use crate::config::FamilyPref;

// Backlog handed to the kernel; clamped by it to net.core.somaxconn.
const LISTEN_BACKLOG: i32 = 1024;

/// Identity of both ends of an accepted connection, captured once at
/// accept time. Diagnostics only.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub peer_addr: String,
    pub peer_port: u16,
    pub peer_dns: String,
    pub local_addr: String,
    pub local_dns: String,
}

/// The server's listening socket.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Binds and listens on the wildcard address for `port`.
    ///
    /// Candidate addresses for the family preference are tried in order;
    /// each gets a fresh socket with `SO_REUSEADDR` (and, for IPv6,
    /// `IPV6_V6ONLY` off so IPv4-mapped peers are accepted). The first
    /// successful bind wins. Failing to bind every candidate, or to mark
    /// the bound socket as listening, fails the whole startup.
    pub fn bind(port: u16, family: FamilyPref) -> anyhow::Result<Listener> {
        let mut last_error = None;

        for candidate in candidates(port, family) {
            match bind_candidate(candidate) {
                Ok(socket) => {
                    socket
                        .listen(LISTEN_BACKLOG)
                        .context("failed to mark socket as listening")?;

                    let std_listener: std::net::TcpListener = socket.into();
                    std_listener
                        .set_nonblocking(true)
                        .context("failed to make listener non-blocking")?;
                    let inner = TcpListener::from_std(std_listener)
                        .context("failed to register listener with the runtime")?;

                    info!(addr = %candidate, "listening socket bound");
                    return Ok(Listener { inner });
                }
                Err(e) => {
                    warn!(addr = %candidate, error = %e, "bind candidate failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("no candidate addresses for port {port}")))
            .context("could not bind the listening socket")
    }

    /// Blocks until a client connects, returning the stream and the
    /// captured endpoint identity.
    ///
    /// Every failure here is terminal for the whole server by design: the
    /// caller is expected to stop accepting rather than retry.
    pub async fn accept(&self) -> anyhow::Result<(TcpStream, Endpoint)> {
        let (stream, peer) = self.inner.accept().await.context("accept failed")?;
        let local = stream
            .local_addr()
            .context("local endpoint lookup failed")?;

        let peer_dns = resolve_name(peer.ip()).await;
        let local_dns = resolve_name(local.ip()).await;

        let endpoint = Endpoint {
            peer_addr: peer.ip().to_string(),
            peer_port: peer.port(),
            peer_dns,
            local_addr: local.ip().to_string(),
            local_dns,
        };

        Ok((stream, endpoint))
    }

    /// The address actually bound; the port differs from the configured
    /// one when binding port 0.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.inner
            .local_addr()
            .context("listener local address lookup failed")
    }
}

fn candidates(port: u16, family: FamilyPref) -> Vec<SocketAddr> {
    let v4 = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let v6 = SocketAddr::from((Ipv6Addr::UNSPECIFIED, port));

    match family {
        FamilyPref::Ipv4 => vec![v4],
        FamilyPref::Ipv6 => vec![v6],
        FamilyPref::Dual => vec![v6, v4],
    }
}

fn bind_candidate(addr: SocketAddr) -> anyhow::Result<Socket> {
    let domain = match addr {
        SocketAddr::V4(_) => Domain::IPV4,
        SocketAddr::V6(_) => Domain::IPV6,
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
        .context("socket creation failed")?;
    socket
        .set_reuse_address(true)
        .context("SO_REUSEADDR failed")?;
    if addr.is_ipv6() {
        // accept IPv4 peers as v4-mapped addresses on the same socket
        socket.set_only_v6(false).context("IPV6_V6ONLY failed")?;
    }
    socket
        .bind(&addr.into())
        .with_context(|| format!("bind to {addr} failed"))?;

    Ok(socket)
}

/// Reverse-resolves an address to a DNS name, falling back to the text
/// form of the address itself.
async fn resolve_name(ip: IpAddr) -> String {
    let text = ip.to_string();
    match tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip)).await {
        Ok(Ok(name)) => name,
        _ => text,
    }
}
