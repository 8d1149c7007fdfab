use std::net::{SocketAddr, UdpSocket};

use tracing::debug;

/// Synchronous probe of current network availability.
///
/// The pagination path queries this fresh before every fetch attempt;
/// implementations must not cache or debounce the answer.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Checks for a usable transport by opening a connected UDP socket toward
/// a public resolver. No datagram leaves the machine; the connect call
/// only asks the OS routing table whether any interface could carry the
/// traffic, so the probe stays cheap enough to run per pagination attempt.
#[derive(Debug, Clone)]
pub struct RouteProbe {
    probe_addr: SocketAddr,
}

impl RouteProbe {
    pub fn new(probe_addr: SocketAddr) -> Self {
        Self { probe_addr }
    }
}

impl Default for RouteProbe {
    fn default() -> Self {
        // Cloudflare DNS; any stable public anycast address works here.
        Self::new(SocketAddr::from(([1, 1, 1, 1], 53)))
    }
}

impl Connectivity for RouteProbe {
    fn is_online(&self) -> bool {
        let socket = match UdpSocket::bind(("0.0.0.0", 0)) {
            Ok(socket) => socket,
            Err(err) => {
                debug!(%err, "connectivity probe could not bind a socket");
                return false;
            }
        };
        match socket.connect(self.probe_addr) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, addr = %self.probe_addr, "no route to probe address");
                false
            }
        }
    }
}
