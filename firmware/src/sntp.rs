//! Minimal SNTPv4 client
//!
//! One request, one reply, no retries. The reply's transmit timestamp
//! (bytes 40..44, seconds since 1900) becomes the wall clock.

use core::fmt;

/// Size of an SNTP packet without extensions
pub const PACKET_LEN: usize = 48;

/// Seconds between the NTP epoch (1900) and the unix epoch (1970)
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// LI = 0, VN = 4, Mode = 3 (client)
const CLIENT_HEADER: u8 = 0b00_100_011;

const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;

/// SNTP error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SntpError {
    /// Reply shorter than 48 bytes
    Truncated(usize),
    /// Reply is not from a server
    UnexpectedMode(u8),
    /// Stratum 0 (kiss-o'-death)
    KissOfDeath,
    /// Transmit timestamp before the unix epoch
    InvalidTimestamp,
    /// Could not resolve the server name
    Dns,
    /// UDP socket error
    Socket,
    /// No reply in time
    Timeout,
}

impl fmt::Display for SntpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SntpError::Truncated(n) => write!(f, "reply truncated ({} bytes)", n),
            SntpError::UnexpectedMode(m) => write!(f, "unexpected mode {}", m),
            SntpError::KissOfDeath => f.write_str("kiss-o'-death"),
            SntpError::InvalidTimestamp => f.write_str("invalid transmit timestamp"),
            SntpError::Dns => f.write_str("DNS lookup failed"),
            SntpError::Socket => f.write_str("socket error"),
            SntpError::Timeout => f.write_str("timed out"),
        }
    }
}

/// Build a client request packet
pub fn request_packet() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = CLIENT_HEADER;
    packet
}

/// Extract unix seconds from a server reply
pub fn parse_response(reply: &[u8]) -> Result<u64, SntpError> {
    if reply.len() < PACKET_LEN {
        return Err(SntpError::Truncated(reply.len()));
    }

    let mode = reply[0] & 0x07;
    if mode != MODE_SERVER && mode != MODE_BROADCAST {
        return Err(SntpError::UnexpectedMode(mode));
    }

    if reply[1] == 0 {
        return Err(SntpError::KissOfDeath);
    }

    let secs = u32::from_be_bytes([reply[40], reply[41], reply[42], reply[43]]) as u64;
    secs.checked_sub(NTP_UNIX_OFFSET)
        .filter(|&unix| unix > 0)
        .ok_or(SntpError::InvalidTimestamp)
}

#[cfg(feature = "net")]
pub use self::net::query;

#[cfg(feature = "net")]
mod net {
    use embassy_net::dns::DnsQueryType;
    use embassy_net::udp::{PacketMetadata, UdpSocket};
    use embassy_net::{IpAddress, Stack};
    use embassy_time::{Duration, with_timeout};
    use log::{info, warn};

    use super::{PACKET_LEN, SntpError, parse_response, request_packet};
    use crate::config::NTP_PORT;

    /// Receive timeout for the reply
    const REPLY_TIMEOUT_SECS: u64 = 5;

    /// Query `host` once and return unix seconds
    pub async fn query(stack: Stack<'_>, host: &str) -> Result<u64, SntpError> {
        let addrs = stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(|_| SntpError::Dns)?;
        let server: IpAddress = *addrs.first().ok_or(SntpError::Dns)?;

        let mut rx_meta = [PacketMetadata::EMPTY; 1];
        let mut rx_buffer = [0u8; 128];
        let mut tx_meta = [PacketMetadata::EMPTY; 1];
        let mut tx_buffer = [0u8; 128];

        let mut socket = UdpSocket::new(
            stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|_| SntpError::Socket)?;

        info!("SNTP: querying {} ({})", host, server);
        socket
            .send_to(&request_packet(), (server, NTP_PORT))
            .await
            .map_err(|_| SntpError::Socket)?;

        let mut reply = [0u8; PACKET_LEN];
        let (len, _) = match with_timeout(
            Duration::from_secs(REPLY_TIMEOUT_SECS),
            socket.recv_from(&mut reply),
        )
        .await
        {
            Ok(Ok(r)) => r,
            Ok(Err(_)) => return Err(SntpError::Socket),
            Err(_) => {
                warn!("SNTP: no reply from {} in {}s", host, REPLY_TIMEOUT_SECS);
                return Err(SntpError::Timeout);
            }
        };

        parse_response(&reply[..len])
    }
}
