//! Network bootstrap
//!
//! Validates credentials, starts association and polls the link once a
//! second until it reports an address or the poll budget runs out.

use core::fmt;
use core::net::Ipv4Addr;

use embedded_hal_async::delay::DelayNs;
use log::info;

use crate::config::{CONNECT_POLL_INTERVAL_MS, CONNECT_POLL_LIMIT, ConfigError, Credentials};

/// A wireless station interface
#[allow(async_fn_in_trait)]
pub trait WifiLink {
    type Error: fmt::Debug;

    /// Configure the station and associate
    ///
    /// A rejected association is an error; DHCP is left to the polls.
    async fn begin(&mut self, credentials: &Credentials<'_>) -> Result<(), Self::Error>;

    /// Associated and holding an IPv4 lease
    async fn is_connected(&mut self) -> bool;

    /// Address assigned by DHCP, once connected
    fn local_address(&self) -> Option<Ipv4Addr>;
}

/// Bootstrap error types
#[derive(Debug, PartialEq, Eq)]
pub enum BootstrapError<E> {
    /// Credentials rejected before touching the radio
    Config(ConfigError),
    /// The link driver failed to start
    Link(E),
    /// No connection after the poll budget
    Timeout { polls: u32 },
}

impl<E> From<ConfigError> for BootstrapError<E> {
    fn from(e: ConfigError) -> Self {
        BootstrapError::Config(e)
    }
}

impl<E: fmt::Debug> fmt::Display for BootstrapError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(e) => write!(f, "configuration error: {}", e),
            BootstrapError::Link(e) => write!(f, "link error: {:?}", e),
            BootstrapError::Timeout { polls } => write!(
                f,
                "unable to connect after {} attempts, check WIFI_SSID and WIFI_PASS",
                polls
            ),
        }
    }
}

/// Join the network named by `ssid`
///
/// Returns the assigned address. Empty credentials fail before the link is
/// touched; otherwise the link is polled at most [`CONNECT_POLL_LIMIT`] times.
pub async fn connect<L, D>(
    link: &mut L,
    delay: &mut D,
    ssid: &str,
    password: &str,
) -> Result<Ipv4Addr, BootstrapError<L::Error>>
where
    L: WifiLink,
    D: DelayNs,
{
    let credentials = Credentials::new(ssid, password)?;
    link.begin(&credentials).await.map_err(BootstrapError::Link)?;

    for attempt in 1..=CONNECT_POLL_LIMIT {
        if link.is_connected().await
            && let Some(address) = link.local_address()
        {
            info!("Connected to {}, address {}", credentials.ssid(), address);
            return Ok(address);
        }

        info!(
            "Attempting connection to {} ({}/{})",
            credentials.ssid(),
            attempt,
            CONNECT_POLL_LIMIT
        );
        delay.delay_ms(CONNECT_POLL_INTERVAL_MS).await;
    }

    Err(BootstrapError::Timeout {
        polls: CONNECT_POLL_LIMIT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    /// Link that comes up on a given poll (1-based), or never
    struct FakeLink {
        up_on_poll: Option<u32>,
        begin_calls: u32,
        polls: u32,
        begin_error: Option<&'static str>,
    }

    impl FakeLink {
        fn new(up_on_poll: Option<u32>) -> Self {
            Self {
                up_on_poll,
                begin_calls: 0,
                polls: 0,
                begin_error: None,
            }
        }
    }

    impl WifiLink for FakeLink {
        type Error = &'static str;

        async fn begin(&mut self, _credentials: &Credentials<'_>) -> Result<(), Self::Error> {
            self.begin_calls += 1;
            match self.begin_error {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        async fn is_connected(&mut self) -> bool {
            self.polls += 1;
            self.up_on_poll.is_some_and(|n| self.polls >= n)
        }

        fn local_address(&self) -> Option<Ipv4Addr> {
            self.up_on_poll
                .filter(|&n| self.polls >= n)
                .map(|_| Ipv4Addr::new(192, 168, 1, 42))
        }
    }

    /// Records requested delays without sleeping
    #[derive(Default)]
    struct FakeDelay {
        total_ms: u64,
    }

    impl DelayNs for FakeDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.total_ms += ns as u64 / 1_000_000;
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms as u64;
        }
    }

    #[test]
    fn test_connect_immediately() {
        let mut link = FakeLink::new(Some(1));
        let mut delay = FakeDelay::default();

        let addr = block_on(connect(&mut link, &mut delay, "home", "hunter22")).unwrap();
        assert_eq!(addr, Ipv4Addr::new(192, 168, 1, 42));
        assert_eq!(link.begin_calls, 1);
        assert_eq!(link.polls, 1);
        assert_eq!(delay.total_ms, 0);
    }

    #[test]
    fn test_connect_on_last_poll() {
        let mut link = FakeLink::new(Some(10));
        let mut delay = FakeDelay::default();

        let result = block_on(connect(&mut link, &mut delay, "home", "hunter22"));
        assert!(result.is_ok());
        assert_eq!(link.polls, 10);
        assert_eq!(delay.total_ms, 9_000);
    }

    #[test]
    fn test_connect_times_out_after_ten_polls() {
        let mut link = FakeLink::new(None);
        let mut delay = FakeDelay::default();

        let result = block_on(connect(&mut link, &mut delay, "home", "hunter22"));
        assert_eq!(result, Err(BootstrapError::Timeout { polls: 10 }));
        assert_eq!(link.polls, 10);
        assert_eq!(delay.total_ms, 10_000);
    }

    #[test]
    fn test_connect_too_late() {
        let mut link = FakeLink::new(Some(11));
        let mut delay = FakeDelay::default();

        let result = block_on(connect(&mut link, &mut delay, "home", "hunter22"));
        assert_eq!(result, Err(BootstrapError::Timeout { polls: 10 }));
        assert_eq!(link.polls, 10);
    }

    #[test]
    fn test_empty_credentials_never_touch_link() {
        let mut link = FakeLink::new(Some(1));
        let mut delay = FakeDelay::default();

        let result = block_on(connect(&mut link, &mut delay, "", "hunter22"));
        assert_eq!(result, Err(BootstrapError::Config(ConfigError::EmptySsid)));

        let result = block_on(connect(&mut link, &mut delay, "home", ""));
        assert_eq!(result, Err(BootstrapError::Config(ConfigError::EmptyPassword)));

        assert_eq!(link.begin_calls, 0);
        assert_eq!(link.polls, 0);
    }

    #[test]
    fn test_link_start_failure() {
        let mut link = FakeLink::new(Some(1));
        link.begin_error = Some("radio init failed");
        let mut delay = FakeDelay::default();

        let result = block_on(connect(&mut link, &mut delay, "home", "hunter22"));
        assert_eq!(result, Err(BootstrapError::Link("radio init failed")));
        assert_eq!(link.polls, 0);
    }

    #[test]
    fn test_rejected_association_is_reported_immediately() {
        let mut link = FakeLink::new(None);
        link.begin_error = Some("auth failed");
        let mut delay = FakeDelay::default();

        let result = block_on(connect(&mut link, &mut delay, "home", "wrongpass"));
        assert_eq!(result, Err(BootstrapError::Link("auth failed")));
        assert_eq!(link.begin_calls, 1);
        assert_eq!(link.polls, 0);
        assert_eq!(delay.total_ms, 0);
    }
}
