//! HTTPS price source over embassy-net
//!
//! Wraps a reqwless client with TLS. Certificates are not verified; the
//! device has no CA store.

use alloc::boxed::Box;
use alloc::vec;

use embedded_nal_async::{Dns, TcpConnect};
use log::debug;
use reqwless::client::{HttpClient, TlsConfig, TlsVerify};
use reqwless::request::Method;

use crate::price::PriceSource;

extern crate alloc;

/// TLS buffer sizes
pub const TLS_READ_BUF_SIZE: usize = 16640;
pub const TLS_WRITE_BUF_SIZE: usize = 4096;

/// Response buffer (headers + body); a three-entry response is well under 2KB
pub const RX_BUF_SIZE: usize = 4096;

/// Unit rates client for the Octopus API
pub struct OctopusClient<'a, T: TcpConnect, D: Dns> {
    tcp: &'a T,
    dns: &'a D,
    tls_read_buf: Box<[u8]>,
    tls_write_buf: Box<[u8]>,
    rx_buf: Box<[u8]>,
    seed: u64,
}

impl<'a, T: TcpConnect, D: Dns> OctopusClient<'a, T, D> {
    /// Create a client; buffers are allocated on the heap
    pub fn new(tcp: &'a T, dns: &'a D, seed: u64) -> Self {
        Self {
            tcp,
            dns,
            tls_read_buf: vec![0u8; TLS_READ_BUF_SIZE].into_boxed_slice(),
            tls_write_buf: vec![0u8; TLS_WRITE_BUF_SIZE].into_boxed_slice(),
            rx_buf: vec![0u8; RX_BUF_SIZE].into_boxed_slice(),
            seed,
        }
    }
}

impl<T: TcpConnect, D: Dns> PriceSource for OctopusClient<'_, T, D> {
    type Error = reqwless::Error;

    async fn get(&mut self, url: &str) -> Result<&[u8], Self::Error> {
        self.seed = self.seed.wrapping_mul(6364136223846793005).wrapping_add(1);

        let tls = TlsConfig::new(
            self.seed,
            &mut self.tls_read_buf,
            &mut self.tls_write_buf,
            TlsVerify::None,
        );
        let mut client = HttpClient::new_with_tls(self.tcp, self.dns, tls);

        let mut request = client.request(Method::GET, url).await?;
        let response = request.send(&mut self.rx_buf).await?;
        debug!("HTTP status {:?}", response.status);

        let body = response.body().read_to_end().await?;
        Ok(body)
    }
}
