#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod app;
pub mod clock;
pub mod config;
pub mod framebuffer;
#[cfg(feature = "net")]
pub mod http;
pub mod layout;
pub mod lcd;
pub mod network;
pub mod price;
pub mod sntp;
pub mod window;
