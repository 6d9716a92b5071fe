//! Wall clock derived from a one-shot SNTP sync

/// Source of wall-clock time
pub trait Clock {
    /// Seconds since the unix epoch (UTC)
    fn unix_time(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn unix_time(&self) -> u64 {
        (**self).unix_time()
    }
}

/// Unix time anchored to the uptime counter at the moment of sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    unix_at_sync: u64,
    uptime_ms_at_sync: u64,
}

impl WallClock {
    pub const fn new(unix_at_sync: u64, uptime_ms_at_sync: u64) -> Self {
        Self {
            unix_at_sync,
            uptime_ms_at_sync,
        }
    }

    /// Wall time for the given uptime
    pub fn unix_time_at(&self, uptime_ms: u64) -> u64 {
        let elapsed_ms = uptime_ms.saturating_sub(self.uptime_ms_at_sync);
        self.unix_at_sync + elapsed_ms / 1000
    }
}

/// [`WallClock`] driven by the embassy time driver
#[cfg(feature = "net")]
#[derive(Debug, Clone, Copy)]
pub struct SyncedClock(WallClock);

#[cfg(feature = "net")]
impl SyncedClock {
    /// Anchor `unix_now` to the current instant
    pub fn new(unix_now: u64) -> Self {
        let uptime = embassy_time::Instant::now().as_millis();
        Self(WallClock::new(unix_now, uptime))
    }
}

#[cfg(feature = "net")]
impl Clock for SyncedClock {
    fn unix_time(&self) -> u64 {
        self.0.unix_time_at(embassy_time::Instant::now().as_millis())
    }
}
