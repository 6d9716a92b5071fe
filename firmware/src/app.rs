//! Render loop state and step function
//!
//! The firmware loop is:
//! 1. `App::next_frame` reads the clock and refreshes prices when a period
//!    has passed since the last refresh
//! 2. The returned [`Frame`] is drawn into the framebuffer
//! 3. The framebuffer is pushed to the panel

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::DrawTarget;
use log::info;

use crate::clock::Clock;
use crate::config::REFRESH_INTERVAL_SECS;
use crate::layout;
use crate::price::{PriceSample, PriceSource, fetch_prices};

/// Prices on screen and when they were fetched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppState {
    pub prices: PriceSample,
    /// Unix seconds of the last refresh attempt
    pub last_updated: u64,
}

impl AppState {
    pub fn new(prices: PriceSample, last_updated: u64) -> Self {
        Self {
            prices,
            last_updated,
        }
    }

    /// A full refresh interval has elapsed since the last refresh
    pub fn needs_refresh(&self, now: u64) -> bool {
        now.saturating_sub(self.last_updated) >= REFRESH_INTERVAL_SECS
    }
}

/// Everything one drawn frame shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub prices: PriceSample,
}

impl Frame {
    /// Draw the price screen onto `target`
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        layout::draw_prices(target, &self.prices)
    }
}

/// Advance the loop by one frame
///
/// Refreshes the prices when [`REFRESH_INTERVAL_SECS`] have elapsed since
/// `state.last_updated`. Parse failures are already folded into
/// [`PriceSample::ZERO`]; only transport errors are returned.
pub async fn render_frame<S: PriceSource>(
    state: AppState,
    now: u64,
    source: &mut S,
) -> Result<(AppState, Frame), S::Error> {
    let state = if state.needs_refresh(now) {
        let prices = fetch_prices(source, now).await?;
        info!(
            "Prices refreshed: last={} now={} next={}",
            prices.last, prices.current, prices.next
        );
        AppState::new(prices, now)
    } else {
        state
    };

    Ok((
        state,
        Frame {
            prices: state.prices,
        },
    ))
}

/// Clock, price source and loop state
pub struct App<C, S> {
    clock: C,
    source: S,
    state: AppState,
}

impl<C: Clock, S: PriceSource> App<C, S> {
    /// Fetch the initial prices and start the refresh timer
    pub async fn start(clock: C, mut source: S) -> Result<Self, S::Error> {
        let now = clock.unix_time();
        let prices = fetch_prices(&mut source, now).await?;
        info!(
            "Initial prices: last={} now={} next={}",
            prices.last, prices.current, prices.next
        );

        Ok(Self {
            clock,
            source,
            state: AppState::new(prices, now),
        })
    }

    /// Run one step of the render loop
    pub async fn next_frame(&mut self) -> Result<Frame, S::Error> {
        let now = self.clock.unix_time();
        let (state, frame) = render_frame(self.state, now, &mut self.source).await?;
        self.state = state;
        Ok(frame)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
