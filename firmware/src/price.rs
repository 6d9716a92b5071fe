//! Agile unit rate types and the price fetcher
//!
//! JSON format from the unit rates endpoint (newest first):
//! ```json
//! {"count": 3, "results": [
//!   {"value_exc_vat": 22.5, "value_inc_vat": 23.625,
//!    "valid_from": "2024-01-15T11:30:00Z", "valid_to": "2024-01-15T12:00:00Z"},
//!   ...
//! ]}
//! ```

use core::fmt::{self, Write as FmtWrite};
use core::marker::PhantomData;

use heapless::{String, Vec};
use log::{debug, warn};
use serde::de::{Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::Deserialize;

use crate::config::API_URL;
use crate::window::{MAX_QUERY_LEN, MAX_URL_LEN, TimeWindow};

const _: () = assert!(API_URL.len() + MAX_QUERY_LEN <= MAX_URL_LEN);

/// Rate entries read from a response; the rest of `results` is skipped
pub const RATES_USED: usize = 3;

/// Capacity of a formatted price label; fits any `f32`, e.g. `-f32::MAX`
/// (41 chars) or the smallest subnormal (49 chars)
pub const MAX_LABEL_LEN: usize = 64;

/// Last, current and next half-hour prices (p/kWh inc. VAT)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceSample {
    pub last: f32,
    pub current: f32,
    pub next: f32,
}

impl PriceSample {
    /// Shown when a response could not be parsed
    pub const ZERO: PriceSample = PriceSample {
        last: 0.0,
        current: 0.0,
        next: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Parse a unit rates response, falling back to [`PriceSample::ZERO`]
    pub fn from_json(body: &[u8]) -> Self {
        match parse_unit_rates(body) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Failed to parse unit rates: {}, showing zero prices", e);
                Self::ZERO
            }
        }
    }
}

/// Format a price the way the display shows it (`"23.625p"`, `"0p"`)
pub fn price_label(price: f32) -> String<MAX_LABEL_LEN> {
    let mut label = String::new();
    if write!(label, "{}p", price).is_err() {
        label.clear();
        let _ = label.push_str("?p");
    }
    label
}

/// Price parse error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// Body is not valid JSON of the expected shape
    Json,
    /// Fewer than three rate entries
    MissingResults(usize),
}

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceError::Json => f.write_str("malformed JSON"),
            PriceError::MissingResults(n) => write!(f, "expected 3 results, got {}", n),
        }
    }
}

/// One entry of the `results` array
#[derive(Debug, Deserialize)]
struct UnitRate<'a> {
    value_inc_vat: f32,
    #[serde(default, borrow)]
    valid_from: Option<&'a str>,
}

/// Leading entries of the `results` array
#[derive(Debug)]
struct LeadingRates<'a>(Vec<UnitRate<'a>, RATES_USED>);

impl<'de: 'a, 'a> Deserialize<'de> for LeadingRates<'a> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LeadingVisitor<'a>(PhantomData<&'a ()>);

        impl<'de: 'a, 'a> Visitor<'de> for LeadingVisitor<'a> {
            type Value = LeadingRates<'a>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of unit rates")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut rates = Vec::new();
                while !rates.is_full() {
                    match seq.next_element::<UnitRate<'a>>()? {
                        Some(rate) => {
                            let _ = rates.push(rate);
                        }
                        None => return Ok(LeadingRates(rates)),
                    }
                }
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(LeadingRates(rates))
            }
        }

        deserializer.deserialize_seq(LeadingVisitor(PhantomData))
    }
}

/// Unit rates response body
#[derive(Debug, Deserialize)]
struct UnitRates<'a> {
    #[serde(borrow)]
    results: LeadingRates<'a>,
}

/// Parse a unit rates response into a [`PriceSample`]
///
/// Entries 0, 1 and 2 are taken as next, current and last. If the entries
/// carry `valid_from` stamps that are not newest-first, a warning is logged
/// but the positional reading is kept.
pub fn parse_unit_rates(body: &[u8]) -> Result<PriceSample, PriceError> {
    let (rates, _): (UnitRates, _) =
        serde_json_core::from_slice(body).map_err(|_| PriceError::Json)?;

    let results = &rates.results.0;
    if results.len() < RATES_USED {
        return Err(PriceError::MissingResults(results.len()));
    }

    if !newest_first(results) {
        warn!("Unit rates are not newest-first, prices may be shifted");
    }

    Ok(PriceSample {
        next: results[0].value_inc_vat,
        current: results[1].value_inc_vat,
        last: results[2].value_inc_vat,
    })
}

/// Check `valid_from` ordering (RFC 3339 UTC stamps sort lexically)
fn newest_first(rates: &[UnitRate<'_>]) -> bool {
    rates.windows(2).all(|pair| match (pair[0].valid_from, pair[1].valid_from) {
        (Some(newer), Some(older)) => newer > older,
        _ => true,
    })
}

/// A source of unit rate responses
///
/// Implementations perform the HTTP GET and hand back the raw body.
/// Transport failures are returned as errors; body contents are not checked.
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    type Error: fmt::Debug;

    /// GET `url` and return the response body
    async fn get(&mut self, url: &str) -> Result<&[u8], Self::Error>;
}

/// Fetch the prices around `now` (unix seconds, UTC)
///
/// Parse failures yield [`PriceSample::ZERO`]; transport errors propagate.
pub async fn fetch_prices<S: PriceSource>(
    source: &mut S,
    now: u64,
) -> Result<PriceSample, S::Error> {
    let Some(window) = TimeWindow::from_unix(now) else {
        warn!("Clock value {} out of range, showing zero prices", now);
        return Ok(PriceSample::ZERO);
    };

    let Some(url) = window.request_url(API_URL) else {
        return Ok(PriceSample::ZERO);
    };
    debug!("Fetching prices from {}", url.as_str());

    let body = source.get(&url).await?;
    debug!("Received {} bytes of JSON", body.len());

    Ok(PriceSample::from_json(body))
}
