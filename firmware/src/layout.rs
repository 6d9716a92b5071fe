//! Screen layout for the price display
//!
//! ```text
//! +---------------------------+
//! |  last:                    |   orange background with a lighter
//! |  19.005p                  |   circle bulging in from the left edge
//! |  Now:                     |
//! |  21p         (shadowed)   |
//! |  Next:                    |
//! |  23.625p                  |
//! +---------------------------+
//! ```
//!
//! Coordinates are text baselines.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_10X20},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, PrimitiveStyle},
    text::Text,
};
use profont::PROFONT_24_POINT;

use crate::price::{PriceSample, price_label};

/// Background, rgb(255, 99, 71)
pub const ORANGE: Rgb565 = Rgb565::new(31, 24, 9);
/// "last" text, rgb(255, 149, 121)
pub const ORANGE_2: Rgb565 = Rgb565::new(31, 37, 15);
/// "next" and splash text, rgb(255, 119, 91)
pub const ORANGE_3: Rgb565 = Rgb565::new(31, 29, 11);
/// Decorative circle, rgb(255, 169, 141)
pub const ORANGE_4: Rgb565 = Rgb565::new(31, 42, 17);
pub const WHITE: Rgb565 = Rgb565::WHITE;
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Left margin for all labels
pub const MARGIN: i32 = 15;

/// Offset of the drop shadow behind the current price
pub const SHADOW_OFFSET: i32 = 2;

/// Radius of the decorative circle
pub const CIRCLE_RADIUS: u32 = 190;

const SMALL_FONT: &MonoFont<'static> = &FONT_10X20;
const LARGE_FONT: &MonoFont<'static> = &PROFONT_24_POINT;

const LAST_LABEL_Y: i32 = 50;
const LAST_VALUE_Y: i32 = 70;
const NOW_LABEL_Y: i32 = 120;
const NOW_VALUE_Y: i32 = 160;
const NEXT_LABEL_Y: i32 = 195;
const NEXT_VALUE_Y: i32 = 215;

/// Draw the background and the decorative circle
fn draw_background<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(ORANGE)?;

    let center_y = (target.bounding_box().size.height / 2) as i32;
    Circle::with_center(Point::new(0, center_y), CIRCLE_RADIUS * 2)
        .into_styled(PrimitiveStyle::with_fill(ORANGE_4))
        .draw(target)?;

    Ok(())
}

fn draw_text<D>(
    target: &mut D,
    text: &str,
    x: i32,
    y: i32,
    font: &MonoFont<'_>,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Text::new(text, Point::new(x, y), MonoTextStyle::new(font, color)).draw(target)?;
    Ok(())
}

/// Draw text in `color` over a black copy offset down and right
fn draw_shadowed_text<D>(
    target: &mut D,
    text: &str,
    y: i32,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_text(
        target,
        text,
        MARGIN + SHADOW_OFFSET,
        y + SHADOW_OFFSET,
        LARGE_FONT,
        BLACK,
    )?;
    draw_text(target, text, MARGIN, y, LARGE_FONT, color)
}

/// Draw the full price screen
pub fn draw_prices<D>(target: &mut D, prices: &PriceSample) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_background(target)?;

    draw_text(target, "last:", MARGIN, LAST_LABEL_Y, SMALL_FONT, ORANGE_2)?;
    draw_text(
        target,
        &price_label(prices.last),
        MARGIN,
        LAST_VALUE_Y,
        SMALL_FONT,
        ORANGE_2,
    )?;

    draw_shadowed_text(target, "Now:", NOW_LABEL_Y, WHITE)?;
    draw_shadowed_text(target, &price_label(prices.current), NOW_VALUE_Y, WHITE)?;

    draw_text(target, "Next:", MARGIN, NEXT_LABEL_Y, SMALL_FONT, ORANGE_3)?;
    draw_text(
        target,
        &price_label(prices.next),
        MARGIN,
        NEXT_VALUE_Y,
        SMALL_FONT,
        ORANGE_3,
    )
}

/// Start-up screen shown until the first prices arrive
pub fn draw_splash<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(ORANGE)?;
    draw_text(target, "Getting prices...", 10, 92, SMALL_FONT, ORANGE_3)
}
