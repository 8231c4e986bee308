//! Computed CSS color parsing
//!
//! Hosts report backgrounds the way `getComputedStyle` does, so the accepted
//! forms are the ones a resolved style can take:
//!
//! - `rgb(r, g, b)` / `rgba(r, g, b, a)` (comma separated)
//! - `rgb(r g b / a)` (space separated, optional slash alpha)
//! - percentage channels and alpha: `rgb(100%, 0%, 0%)`, `rgb(0 0 0 / 50%)`
//! - hex: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
//! - `transparent` and a handful of named colors
//!
//! Channels are clamped to `0..=255` and alpha to `0.0..=1.0`.

use navtint_core::ColorSample;
use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map_opt, opt, value, verify},
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};
use thiserror::Error;

/// Why a color string could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,

    #[error("unrecognized color: {0}")]
    Unrecognized(String),
}

type ParseResult<'a, O> = IResult<&'a str, O>;

/// Parse a resolved CSS color string
pub fn parse_color(input: &str) -> Result<ColorSample, ColorParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ColorParseError::Empty);
    }

    if let Some(color) = parse_named_color(input) {
        return Ok(color);
    }

    match alt((parse_hex_color, parse_rgb_function))(input) {
        Ok((rest, color)) if rest.trim().is_empty() => Ok(color),
        _ => Err(ColorParseError::Unrecognized(input.to_string())),
    }
}

/// Parse hex color: #RGB, #RGBA, #RRGGBB, or #RRGGBBAA
fn parse_hex_color(input: &str) -> ParseResult<'_, ColorSample> {
    map_opt(
        preceded(char('#'), take_while1(|c: char| c.is_ascii_hexdigit())),
        decode_hex,
    )(input)
}

fn decode_hex(hex: &str) -> Option<ColorSample> {
    let pair = |s: &str| u8::from_str_radix(s, 16).ok();
    let short = |s: &str| u8::from_str_radix(&s.repeat(2), 16).ok();

    match hex.len() {
        3 => Some(ColorSample::rgb(
            short(&hex[0..1])?,
            short(&hex[1..2])?,
            short(&hex[2..3])?,
        )),
        4 => Some(ColorSample::rgba(
            short(&hex[0..1])?,
            short(&hex[1..2])?,
            short(&hex[2..3])?,
            short(&hex[3..4])? as f32 / 255.0,
        )),
        6 => Some(ColorSample::rgb(
            pair(&hex[0..2])?,
            pair(&hex[2..4])?,
            pair(&hex[4..6])?,
        )),
        8 => Some(ColorSample::rgba(
            pair(&hex[0..2])?,
            pair(&hex[2..4])?,
            pair(&hex[4..6])?,
            pair(&hex[6..8])? as f32 / 255.0,
        )),
        _ => None,
    }
}

/// Parse rgb()/rgba() in either comma or space separated syntax
fn parse_rgb_function(input: &str) -> ParseResult<'_, ColorSample> {
    let (input, _) = alt((tag_no_case("rgba"), tag_no_case("rgb")))(input)?;
    let (input, _) = tuple((multispace0, char('('), multispace0))(input)?;
    let (input, r) = channel(input)?;
    let (input, _) = channel_separator(input)?;
    let (input, g) = channel(input)?;
    let (input, _) = channel_separator(input)?;
    let (input, b) = channel(input)?;
    let (input, a) = opt(preceded(alt((separator(','), separator('/'))), alpha))(input)?;
    let (input, _) = tuple((multispace0, char(')')))(input)?;

    Ok((input, ColorSample::rgba(r, g, b, a.unwrap_or(1.0))))
}

/// A number, excluding `nan` and `inf` spellings
fn finite(input: &str) -> ParseResult<'_, f32> {
    verify(float, |v: &f32| v.is_finite())(input)
}

fn channel(input: &str) -> ParseResult<'_, u8> {
    let (input, raw) = finite(input)?;
    let (input, percent) = opt(char('%'))(input)?;
    let raw = if percent.is_some() {
        raw * 255.0 / 100.0
    } else {
        raw
    };
    Ok((input, raw.round().clamp(0.0, 255.0) as u8))
}

fn alpha(input: &str) -> ParseResult<'_, f32> {
    let (input, raw) = finite(input)?;
    let (input, percent) = opt(char('%'))(input)?;
    let raw = if percent.is_some() { raw / 100.0 } else { raw };
    Ok((input, raw.clamp(0.0, 1.0)))
}

fn separator<'a>(sep: char) -> impl FnMut(&'a str) -> ParseResult<'a, ()> {
    value((), tuple((multispace0, char(sep), multispace0)))
}

fn channel_separator(input: &str) -> ParseResult<'_, ()> {
    alt((separator(','), value((), multispace1)))(input)
}

/// Parse named colors
fn parse_named_color(name: &str) -> Option<ColorSample> {
    match name.to_ascii_lowercase().as_str() {
        "transparent" => Some(ColorSample::TRANSPARENT),
        "white" => Some(ColorSample::rgb(255, 255, 255)),
        "black" => Some(ColorSample::rgb(0, 0, 0)),
        "red" => Some(ColorSample::rgb(255, 0, 0)),
        "green" => Some(ColorSample::rgb(0, 128, 0)),
        "blue" => Some(ColorSample::rgb(0, 0, 255)),
        "navy" => Some(ColorSample::rgb(0, 0, 128)),
        "gray" | "grey" => Some(ColorSample::rgb(128, 128, 128)),
        "silver" => Some(ColorSample::rgb(192, 192, 192)),
        "whitesmoke" => Some(ColorSample::rgb(245, 245, 245)),
        _ => None,
    }
}
