/// RGBA colors and the CSS-like color string parser
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{alpha1, char, hex_digit1, multispace0},
    combinator::{all_consuming, map, map_opt},
    number::complete::double,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use std::str::FromStr;

use crate::error::{Error, Result};

/// A color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 0.5, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Self = Self::rgb(1.0, 0.0, 1.0);
    pub const GRAY: Self = Self::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (byte(self.r), byte(self.g), byte(self.b))
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Clamps every channel into `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// Relative luminance (Rec. 709 weights).
    pub fn luminance(&self) -> f64 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(..)`, `rgba(..)` or a basic color name.
    pub fn parse(input: &str) -> Result<Color> {
        match all_consuming(delimited(multispace0, color, multispace0))(input) {
            Ok((_, color)) => Ok(color),
            Err(_) => Err(Error::InvalidColor(input.to_string())),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

fn color(input: &str) -> IResult<&str, Color> {
    alt((hex_color, rgba_color, rgb_color, named_color))(input)
}

fn hex_color(input: &str) -> IResult<&str, Color> {
    map_opt(preceded(char('#'), hex_digit1), |digits: &str| {
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            3 => {
                let expand = |v: u32| ((v & 0xf) * 0x11) as u8;
                Some(Color::from_rgb8(
                    expand(value >> 8),
                    expand(value >> 4),
                    expand(value),
                ))
            }
            6 => Some(Color::from_rgb8(
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            )),
            _ => None,
        }
    })(input)
}

fn channel(input: &str) -> IResult<&str, f64> {
    delimited(multispace0, double, multispace0)(input)
}

fn rgb_color(input: &str) -> IResult<&str, Color> {
    map(
        preceded(
            tag_no_case("rgb"),
            delimited(
                char('('),
                tuple((
                    channel,
                    preceded(char(','), channel),
                    preceded(char(','), channel),
                )),
                char(')'),
            ),
        ),
        |(r, g, b)| Color::rgb(r / 255.0, g / 255.0, b / 255.0).clamped(),
    )(input)
}

fn rgba_color(input: &str) -> IResult<&str, Color> {
    map(
        preceded(
            tag_no_case("rgba"),
            delimited(
                char('('),
                tuple((
                    channel,
                    preceded(char(','), channel),
                    preceded(char(','), channel),
                    preceded(char(','), channel),
                )),
                char(')'),
            ),
        ),
        |(r, g, b, a)| Color::rgba(r / 255.0, g / 255.0, b / 255.0, a).clamped(),
    )(input)
}

fn named_color(input: &str) -> IResult<&str, Color> {
    map_opt(alpha1, |name: &str| {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::RED,
            "green" => Color::GREEN,
            "blue" => Color::BLUE,
            "yellow" => Color::YELLOW,
            "cyan" | "aqua" => Color::CYAN,
            "magenta" | "fuchsia" => Color::MAGENTA,
            "gray" | "grey" => Color::GRAY,
            "orange" => Color::from_rgb8(255, 165, 0),
            "purple" => Color::from_rgb8(128, 0, 128),
            _ => return None,
        };
        Some(color)
    })(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse("#ff0000").unwrap(), Color::RED);
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse(" #00F ").unwrap(), Color::BLUE);
        assert!(Color::parse("#ff00").is_err());
    }

    #[test]
    fn test_parse_functional() {
        assert_eq!(Color::parse("rgb(255, 255, 0)").unwrap(), Color::YELLOW);
        let c: Color = "rgba(0,0,255,0.5)".parse().unwrap();
        assert_eq!(c, Color::BLUE.with_alpha(0.5));
        assert!(Color::parse("rgb(1,2)").is_err());
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Color::parse("Grey").unwrap(), Color::GRAY);
        assert_eq!(
            Color::parse("chartreuse-ish"),
            Err(Error::InvalidColor("chartreuse-ish".to_string()))
        );
    }

    #[test]
    fn test_rgb8_round_trip() {
        let c = Color::from_rgb8(12, 200, 99);
        assert_eq!(c.to_rgb8(), (12, 200, 99));
    }
}
