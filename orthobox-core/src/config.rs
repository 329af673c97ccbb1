/// Sandbox configuration and its `key = value` file format
use std::fmt;
use std::path::Path;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{alpha1, alphanumeric1, char, not_line_ending, space0},
    combinator::{map, opt, recognize},
    multi::{many0_count, separated_list1},
    number::complete::double,
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::draw::{RenderContext, Rgba, BLACK};
use crate::projection::{Viewport, WorldWindow};
use crate::scene::SceneKind;

/// Window placement requested by the sandbox
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 480,
            x: 50,
            y: 100,
            title: "OpenGL Window".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub window: WindowConfig,
    pub world: WorldWindow,
    /// Cube rotation about Y, in degrees
    pub angle_y: f64,
    /// Cube rotation about X, in degrees
    pub angle_x: f64,
    pub point_size: f32,
    pub line_width: f32,
    pub clear_color: Rgba,
    pub draw_color: Rgba,
    pub depth_test: bool,
    pub scene: SceneKind,
    /// `env_logger` filter; `RUST_LOG` applies when unset
    pub log_filter: Option<String>,
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            world: WorldWindow::default(),
            angle_y: 45.0,
            angle_x: 45.0,
            point_size: 4.0,
            line_width: 10.0,
            clear_color: [1.0, 1.0, 1.0, 0.3],
            draw_color: BLACK,
            depth_test: false,
            scene: SceneKind::Lines,
            log_filter: None,
            log_file: "orthobox.log".to_string(),
        }
    }
}

impl Config {
    /// Cube angles (about Y, about X) in radians
    pub fn cube_angles(&self) -> (f64, f64) {
        (self.angle_y.to_radians(), self.angle_x.to_radians())
    }

    /// Initial drawing state for a window of the given size
    pub fn render_context(&self, window_width: u32, window_height: u32) -> RenderContext {
        RenderContext {
            color: self.draw_color,
            clear_color: self.clear_color,
            point_size: self.point_size,
            line_width: self.line_width,
            depth_test: self.depth_test,
            ..RenderContext::new(self.world, Viewport::full(window_width, window_height))
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        let config = Self::parse(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a config file; keys not mentioned keep their defaults
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (key, value) = match parse_entry(trimmed) {
                Ok(("", entry)) => entry,
                Ok((rest, _)) => {
                    return Err(ConfigError::Syntax {
                        line,
                        message: format!("unexpected trailing input `{rest}`"),
                    })
                }
                Err(_) => {
                    return Err(ConfigError::Syntax {
                        line,
                        message: "expected `key = value`".to_string(),
                    })
                }
            };

            config.assign(key, value).map_err(|err| match err {
                EntryError::UnknownKey => ConfigError::UnknownKey {
                    line,
                    key: key.to_string(),
                },
                EntryError::Invalid(message) => ConfigError::InvalidValue {
                    line,
                    key: key.to_string(),
                    message: message.to_string(),
                },
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    fn assign(&mut self, key: &str, value: Value) -> Result<(), EntryError> {
        match key {
            "window_width" => self.window.width = value.dimension().ok_or(expected::DIMENSION)?,
            "window_height" => self.window.height = value.dimension().ok_or(expected::DIMENSION)?,
            "window_x" => self.window.x = value.integer().ok_or(expected::INTEGER)?,
            "window_y" => self.window.y = value.integer().ok_or(expected::INTEGER)?,
            "title" => self.window.title = value.text().ok_or(expected::TEXT)?,
            "world_min_x" => self.world.min_x = value.number().ok_or(expected::NUMBER)? as f32,
            "world_max_x" => self.world.max_x = value.number().ok_or(expected::NUMBER)? as f32,
            "world_min_y" => self.world.min_y = value.number().ok_or(expected::NUMBER)? as f32,
            "world_max_y" => self.world.max_y = value.number().ok_or(expected::NUMBER)? as f32,
            "angle_y" => self.angle_y = value.number().ok_or(expected::ANGLE)?,
            "angle_x" => self.angle_x = value.number().ok_or(expected::ANGLE)?,
            "point_size" => self.point_size = value.size().ok_or(expected::SIZE)?,
            "line_width" => self.line_width = value.size().ok_or(expected::SIZE)?,
            "clear_color" => self.clear_color = value.color().ok_or(expected::COLOR)?,
            "draw_color" => self.draw_color = value.color().ok_or(expected::COLOR)?,
            "depth_test" => self.depth_test = value.flag().ok_or(expected::FLAG)?,
            "scene" => {
                let name = value.text().ok_or(expected::TEXT)?;
                self.scene = name.parse().map_err(|_| "unknown scene")?;
            }
            "log_filter" => self.log_filter = Some(value.text().ok_or(expected::TEXT)?),
            "log_file" => self.log_file = value.text().ok_or(expected::TEXT)?,
            _ => return Err(EntryError::UnknownKey),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.world.is_valid() {
            return Err(ConfigError::Invalid(
                "world window must have min < max on both axes".to_string(),
            ));
        }
        Ok(())
    }
}

/// Errors raised while loading a config file
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io(String),
    Syntax { line: usize, message: String },
    UnknownKey { line: usize, key: String },
    InvalidValue {
        line: usize,
        key: String,
        message: String,
    },
    Invalid(String),
}

/// Why a single entry was rejected, before its line is known
#[derive(Debug, Clone, Copy, PartialEq)]
enum EntryError {
    UnknownKey,
    Invalid(&'static str),
}

impl From<&'static str> for EntryError {
    fn from(message: &'static str) -> Self {
        EntryError::Invalid(message)
    }
}

/// What each kind of value must look like
mod expected {
    pub const DIMENSION: &str = "expected a positive integer";
    pub const INTEGER: &str = "expected an integer";
    pub const NUMBER: &str = "expected a number";
    pub const ANGLE: &str = "expected a finite angle in degrees";
    pub const SIZE: &str = "expected a positive number";
    pub const COLOR: &str = "expected 3 or 4 components in [0, 1]";
    pub const FLAG: &str = "expected \"on\" or \"off\"";
    pub const TEXT: &str = "expected a quoted string";
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(message) => write!(f, "cannot read config: {message}"),
            ConfigError::Syntax { line, message } => write!(f, "config line {line}: {message}"),
            ConfigError::UnknownKey { line, key } => {
                write!(f, "config line {line}: unknown key `{key}`")
            }
            ConfigError::InvalidValue { line, key, message } => {
                write!(f, "config line {line}: bad value for `{key}`: {message}")
            }
            ConfigError::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    Numbers(Vec<f64>),
}

impl Value {
    fn text(self) -> Option<String> {
        match self {
            Value::Text(text) => Some(text),
            Value::Numbers(_) => None,
        }
    }

    fn number(&self) -> Option<f64> {
        match self {
            Value::Numbers(numbers) if numbers.len() == 1 && numbers[0].is_finite() => {
                Some(numbers[0])
            }
            _ => None,
        }
    }

    fn integer(&self) -> Option<i32> {
        let range = i32::MIN as f64..=i32::MAX as f64;
        self.number()
            .filter(|n| n.fract() == 0.0 && range.contains(n))
            .map(|n| n as i32)
    }

    fn dimension(&self) -> Option<u32> {
        self.integer().filter(|&n| n > 0).map(|n| n as u32)
    }

    fn size(&self) -> Option<f32> {
        self.number().filter(|&n| n > 0.0).map(|n| n as f32)
    }

    fn color(&self) -> Option<Rgba> {
        let Value::Numbers(numbers) = self else {
            return None;
        };
        if !numbers.iter().all(|c| (0.0..=1.0).contains(c)) {
            return None;
        }
        match numbers.as_slice() {
            [r, g, b] => Some([*r as f32, *g as f32, *b as f32, 1.0]),
            [r, g, b, a] => Some([*r as f32, *g as f32, *b as f32, *a as f32]),
            _ => None,
        }
    }

    fn flag(self) -> Option<bool> {
        match self.text()?.as_str() {
            "on" | "true" | "yes" => Some(true),
            "off" | "false" | "no" => Some(false),
            _ => None,
        }
    }
}

fn parse_entry(input: &str) -> IResult<&str, (&str, Value)> {
    let (input, key) = parse_key(input)?;
    let (input, _) = delimited(space0, char('='), space0)(input)?;
    let (input, value) = alt((
        map(parse_quoted, |text: &str| Value::Text(text.to_string())),
        map(parse_numbers, Value::Numbers),
    ))(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = opt(preceded(tag("#"), not_line_ending))(input)?;
    Ok((input, (key, value)))
}

fn parse_key(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, many0_count(alt((alphanumeric1, tag("_"))))))(input)
}

fn parse_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"'))(input)
}

fn parse_numbers(input: &str) -> IResult<&str, Vec<f64>> {
    separated_list1(delimited(space0, char(','), space0), double)(input)
}
