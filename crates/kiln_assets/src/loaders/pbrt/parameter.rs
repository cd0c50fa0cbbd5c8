//! Typed directive parameters (`"type name" [values]`).

use glam::{Vec2, Vec3};
use kiln_core::errors::malformed;
use kiln_core::{KilnError, Result, Value};

use super::lexer::{Token, TokenKind};

/// Declared parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Float,
    Int,
    Vector2,
    Vector3,
    String,
    Texture,
    Bool,
}

impl ParamType {
    /// Maps a type keyword from the scene text. Unknown keywords yield `None`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "float" => Self::Float,
            "integer" | "int" => Self::Int,
            "point2" | "vector2" => Self::Vector2,
            "point" | "point3" | "normal" | "normal3" | "vector" | "vector3" | "color" | "rgb" => Self::Vector3,
            "string" => Self::String,
            "texture" => Self::Texture,
            "bool" => Self::Bool,
            _ => return None,
        })
    }
}

/// Homogeneous parameter values; the variant is the parameter's type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamData {
    Float(Vec<f32>),
    Int(Vec<i32>),
    Vector2(Vec<Vec2>),
    Vector3(Vec<Vec3>),
    String(Vec<String>),
    /// Texture names.
    Texture(Vec<String>),
    Bool(Vec<bool>),
}

/// A named, typed value array taken from a directive.
///
/// An empty array is legal and treated as "absent" by consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub data: ParamData,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data: ParamData) -> Self {
        Self { name: name.into(), data }
    }

    pub fn floats(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self::new(name, ParamData::Float(values))
    }

    pub fn ints(name: impl Into<String>, values: Vec<i32>) -> Self {
        Self::new(name, ParamData::Int(values))
    }

    pub fn vec3s(name: impl Into<String>, values: Vec<Vec3>) -> Self {
        Self::new(name, ParamData::Vector3(values))
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParamData::String(vec![value.into()]))
    }

    pub fn texture(name: impl Into<String>, texture: impl Into<String>) -> Self {
        Self::new(name, ParamData::Texture(vec![texture.into()]))
    }

    #[must_use]
    pub fn param_type(&self) -> ParamType {
        match &self.data {
            ParamData::Float(_) => ParamType::Float,
            ParamData::Int(_) => ParamType::Int,
            ParamData::Vector2(_) => ParamType::Vector2,
            ParamData::Vector3(_) => ParamType::Vector3,
            ParamData::String(_) => ParamType::String,
            ParamData::Texture(_) => ParamType::Texture,
            ParamData::Bool(_) => ParamType::Bool,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match &self.data {
            ParamData::Float(v) => v.len(),
            ParamData::Int(v) => v.len(),
            ParamData::Vector2(v) => v.len(),
            ParamData::Vector3(v) => v.len(),
            ParamData::String(v) | ParamData::Texture(v) => v.len(),
            ParamData::Bool(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// First element as a [`Value`]. Texture references come back as strings.
    #[must_use]
    pub fn first_value(&self) -> Option<Value> {
        Some(match &self.data {
            ParamData::Float(v) => Value::Float(*v.first()?),
            ParamData::Int(v) => Value::Int(*v.first()?),
            ParamData::Vector2(v) => Value::Vec2(*v.first()?),
            ParamData::Vector3(v) => Value::Vec3(*v.first()?),
            ParamData::String(v) | ParamData::Texture(v) => Value::String(v.first()?.clone()),
            ParamData::Bool(v) => Value::Bool(*v.first()?),
        })
    }

    /// The value if this is a string parameter holding exactly one entry.
    #[must_use]
    pub fn single_string(&self) -> Option<&str> {
        match &self.data {
            ParamData::String(v) if v.len() == 1 => Some(&v[0]),
            _ => None,
        }
    }

    /// Flattens numeric data to floats.
    #[must_use]
    pub fn to_floats(&self) -> Option<Vec<f32>> {
        match &self.data {
            ParamData::Float(v) => Some(v.clone()),
            ParamData::Int(v) => Some(v.iter().map(|&i| i as f32).collect()),
            ParamData::Vector2(v) => Some(v.iter().flat_map(|p| p.to_array()).collect()),
            ParamData::Vector3(v) => Some(v.iter().flat_map(|p| p.to_array()).collect()),
            _ => None,
        }
    }

    /// Numeric data regrouped as 3-vectors; `None` if the float count is not a multiple of 3.
    #[must_use]
    pub fn to_vec3s(&self) -> Option<Vec<Vec3>> {
        if let ParamData::Vector3(v) = &self.data {
            return Some(v.clone());
        }
        let floats = self.to_floats()?;
        if floats.len() % 3 != 0 {
            return None;
        }
        Some(floats.chunks_exact(3).map(Vec3::from_slice).collect())
    }

    /// Non-negative integral data as vertex indices.
    #[must_use]
    pub fn to_indices(&self) -> Option<Vec<u32>> {
        match &self.data {
            ParamData::Int(v) => v.iter().map(|&i| u32::try_from(i).ok()).collect(),
            ParamData::Float(v) => v
                .iter()
                .map(|&f| (f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f32).then_some(f as u32))
                .collect(),
            _ => None,
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_number<T: std::str::FromStr>(directive: &str, token: &Token<'_>) -> Result<T> {
    match token.kind {
        TokenKind::Number(text) => text
            .parse()
            .map_err(|_| malformed(directive, format!("line {}: '{text}' is not a valid number", token.line))),
        _ => Err(malformed(directive, format!("line {}: expected a number, found {token}", token.line))),
    }
}

fn parse_integer(directive: &str, token: &Token<'_>) -> Result<i32> {
    // Integers written as `3.0` are still accepted.
    parse_number::<i32>(directive, token).or_else(|err| {
        let f = parse_number::<f64>(directive, token)?;
        if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
            Ok(f as i32)
        } else {
            Err(err)
        }
    })
}

fn parse_string(directive: &str, token: &Token<'_>) -> Result<String> {
    match token.kind {
        TokenKind::String(text) => Ok(text.to_string()),
        _ => Err(malformed(directive, format!("line {}: expected a string, found {token}", token.line))),
    }
}

fn parse_bool(directive: &str, token: &Token<'_>) -> Result<bool> {
    match token.kind {
        TokenKind::String("true") | TokenKind::Identifier("true") => Ok(true),
        TokenKind::String("false") | TokenKind::Identifier("false") => Ok(false),
        _ => Err(malformed(directive, format!("line {}: expected a bool, found {token}", token.line))),
    }
}

/// Reads a flat float list, with or without surrounding brackets.
pub fn parse_floats(directive: &str, tokens: &[Token<'_>]) -> Result<Vec<f32>> {
    let inner = match tokens {
        [
            Token { kind: TokenKind::OpenBracket, .. },
            inner @ ..,
            Token { kind: TokenKind::CloseBracket, .. },
        ] => inner,
        _ => tokens,
    };
    inner.iter().map(|t| parse_number(directive, t)).collect()
}

/// Splits off the leading quoted string (`Shape "trianglemesh" ...`).
pub fn split_leading_string<'t, 'a>(directive: &str, tokens: &'t [Token<'a>]) -> Result<(&'a str, &'t [Token<'a>])> {
    match tokens.split_first() {
        Some((Token { kind: TokenKind::String(s), .. }, rest)) => Ok((*s, rest)),
        Some((token, _)) => Err(malformed(directive, format!("line {}: expected a quoted name, found {token}", token.line))),
        None => Err(malformed(directive, "missing quoted name")),
    }
}

/// Parses `"type name" value` / `"type name" [values]` pairs.
///
/// Parameters with an unknown type keyword are skipped with a warning.
pub fn parse_parameter_list(directive: &str, tokens: &[Token<'_>]) -> Result<Vec<Parameter>> {
    let mut parameters = Vec::new();
    let mut rest = tokens;

    while let Some((head, tail)) = rest.split_first() {
        let TokenKind::String(declaration) = head.kind else {
            return Err(malformed(directive, format!("line {}: expected \"type name\", found {head}", head.line)));
        };
        let mut words = declaration.split_whitespace();
        let (Some(keyword), Some(name), None) = (words.next(), words.next(), words.next()) else {
            return Err(malformed(directive, format!("line {}: bad parameter declaration \"{declaration}\"", head.line)));
        };

        let values: &[Token<'_>] = match tail.split_first() {
            Some((Token { kind: TokenKind::OpenBracket, .. }, after)) => {
                let Some(close) = after.iter().position(|t| t.kind == TokenKind::CloseBracket) else {
                    return Err(KilnError::Syntax {
                        line: head.line,
                        message: format!("{directive}: unterminated '[' for \"{name}\""),
                    });
                };
                rest = &after[close + 1..];
                &after[..close]
            }
            Some((_, after)) => {
                rest = after;
                &tail[..1]
            }
            None => return Err(malformed(directive, format!("line {}: \"{name}\" has no value", head.line))),
        };

        let Some(ty) = ParamType::from_keyword(keyword) else {
            log::warn!("{directive}: skipping parameter \"{name}\" of unsupported type '{keyword}' (line {})", head.line);
            continue;
        };

        let data = match ty {
            ParamType::Float => ParamData::Float(values.iter().map(|t| parse_number(directive, t)).collect::<Result<_>>()?),
            ParamType::Int => ParamData::Int(values.iter().map(|t| parse_integer(directive, t)).collect::<Result<_>>()?),
            ParamType::Vector2 | ParamType::Vector3 => {
                let width = if ty == ParamType::Vector2 { 2 } else { 3 };
                let floats: Vec<f32> = values.iter().map(|t| parse_number(directive, t)).collect::<Result<_>>()?;
                if floats.len() % width != 0 {
                    return Err(malformed(
                        directive,
                        format!("line {}: \"{name}\" has {} values, not a multiple of {width}", head.line, floats.len()),
                    ));
                }
                if width == 2 {
                    ParamData::Vector2(floats.chunks_exact(2).map(Vec2::from_slice).collect())
                } else {
                    ParamData::Vector3(floats.chunks_exact(3).map(Vec3::from_slice).collect())
                }
            }
            ParamType::String => ParamData::String(values.iter().map(|t| parse_string(directive, t)).collect::<Result<_>>()?),
            ParamType::Texture => ParamData::Texture(values.iter().map(|t| parse_string(directive, t)).collect::<Result<_>>()?),
            ParamType::Bool => ParamData::Bool(values.iter().map(|t| parse_bool(directive, t)).collect::<Result<_>>()?),
        };

        parameters.push(Parameter::new(name, data));
    }

    Ok(parameters)
}
