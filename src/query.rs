use std::num::ParseFloatError;

use log::{info, warn};

use crate::complex::{self, Complex};
use crate::coord::Viewport;

pub const DEFAULT_CENTER: Complex = Complex::ZERO;
pub const DEFAULT_HALF_WIDTH: f64 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid query {query:?}: {reason}")]
    MalformedQuery { query: String, reason: &'static str },
    #[error("invalid center {value:?}: {source}")]
    BadCenter {
        value: String,
        source: complex::ParseError,
    },
    #[error("invalid width {value:?}: {source}")]
    BadWidth {
        value: String,
        source: ParseFloatError,
    },
}

/// Reads `center` (complex literal) and `width` (half side length). Missing or
/// empty values take their defaults, unknown keys are ignored, anything that
/// does not parse is an error.
pub fn parse_query(raw: &str) -> Result<Viewport, QueryError> {
    check_escapes(raw)?;

    let mut center: Option<String> = None;
    let mut width: Option<String> = None;
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let slot = match key.as_ref() {
            "center" => &mut center,
            "width" => &mut width,
            _ => continue,
        };
        // first occurrence wins
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    let center = match center.as_deref() {
        None | Some("") => DEFAULT_CENTER,
        Some(value) => value.parse().map_err(|source| QueryError::BadCenter {
            value: value.to_string(),
            source,
        })?,
    };
    let width = match width.as_deref() {
        None | Some("") => DEFAULT_HALF_WIDTH,
        Some(value) => value.parse().map_err(|source| QueryError::BadWidth {
            value: value.to_string(),
            source,
        })?,
    };
    Ok(Viewport::from_center(center, width))
}

pub fn parse_cli(raw: &str) -> Viewport {
    if raw.is_empty() {
        info!("Using default viewport");
        return Viewport::default();
    }
    match parse_query(raw) {
        Ok(viewport) => viewport,
        Err(err) => {
            warn!("{}, using default viewport", err);
            Viewport::default()
        }
    }
}

pub fn query_of(target: &str) -> &str {
    match target.split_once('?') {
        Some((_, query)) => query.split('#').next().unwrap_or_default(),
        None => "",
    }
}

fn check_escapes(raw: &str) -> Result<(), QueryError> {
    let malformed = |reason| QueryError::MalformedQuery {
        query: raw.to_string(),
        reason,
    };
    let bytes = raw.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3);
                if !hex.map_or(false, |h| h.iter().all(u8::is_ascii_hexdigit)) {
                    return Err(malformed("invalid percent escape"));
                }
            }
            b';' => return Err(malformed("semicolons are not allowed as separators")),
            _ => {}
        }
    }
    Ok(())
}
