use std::num::ParseFloatError;
use std::ops::{Add, Mul};
use std::str::FromStr;

use num::complex::ParseComplexError;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected {0:?} in complex literal")]
    Unexpected(char),
    #[error("sign followed by another sign in complex literal")]
    RepeatedSign,
    #[error(transparent)]
    Number(#[from] ParseComplexError<ParseFloatError>),
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// True when either component lies outside `[-bound, bound]`.
    pub fn outside_square(&self, bound: f64) -> bool {
        self.re.abs() > bound || self.im.abs() > bound
    }
}

pub const fn c(re: f64, im: f64) -> Complex {
    Complex::new(re, im)
}

pub const fn cr(re: f64) -> Complex {
    c(re, 0.0)
}

pub const fn ci(im: f64) -> Complex {
    c(0.0, im)
}

impl Add for Complex {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        c(self.re + other.re, self.im + other.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        c(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }
}

impl From<num::Complex<f64>> for Complex {
    fn from(z: num::Complex<f64>) -> Self {
        c(z.re, z.im)
    }
}

/// Parses `a+bi` style literals (`1+1i`, `-0.5`, `2i`, `1e-3-2.5i`),
/// optionally wrapped in one pair of parentheses.
impl FromStr for Complex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(s);
        check_literal(inner)?;
        Ok(num::Complex::<f64>::from_str(inner)?.into())
    }
}

// `num` is looser than the `a+bi` grammar: it trims spaces around the
// operator, takes `j` for `i` and folds `1++1i` into `1+1i`.
fn check_literal(s: &str) -> Result<(), ParseError> {
    let mut after_sign = false;
    for ch in s.chars() {
        if ch.is_whitespace() || ch == 'j' || ch == 'J' {
            return Err(ParseError::Unexpected(ch));
        }
        let sign = ch == '+' || ch == '-';
        if sign && after_sign {
            return Err(ParseError::RepeatedSign);
        }
        after_sign = sign;
    }
    Ok(())
}
