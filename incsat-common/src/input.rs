//! File reader

use std::{
    io::{Error, ErrorKind, Result},
    iter::Peekable,
};

/// A peekable iterator for bytes that records line and column information.
pub struct Input<'a> {
    /// The source of the input data
    source: Peekable<Box<dyn Iterator<Item = u8> + 'a>>,
    /// The current line number
    line: usize,
    /// The current column
    column: usize,
}

impl<'a> Input<'a> {
    /// Create a new `Input` from some source
    pub fn new(source: Box<dyn Iterator<Item = u8> + 'a>) -> Self {
        Input {
            source: source.peekable(),
            line: 1,
            column: 1,
        }
    }
    /// Look at the next byte without consuming it
    pub fn peek(&mut self) -> Option<u8> {
        self.source.peek().cloned()
    }
    /// Create an io::Error with the given message and position information.
    pub fn error(&self, why: &'static str) -> Error {
        Error::new(
            ErrorKind::InvalidData,
            format!("{} at line {} column {}", why, self.line, self.column),
        )
    }

    /// Parse a decimal number.
    ///
    /// Consumes an optional minus sign and one or more decimal digits,
    /// returning the value of the resulting number on success. Fails if
    /// there is no digit, or if the number does not lie within the range
    /// [-i64::MAX, i64::MAX].
    pub fn parse_dec64(&mut self) -> Result<i64> {
        let negative = self.peek() == Some(b'-');
        if negative {
            self.next();
        }
        if !self.peek().map_or(false, Self::is_digit) {
            return Err(self.error(Self::NUMBER));
        }
        let mut value: i64 = 0;
        while let Some(c) = self.peek() {
            if !Self::is_digit(c) {
                break;
            }
            value = value
                .checked_mul(10)
                .and_then(|value| value.checked_add(i64::from(c - b'0')))
                .ok_or_else(|| self.error(Self::OVERFLOW))?;
            self.next();
        }
        Ok(if negative { -value } else { value })
    }

    /// Like [`parse_dec64()`](#method.parse_dec64), but the result must lie
    /// within [-i32::MAX, i32::MAX].
    pub fn parse_dec32(&mut self) -> Result<i32> {
        let value = self.parse_dec64()?;
        if value.abs() > i64::from(i32::max_value()) {
            return Err(self.error(Self::OVERFLOW));
        }
        Ok(value as i32)
    }

    /// Parse zero or more whitespace characters.
    pub fn skip_any_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !Self::is_space(c) {
                break;
            }
            self.next();
        }
    }

    /// Skips whitespace, and returns an error if neither space nor EOF was parsed.
    pub fn skip_some_whitespace(&mut self) -> Result<()> {
        if let Some(c) = self.peek() {
            if !Self::is_space(c) {
                return Err(self.error(Self::SPACE));
            }
        }
        self.skip_any_whitespace();
        Ok(())
    }

    // Error messages.
    /// A numeric overflow. This should only happen for user input.
    pub const OVERFLOW: &'static str = "overflow while parsing number";
    /// Parser error ("unexpected EOF")
    pub const EOF: &'static str = "premature end of file";
    /// Parser error (`expected ...`)
    pub const NUMBER: &'static str = "expected number";
    /// Parser error (`expected ...`)
    pub const SPACE: &'static str = "expected space";
    /// Parser error (`expected ...`)
    pub const P_CNF: &'static str = "expected \"p cnf\"";
    /// Parser error (`expected ...`)
    pub const NEWLINE: &'static str = "expected newline";
    /// A literal whose variable exceeds the header.
    pub const MAXVAR: &'static str = "literal exceeds maximum variable of header";

    /// Check if a character is a decimal digit.
    pub fn is_digit(value: u8) -> bool {
        value >= b'0' && value <= b'9'
    }

    /// Returns true if the character is one of the whitespace characters we allow.
    pub fn is_space(c: u8) -> bool {
        [b' ', b'\t', b'\n', b'\r'].iter().any(|&s| s == c)
    }
}

impl Iterator for Input<'_> {
    type Item = u8;
    fn next(&mut self) -> Option<u8> {
        self.source.next().map(|c| {
            if c == b'\n' {
                self.line += 1;
                self.column = 0;
            }
            self.column += 1;
            c
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &'static str) -> Input<'static> {
        Input::new(Box::new(text.as_bytes().iter().cloned()))
    }

    #[test]
    fn numbers() {
        let mut numbers = input("-17 2147483647\n2147483648");
        assert_eq!(numbers.parse_dec32().unwrap(), -17);
        numbers.skip_some_whitespace().unwrap();
        assert_eq!(numbers.parse_dec32().unwrap(), i32::max_value());
        numbers.skip_some_whitespace().unwrap();
        let error = numbers.parse_dec32().unwrap_err();
        assert_eq!(
            error.to_string(),
            "overflow while parsing number at line 2 column 11"
        );
    }

    #[test]
    fn missing_digits() {
        assert!(input("-x").parse_dec64().is_err());
        assert!(input("x").skip_some_whitespace().is_err());
        assert!(input("").skip_some_whitespace().is_ok());
        let mut garbage = input("1x");
        garbage.parse_dec64().unwrap();
        assert!(garbage.skip_some_whitespace().is_err());
    }
}
