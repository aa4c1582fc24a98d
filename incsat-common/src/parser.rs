//! DIMACS parser and file handling

use crate::input::Input;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Error, ErrorKind, Read, Result, StdinLock},
};

/// The problem line of a DIMACS file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DimacsHeader {
    /// The largest variable the formula may use.
    pub maxvar: i32,
    /// The number of clauses announced.
    pub num_clauses: u64,
}

/// Parse a DIMACS CNF formula.
///
/// Every literal, including the terminating zeros, is passed to `add_literal`
/// in file order.
pub fn parse_dimacs(input: &mut Input, mut add_literal: impl FnMut(i32)) -> Result<DimacsHeader> {
    let header = parse_formula_header(input)?;
    let mut clauses = 0;
    let mut open_clause = false;
    while let Some(c) = input.peek() {
        if c == b'c' {
            parse_comment(input)?;
            continue;
        }
        let literal = parse_literal(input)?;
        if literal.abs() > header.maxvar {
            return Err(input.error(Input::MAXVAR));
        }
        if literal == 0 {
            clauses += 1;
        }
        open_clause = literal != 0;
        add_literal(literal);
    }
    if open_clause {
        return Err(input.error(Input::EOF));
    }
    if clauses != header.num_clauses {
        warn!(
            "header announces {} clauses but found {}",
            header.num_clauses, clauses
        );
    }
    Ok(header)
}

/// Parse a literal followed by whitespace or EOF.
pub fn parse_literal(input: &mut Input) -> Result<i32> {
    let literal = input.parse_dec32()?;
    input.skip_some_whitespace()?;
    Ok(literal)
}

/// Parse a DIMACS comment starting with "c".
///
/// Consumes a leading "c" and any characters until (including) the next newline.
fn parse_comment(input: &mut Input) -> Result<()> {
    match input.peek() {
        Some(b'c') => {
            input.next();
            while let Some(c) = input.next() {
                if c == b'\n' {
                    input.skip_any_whitespace();
                    return Ok(());
                }
            }
            Err(input.error(Input::NEWLINE))
        }
        _ => Err(input.error(Input::NEWLINE)),
    }
}

/// Parse a DIMACS header.
fn parse_formula_header(input: &mut Input) -> Result<DimacsHeader> {
    input.skip_any_whitespace();
    while Some(b'c') == input.peek() {
        parse_comment(input)?
    }
    for &expected in b"p cnf" {
        if input.peek().map_or(true, |c| c != expected) {
            return Err(input.error(Input::P_CNF));
        }
        input.next();
    }
    input.skip_some_whitespace()?;
    let maxvar = input.parse_dec32()?;
    input.skip_some_whitespace()?;
    let num_clauses = input.parse_dec64()?;
    input.skip_some_whitespace()?;
    if maxvar < 0 || num_clauses < 0 {
        return Err(input.error(Input::P_CNF));
    }
    Ok(DimacsHeader {
        maxvar,
        num_clauses: num_clauses as u64,
    })
}

/// Open a file for reading.
/// # Panics
/// Exits the process on error.
pub fn open_file(filename: &str) -> File {
    File::open(filename).unwrap_or_else(|err| die!("cannot open file: {}", err))
}

/// Open a file for writing.
/// # Panics
/// Exits the process on error.
pub fn open_file_for_writing(filename: &str) -> BufWriter<File> {
    BufWriter::new(
        File::create(filename).unwrap_or_else(|err| die!("cannot open file for writing: {}", err)),
    )
}

/// File extension of Zstandard archives.
const ZSTD: &str = ".zst";
/// File extension of Gzip archives.
const GZIP: &str = ".gz";
/// File extension of Bzip2 archives.
const BZIP2: &str = ".bz2";
/// File extension of XZ archives.
const XZ: &str = ".xz";
/// File extension of LZ4 archives.
const LZ4: &str = ".lz4";

/// Determine the compression format of a file by its extension.
///
/// Returns the empty string for uncompressed files.
fn compression_format_by_extension(filename: &str) -> &'static str {
    for &extension in &[ZSTD, GZIP, BZIP2, LZ4, XZ] {
        if filename.ends_with(extension) {
            return extension;
        }
    }
    ""
}

/// Return an [Input](../input/struct.Input.html) to read from a possibly compressed file.
///
/// If the file is compressed it is transparently uncompressed.
/// If the filename is "-", returns an [Input](../input/struct.Input.html) reading data from stdin.
pub fn read_compressed_file_or_stdin<'a>(
    filename: &str,
    stdin: StdinLock<'a>,
) -> Result<Input<'a>> {
    match filename {
        "-" => Ok(Input::new(Box::new(stdin.bytes().map(panic_on_error)))),
        filename => read_compressed_file(filename),
    }
}

/// Return an [Input](../input/struct.Input.html) to read from a possibly compressed file.
pub fn read_compressed_file<'a>(filename: &str) -> Result<Input<'a>> {
    let file = File::open(filename)?;
    Ok(Input::new(read_from_compressed_file(file, filename)?))
}

/// Return an Iterator to read from a possibly compressed file.
fn read_from_compressed_file(file: File, filename: &str) -> Result<Box<dyn Iterator<Item = u8>>> {
    let bytes: Box<dyn Iterator<Item = u8>> = match compression_format_by_extension(filename) {
        ZSTD => {
            let de = zstd::stream::read::Decoder::new(file)?;
            Box::new(de.bytes().map(panic_on_error))
        }
        GZIP => {
            let de = flate2::read::GzDecoder::new(file);
            Box::new(de.bytes().map(panic_on_error))
        }
        BZIP2 => {
            let de = bzip2::read::BzDecoder::new(file);
            Box::new(de.bytes().map(panic_on_error))
        }
        XZ => {
            let de = xz2::read::XzDecoder::new(file);
            Box::new(de.bytes().map(panic_on_error))
        }
        LZ4 => {
            let de = lz4::Decoder::new(file)?;
            Box::new(de.bytes().map(panic_on_error))
        }
        "" => Box::new(BufReader::new(file).bytes().map(panic_on_error)),
        format => {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("unsupported compression format {}", format),
            ))
        }
    };
    Ok(bytes)
}

/// Unwraps a result, exiting on error.
///
/// Used for read errors in the middle of a stream, which we cannot
/// recover from.
pub fn panic_on_error<T>(result: Result<T>) -> T {
    result.unwrap_or_else(|error| die!("{}", error))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &'static str) -> Result<(DimacsHeader, Vec<i32>)> {
        let mut input = Input::new(Box::new(text.as_bytes().iter().cloned()));
        let mut literals = Vec::new();
        let header = parse_dimacs(&mut input, |literal| literals.push(literal))?;
        Ok((header, literals))
    }

    #[test]
    fn missing_file_is_an_error() {
        let stdin = std::io::stdin();
        let input = read_compressed_file_or_stdin("/nonexistent/formula.cnf.gz", stdin.lock());
        assert_eq!(
            input.err().map(|err| err.kind()),
            Some(ErrorKind::NotFound)
        );
    }

    #[test]
    fn valid_formula() {
        let example = r#"c comment
p cnf 3 2
1 -2 0
c another
 -3
 2 0
"#;
        let (header, literals) = parse(example).unwrap();
        assert_eq!(
            header,
            DimacsHeader {
                maxvar: 3,
                num_clauses: 2
            }
        );
        assert_eq!(literals, vec![1, -2, 0, -3, 2, 0]);
    }

    #[test]
    fn invalid_formulas() {
        assert!(parse("1 2 0\n").is_err());
        assert!(parse("p cnf 2 1\n1 3 0\n").is_err());
        assert!(parse("p cnf 2 1\n1 2\n").is_err());
        assert!(parse("p cnf 2 1\n1 2x 0\n").is_err());
    }

    #[test]
    fn extensions() {
        assert_eq!(compression_format_by_extension("formula.cnf.xz"), XZ);
        assert_eq!(compression_format_by_extension("formula.cnf"), "");
    }
}
