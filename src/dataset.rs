use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, warn};

use crate::{OracleErr, Result};

/// Reads a series with one value per line.
///
/// Lines may also be delimited rows (`,`, `;`, tabs or spaces), in which case
/// the first field that parses as a finite number is taken. Blank lines,
/// `#` comments and rows without any number are skipped.
///
/// # Errors
/// `OracleErr::EmptySeries` if no value was found.
pub fn parse_series<R: BufRead>(reader: R) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(256);
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match first_number(line) {
            Some(v) => values.push(v),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("skipped {skipped} rows without a numeric field");
    }
    if values.is_empty() {
        return Err(OracleErr::EmptySeries);
    }

    Ok(values)
}

/// Reads the series stored in the file at `path`. See [`parse_series`].
pub fn load_series(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    let values = parse_series(BufReader::new(file)).inspect_err(|e| {
        if matches!(e, OracleErr::EmptySeries) {
            warn!("no numeric values found in {}", path.display());
        }
    })?;

    debug!("loaded {} points from {}", values.len(), path.display());
    Ok(values)
}

fn first_number(line: &str) -> Option<f64> {
    line.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .filter_map(|field| field.parse::<f64>().ok())
        .find(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn one_value_per_line() {
        let values = parse_series("1.5\n2\n-3e1\n".as_bytes()).unwrap();
        assert_eq!(values, vec![1.5, 2., -30.]);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let input = "# header comment\n\n  10\n   \n# 99\n11\n";
        assert_eq!(parse_series(input.as_bytes()).unwrap(), vec![10., 11.]);
    }

    #[test]
    fn first_numeric_field_wins() {
        let input = "date,value\n2024-01-01,5.5\nmon;6;7\nx\t8 9\nlabel only\n";
        assert_eq!(parse_series(input.as_bytes()).unwrap(), vec![5.5, 6., 8.]);
    }

    #[test]
    fn non_finite_fields_are_not_values() {
        let input = "NaN,1\ninf 2\n3\n";
        assert_eq!(parse_series(input.as_bytes()).unwrap(), vec![1., 2., 3.]);
    }

    #[test]
    fn no_values_is_an_error() {
        let err = parse_series("# nothing\nfoo,bar\n".as_bytes()).unwrap_err();
        assert!(matches!(err, OracleErr::EmptySeries));
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "value\n1\n2\n3").unwrap();

        assert_eq!(load_series(file.path()).unwrap(), vec![1., 2., 3.]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_series(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, OracleErr::Io(_)));
    }
}
