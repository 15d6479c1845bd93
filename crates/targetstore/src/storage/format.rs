//! Flat-file row format for target records.
//!
//! One header row naming the eight columns in fixed order, then one
//! comma-separated row per record. Fields containing a comma, a quote or a
//! line break are wrapped in double quotes with inner quotes doubled; a quoted
//! line break continues the record on the next line. Rows may end in `\n` or
//! `\r\n`.

use crate::target::{Field, Target};

/// Column names, in on-disk order.
pub const COLUMNS: [&str; 8] = [
    "id",
    "latitude",
    "longitude",
    "altitude",
    "frequency",
    "speed",
    "bearing",
    "ip_address",
];

/// The header row, without line terminator.
#[must_use]
pub fn header_row() -> String {
    COLUMNS.join(",")
}

/// Check that a line is the expected header row.
///
/// # Errors
///
/// Returns a description of the mismatch.
pub fn check_header(line: &str) -> Result<(), String> {
    let line = line.trim_start_matches('\u{feff}');
    let columns = split_row(line)?;
    if columns.iter().map(String::as_str).eq(COLUMNS) {
        Ok(())
    } else {
        Err(format!(
            "unexpected header '{line}', expected '{}'",
            header_row()
        ))
    }
}

/// Group the lines of a file into records, each paired with the 1-based
/// line number it starts on.
///
/// Blank lines between records are skipped. A record whose quotes are still
/// open at end of input is returned as-is so that decoding reports it.
#[must_use]
pub fn records(contents: &str) -> Vec<(usize, String)> {
    let mut records = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if let Some((_, record)) = pending.as_mut() {
            record.push('\n');
            record.push_str(line);
        } else if line.is_empty() {
            continue;
        } else {
            pending = Some((index + 1, line.to_string()));
        }

        let closed = pending
            .as_ref()
            .is_some_and(|(_, record)| record.matches('"').count() % 2 == 0);
        if closed {
            records.extend(pending.take());
        }
    }

    records.extend(pending);
    records
}

/// Encode a record as a row, without line terminator.
#[must_use]
pub fn encode_row(target: &Target) -> String {
    let mut cells = Vec::with_capacity(COLUMNS.len());
    cells.push(quote(&target.id));
    for field in Field::ALL {
        let cell = match target.numeric(field) {
            Some(number) => number.to_string(),
            None => quote(&target.ip_address),
        };
        cells.push(cell);
    }
    cells.join(",")
}

/// Decode a row into a record.
///
/// # Errors
///
/// Returns a description of the problem if the column count is wrong or a
/// numeric column does not hold a finite number.
pub fn decode_row(line: &str) -> Result<Target, String> {
    let cells = split_row(line)?;
    if cells.len() != COLUMNS.len() {
        return Err(format!(
            "expected {} columns, found {}",
            COLUMNS.len(),
            cells.len()
        ));
    }

    let number = |index: usize| -> Result<f64, String> {
        let raw = &cells[index];
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| format!("invalid {} '{raw}'", COLUMNS[index]))
    };

    Ok(Target {
        id: cells[0].clone(),
        latitude: number(1)?,
        longitude: number(2)?,
        altitude: number(3)?,
        frequency: number(4)?,
        speed: number(5)?,
        bearing: number(6)?,
        ip_address: cells[7].clone(),
    })
}

fn quote(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn split_row(line: &str) -> Result<Vec<String>, String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            (true, '"') => quoted = false,
            (false, '"') if current.is_empty() => quoted = true,
            (false, ',') => cells.push(std::mem::take(&mut current)),
            (_, c) => current.push(c),
        }
    }

    if quoted {
        return Err("unterminated quoted field".to_string());
    }
    cells.push(current);
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Target {
        Target {
            id: "6f1c2e0a-1111-4222-8333-444455556666".to_string(),
            latitude: 32.0853,
            longitude: 34.7818,
            altitude: 150.5,
            frequency: 2.4,
            speed: 25.0,
            bearing: 180.0,
            ip_address: "192.168.1.1".to_string(),
        }
    }

    #[test]
    fn test_records_skip_blank_lines() {
        let contents = "a,b\r\n\r\nc,d\n\n";
        assert_eq!(
            records(contents),
            vec![(1, "a,b".to_string()), (3, "c,d".to_string())]
        );
    }

    #[test]
    fn test_records_join_quoted_line_breaks() {
        let contents = "h\n\"first\nsecond\",x\nnext\n";
        assert_eq!(
            records(contents),
            vec![
                (1, "h".to_string()),
                (2, "\"first\nsecond\",x".to_string()),
                (4, "next".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_cell_reads_back() {
        let mut target = sample();
        target.id = "line one\nline two".to_string();
        let row = encode_row(&target);

        let grouped = records(&format!("{}\n{row}\n", header_row()));
        assert_eq!(grouped.len(), 2);
        assert_eq!(decode_row(&grouped[1].1).unwrap(), target);
    }

    #[test]
    fn test_records_unterminated_quote_is_reported() {
        let grouped = records("\"open,1\nmore");
        assert_eq!(grouped.len(), 1);
        assert!(decode_row(&grouped[0].1).is_err());
    }

    #[test]
    fn test_header_row() {
        assert_eq!(
            header_row(),
            "id,latitude,longitude,altitude,frequency,speed,bearing,ip_address"
        );
    }

    #[test]
    fn test_check_header() {
        assert!(check_header(&header_row()).is_ok());
        assert!(check_header(&format!("\u{feff}{}", header_row())).is_ok());
        assert!(check_header("id,lat,lon").is_err());
        assert!(check_header("").is_err());
    }

    #[test]
    fn test_encode_row() {
        assert_eq!(
            encode_row(&sample()),
            "6f1c2e0a-1111-4222-8333-444455556666,32.0853,34.7818,150.5,2.4,25,180,192.168.1.1"
        );
    }

    #[test]
    fn test_decode_encoded_row() {
        let target = sample();
        assert_eq!(decode_row(&encode_row(&target)).unwrap(), target);
    }

    #[test]
    fn test_decode_python_style_numbers() {
        let row = "abc,1.0,2.0,-3.5,433.0,0.0,360.0,10.0.0.1";
        let target = decode_row(row).unwrap();
        assert_eq!(target.frequency, 433.0);
        assert_eq!(target.altitude, -3.5);
        assert_eq!(target.ip_address, "10.0.0.1");
    }

    #[test]
    fn test_decode_wrong_column_count() {
        let err = decode_row("abc,1,2,3").unwrap_err();
        assert!(err.contains("expected 8 columns, found 4"));
    }

    #[test]
    fn test_decode_malformed_number() {
        let err = decode_row("abc,north,2,3,433,1,1,10.0.0.1").unwrap_err();
        assert_eq!(err, "invalid latitude 'north'");
    }

    #[test]
    fn test_decode_rejects_non_finite() {
        let err = decode_row("abc,1,2,3,433,nan,1,10.0.0.1").unwrap_err();
        assert!(err.contains("speed"));
    }

    #[test]
    fn test_quoted_cells() {
        let mut target = sample();
        target.id = "odd,\"id\"".to_string();
        let row = encode_row(&target);
        assert!(row.starts_with("\"odd,\"\"id\"\"\","));
        assert_eq!(decode_row(&row).unwrap(), target);
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(decode_row("\"abc,1,2,3,433,1,1,10.0.0.1").is_err());
    }
}
