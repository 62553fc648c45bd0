//! Year-series extraction for a selected district.
//!
//! Year keys are fixed-width `YYYYZZZZ` tokens, so lexicographic order is
//! chronological order. Keys of any other width are treated as malformed:
//! they keep their verbatim label and sort after every well-formed key.

use crate::domain::{DistrictRecord, SeriesPoint, YearSeries};

/// Raw value meaning "not available".
pub const NOT_AVAILABLE: &str = "NA";

const YEAR_KEY_CHARS: usize = 8;

/// Build the ascending year series for `record`.
pub fn extract_series(record: &DistrictRecord) -> YearSeries {
    let mut fields: Vec<&(String, Option<String>)> = record.fields.iter().collect();
    fields.sort_by(|(a, _), (b, _)| {
        is_well_formed(b)
            .cmp(&is_well_formed(a))
            .then_with(|| a.cmp(b))
    });

    let points = fields
        .into_iter()
        .map(|(key, raw)| SeriesPoint {
            key: key.clone(),
            label: format_year_label(key),
            value: parse_value(raw.as_deref()),
        })
        .collect();

    YearSeries {
        district: record.display_name().to_string(),
        points,
    }
}

fn is_well_formed(key: &str) -> bool {
    key.chars().count() == YEAR_KEY_CHARS
}

/// `20192020` -> `2019-2020`; keys of other widths are returned unchanged.
pub fn format_year_label(key: &str) -> String {
    if !is_well_formed(key) {
        return key.to_string();
    }
    let split = key
        .char_indices()
        .nth(YEAR_KEY_CHARS / 2)
        .map(|(i, _)| i)
        .unwrap_or(key.len());
    format!("{}-{}", &key[..split], &key[split..])
}

/// Parse a raw percentage from its leading number (`"12.5%"` and `"12.5abc"`
/// both give 12.5). `NA`, empty, missing and values with no leading number
/// are absent.
pub fn parse_value(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        return None;
    }
    let number = &trimmed[..leading_number_len(trimmed)];
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Byte length of the decimal number at the start of `s`: optional sign,
/// digits with an optional fraction, optional exponent.
fn leading_number_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }
    end
}
