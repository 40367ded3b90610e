//! Obfuscator report parser
//!
//! Turns the label/colon/value report that `h5x-cli obfuscate` prints on
//! stdout into a [`MetricsRecord`]. This is the only place that knows the
//! report's labels; a change in the tool's output format is handled here.
//!
//! Extraction is a single pass over the lines and does not depend on their
//! order. Unknown lines are ignored, missing labels keep their defaults, and
//! a label whose value cannot be converted fails only that field.

use h5x_core::domain::metrics::MetricsRecord;

/// A metric line that was present but could not be converted
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid value for '{label}': {value:?} ({reason})")]
pub struct MetricsParseError {
    pub label: &'static str,
    pub value: String,
    pub reason: String,
}

/// Result of a lenient extraction
#[derive(Debug, Clone, Default)]
pub struct MetricsExtraction {
    /// Metrics with every failed field left at its default
    pub metrics: MetricsRecord,
    /// One entry per field that could not be converted
    pub errors: Vec<MetricsParseError>,
}

impl MetricsExtraction {
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Field {
    FunctionsProcessed,
    StringsObfuscated,
    InstructionsModified,
    SecurityScore,
    ProcessingTime,
    OriginalSize,
    ObfuscatedSize,
    SizeIncrease,
}

const LABELS: [(&str, Field); 8] = [
    ("Functions Processed", Field::FunctionsProcessed),
    ("Strings Obfuscated", Field::StringsObfuscated),
    ("Instructions Modified", Field::InstructionsModified),
    ("Security Score", Field::SecurityScore),
    ("Processing Time", Field::ProcessingTime),
    ("Original Size", Field::OriginalSize),
    ("Obfuscated Size", Field::ObfuscatedSize),
    ("Size Increase", Field::SizeIncrease),
];

/// Parses the report, surfacing the first field that could not be converted
pub fn parse_metrics(output: &str) -> Result<MetricsRecord, MetricsParseError> {
    let extraction = extract_metrics(output);
    match extraction.errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(extraction.metrics),
    }
}

/// Parses the report, defaulting every field that could not be converted
pub fn extract_metrics(output: &str) -> MetricsExtraction {
    let mut extraction = MetricsExtraction::default();

    for line in output.lines() {
        let line = line.trim_start();
        let Some((label, field)) = match_label(line) else {
            continue;
        };

        // The label itself contains no colon, so the value starts after the first one
        let value = line
            .split_once(':')
            .map(|(_, rest)| rest.trim())
            .unwrap_or_default();

        if let Err(reason) = apply(&mut extraction.metrics, field, value) {
            extraction.errors.push(MetricsParseError {
                label,
                value: value.to_string(),
                reason,
            });
        }
    }

    extraction
}

fn match_label(line: &str) -> Option<(&'static str, Field)> {
    LABELS.iter().copied().find(|(label, _)| {
        line.strip_prefix(label)
            .is_some_and(|rest| rest.starts_with(':'))
    })
}

fn apply(metrics: &mut MetricsRecord, field: Field, value: &str) -> Result<(), String> {
    match field {
        Field::FunctionsProcessed => metrics.functions_processed = parse_count(value)?,
        Field::StringsObfuscated => metrics.strings_obfuscated = parse_count(value)?,
        Field::InstructionsModified => metrics.instructions_modified = parse_count(value)?,
        Field::SecurityScore => metrics.security_score = parse_score(value)?,
        Field::ProcessingTime => metrics.processing_time_seconds = parse_seconds(value)?,
        Field::OriginalSize => metrics.original_size_bytes = parse_size(value)?,
        Field::ObfuscatedSize => metrics.obfuscated_size_bytes = parse_size(value)?,
        Field::SizeIncrease => metrics.size_increase_label = value.to_string(),
    }
    Ok(())
}

fn parse_count(value: &str) -> Result<u64, String> {
    value.parse::<u64>().map_err(|e| e.to_string())
}

/// `8.5/10` -> 8.5
fn parse_score(value: &str) -> Result<f64, String> {
    let numerator = value.split('/').next().unwrap_or_default().trim();
    numerator.parse::<f64>().map_err(|e| e.to_string())
}

/// `3.2s` -> 3.2, `1500ms` -> 1.5
fn parse_seconds(value: &str) -> Result<f64, String> {
    if let Some(millis) = value.strip_suffix("ms") {
        return millis
            .trim()
            .parse::<f64>()
            .map(|ms| ms / 1000.0)
            .map_err(|e| e.to_string());
    }

    value
        .strip_suffix('s')
        .unwrap_or(value)
        .trim()
        .parse::<f64>()
        .map_err(|e| e.to_string())
}

/// `1024 bytes` -> 1024
fn parse_size(value: &str) -> Result<u64, String> {
    let token = value
        .split_whitespace()
        .next()
        .ok_or_else(|| "empty value".to_string())?;
    parse_count(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_report() {
        let metrics =
            parse_metrics("Functions Processed: 42\nSecurity Score: 8.5/10\nProcessing Time: 3.2s\n")
                .unwrap();

        assert_eq!(metrics.functions_processed, 42);
        assert_eq!(metrics.security_score, 8.5);
        assert_eq!(metrics.processing_time_seconds, 3.2);
        assert_eq!(
            metrics,
            MetricsRecord {
                functions_processed: 42,
                security_score: 8.5,
                processing_time_seconds: 3.2,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_empty_output() {
        let metrics = parse_metrics("").unwrap();
        assert_eq!(metrics, MetricsRecord::default());
    }

    #[test]
    fn test_parse_full_cli_report() {
        let output = "\
🔐 H5X ENGINE - Advanced Multi-Layer Code Obfuscation System
Obfuscating main.cpp...

OBFUSCATION RESULTS:
  Original Size:      20480 bytes
  Obfuscated Size:    24576 bytes
  Size Increase:      20.0%
  Security Score:     87.5/100
  Processing Time:    1250ms

  Functions Processed: 12
  Strings Obfuscated:  34
  Instructions Modified: 560
";
        let metrics = parse_metrics(output).unwrap();

        assert_eq!(metrics.original_size_bytes, 20480);
        assert_eq!(metrics.obfuscated_size_bytes, 24576);
        assert_eq!(metrics.size_increase_label, "20.0%");
        assert_eq!(metrics.security_score, 87.5);
        assert_eq!(metrics.processing_time_seconds, 1.25);
        assert_eq!(metrics.functions_processed, 12);
        assert_eq!(metrics.strings_obfuscated, 34);
        assert_eq!(metrics.instructions_modified, 560);
    }

    #[test]
    fn test_order_independent() {
        let forward = parse_metrics("Strings Obfuscated: 3\nOriginal Size: 100 bytes\n").unwrap();
        let reverse = parse_metrics("Original Size: 100 bytes\nStrings Obfuscated: 3\n").unwrap();
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_unknown_lines_ignored() {
        let metrics = parse_metrics(
            "Applying passes...\nFunctions: nope\nFunctions Processed: 7\nDone: yes\n",
        )
        .unwrap();
        assert_eq!(metrics.functions_processed, 7);
    }

    #[test]
    fn test_label_must_be_followed_by_colon() {
        let metrics = parse_metrics("Functions Processed 9\nFunctions Processed Total: x\n").unwrap();
        assert_eq!(metrics, MetricsRecord::default());
    }

    #[test]
    fn test_unparsable_integer_is_an_error() {
        let err = parse_metrics("Functions Processed: many\n").unwrap_err();
        assert_eq!(err.label, "Functions Processed");
        assert_eq!(err.value, "many");
    }

    #[test]
    fn test_negative_count_is_an_error() {
        assert!(parse_metrics("Strings Obfuscated: -4\n").is_err());
    }

    #[test]
    fn test_lenient_extraction_defaults_only_the_failed_field() {
        let extraction = extract_metrics(
            "Functions Processed: many\nStrings Obfuscated: 5\nSecurity Score: high/10\n",
        );

        assert!(extraction.is_degraded());
        assert_eq!(extraction.errors.len(), 2);
        assert_eq!(extraction.metrics.functions_processed, 0);
        assert_eq!(extraction.metrics.strings_obfuscated, 5);
        assert_eq!(extraction.metrics.security_score, 0.0);
    }

    #[test]
    fn test_score_without_denominator() {
        let metrics = parse_metrics("Security Score: 6.25\n").unwrap();
        assert_eq!(metrics.security_score, 6.25);
    }

    #[test]
    fn test_processing_time_without_unit() {
        let metrics = parse_metrics("Processing Time: 0.75\n").unwrap();
        assert_eq!(metrics.processing_time_seconds, 0.75);
    }

    #[test]
    fn test_size_field_missing_value() {
        let extraction = extract_metrics("Original Size:\n");
        assert_eq!(extraction.errors.len(), 1);
        assert_eq!(extraction.metrics.original_size_bytes, 0);
    }

    #[test]
    fn test_size_increase_kept_verbatim() {
        let metrics = parse_metrics("Size Increase:  +12.5% (approx)  \n").unwrap();
        assert_eq!(metrics.size_increase_label, "+12.5% (approx)");
    }

    #[test]
    fn test_value_containing_colon() {
        let metrics = parse_metrics("Size Increase: ratio 1:2\n").unwrap();
        assert_eq!(metrics.size_increase_label, "ratio 1:2");
    }

    #[test]
    fn test_crlf_line_endings() {
        let metrics = parse_metrics("Functions Processed: 3\r\nProcessing Time: 2s\r\n").unwrap();
        assert_eq!(metrics.functions_processed, 3);
        assert_eq!(metrics.processing_time_seconds, 2.0);
    }

    #[test]
    fn test_error_display() {
        let err = parse_metrics("Obfuscated Size: lots bytes\n").unwrap_err();
        assert!(err.to_string().contains("Obfuscated Size"));
        assert!(err.to_string().contains("lots bytes"));
    }
}
