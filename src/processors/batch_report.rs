use validator::Validate;

use crate::models::ObservationRow;

/// Data-quality flags gathered while normalizing a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub input_records: usize,
    pub normalized_rows: usize,
    pub duplicates_dropped: usize,
    /// Cities whose observation time was missing or unparsable.
    pub untimed_rows: Vec<String>,
    pub unknown_weather_codes: Vec<(String, Option<i32>)>,
    pub incomplete_rows: usize,
    pub range_violations: Vec<RangeViolation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeViolation {
    pub city: String,
    pub details: String,
}

impl BatchReport {
    pub fn build(input_records: usize, duplicates_dropped: usize, rows: &[ObservationRow]) -> Self {
        let mut report = Self {
            input_records,
            normalized_rows: rows.len(),
            duplicates_dropped,
            ..Default::default()
        };

        for row in rows {
            report.check_row(row);
        }

        report
    }

    fn check_row(&mut self, row: &ObservationRow) {
        if !row.has_time() {
            self.untimed_rows.push(row.city.clone());
        }

        if !row.has_known_weather() {
            self.unknown_weather_codes
                .push((row.city.clone(), row.weather_code));
        }

        if row.has_missing_attributes() {
            self.incomplete_rows += 1;
        }

        // Reported only; physically odd readings still get stored.
        if let Err(errors) = row.validate() {
            for field in errors.field_errors().keys() {
                self.range_violations.push(RangeViolation {
                    city: row.city.clone(),
                    details: format!("{} out of range", field),
                });
            }
        }
    }

    /// Rows that can take part in the keyed merge.
    pub fn mergeable_rows(&self) -> usize {
        self.normalized_rows - self.untimed_rows.len()
    }

    pub fn is_clean(&self) -> bool {
        self.untimed_rows.is_empty()
            && self.unknown_weather_codes.is_empty()
            && self.incomplete_rows == 0
            && self.range_violations.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Batch Report ===\n");
        summary.push_str(&format!("Records collected: {}\n", self.input_records));
        summary.push_str(&format!("Rows normalized: {}\n", self.normalized_rows));
        summary.push_str(&format!(
            "Duplicates dropped: {}\n",
            self.duplicates_dropped
        ));
        summary.push_str(&format!(
            "Rows without time: {} (not mergeable)\n",
            self.untimed_rows.len()
        ));
        summary.push_str(&format!(
            "Unknown weather codes: {}\n",
            self.unknown_weather_codes.len()
        ));
        summary.push_str(&format!(
            "Rows with missing attributes: {}\n",
            self.incomplete_rows
        ));
        summary.push_str(&format!("Rows mergeable: {}\n", self.mergeable_rows()));
        if self.is_clean() {
            summary.push_str("No data-quality flags\n");
        }

        if !self.range_violations.is_empty() {
            summary.push_str(&format!(
                "\nRange Violations: {}\n",
                self.range_violations.len()
            ));
            for (i, violation) in self.range_violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {}: {}\n",
                    i + 1,
                    violation.city,
                    violation.details
                ));
            }
        }

        summary
    }
}
