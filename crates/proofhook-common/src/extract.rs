//! Field extraction from free-form submission text
//!
//! The form service delivers the watched field as a single line of
//! `Label: value` pairs separated by commas, for example:
//!
//! ```text
//! Factuurnummer:INV42, Klant: Jane Doe, Adres: Main St 1, Factuur uploaden: yes, Offerte uploaden: no
//! ```
//!
//! Each field of a [`ProofRecord`] is described by one [`ExtractionRule`]. Rules
//! are compiled once into a [`FieldExtractor`] and every rule is matched against
//! the whole input independently, so the order of the pairs in the text does not
//! matter and a missing pair only blanks its own field.
//!
//! # Example
//!
//! ```
//! use proofhook_common::extract::FieldExtractor;
//!
//! let extractor = FieldExtractor::standard().unwrap();
//! let record = extractor.extract("Klant: Jane Doe, Offerte uploaden: no");
//!
//! assert_eq!(record.customer_name, "Jane Doe");
//! assert_eq!(record.quote_upload_flag, "no");
//! assert_eq!(record.invoice_number, "");
//! ```

use regex::Regex;

use crate::error::{ProofhookError, Result};
use crate::types::{ProofField, ProofRecord};

/// Where the value of a labelled field ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// One or more word characters directly after the colon; ends at the
    /// first non-word character
    Word,
    /// Shortest run of characters up to the next comma
    Comma,
    /// Everything up to the end of the input
    EndOfInput,
}

/// A single `label -> field` extraction rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    pub field: ProofField,
    /// Label text as it appears before the colon
    pub label: &'static str,
    pub terminator: Terminator,
}

impl ExtractionRule {
    pub const fn new(field: ProofField, label: &'static str, terminator: Terminator) -> Self {
        Self {
            field,
            label,
            terminator,
        }
    }

    /// Regular expression implementing this rule; capture group 1 is the value
    pub fn pattern(&self) -> String {
        let label = regex::escape(self.label);
        match self.terminator {
            Terminator::Word => format!(r"(?s){label}:(\w+)"),
            Terminator::Comma => format!(r"(?s){label}:(.*?),"),
            Terminator::EndOfInput => format!(r"(?s){label}:(.*)"),
        }
    }
}

/// Labels used by the installation proof form
pub const STANDARD_RULES: &[ExtractionRule] = &[
    ExtractionRule::new(ProofField::InvoiceNumber, "Factuurnummer", Terminator::Word),
    ExtractionRule::new(ProofField::CustomerName, "Klant", Terminator::Comma),
    ExtractionRule::new(ProofField::Address, "Adres", Terminator::Comma),
    ExtractionRule::new(ProofField::InvoiceUploadFlag, "Factuur uploaden", Terminator::Comma),
    ExtractionRule::new(ProofField::QuoteUploadFlag, "Offerte uploaden", Terminator::EndOfInput),
];

#[derive(Debug, Clone)]
struct CompiledRule {
    field: ProofField,
    pattern: Regex,
}

/// Compiled set of extraction rules
///
/// Cheap to share behind an `Arc`; extraction takes `&self` and has no side effects.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    rules: Vec<CompiledRule>,
}

impl FieldExtractor {
    /// Compile a rule table
    pub fn new(rules: &[ExtractionRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern())
                    .map(|pattern| CompiledRule {
                        field: rule.field,
                        pattern,
                    })
                    .map_err(|source| ProofhookError::InvalidRule {
                        field: rule.field.as_str(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Extractor for [`STANDARD_RULES`]
    pub fn standard() -> Result<Self> {
        Self::new(STANDARD_RULES)
    }

    /// Fields this extractor fills, in rule order
    pub fn fields(&self) -> impl Iterator<Item = ProofField> + '_ {
        self.rules.iter().map(|rule| rule.field)
    }

    /// Extract a [`ProofRecord`] from `text`
    ///
    /// Never fails: a rule that does not match leaves its field empty.
    pub fn extract(&self, text: &str) -> ProofRecord {
        let mut record = ProofRecord::default();

        for rule in &self.rules {
            if let Some(value) = rule
                .pattern
                .captures(text)
                .and_then(|captures| captures.get(1))
            {
                record.set(rule.field, value.as_str().trim());
            }
        }

        record
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FULL_SUBMISSION: &str = "Factuurnummer:INV42, Klant: Jane Doe, Adres: Main St 1, Factuur uploaden: yes, Offerte uploaden: no";

    fn extractor() -> FieldExtractor {
        FieldExtractor::standard().unwrap()
    }

    #[test]
    fn test_extract_all_fields() {
        let record = extractor().extract(FULL_SUBMISSION);

        assert_eq!(record.invoice_number, "INV42");
        assert_eq!(record.customer_name, "Jane Doe");
        assert_eq!(record.address, "Main St 1");
        assert_eq!(record.invoice_upload_flag, "yes");
        assert_eq!(record.quote_upload_flag, "no");
    }

    #[test]
    fn test_no_labels_yields_empty_record() {
        let record = extractor().extract("nothing to see here, move along");
        assert_eq!(record, ProofRecord::default());
        assert!(extractor().extract("").is_empty());
    }

    #[test]
    fn test_missing_label_blanks_only_that_field() {
        let record = extractor().extract(
            "Factuurnummer:INV42, Adres: Main St 1, Factuur uploaden: yes, Offerte uploaden: no",
        );

        assert_eq!(record.customer_name, "");
        assert_eq!(record.invoice_number, "INV42");
        assert_eq!(record.address, "Main St 1");
        assert_eq!(record.invoice_upload_flag, "yes");
        assert_eq!(record.quote_upload_flag, "no");
    }

    #[test]
    fn test_rules_are_order_insensitive() {
        let record = extractor().extract(
            "Adres: Main St 1, Factuur uploaden: yes, Klant: Jane Doe, Factuurnummer:INV42, Offerte uploaden: no",
        );
        assert_eq!(record, extractor().extract(FULL_SUBMISSION));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = extractor();
        let first = extractor.extract(FULL_SUBMISSION);
        let second = extractor.extract(FULL_SUBMISSION);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invoice_number_stops_at_non_word_character() {
        let record = extractor().extract("Factuurnummer:INV-42");
        assert_eq!(record.invoice_number, "INV");

        let record = extractor().extract("Factuurnummer:2024_007 Klant: x,");
        assert_eq!(record.invoice_number, "2024_007");
    }

    #[test]
    fn test_invoice_number_must_follow_colon_directly() {
        let record = extractor().extract("Factuurnummer: INV42, Klant: A,");
        assert_eq!(record.invoice_number, "");
        assert_eq!(record.customer_name, "A");

        let record = extractor().extract("Factuurnummer:\nINV42");
        assert_eq!(record.invoice_number, "");
    }

    #[test]
    fn test_comma_rule_requires_a_trailing_comma() {
        let record = extractor().extract("Offerte uploaden: no, Klant: Jane Doe");
        assert_eq!(record.customer_name, "");
    }

    #[test]
    fn test_comma_rule_takes_shortest_value() {
        let record = extractor().extract("Klant: Doe, Jane, Adres: Main St 1,");
        assert_eq!(record.customer_name, "Doe");
        assert_eq!(record.address, "Main St 1");
    }

    #[test]
    fn test_quote_flag_runs_to_end_of_input() {
        let record = extractor().extract("Offerte uploaden:  yes please, thanks \n");
        assert_eq!(record.quote_upload_flag, "yes please, thanks");
    }

    #[test]
    fn test_values_spanning_lines() {
        let record = extractor().extract("Klant: Jane\nDoe, Adres:\n Main St 1\n,");
        assert_eq!(record.customer_name, "Jane\nDoe");
        assert_eq!(record.address, "Main St 1");
    }

    #[test]
    fn test_custom_rule_table() {
        let rules = [
            ExtractionRule::new(ProofField::CustomerName, "Customer", Terminator::Comma),
            ExtractionRule::new(ProofField::InvoiceNumber, "Invoice (no.)", Terminator::Word),
        ];
        let extractor = FieldExtractor::new(&rules).unwrap();

        let record = extractor.extract("Invoice (no.):A1, Customer: ACME,");
        assert_eq!(record.invoice_number, "A1");
        assert_eq!(record.customer_name, "ACME");
        assert_eq!(
            extractor.fields().collect::<Vec<_>>(),
            vec![ProofField::CustomerName, ProofField::InvoiceNumber]
        );
    }

    #[test]
    fn test_standard_patterns() {
        assert_eq!(STANDARD_RULES[0].pattern(), r"(?s)Factuurnummer:(\w+)");
        assert_eq!(STANDARD_RULES[3].pattern(), r"(?s)Factuur uploaden:(.*?),");
        assert_eq!(STANDARD_RULES[4].pattern(), r"(?s)Offerte uploaden:(.*)");
    }

    proptest! {
        #[test]
        fn prop_extracted_values_are_trimmed(text in "\\PC{0,200}") {
            let record = extractor().extract(&text);
            for field in ProofField::ALL {
                let value = record.get(field);
                prop_assert_eq!(value, value.trim());
            }
        }

        #[test]
        fn prop_labelled_values_round_trip(
            invoice in "[A-Za-z0-9]{1,12}",
            customer in "[A-Za-z][A-Za-z ]{0,20}[A-Za-z]",
            flag in "(yes|no)",
        ) {
            let text = format!(
                "Factuurnummer:{invoice}, Klant: {customer}, Adres: x, Factuur uploaden: {flag}, Offerte uploaden: {flag}"
            );
            let record = extractor().extract(&text);
            prop_assert_eq!(record.invoice_number, invoice);
            prop_assert_eq!(record.customer_name, customer);
            prop_assert_eq!(&record.invoice_upload_flag, &flag);
            prop_assert_eq!(record.quote_upload_flag, flag);
        }
    }
}
