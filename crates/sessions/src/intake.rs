//! Per-session intake state machine.
//!
//! A cursor walks the catalog in order. Each user answer is stored under the
//! current field's key and the cursor advances. Once the cursor passes the
//! last field the intake is complete and stays complete; further writes go
//! through [`Intake::set`] (tool calls and explicit data mutations).

use crate::catalog::{catalog, FieldDef};
use ne_domain::config::CatalogVariant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The questionnaire state for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intake {
    catalog: CatalogVariant,
    /// Index of the next unanswered field. Equal to the catalog length once
    /// every question has been answered.
    cursor: usize,
    /// Collected answers keyed by storage key. BTreeMap keeps wire output
    /// deterministic.
    collected: BTreeMap<String, String>,
}

impl Intake {
    pub fn new(variant: CatalogVariant) -> Self {
        Self {
            catalog: variant,
            cursor: 0,
            collected: BTreeMap::new(),
        }
    }

    fn fields(&self) -> &'static [FieldDef] {
        catalog(self.catalog)
    }

    /// The field the intake is currently asking about, or `None` once
    /// complete.
    pub fn current_question(&self) -> Option<&'static FieldDef> {
        self.fields().get(self.cursor)
    }

    /// Whether every catalog field has been answered.
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.fields().len()
    }

    /// Record an answer for the current field and advance the cursor. The
    /// answer is stored exactly as given, with no trimming or coercion.
    ///
    /// Returns the field that was answered, or `None` when the intake is
    /// already complete (in which case nothing is stored).
    pub fn record_answer(&mut self, answer: &str) -> Option<&'static FieldDef> {
        let field = self.fields().get(self.cursor)?;
        self.collected
            .insert(field.key.to_string(), answer.to_string());
        self.cursor += 1;
        Some(field)
    }

    /// The most recently answered field, if any.
    pub fn last_answered(&self) -> Option<&'static FieldDef> {
        if self.cursor == 0 {
            return None;
        }
        self.fields().get(self.cursor - 1)
    }

    /// Directly set a collected value without touching the cursor. Used by
    /// tool calls and explicit data mutations; accepts keys outside the
    /// catalog so clients can store ad-hoc fields.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.collected.insert(key.into(), value.into());
    }

    /// Read-only view of everything collected so far.
    pub fn collected(&self) -> &BTreeMap<String, String> {
        &self.collected
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn variant(&self) -> CatalogVariant {
        self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn questions_come_in_catalog_order() {
        let mut intake = Intake::new(CatalogVariant::Minimal);
        assert_eq!(intake.current_question().unwrap().key, "name");
        intake.record_answer("Ada");
        assert_eq!(intake.current_question().unwrap().key, "age");
        intake.record_answer("34");
        assert_eq!(intake.current_question().unwrap().key, "income");
    }

    #[test]
    fn answers_are_stored_as_given() {
        let mut intake = Intake::new(CatalogVariant::Minimal);
        intake.record_answer("  Ada  ");
        assert_eq!(
            intake.collected().get("name").map(String::as_str),
            Some("  Ada  ")
        );
    }

    #[test]
    fn completes_after_last_answer_and_stays_complete() {
        let mut intake = Intake::new(CatalogVariant::Minimal);
        for answer in ["Ada", "34", "90000", "12000", "150000"] {
            assert!(!intake.is_complete());
            intake.record_answer(answer);
        }
        assert!(intake.is_complete());
        assert!(intake.current_question().is_none());

        // Further answers are not recorded against any field.
        let before = intake.collected().clone();
        assert!(intake.record_answer("extra").is_none());
        assert_eq!(intake.collected(), &before);
    }

    #[test]
    fn set_does_not_advance_the_cursor() {
        let mut intake = Intake::new(CatalogVariant::Minimal);
        intake.set("cash", "5000");
        assert_eq!(intake.cursor(), 0);
        assert_eq!(intake.current_question().unwrap().key, "name");
        assert_eq!(intake.collected().get("cash").map(String::as_str), Some("5000"));
    }

    #[test]
    fn set_accepts_keys_outside_the_catalog() {
        let mut intake = Intake::new(CatalogVariant::Minimal);
        intake.set("cryptoHoldings", "2 BTC");
        assert!(intake.collected().contains_key("cryptoHoldings"));
    }

    #[test]
    fn last_answered_tracks_the_previous_field() {
        let mut intake = Intake::new(CatalogVariant::Full);
        assert!(intake.last_answered().is_none());
        intake.record_answer("Ada");
        assert_eq!(intake.last_answered().unwrap().key, "name");
    }
}
