//! Question catalogs.
//!
//! Each catalog is a fixed, ordered list of fields the intake walks through.
//! The `key` is the storage key used in collected data and over the wire, so
//! these stay camelCase to match the client contract.

use ne_domain::config::CatalogVariant;

/// One field the intake collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Storage key (camelCase, appears in wire responses).
    pub key: &'static str,
    /// The question asked for this field.
    pub prompt: &'static str,
}

/// Full financial picture, asked in this exact order.
pub const FULL_CATALOG: &[FieldDef] = &[
    FieldDef { key: "name", prompt: "What's your name?" },
    FieldDef { key: "age", prompt: "How old are you?" },
    FieldDef { key: "income", prompt: "What is your annual household income?" },
    FieldDef {
        key: "cash",
        prompt: "How much do you have in cash, checking, and savings accounts?",
    },
    FieldDef {
        key: "brokerage",
        prompt: "How much do you have in taxable brokerage accounts?",
    },
    FieldDef {
        key: "retirement",
        prompt: "How much is in your retirement accounts (401k, IRA, etc.)?",
    },
    FieldDef {
        key: "pension",
        prompt: "Do you have a pension? If so, what is its estimated value?",
    },
    FieldDef {
        key: "annuities",
        prompt: "Do you hold any annuities? If so, what is their total value?",
    },
    FieldDef {
        key: "properties",
        prompt: "What is the total value of any real estate you own?",
    },
    FieldDef {
        key: "mortgage",
        prompt: "How much do you still owe on your mortgage?",
    },
    FieldDef {
        key: "autoLoan",
        prompt: "How much do you owe on auto loans?",
    },
    FieldDef {
        key: "studentLoans",
        prompt: "How much do you owe in student loans?",
    },
    FieldDef {
        key: "otherDebts",
        prompt: "Do you have any other debts (credit cards, personal loans)? How much?",
    },
    FieldDef {
        key: "otherAssets",
        prompt: "Any other significant assets we haven't covered (vehicles, collectibles, business interests)?",
    },
];

/// Short variant for quick demos.
pub const MINIMAL_CATALOG: &[FieldDef] = &[
    FieldDef { key: "name", prompt: "What's your name?" },
    FieldDef { key: "age", prompt: "How old are you?" },
    FieldDef { key: "income", prompt: "What is your annual household income?" },
    FieldDef {
        key: "cash",
        prompt: "How much do you have in cash, checking, and savings accounts?",
    },
    FieldDef {
        key: "retirement",
        prompt: "How much is in your retirement accounts (401k, IRA, etc.)?",
    },
];

/// Storage keys counted as assets when summarizing net worth.
pub const ASSET_KEYS: &[&str] = &[
    "cash",
    "brokerage",
    "retirement",
    "pension",
    "annuities",
    "properties",
    "otherAssets",
];

/// Storage keys counted as liabilities when summarizing net worth.
pub const LIABILITY_KEYS: &[&str] = &["mortgage", "autoLoan", "studentLoans", "otherDebts"];

/// Resolve the catalog for a configured variant.
pub fn catalog(variant: CatalogVariant) -> &'static [FieldDef] {
    match variant {
        CatalogVariant::Full => FULL_CATALOG,
        CatalogVariant::Minimal => MINIMAL_CATALOG,
    }
}
