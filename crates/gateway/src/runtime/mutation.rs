//! Mutation protocol parser.
//!
//! Once collection is complete, the advisor instruction tells the model to
//! emit one of two sentinel lines instead of prose when the user wants to
//! change their data:
//!
//! ```text
//! UPDATE_DATA|field|value
//! ADD_DATA|field|value
//! ```
//!
//! Both are the same overwrite operation on the collected map; they differ
//! only in the confirmation wording. Anything that does not parse as a
//! mutation passes through to the user verbatim.

/// Which sentinel the model emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Update,
    Add,
}

/// A parsed data mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub op: MutationOp,
    pub field: String,
    pub value: String,
}

/// Parse a model reply as a mutation, if it is one.
///
/// Splits on at most two `|` separators, so a `|` inside the value folds
/// into the value. Returns `None` for replies that are not well-formed
/// mutations (wrong sentinel, empty field, missing value part); those are
/// displayed verbatim.
pub fn parse_mutation(text: &str) -> Option<Mutation> {
    let trimmed = text.trim();
    let op = if trimmed.starts_with("UPDATE_DATA|") {
        MutationOp::Update
    } else if trimmed.starts_with("ADD_DATA|") {
        MutationOp::Add
    } else {
        return None;
    };

    let mut parts = trimmed.splitn(3, '|');
    let _sentinel = parts.next()?;
    let field = parts.next()?.trim();
    let value = parts.next()?.trim();

    if field.is_empty() {
        return None;
    }

    Some(Mutation {
        op,
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// The confirmation sentence shown to the user after a mutation is applied.
pub fn confirmation(mutation: &Mutation) -> String {
    match mutation.op {
        MutationOp::Update => format!(
            "Got it. I've updated {} to {}.",
            mutation.field, mutation.value
        ),
        MutationOp::Add => format!(
            "Got it. I've recorded {} as {}.",
            mutation.field, mutation.value
        ),
    }
}
