//! Stable identifiers for projects, solution folders, and filter groups.
//!
//! An identifier depends on nothing but the name it is derived from, so
//! regenerating a solution leaves every project and folder identifier intact.

use uuid::Uuid;

/// Namespace all generated identifiers live under
pub const NAMESPACE: Uuid = Uuid::NAMESPACE_OID;

/// Identifier for `name`, upper-case and hyphenated, without braces
pub fn create_guid(name: &str) -> String {
    Uuid::new_v5(&NAMESPACE, name.as_bytes())
        .hyphenated()
        .to_string()
        .to_uppercase()
}
