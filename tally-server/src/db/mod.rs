//! Database access layer
//!
//! Plain functions over the shared pool; runtime-bound queries built with
//! the [`filter::Filter`] predicate builder so count and data queries can
//! never diverge.

pub mod customers;
pub mod expenses;
pub mod filter;
pub mod orders;
pub mod products;
pub mod stats;

use chrono::Local;
use rand::Rng;

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Generate a document number: `{prefix}{YYYYMMDD}{4 random digits}`.
///
/// Collisions are improbable but possible; the UNIQUE constraint catches
/// them and the insert fails with a conflict. Never retried silently.
pub(crate) fn generate_no(prefix: &str) -> String {
    let date = Local::now().format("%Y%m%d");
    let random: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("{prefix}{date}{random:04}")
}

/// Today's date as `YYYY-MM-DD`
pub(crate) fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_numbers_have_fixed_shape() {
        let no = generate_no("ORD");
        assert_eq!(no.len(), 3 + 8 + 4);
        assert!(no.starts_with("ORD"));
        assert!(no[3..].chars().all(|c| c.is_ascii_digit()));
    }
}
