//! Shared `Result` alias.
//!
//! Crates keep their own error enums and attach them to a
//! `rootcause::Report`; this alias only saves spelling out the report type.

use rootcause::Report;

/// `Result` whose error is a `Report` carrying context `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Lookup;

    impl std::fmt::Display for Lookup {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("lookup failed")
        }
    }

    impl std::error::Error for Lookup {}

    fn lookup(found: bool) -> Result<&'static str, Lookup> {
        if found { Ok("urn:aaid:aem:1234") } else { Err(Lookup.into()) }
    }

    #[test]
    fn alias_carries_context() {
        assert_eq!(lookup(true).expect("found"), "urn:aaid:aem:1234");
        let report = lookup(false).expect_err("missing");
        assert!(report.to_string().contains("lookup failed"));
    }
}
