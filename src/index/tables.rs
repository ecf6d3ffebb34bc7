//! Table layout inside the redb file.

use redb::TableDefinition;

/// Node key → 16-byte encoded extent.
pub const PRIMARY: TableDefinition<&[u8], &[u8]> = TableDefinition::new("primary");

/// `sortable(start) ‖ node key` → encoded extent.
pub const STARTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("starts");

/// `sortable(end) ‖ node key` → encoded extent.
pub const ENDS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("ends");

/// One of the two derived orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secondary {
    Starts,
    Ends,
}

impl Secondary {
    pub fn table(self) -> TableDefinition<'static, &'static [u8], &'static [u8]> {
        match self {
            Secondary::Starts => STARTS,
            Secondary::Ends => ENDS,
        }
    }

    /// Key extractor over an encoded value.
    pub fn extractor(self) -> fn(&[u8]) -> &[u8] {
        match self {
            Secondary::Starts => crate::format::codec::start_key,
            Secondary::Ends => crate::format::codec::end_key,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Secondary::Starts => "starts",
            Secondary::Ends => "ends",
        }
    }
}
