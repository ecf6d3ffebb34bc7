//! Byte-level and lexical encodings of temporal extents.

pub mod codec;
pub mod literal;

pub use codec::{decode, encode, end_key, sortable_millis, start_key};
pub use literal::{
    extent_from_literal, literal_for, parse_date_time, parse_duration, parse_interval,
    XsdDuration,
};
