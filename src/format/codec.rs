//! Fixed-width extent encoding and secondary-key extraction.
//!
//! Value layout (16 bytes, big-endian):
//!
//! ```text
//! [0..8)   start, epoch millis (i64)
//! [8..16)  end, epoch millis (i64)
//! ```
//!
//! Secondary keys are the sortable form of one endpoint followed by the node
//! key, so entries with equal endpoints stay distinct.

use crate::types::{Extent, Instant, Interval, EXTENT_SIZE};

/// Width of one encoded endpoint.
pub const ENDPOINT_SIZE: usize = 8;

/// Encode an extent as start then end, big-endian.
pub fn encode(extent: &Extent) -> [u8; EXTENT_SIZE] {
    let mut buf = [0u8; EXTENT_SIZE];
    buf[..ENDPOINT_SIZE].copy_from_slice(&extent.start_millis().to_be_bytes());
    buf[ENDPOINT_SIZE..].copy_from_slice(&extent.end_millis().to_be_bytes());
    buf
}

/// Decode a value written by [`encode`]. Equal endpoints yield an instant.
///
/// The bytes are trusted: no length or ordering validation is performed.
pub fn decode(bytes: &[u8]) -> Extent {
    let start = read_i64(bytes, 0);
    let end = read_i64(bytes, ENDPOINT_SIZE);
    if start == end {
        Extent::Instant(Instant::new(start))
    } else {
        Extent::Interval(Interval::new_unchecked(
            Instant::new(start),
            Instant::new(end),
        ))
    }
}

fn read_i64(bytes: &[u8], at: usize) -> i64 {
    let mut buf = [0u8; ENDPOINT_SIZE];
    if let Some(src) = bytes.get(at..at + ENDPOINT_SIZE) {
        buf.copy_from_slice(src);
    }
    i64::from_be_bytes(buf)
}

/// Start-index key extractor: the first endpoint of an encoded value.
pub fn start_key(value: &[u8]) -> &[u8] {
    value.get(..ENDPOINT_SIZE).unwrap_or(value)
}

/// End-index key extractor: the second endpoint of an encoded value.
pub fn end_key(value: &[u8]) -> &[u8] {
    value.get(ENDPOINT_SIZE..EXTENT_SIZE).unwrap_or(value)
}

/// Map a big-endian i64 to bytes whose lexicographic order matches numeric order.
pub fn sortable(endpoint: &[u8]) -> [u8; ENDPOINT_SIZE] {
    let mut buf = [0u8; ENDPOINT_SIZE];
    buf[..endpoint.len().min(ENDPOINT_SIZE)]
        .copy_from_slice(&endpoint[..endpoint.len().min(ENDPOINT_SIZE)]);
    buf[0] ^= 0x80;
    buf
}

/// Sortable bytes of a millisecond value.
pub fn sortable_millis(millis: i64) -> [u8; ENDPOINT_SIZE] {
    sortable(&millis.to_be_bytes())
}

/// Inverse of [`sortable_millis`] over the first 8 bytes of `key`.
pub fn millis_from_sortable(key: &[u8]) -> i64 {
    let mut buf = [0u8; ENDPOINT_SIZE];
    if let Some(src) = key.get(..ENDPOINT_SIZE) {
        buf.copy_from_slice(src);
    }
    buf[0] ^= 0x80;
    i64::from_be_bytes(buf)
}

/// Secondary key: `sortable(extracted endpoint) ‖ node key`.
pub fn secondary_key(extract: fn(&[u8]) -> &[u8], value: &[u8], node_key: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(ENDPOINT_SIZE + node_key.len());
    key.extend_from_slice(&sortable(extract(value)));
    key.extend_from_slice(node_key);
    key
}

/// Node key portion of a secondary key.
pub fn node_key_of(secondary: &[u8]) -> &[u8] {
    secondary.get(ENDPOINT_SIZE..).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MAX_TIME, MIN_TIME};

    #[test]
    fn layout_is_big_endian_start_then_end() {
        let e = Extent::from_millis(1, 258).unwrap();
        let bytes = encode(&e);
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(&bytes[8..], &[0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(start_key(&bytes), &bytes[..8]);
        assert_eq!(end_key(&bytes), &bytes[8..]);
    }

    #[test]
    fn decode_restores_variant() {
        for e in [
            Extent::instant(0),
            Extent::instant(-42),
            Extent::from_millis(-5, 5).unwrap(),
            Extent::from_millis(MIN_TIME, MAX_TIME).unwrap(),
        ] {
            assert_eq!(decode(&encode(&e)), e);
        }
    }

    #[test]
    fn sortable_orders_negatives_first() {
        let mut values = vec![MAX_TIME, 0, -1, 1, MIN_TIME, -1000, 1000];
        let mut keys: Vec<_> = values.iter().map(|v| sortable_millis(*v)).collect();
        keys.sort();
        values.sort();
        let back: Vec<i64> = keys.iter().map(|k| millis_from_sortable(k)).collect();
        assert_eq!(back, values);
    }

    #[test]
    fn secondary_key_carries_node_key() {
        let value = encode(&Extent::from_millis(3, 7).unwrap());
        let key = secondary_key(end_key, &value, b"urn:n");
        assert_eq!(millis_from_sortable(&key), 7);
        assert_eq!(node_key_of(&key), b"urn:n");
    }
}
