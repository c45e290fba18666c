//! Shared proptest strategies.

use proptest::prelude::*;

/// Arbitrary request field values of at most `max_chars` characters.
pub fn arb_field_value(max_chars: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<char>(), 0..=max_chars)
        .prop_map(|chars| chars.into_iter().collect())
}
