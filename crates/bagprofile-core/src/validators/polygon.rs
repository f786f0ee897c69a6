//! Closed polygon ring validation for `gml:posList` values.

/// Minimum number of coordinate values in a ring (four pairs).
pub const MIN_RING_VALUES: usize = 8;

/// Reason a coordinate list is not a closed ring.
///
/// Checks run in a fixed order (even count, minimum length, closure) and only
/// the first failing one is reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolygonError {
    #[error("odd number of values: {count}")]
    OddCount { count: usize },

    #[error("too few values: {count} (minimum 8)")]
    TooFew { count: usize },

    #[error("unequal first and last pairs: ({first}) and ({last})")]
    NotClosed { first: String, last: String },
}

/// Validate a whitespace-separated list of coordinates describing one ring.
pub fn validate_pos_list(pos_list: &str) -> Result<(), PolygonError> {
    let values: Vec<&str> = pos_list.split_whitespace().collect();
    let count = values.len();

    if count % 2 != 0 {
        return Err(PolygonError::OddCount { count });
    }
    if count < MIN_RING_VALUES {
        return Err(PolygonError::TooFew { count });
    }

    let first = &values[..2];
    let last = &values[count - 2..];
    if first != last {
        return Err(PolygonError::NotClosed {
            first: first.join(" "),
            last: last.join(" "),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn closed_ring_is_valid() {
        assert_eq!(validate_pos_list("1 2 3 4 5 6 7 8 1 2"), Ok(()));
    }

    #[test]
    fn too_few_values() {
        let err = validate_pos_list("1 2 1 2").unwrap_err();
        assert!(err.to_string().contains("too few values"), "{}", err);
    }

    #[test]
    fn odd_number_of_values() {
        let err = validate_pos_list("1 2 3 4 5 6 7 1 2").unwrap_err();
        assert!(err.to_string().contains("odd number of values"), "{}", err);
    }

    #[test]
    fn unclosed_ring() {
        let err = validate_pos_list("1 2 3 4 5 6 7 8").unwrap_err();
        assert!(err.to_string().contains("unequal first and last"), "{}", err);
    }

    #[test]
    fn odd_count_reported_before_length() {
        // 3 values: both odd and too short
        assert_eq!(
            validate_pos_list("1 2 3"),
            Err(PolygonError::OddCount { count: 3 })
        );
    }

    #[test]
    fn length_reported_before_closure() {
        assert_eq!(
            validate_pos_list("1 2 3 4"),
            Err(PolygonError::TooFew { count: 4 })
        );
    }

    #[test]
    fn surrounding_whitespace_and_newlines_are_ignored() {
        assert_eq!(validate_pos_list("\n  1 2\n3 4\t5 6 7 8 1 2  \n"), Ok(()));
    }

    proptest! {
        #[test]
        fn any_closed_ring_of_four_or_more_pairs_is_valid(
            pairs in proptest::collection::vec((-1000i32..1000, -1000i32..1000), 3..20)
        ) {
            let mut values: Vec<String> = pairs
                .iter()
                .flat_map(|(x, y)| [x.to_string(), y.to_string()])
                .collect();
            values.push(pairs[0].0.to_string());
            values.push(pairs[0].1.to_string());
            prop_assert_eq!(validate_pos_list(&values.join(" ")), Ok(()));
        }

        #[test]
        fn odd_token_counts_are_always_rejected(
            values in proptest::collection::vec(-1000i32..1000, 0..40)
                .prop_filter("odd length", |v| v.len() % 2 == 1)
        ) {
            let list = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
            let is_odd_count = matches!(validate_pos_list(&list), Err(PolygonError::OddCount { .. }));
            prop_assert!(is_odd_count);
        }
    }
}
