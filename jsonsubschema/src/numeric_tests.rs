#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::checker::{is_equivalent, is_subschema};
    use crate::error::SubschemaError;
    use serde_json::{Value, json};

    const DRAFT4: &str = "http://json-schema.org/draft-04/schema";

    fn draft4(mut schema: Value) -> Value {
        if let Value::Object(map) = &mut schema {
            map.insert("$schema".to_owned(), json!(DRAFT4));
        }
        schema
    }

    /// Asserts both directions of a check.
    fn assert_sub(lhs: Value, rhs: Value, forward: bool, backward: bool) {
        let (lhs, rhs) = (draft4(lhs), draft4(rhs));
        assert_eq!(
            is_subschema(&lhs, &rhs).unwrap(),
            forward,
            "{lhs} <: {rhs}"
        );
        assert_eq!(
            is_subschema(&rhs, &lhs).unwrap(),
            backward,
            "{rhs} <: {lhs}"
        );
    }

    // ---- integer ----

    #[test]
    fn test_integer_identity() {
        let s = draft4(json!({"type": "integer"}));
        assert!(is_subschema(&s, &s).unwrap());
    }

    #[test]
    fn test_integer_min_min() {
        assert_sub(
            json!({"type": "integer", "minimum": 5}),
            json!({"type": "integer", "minimum": 1}),
            true,
            false,
        );
    }

    #[test]
    fn test_integer_max_max() {
        assert_sub(
            json!({"type": "integer", "maximum": 10}),
            json!({"type": "integer", "maximum": 5}),
            false,
            true,
        );
    }

    #[test]
    fn test_integer_disjoint_half_lines() {
        assert_sub(
            json!({"type": "integer", "maximum": 10}),
            json!({"type": "integer", "minimum": 5}),
            false,
            false,
        );
        assert_sub(
            json!({"type": "integer", "minimum": 10}),
            json!({"type": "integer", "maximum": 20}),
            false,
            false,
        );
    }

    #[test]
    fn test_integer_closed_ranges() {
        assert_sub(
            json!({"type": "integer", "minimum": 5, "maximum": 10}),
            json!({"type": "integer", "minimum": 1, "maximum": 20}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "integer", "minimum": 5, "maximum": 20}),
            json!({"type": "integer", "minimum": 10, "maximum": 20}),
            false,
            true,
        );
        assert_sub(
            json!({"type": "integer", "minimum": 5, "maximum": 20}),
            json!({"type": "integer", "minimum": 40, "maximum": 100}),
            false,
            false,
        );
    }

    #[test]
    fn test_integer_exclusive_lower() {
        assert_sub(
            json!({"type": "integer", "minimum": 5, "exclusiveMinimum": true, "maximum": 20}),
            json!({"type": "integer", "minimum": 5, "maximum": 20}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "integer", "minimum": 5, "exclusiveMinimum": true, "maximum": 20}),
            json!({"type": "integer", "minimum": 5, "maximum": 20, "exclusiveMaximum": true}),
            false,
            false,
        );
    }

    #[test]
    fn test_integer_exclusive_both() {
        assert_sub(
            json!({"type": "integer", "minimum": 5, "exclusiveMinimum": true,
                   "maximum": 20, "exclusiveMaximum": true}),
            json!({"type": "integer", "minimum": 5, "maximum": 20}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "integer", "minimum": 5, "exclusiveMinimum": false,
                   "maximum": 20, "exclusiveMaximum": true}),
            json!({"type": "integer", "minimum": 5, "exclusiveMinimum": true,
                   "maximum": 20, "exclusiveMaximum": true}),
            false,
            true,
        );
    }

    #[test]
    fn test_integer_exclusive_bounds_discretize() {
        assert_sub(
            json!({"type": "integer", "minimum": 5, "exclusiveMinimum": true,
                   "maximum": 20, "exclusiveMaximum": true}),
            json!({"type": "integer", "minimum": 6, "maximum": 19}),
            true,
            true,
        );
        assert_sub(
            json!({"type": "integer", "minimum": 5, "exclusiveMinimum": true,
                   "maximum": 20, "exclusiveMaximum": true}),
            json!({"type": "integer", "minimum": 6, "maximum": 20}),
            true,
            false,
        );
    }

    #[test]
    fn test_integer_multiple_of() {
        assert_sub(
            json!({"type": "integer", "multipleOf": 10}),
            json!({"type": "integer"}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "integer", "multipleOf": 10}),
            json!({"type": "integer", "multipleOf": 5}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "integer", "multipleOf": 10}),
            json!({"type": "integer", "multipleOf": 98}),
            false,
            false,
        );
    }

    #[test]
    fn test_integer_multiple_of_with_bounds() {
        assert_sub(
            json!({"type": "integer", "multipleOf": 10}),
            json!({"type": "integer", "minimum": 5}),
            false,
            false,
        );
        assert_sub(
            json!({"type": "integer", "multipleOf": 10, "minimum": 10}),
            json!({"type": "integer", "minimum": 5}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "integer", "multipleOf": 10, "minimum": 10}),
            json!({"type": "integer", "minimum": 5, "maximum": 500}),
            false,
            false,
        );
    }

    #[test]
    fn test_integer_empty_lattice_window() {
        // No multiple of 15 lies in [5, 10].
        assert_sub(
            json!({"type": "integer", "minimum": 5, "maximum": 10, "multipleOf": 15}),
            json!({"type": "integer"}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "integer", "minimum": 5, "maximum": 10, "multipleOf": 15}),
            json!({"type": "string"}),
            true,
            false,
        );
    }

    // ---- number ----

    #[test]
    fn test_number_identity() {
        let s = draft4(json!({"type": "number"}));
        assert!(is_subschema(&s, &s).unwrap());
    }

    #[test]
    fn test_number_bounds() {
        assert_sub(
            json!({"type": "number", "minimum": 5}),
            json!({"type": "number", "minimum": 1}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "number", "maximum": 10}),
            json!({"type": "number", "maximum": 5}),
            false,
            true,
        );
        assert_sub(
            json!({"type": "number", "minimum": 5, "maximum": 20}),
            json!({"type": "number", "minimum": 10, "maximum": 20}),
            false,
            true,
        );
    }

    #[test]
    fn test_number_exclusive_bounds_stay_continuous() {
        assert_sub(
            json!({"type": "number", "minimum": 5, "exclusiveMinimum": true,
                   "maximum": 20, "exclusiveMaximum": true}),
            json!({"type": "number", "minimum": 6, "maximum": 19}),
            false,
            true,
        );
        assert_sub(
            json!({"type": "number", "minimum": 5, "exclusiveMinimum": true,
                   "maximum": 20, "exclusiveMaximum": true}),
            json!({"type": "number", "minimum": 6, "maximum": 20}),
            false,
            false,
        );
        assert_sub(
            json!({"type": "number", "minimum": 5, "exclusiveMinimum": true, "maximum": 20}),
            json!({"type": "number", "minimum": 5, "maximum": 20, "exclusiveMaximum": true}),
            false,
            false,
        );
    }

    #[test]
    fn test_number_multiple_of() {
        assert_sub(
            json!({"type": "number", "multipleOf": 10.5}),
            json!({"type": "number"}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "number", "multipleOf": 1.5}),
            json!({"type": "number", "multipleOf": 6}),
            false,
            true,
        );
        assert_sub(
            json!({"type": "number", "multipleOf": 1}),
            json!({"type": "number"}),
            true,
            false,
        );
    }

    #[test]
    fn test_number_multiple_of_with_bounds() {
        assert_sub(
            json!({"type": "number", "multipleOf": 10}),
            json!({"type": "number", "minimum": 5}),
            false,
            false,
        );
        assert_sub(
            json!({"type": "number", "multipleOf": 10, "minimum": 10}),
            json!({"type": "number", "minimum": 5}),
            true,
            false,
        );
        assert_sub(
            json!({"type": "number", "multipleOf": 10, "minimum": 10}),
            json!({"type": "number", "minimum": 5, "maximum": 500}),
            false,
            false,
        );
    }

    #[test]
    fn test_negative_multiple_of_is_malformed() {
        let lhs = draft4(json!({"type": "number", "multipleOf": 0.5}));
        let rhs = draft4(json!({"type": "number", "multipleOf": -0.5}));
        assert!(matches!(
            is_subschema(&lhs, &rhs),
            Err(SubschemaError::MalformedSchema(_))
        ));
        assert!(matches!(
            is_subschema(&rhs, &lhs),
            Err(SubschemaError::MalformedSchema(_))
        ));
    }

    #[test]
    fn test_decimal_literals_are_exact() {
        // 0.3 is three tenths, so 0.9 is one of its multiples.
        assert_sub(
            json!({"type": "number", "multipleOf": 0.9}),
            json!({"type": "number", "multipleOf": 0.3}),
            true,
            false,
        );
    }

    // ---- integer against number ----

    #[test]
    fn test_integer_inside_number() {
        assert_sub(
            json!({"type": "integer"}),
            json!({"type": "number"}),
            true,
            false,
        );
    }

    #[test]
    fn test_fractional_minimum_against_integer() {
        assert_sub(
            json!({"type": "number", "minimum": 1.5}),
            json!({"type": "integer", "minimum": 1}),
            false,
            false,
        );
    }

    #[test]
    fn test_number_multiple_of_against_integer() {
        assert_sub(
            json!({"type": "number", "multipleOf": 10}),
            json!({"type": "integer", "minimum": 5}),
            false,
            false,
        );
        assert_sub(
            json!({"type": "number", "multipleOf": 10}),
            json!({"type": "integer"}),
            true,
            false,
        );
    }

    #[test]
    fn test_number_multiple_of_one_is_integer() {
        let lhs = json!({"type": "number", "multipleOf": 1});
        let rhs = json!({"type": "integer"});
        assert!(is_equivalent(&lhs, &rhs).unwrap());
    }

    // ---- combinators over numbers ----

    #[test]
    fn test_invalid_all_of_member_from_both_sides() {
        let lhs = draft4(json!({"type": "integer"}));
        let rhs = draft4(json!({"type": "number", "allOf": [""]}));
        assert!(matches!(
            is_subschema(&lhs, &rhs),
            Err(SubschemaError::MalformedSchema(_))
        ));
        assert!(matches!(
            is_subschema(&rhs, &lhs),
            Err(SubschemaError::MalformedSchema(_))
        ));
    }

    #[test]
    fn test_all_of_integer_with_minimum() {
        assert_sub(
            json!({"type": "integer"}),
            json!({"type": "number",
                   "allOf": [{"type": "integer"}, {"type": "number", "minimum": 10}]}),
            false,
            true,
        );
        assert_sub(
            json!({"type": "integer", "multipleOf": 5}),
            json!({"type": "number",
                   "allOf": [{"type": "integer"}, {"type": "number", "minimum": 10}]}),
            false,
            false,
        );
    }

    #[test]
    fn test_misspelled_keyword_is_ignored() {
        assert_sub(
            json!({"type": "integer", "multipleOf": 5}),
            json!({"type": "number", "multipleOF": 3,
                   "allOf": [{"type": "integer"}, {"type": "number", "multipleOf": 3}]}),
            false,
            false,
        );
    }

    #[test]
    fn test_combined_moduli_merge() {
        assert_sub(
            json!({"type": "integer", "multipleOf": 15}),
            json!({"type": "number", "multipleOf": 3,
                   "allOf": [{"type": "integer"}, {"type": "number", "multipleOf": 5}]}),
            true,
            true,
        );
        assert_sub(
            json!({"type": "integer", "allOf": [{"multipleOf": 3}]}),
            json!({"type": "number", "multipleOf": 3,
                   "allOf": [{"type": "integer"}, {"type": "number", "multipleOf": 3}]}),
            true,
            true,
        );
    }

    #[test]
    fn test_bounded_lattice_against_merged_lattice() {
        assert_sub(
            json!({"type": "integer", "allOf": [{"multipleOf": 3}, {"minimum": 5}]}),
            json!({"type": "number", "multipleOf": 3,
                   "allOf": [{"type": "integer"}, {"type": "number", "multipleOf": 5}]}),
            false,
            false,
        );
    }

    #[test]
    fn test_integer_multiples_of_three_inside_tenths_lattice() {
        // Every multiple of 3 is a multiple of 0.3; the converse fails at 0.3.
        assert_sub(
            json!({"type": "number", "allOf": [{"multipleOf": 0.3}]}),
            json!({"type": "number", "multipleOf": 3,
                   "allOf": [{"type": "integer"}, {"type": "number", "multipleOf": 3}]}),
            false,
            true,
        );
    }

    #[test]
    fn test_any_of_covers_split_range() {
        assert_sub(
            json!({"type": "integer", "minimum": 0, "maximum": 10}),
            json!({"anyOf": [
                {"type": "integer", "maximum": 4},
                {"type": "integer", "minimum": 5}
            ]}),
            true,
            false,
        );
        // The gap (4, 5) has no integers but does have numbers.
        assert_sub(
            json!({"type": "number", "minimum": 0, "maximum": 10}),
            json!({"anyOf": [
                {"type": "number", "maximum": 4},
                {"type": "number", "minimum": 5}
            ]}),
            false,
            false,
        );
    }

    #[test]
    fn test_residue_classes_cover_integers() {
        let even = json!({"type": "integer", "multipleOf": 2});
        let odd = json!({"type": "integer", "not": {"multipleOf": 2}});
        let either = json!({"anyOf": [even, odd]});
        assert_sub(json!({"type": "integer"}), either, true, true);
    }

    #[test]
    fn test_not_multiple_of() {
        assert_sub(
            json!({"type": "integer", "multipleOf": 4}),
            json!({"type": "integer", "not": {"multipleOf": 3}}),
            false,
            false,
        );
        assert_sub(
            json!({"type": "integer", "multipleOf": 4}),
            json!({"type": "integer", "not": {"multipleOf": 8, "minimum": 0}}),
            false,
            false,
        );
        assert_sub(
            json!({"type": "integer", "multipleOf": 4}),
            json!({"not": {"type": "integer", "multipleOf": 2, "maximum": -1, "exclusiveMaximum": false,
                            "minimum": -1}}),
            true,
            false,
        );
    }

    #[test]
    fn test_enum_numbers() {
        assert_sub(
            json!({"enum": [3, 6, 9]}),
            json!({"type": "integer", "multipleOf": 3}),
            true,
            false,
        );
        assert_sub(
            json!({"enum": [1.5]}),
            json!({"type": "integer"}),
            false,
            false,
        );
    }

    #[test]
    fn test_large_coprime_exclusions_have_witnesses() {
        // 100019 escapes the left side, 100003 the right.
        assert_sub(
            json!({"type": "integer", "not": {"multipleOf": 100_003}}),
            json!({"type": "integer", "not": {"multipleOf": 100_019}}),
            false,
            false,
        );
        assert_sub(
            json!({"type": "integer", "minimum": 0, "not": {"multipleOf": 100_003}}),
            json!({"type": "integer", "not": {"multipleOf": 100_003}}),
            true,
            false,
        );
    }
}
