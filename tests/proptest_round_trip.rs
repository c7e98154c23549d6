use fixbin::{to_decimal_string, FixedPoint, SATURATING};
use proptest::prelude::*;

type Q16_8 = FixedPoint<16, 8>;
type Q16_8Sat = FixedPoint<16, 8, SATURATING>;

// Property 1: decimal string round trip is the identity on every raw pattern
proptest! {
    #[test]
    fn prop_decimal_string_round_trip(raw in 0u64..=0xFFFF) {
        let v = Q16_8::from_raw_bits(raw);
        let text = to_decimal_string(&v);
        let back: Q16_8 = text.parse().unwrap();
        prop_assert_eq!(back, v, "round trip failed for {}", text);
    }
}

// Property 2: f64 export/import round trip (Q16.8 fits f64 exactly)
proptest! {
    #[test]
    fn prop_f64_round_trip(raw in 0u64..=0xFFFF) {
        let v = Q16_8::from_raw_bits(raw);
        prop_assert_eq!(Q16_8::from(v.to_f64()), v);
    }
}

// Property 3: negation is an involution away from the most negative value
proptest! {
    #[test]
    fn prop_negation_involution(raw in 0u64..=0xFFFF) {
        let v = Q16_8::from_raw_bits(raw);
        prop_assert_eq!(-(-v.clone()), v);
    }
}

// Property 4: modulo addition is commutative and subtraction inverts it
proptest! {
    #[test]
    fn prop_modulo_add_commutes_and_sub_inverts(a in 0u64..=0xFFFF, b in 0u64..=0xFFFF) {
        let x = Q16_8::from_raw_bits(a);
        let y = Q16_8::from_raw_bits(b);
        prop_assert_eq!(x.clone() + y.clone(), y.clone() + x.clone());
        prop_assert_eq!((x.clone() + y.clone()) - y, x);
    }
}

// Property 5: ordering agrees with the exact f64 rendering
proptest! {
    #[test]
    fn prop_ordering_matches_f64(a in 0u64..=0xFFFF, b in 0u64..=0xFFFF) {
        let x = Q16_8::from_raw_bits(a);
        let y = Q16_8::from_raw_bits(b);
        let expected = x.to_f64().partial_cmp(&y.to_f64()).unwrap();
        prop_assert_eq!(x.cmp(&y), expected);
    }
}

// Property 6: saturating import never leaves the representable range
proptest! {
    #[test]
    fn prop_saturating_import_stays_in_range(value in -1000.0f64..1000.0f64) {
        let v = Q16_8Sat::from(value);
        let lo = Q16_8Sat::max_neg().to_f64();
        let hi = Q16_8Sat::max_pos().to_f64();
        let exported = v.to_f64();
        prop_assert!(exported >= lo && exported <= hi, "{} escaped [{}, {}]", exported, lo, hi);
    }
}

// Property 7: float import is within half an ULP of the source value
proptest! {
    #[test]
    fn prop_import_rounds_to_nearest(value in -100.0f64..100.0f64) {
        let v = Q16_8::from(value);
        let ulp = 1.0 / 256.0;
        prop_assert!((v.to_f64() - value).abs() <= ulp / 2.0 + f64::EPSILON);
    }
}
