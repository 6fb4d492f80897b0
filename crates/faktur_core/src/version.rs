//! Semantic schema-version comparison.

use std::cmp::Ordering;

/// Compares two schema version strings.
///
/// Versions are dot-separated non-negative integers compared component-wise
/// left to right. Missing trailing components count as zero, so `"1.0"`
/// equals `"1.0.0"`. Non-numeric components also count as zero; a garbage
/// version therefore sorts before any real one and fails loudly later at
/// the migration catalog instead of here.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<u64> = components(a);
    let right: Vec<u64> = components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

fn components(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|c| c.trim().parse().unwrap_or(0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equal_versions() {
        assert_eq!(compare_versions("1.2.0", "1.2.0"), Ordering::Equal);
    }

    #[test]
    fn component_wise_ordering() {
        assert_eq!(compare_versions("1.0.0", "1.1.0"), Ordering::Less);
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("2.0.0", "1.99.99"), Ordering::Greater);
    }

    #[test]
    fn missing_trailing_components_are_zero() {
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("1.2", "1.1.9"), Ordering::Greater);
    }

    #[test]
    fn non_numeric_components_are_zero() {
        assert_eq!(compare_versions("1.x.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("garbage", "0.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("garbage", "1.0.0"), Ordering::Less);
    }

    proptest! {
        #[test]
        fn reflexive(a in 0u16..100, b in 0u16..100, c in 0u16..100) {
            let v = format!("{a}.{b}.{c}");
            prop_assert_eq!(compare_versions(&v, &v), Ordering::Equal);
        }

        #[test]
        fn antisymmetric(
            a1 in 0u16..100, b1 in 0u16..100, c1 in 0u16..100,
            a2 in 0u16..100, b2 in 0u16..100, c2 in 0u16..100,
        ) {
            let x = format!("{a1}.{b1}.{c1}");
            let y = format!("{a2}.{b2}.{c2}");
            prop_assert_eq!(compare_versions(&x, &y), compare_versions(&y, &x).reverse());
        }
    }
}
