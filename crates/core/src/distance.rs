//! Distance between sparse axis coordinates.

use indexmap::IndexMap;

/// Axis tag to user-space value, in axis order.
pub type Coordinates = IndexMap<String, f64>;

/// Euclidean distance over the union of both key sets.
///
/// A key missing on one side counts as 0 there, so callers fill absent axes
/// with their defaults before comparing.
pub fn distance(a: &Coordinates, b: &Coordinates) -> f64 {
    let only_in_b = b.iter().filter(|(key, _)| !a.contains_key(*key));
    a.iter()
        .map(|(key, value)| value - b.get(key).copied().unwrap_or(0.0))
        .chain(only_in_b.map(|(_, value)| -value))
        .map(|delta| delta * delta)
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(values: &[(&str, f64)]) -> Coordinates {
        values.iter().map(|(tag, value)| (tag.to_string(), *value)).collect()
    }

    #[test]
    fn identity_is_zero() {
        let a = coords(&[("wght", 400.0), ("wdth", 100.0)]);
        assert_eq!(distance(&a, &a), 0.0);
        assert_eq!(distance(&Coordinates::new(), &Coordinates::new()), 0.0);
    }

    #[test]
    fn symmetric_over_disjoint_keys() {
        let a = coords(&[("wght", 400.0), ("slnt", -10.0)]);
        let b = coords(&[("wght", 700.0), ("wdth", 100.0)]);
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn missing_keys_count_as_zero() {
        let a = coords(&[("wght", 3.0)]);
        let b = coords(&[("wdth", 4.0)]);
        assert_eq!(distance(&a, &b), 5.0);
    }

    #[test]
    fn single_axis_is_absolute_difference() {
        let a = coords(&[("wght", 650.0)]);
        assert_eq!(distance(&a, &coords(&[("wght", 700.0)])), 50.0);
        assert_eq!(distance(&a, &coords(&[("wght", 400.0)])), 250.0);
    }
}
