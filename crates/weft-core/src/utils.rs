//! Naming helpers shared by the derivers and printers.

/// Marker that starts every synthesized rule name.
pub const PSEUDO_MARKER: char = '§';

/// Convert a rule name to a type name.
///
/// Segments separated by `_`, `-` or `.` are capitalized and joined; the rest
/// of each segment keeps its case so camelCase rule names survive.
///
/// # Examples
/// ```
/// use weft_core::utils::to_pascal_case;
/// assert_eq!(to_pascal_case("expr_list"), "ExprList");
/// assert_eq!(to_pascal_case("binaryExpr"), "BinaryExpr");
/// assert_eq!(to_pascal_case("S1"), "S1");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for segment in s.split(['_', '-', '.']).filter(|seg| !seg.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Name for the `n`-th occurrence of `base` at one level: `base`, `base2`, `base3`...
pub fn numbered_name(base: &str, occurrence: usize) -> String {
    if occurrence <= 1 {
        base.to_owned()
    } else {
        format!("{base}{occurrence}")
    }
}

/// Whether `name` was synthesized for an anonymous construct.
pub fn is_pseudo_name(name: &str) -> bool {
    name.starts_with(PSEUDO_MARKER)
}
