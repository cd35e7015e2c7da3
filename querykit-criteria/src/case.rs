//! Identifier case conversion.

/// Convert a camelCase name to snake_case.
///
/// Every uppercase character becomes an underscore followed by its lowercase
/// form, except at the start of the string. Existing underscores and digits
/// are kept as they are, so already snake_cased names pass through unchanged.
///
/// ```rust
/// use querykit_criteria::case::to_snake_case;
///
/// assert_eq!(to_snake_case("firstName"), "first_name");
/// assert_eq!(to_snake_case("created_at"), "created_at");
/// ```
pub fn to_snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(to_snake_case("firstName"), "first_name");
        assert_eq!(to_snake_case("createdAtUtc"), "created_at_utc");
    }

    #[test]
    fn test_leading_uppercase() {
        assert_eq!(to_snake_case("Name"), "name");
        assert_eq!(to_snake_case("ID"), "i_d");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(to_snake_case("deleted_at"), "deleted_at");
        assert_eq!(to_snake_case("address1"), "address1");
        assert_eq!(to_snake_case(""), "");
    }
}
