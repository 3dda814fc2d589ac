//! `application/x-www-form-urlencoded` query strings.

use url::form_urlencoded;

/// Parses a query string into ordered key/value pairs.
///
/// A leading `?` is ignored and `+` decodes to a space.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Serializes key/value pairs into a query string without the leading `?`.
pub fn format_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plus_and_repeats() {
        let pairs = parse_query("?name=Hello+World&tags=a&tags=c&empty=");
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "Hello World".to_string()),
                ("tags".to_string(), "a".to_string()),
                ("tags".to_string(), "c".to_string()),
                ("empty".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn parse_empty() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("?").is_empty());
    }

    #[test]
    fn format_escapes() {
        let query = format_query([("b3", "hello world"), ("q", "a&b=c")]);
        assert_eq!(query, "b3=hello+world&q=a%26b%3Dc");
    }
}
