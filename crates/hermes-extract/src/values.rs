//! Ordered, multi-valued query and form storage.

use serde_urlencoded::de::Error as DecodeError;

/// Query and form values in the order they were received.
///
/// Keys may repeat. Lookups by name return the first value; use
/// [`get_all`](Self::get_all) for every value of a key.
///
/// # Example
///
/// ```rust
/// use hermes_extract::FormValues;
///
/// let values = FormValues::parse("tag=a&tag=b&page=2");
/// assert_eq!(values.get("tag"), Some("a"));
/// assert_eq!(values.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(values.get("page"), Some("2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pairs: Vec<(String, String)>,
}

impl FormValues {
    /// Creates an empty set of values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` string.
    ///
    /// `+` decodes to a space. Input that cannot be decoded yields an empty
    /// set; use [`try_parse`](Self::try_parse) to see the error.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::try_parse(input).unwrap_or_default()
    }

    /// Decodes an `application/x-www-form-urlencoded` string.
    pub fn try_parse(input: &str) -> Result<Self, DecodeError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(input)?;
        Ok(Self { pairs })
    }

    /// Decodes url-encoded bytes, such as a form body.
    pub fn try_parse_bytes(input: &[u8]) -> Result<Self, DecodeError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)?;
        Ok(Self { pairs })
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns every value for `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if `name` has at least one value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(key, _)| key == name)
    }

    /// Appends a value, keeping any existing values for the same key.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns an iterator over all pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Extend<(String, String)> for FormValues {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.pairs.extend(iter);
    }
}

impl IntoIterator for FormValues {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order_and_duplicates() {
        let values = FormValues::parse("b=2&a=1&b=3");
        let pairs: Vec<_> = values.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "1"), ("b", "3")]);
    }

    #[test]
    fn test_url_encoded_values() {
        let values = FormValues::parse("name=John+Doe&email=john%40example.com");
        assert_eq!(values.get("name"), Some("John Doe"));
        assert_eq!(values.get("email"), Some("john@example.com"));
    }

    #[test]
    fn test_empty_input() {
        assert!(FormValues::parse("").is_empty());
    }

    #[test]
    fn test_key_without_value() {
        let values = FormValues::parse("flag&x=1");
        assert!(values.contains("flag"));
        assert_eq!(values.get("flag"), Some(""));
    }

    #[test]
    fn test_missing_key() {
        let values = FormValues::parse("x=1");
        assert_eq!(values.get("y"), None);
        assert_eq!(values.get_all("y").count(), 0);
    }

    #[test]
    fn test_append_and_extend() {
        let mut values = FormValues::parse("a=1");
        values.append("a", "2");
        values.extend(FormValues::parse("c=3"));
        assert_eq!(values.get_all("a").collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(values.len(), 3);
    }
}
