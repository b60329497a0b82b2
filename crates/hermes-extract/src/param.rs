//! Route parameter accessors.
//!
//! Routers store captured path segments as they appear in the URL, still
//! percent-encoded. The accessors here decode on read and never fail: a
//! missing or undecodable parameter reads as the empty string, and numeric
//! accessors read as zero.

use crate::request::Request;

impl Request {
    /// Returns the decoded route parameter `name`.
    ///
    /// A leading `:` in `name` is ignored, so `param(":id")` and `param("id")`
    /// are the same lookup. Percent escapes are decoded; `+` is kept as is.
    /// Returns an empty string when the parameter is absent or its escapes
    /// are malformed.
    #[must_use]
    pub fn param(&self, name: &str) -> String {
        self.params
            .get(param_key(name))
            .and_then(path_unescape)
            .unwrap_or_default()
    }

    /// Returns route parameter `name` as a pointer-sized integer, or 0.
    #[must_use]
    pub fn param_int(&self, name: &str) -> isize {
        self.param(name).parse().unwrap_or_default()
    }

    /// Returns route parameter `name` as an `i64`, or 0.
    #[must_use]
    pub fn param_int64(&self, name: &str) -> i64 {
        self.param(name).parse().unwrap_or_default()
    }

    /// Returns route parameter `name` as an `f64`, or 0.0.
    #[must_use]
    pub fn param_float64(&self, name: &str) -> f64 {
        self.param(name).parse().unwrap_or_default()
    }

    /// Inserts or replaces route parameter `name`.
    ///
    /// The value is percent-encoded before storage so that [`param`](Self::param)
    /// returns it unchanged.
    pub fn set_param(&mut self, name: &str, value: &str) {
        self.params
            .set(param_key(name), urlencoding::encode(value).into_owned());
    }
}

fn param_key(name: &str) -> &str {
    name.strip_prefix(':').unwrap_or(name)
}

/// Decodes percent escapes, rejecting truncated or non-hex escapes and
/// escapes that do not form valid UTF-8.
fn path_unescape(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    urlencoding::decode(raw).ok().map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(params: &[(&str, &str)]) -> Request {
        params
            .iter()
            .fold(Request::builder(), |b, (k, v)| b.param(*k, *v))
            .build()
    }

    #[test]
    fn test_param_strips_colon() {
        let req = request(&[("id", "42")]);
        assert_eq!(req.param(":id"), "42");
        assert_eq!(req.param("id"), "42");
    }

    #[test]
    fn test_param_decodes_escapes() {
        let req = request(&[("path", "docs%2Fintro%20page+v2")]);
        assert_eq!(req.param("path"), "docs/intro page+v2");
    }

    #[test]
    fn test_param_missing_or_malformed() {
        let req = request(&[("bad", "100%"), ("worse", "%zz"), ("utf", "%ff")]);
        assert_eq!(req.param("absent"), "");
        assert_eq!(req.param("bad"), "");
        assert_eq!(req.param("worse"), "");
        assert_eq!(req.param("utf"), "");
    }

    #[test]
    fn test_numeric_params() {
        let req = request(&[("n", "-17"), ("big", "9000000000"), ("f", "2.5"), ("s", "abc")]);
        assert_eq!(req.param_int("n"), -17);
        assert_eq!(req.param_int("overflow"), 0);
        assert_eq!(req.param_int64("big"), 9_000_000_000);
        assert!((req.param_float64("f") - 2.5).abs() < f64::EPSILON);
        assert_eq!(req.param_int("s"), 0);
        assert_eq!(req.param_int64("missing"), 0);
        assert!(req.param_float64("s").abs() < f64::EPSILON);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_param_int_is_word_sized() {
        let req = request(&[("big", "9000000000"), ("overflow", "99999999999999999999")]);
        assert_eq!(req.param_int("big"), 9_000_000_000);
        assert_eq!(req.param_int("overflow"), 0);
    }

    #[test]
    fn test_set_param_overwrites() {
        let mut req = request(&[("id", "1")]);
        req.set_param(":id", "2");
        assert_eq!(req.param("id"), "2");
        assert_eq!(req.params().len(), 1);
    }

    #[test]
    fn test_set_param_escapes() {
        let mut req = request(&[]);
        req.set_param("name", "a/b c%d");
        assert_eq!(req.params().get("name"), Some("a%2Fb%20c%25d"));
        assert_eq!(req.param("name"), "a/b c%d");
    }

    proptest! {
        #[test]
        fn test_set_param_round_trips(value in ".*") {
            let mut req = request(&[]);
            req.set_param("v", &value);
            prop_assert_eq!(req.param("v"), value);
        }
    }
}
