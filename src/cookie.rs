//! Named-cookie extraction from packed cookie headers.
//!
//! A single `cookie` header record may pack several `name=value` pairs
//! separated by semicolons, and the platform may deliver several cookie
//! records. The first exact name match across all records wins.

use crate::request::HeaderMap;

/// Returns the value of the named cookie, or `None` if no cookie header
/// record contains it. Pairs are trimmed and split on the first `=`, so
/// values containing `=` are returned whole.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let records = headers.get("cookie")?;
    for record in records {
        for pair in record.value.split(';') {
            if let Some((pair_name, value)) = pair.trim().split_once('=') {
                if pair_name == name {
                    return Some(value);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::EdgeRequest;

    #[test]
    fn finds_cookie_among_packed_pairs() {
        let request = EdgeRequest::new("/").with_header("cookie", "a=1; id_token=XYZ; b=2");
        assert_eq!(extract_cookie(&request.headers, "id_token"), Some("XYZ"));
    }

    #[test]
    fn finds_cookie_in_any_record() {
        let request = EdgeRequest::new("/")
            .with_header("cookie", "a=1; b=2")
            .with_header("cookie", "id_token=XYZ");
        assert_eq!(extract_cookie(&request.headers, "id_token"), Some("XYZ"));
    }

    #[test]
    fn returns_none_when_name_absent() {
        let request = EdgeRequest::new("/").with_header("cookie", "a=1; b=2");
        assert_eq!(extract_cookie(&request.headers, "id_token"), None);
    }

    #[test]
    fn returns_none_without_cookie_header() {
        let request = EdgeRequest::new("/");
        assert_eq!(extract_cookie(&request.headers, "id_token"), None);
    }

    #[test]
    fn name_match_is_exact() {
        let request = EdgeRequest::new("/").with_header("cookie", "my_id_token=NO; id_token2=NO");
        assert_eq!(extract_cookie(&request.headers, "id_token"), None);
    }

    #[test]
    fn value_keeps_embedded_equals_signs() {
        let request = EdgeRequest::new("/").with_header("cookie", "id_token=abc.def==");
        assert_eq!(extract_cookie(&request.headers, "id_token"), Some("abc.def=="));
    }

    #[test]
    fn pair_whitespace_is_trimmed() {
        let request = EdgeRequest::new("/").with_header("cookie", "a=1;   id_token=XYZ  ;b=2");
        assert_eq!(extract_cookie(&request.headers, "id_token"), Some("XYZ"));
    }
}
