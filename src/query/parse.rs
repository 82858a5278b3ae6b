//! Query text splitting.
//!
//! A query is newline-delimited: line 1 is the endpoint identifier, any
//! remaining lines form the argument body whose grammar depends on the
//! endpoint's transform kind.

/// Split raw query text into an endpoint identifier and an optional
/// argument body.
///
/// The endpoint is the first line, trimmed. If more than one line exists
/// the body is the remaining lines rejoined with `\n`, otherwise absent.
/// Total over all inputs: there is no failure mode, only a possibly empty
/// endpoint (which validation then rejects).
pub fn parse_query(query: &str) -> (String, Option<String>) {
    let mut lines = query.split('\n');
    let endpoint = lines.next().unwrap_or("").trim().to_string();
    let rest: Vec<&str> = lines.collect();
    let body = if rest.is_empty() {
        None
    } else {
        Some(rest.join("\n"))
    };
    (endpoint, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_endpoint_and_body() {
        let (ep, body) = parse_query("iris_enrich\ndomains=a.com,b.com");
        assert_eq!(ep, "iris_enrich");
        assert_eq!(body.as_deref(), Some("domains=a.com,b.com"));
    }

    #[test]
    fn single_line_has_no_body() {
        let (ep, body) = parse_query("available_api_calls");
        assert_eq!(ep, "available_api_calls");
        assert!(body.is_none());
    }

    #[test]
    fn multi_line_body_rejoined() {
        let (ep, body) = parse_query("reverse_whois\nexample.com\nmode=purchased");
        assert_eq!(ep, "reverse_whois");
        assert_eq!(body.as_deref(), Some("example.com\nmode=purchased"));
    }

    #[test]
    fn endpoint_is_trimmed() {
        let (ep, _) = parse_query("  domain_profile  \nexample.com");
        assert_eq!(ep, "domain_profile");
    }

    #[test]
    fn empty_input_yields_empty_endpoint() {
        let (ep, body) = parse_query("");
        assert_eq!(ep, "");
        assert!(body.is_none());
    }

    #[test]
    fn parsing_is_idempotent() {
        let q = "iris_investigate\ndomain=example.com\nactive=true";
        let first = parse_query(q);
        let second = parse_query(q);
        assert_eq!(first, second);
    }
}
