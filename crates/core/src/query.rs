//! Search query construction from structured filter fields

use mailsweep_domain::QuerySpec;

/// Build a Gmail search string from `spec`.
///
/// Blank fields are ignored and the result has single spaces between terms.
/// An all-empty spec produces an empty string, which enumeration rejects.
pub fn build_query(spec: &QuerySpec) -> String {
    let parts: Vec<String> = [
        subject_term(spec.subject.as_deref()),
        from_term(spec.from.as_deref()),
        older_than_term(spec.older_than_days),
        spec.exclude_starred.then(|| "-is:starred".to_string()),
        spec.exclude_important.then(|| "-label:important".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    collapse_whitespace(&parts.join(" "))
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean(value: Option<&str>) -> Option<String> {
    value.map(collapse_whitespace).filter(|v| !v.is_empty())
}

fn has_prefix_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.is_char_boundary(prefix.len())
        && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn subject_term(subject: Option<&str>) -> Option<String> {
    let subject = clean(subject)?;
    // Keep an explicit `subject:(...)` as typed, with or without a space before `(`.
    const PREFIX: &str = "subject:";
    if has_prefix_ignore_case(&subject, PREFIX)
        && subject[PREFIX.len()..].trim_start().starts_with('(')
    {
        return Some(subject);
    }
    Some(format!("subject:({subject})"))
}

fn from_term(from: Option<&str>) -> Option<String> {
    let from = clean(from)?;
    if has_prefix_ignore_case(&from, "from:") {
        return Some(from);
    }
    if from.contains(['(', ')']) || contains_or_word(&from) {
        return Some(format!("from:({from})"));
    }
    // The search syntax has no wildcard senders; `*@domain` means the domain.
    if let Some(domain) = from.strip_prefix("*@").filter(|d| !d.is_empty()) {
        return Some(format!("from:{domain}"));
    }
    Some(format!("from:{from}"))
}

fn contains_or_word(value: &str) -> bool {
    value
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| word.eq_ignore_ascii_case("or"))
}

fn older_than_term(days: Option<i64>) -> Option<String> {
    let days = days?.max(0);
    (days > 0).then(|| format!("older_than:{days}d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> QuerySpec {
        QuerySpec::default()
    }

    #[test]
    fn subject_is_grouped() {
        let q = build_query(&QuerySpec { subject: Some("  weekly   promo ".into()), ..spec() });
        assert_eq!(q, "subject:(weekly promo)");
    }

    #[test]
    fn explicit_subject_group_is_kept() {
        let q = build_query(&QuerySpec { subject: Some("Subject: (a OR b)".into()), ..spec() });
        assert_eq!(q, "Subject: (a OR b)");
    }

    #[test]
    fn from_variants() {
        let build = |from: &str| build_query(&QuerySpec { from: Some(from.into()), ..spec() });

        assert_eq!(build("alice@x.com"), "from:alice@x.com");
        assert_eq!(build("x.com"), "from:x.com");
        assert_eq!(build("*@news.example.com"), "from:news.example.com");
        assert_eq!(build("alice or bob"), "from:(alice or bob)");
        assert_eq!(build("(a@x.com b@y.com)"), "from:((a@x.com b@y.com))");
        assert_eq!(build("FROM:someone"), "FROM:someone");
        assert_eq!(build("oracle.com"), "from:oracle.com");
    }

    #[test]
    fn older_than_is_clamped() {
        let build = |days| build_query(&QuerySpec { older_than_days: Some(days), ..spec() });
        assert_eq!(build(30), "older_than:30d");
        assert_eq!(build(0), "");
        assert_eq!(build(-5), "");
    }

    #[test]
    fn full_spec_joins_terms_in_order() {
        let q = build_query(&QuerySpec {
            subject: Some("promo".into()),
            from: Some("*@shop.com".into()),
            older_than_days: Some(90),
            exclude_starred: true,
            exclude_important: true,
        });
        assert_eq!(
            q,
            "subject:(promo) from:shop.com older_than:90d -is:starred -label:important"
        );
    }

    #[test]
    fn exclusions_only() {
        let q = build_query(&QuerySpec { subject: Some("promo".into()), exclude_starred: true, ..spec() });
        assert_eq!(q, "subject:(promo) -is:starred");
    }

    #[test]
    fn empty_spec_builds_empty_query() {
        assert_eq!(build_query(&spec()), "");
        assert_eq!(build_query(&QuerySpec { subject: Some("   ".into()), ..spec() }), "");
    }
}
