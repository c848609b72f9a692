use crate::diary_entry::DiaryEntry;

/// Splits a comma-separated query into lowercase terms, dropping blanks.
pub fn parse_terms(query: &str) -> Vec<String> {
    query
        .split(',')
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

/// True when `term` (already lowercase) occurs in title, content, tag or weather.
pub fn matches_term(entry: &DiaryEntry, term: &str) -> bool {
    [&entry.title, &entry.content, &entry.tag, &entry.weather]
        .iter()
        .any(|field| field.to_lowercase().contains(term))
}

/// Rows matching every term of `query`. Terms are plain substrings.
pub fn filter_entries<'a>(entries: &'a [DiaryEntry], query: &str) -> Vec<&'a DiaryEntry> {
    let terms = parse_terms(query);
    entries
        .iter()
        .filter(|entry| terms.iter().all(|term| matches_term(entry, term)))
        .collect()
}
