//! Free-text search input.

/// Split a search query into terms.
///
/// Terms are separated by whitespace; a double-quoted phrase stays one term.
/// Empty terms are dropped.
pub fn search_terms(query: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in query.chars() {
        match c {
            '"' => {
                if quoted {
                    push_term(&mut terms, &mut current);
                }
                quoted = !quoted;
            }
            c if c.is_whitespace() && !quoted => push_term(&mut terms, &mut current),
            c => current.push(c),
        }
    }
    push_term(&mut terms, &mut current);
    terms
}

fn push_term(terms: &mut Vec<String>, current: &mut String) {
    let term = current.trim();
    if !term.is_empty() {
        terms.push(term.to_owned());
    }
    current.clear();
}
