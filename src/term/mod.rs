//! Term extraction for multi-term delimited input
//!
//! An input like `"alpha, bet"` with delimiter `", "` holds one completed
//! term and one partial term still being typed. Only the trailing partial
//! term is sent to the suggestion endpoint; on selection the trailing term
//! is replaced with the chosen value and the delimiter is re-appended so
//! the user can keep adding terms.

/// Split raw input on the delimiter. With no delimiter the whole input is
/// a single term.
pub fn split(value: &str, delimiter: Option<&str>) -> Vec<String> {
    match delimiter {
        Some(d) if !d.is_empty() => value.split(d).map(String::from).collect(),
        _ => vec![value.to_string()],
    }
}

/// The trailing partial term with leading whitespace stripped.
pub fn active_term(value: &str, delimiter: Option<&str>) -> String {
    split(value, delimiter)
        .pop()
        .map(|t| t.trim_start().to_string())
        .unwrap_or_default()
}

/// Replace the trailing term with the selected value and rejoin.
///
/// With a delimiter, an empty trailing element is appended so the joined
/// string ends with the delimiter and the user can continue entering
/// terms. Without one, the completed terms are concatenated as-is.
pub fn recombine(terms: &[String], selected: &str, delimiter: Option<&str>) -> String {
    let mut completed: Vec<String> = terms.to_vec();
    completed.pop();
    completed.push(selected.to_string());

    match delimiter {
        Some(d) if !d.is_empty() => {
            completed.push(String::new());
            completed.join(d)
        }
        _ => completed.concat(),
    }
}
