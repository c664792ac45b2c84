use std::borrow::Cow;

/// Case-insensitive substring filter that keeps the input order.
///
/// An empty query returns every item.
pub fn filter(items: &[String], query: &str) -> Vec<String> {
    if query.is_empty() {
        return items.to_vec();
    }
    let needle = normalized(query);
    items
        .iter()
        .filter(|item| normalized(item).contains(needle.as_ref()))
        .cloned()
        .collect()
}

fn normalized(input: &str) -> Cow<'_, str> {
    // Titlecase letters such as 'ǅ' are not uppercase but still lowercase.
    if input.chars().all(|c| c.to_lowercase().eq([c])) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.to_lowercase())
    }
}
