use regex::RegexBuilder;

/// Extract the content of the last `<tag>...</tag>` pair in a completion.
///
/// Returns `None` when the completion holds no such pair. With `strip` set,
/// surrounding whitespace is removed from the extracted text.
pub fn extract_answer(completion: &str, tag: &str, strip: bool) -> Option<String> {
    let pattern = format!("<{0}>(.*?)</{0}>", regex::escape(tag));
    let re = RegexBuilder::new(&pattern)
        .dot_matches_new_line(true)
        .build()
        .ok()?;

    let last = re.captures_iter(completion).last()?;
    let answer = last.get(1)?.as_str();
    Some(if strip { answer.trim() } else { answer }.to_string())
}
