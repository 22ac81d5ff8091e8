/// Agenda used when the caller leaves it blank.
pub const DEFAULT_AGENDA: &str = "Generic";

const SLIDE_INSTRUCTIONS: &str = r#"Summarize the input text and arrange it in an array of JSON objects suitable for a PowerPoint presentation.
Determine the number of JSON objects (slides) from the length of the text and the agenda.
Limit each key point on a slide to 10 words.
Use at most 5 bullet points per slide.
The first item in the array must be the title slide.

A title slide looks like this:
{"id": 1, "title_text": "My Presentation Title", "subtitle_text": "My presentation subtitle", "is_title_slide": "yes"}

Content slides look like this:
{"id": 2, "title_text": "Slide 1 Title", "text": ["Bullet 1", "Bullet 2"]}
{"id": 3, "title_text": "Slide 2 Title", "text": ["Bullet 1", "Bullet 2", "Bullet 3"]}
{"id": 4, "title_text": "Slide 3 Title", "table": [[" ", "2022", "2021"], ["Revenue (USD Million)", "92,379", "642,338"], ["Operating margin", "6.6%", "19.1%"]]}

Make sure the output is valid JSON.
Don't output any explanation. Output only the JSON array."#;

/// Build the summarization prompt for `content`, steered by `agenda`.
pub fn build_slide_prompt(agenda: &str, content: &str) -> String {
    let agenda = match agenda.trim() {
        "" => DEFAULT_AGENDA,
        agenda => agenda,
    };
    format!("{SLIDE_INSTRUCTIONS}\nAgenda: {agenda}\nContent: {content}")
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let prompt = build_slide_prompt("Quarterly results", "Revenue grew.");
        assert!(prompt.starts_with("Summarize the input text"));
        assert!(prompt.ends_with("\nAgenda: Quarterly results\nContent: Revenue grew."));
    }

    #[test]
    fn test_blank_agenda_defaults() {
        let prompt = build_slide_prompt("   ", "x");
        assert!(prompt.contains("\nAgenda: Generic\n"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
