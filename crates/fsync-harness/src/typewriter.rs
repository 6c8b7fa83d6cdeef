#![forbid(unsafe_code)]

//! Typewriter reveal for chat replies.
//!
//! Pure presentation: it maps elapsed time to a prefix of the reply text
//! and never feeds anything back into the engine. The showcase binary
//! uses it to pace the assistant's confirmed reply on screen.

use std::time::Duration;

/// The prefix of `text` visible after `elapsed` at `chars_per_sec`.
///
/// Always slices on a character boundary; once enough time has passed the
/// whole text is returned.
pub fn reveal(text: &str, elapsed: Duration, chars_per_sec: u32) -> &str {
    let shown = (elapsed.as_millis() * u128::from(chars_per_sec) / 1000) as usize;
    match text.char_indices().nth(shown) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Whether the whole text is visible after `elapsed`.
pub fn is_complete(text: &str, elapsed: Duration, chars_per_sec: u32) -> bool {
    reveal(text, elapsed, chars_per_sec).len() == text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_shows_at_time_zero() {
        assert_eq!(reveal("hello", Duration::ZERO, 20), "");
    }

    #[test]
    fn reveal_grows_with_time() {
        let text = "hello world";
        assert_eq!(reveal(text, Duration::from_millis(100), 20), "he");
        assert_eq!(reveal(text, Duration::from_millis(250), 20), "hello");
        assert_eq!(reveal(text, Duration::from_secs(10), 20), text);
    }

    #[test]
    fn multibyte_text_slices_on_char_boundaries() {
        let text = "héllo wörld";
        for ms in 0..1200 {
            // Must never panic on a boundary, whatever the instant.
            let _ = reveal(text, Duration::from_millis(ms), 10);
        }
        assert!(is_complete(text, Duration::from_secs(5), 10));
    }

    #[test]
    fn zero_speed_never_completes_nonempty_text() {
        assert_eq!(reveal("abc", Duration::from_secs(60), 0), "");
        assert!(!is_complete("abc", Duration::from_secs(60), 0));
        assert!(is_complete("", Duration::ZERO, 0));
    }
}
