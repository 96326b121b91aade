use regex::{Regex, RegexBuilder};

use ocmscope_types::SearchMatch;

use crate::ansi::strip_ansi;

/// Shortest search input that triggers a search
pub const DEFAULT_MIN_SEARCH_CHARS: usize = 1;

/// Case-insensitive matcher for a literal search term
#[derive(Clone, Debug)]
pub struct KeywordMatcher {
    term: String,
    regex: Regex,
}

impl KeywordMatcher {
    /// Build a matcher; regex metacharacters in `term` match literally
    pub fn new(term: &str) -> Option<Self> {
        if term.is_empty() {
            return None;
        }

        match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
        {
            Ok(regex) => Some(Self {
                term: term.to_string(),
                regex,
            }),
            Err(e) => {
                tracing::warn!(term, error = %e, "could not build search matcher");
                None
            }
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Number of occurrences in an already cleaned line
    pub fn count(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }

    /// Byte ranges of every occurrence in an already cleaned line (for highlighting)
    pub fn find_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        self.regex
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

/// Index every occurrence of `term` in the first `item_count` lines
///
/// Escape sequences are stripped from each line before matching. Matches
/// are returned in line order, numbered from 1 within each line. When
/// nothing matches the result is `[SearchMatch::NOT_FOUND]`.
pub fn search_indexes<I, S>(lines: I, term: &str, item_count: usize) -> Vec<SearchMatch>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(matcher) = KeywordMatcher::new(term) else {
        return vec![SearchMatch::NOT_FOUND];
    };

    let mut matches = Vec::new();
    for (row, line) in lines.into_iter().take(item_count).enumerate() {
        let clean = strip_ansi(line.as_ref());
        let count = matcher.count(&clean);
        matches.extend((1..=count).map(|i| SearchMatch::new(row, i)));
    }

    if matches.is_empty() {
        matches.push(SearchMatch::NOT_FOUND);
    }
    matches
}

/// Search state of the log viewer: input, results and focused match
#[derive(Clone, Debug)]
pub struct LogSearch {
    input: String,
    min_chars: usize,
    /// `None` until a search has run
    matches: Option<Vec<SearchMatch>>,
    matcher: Option<KeywordMatcher>,
    /// One-based position of the focused match, 0 when nothing is focused
    current: usize,
}

impl Default for LogSearch {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SEARCH_CHARS)
    }
}

impl LogSearch {
    pub fn new(min_chars: usize) -> Self {
        Self {
            input: String::new(),
            min_chars: min_chars.max(1),
            matches: None,
            matcher: None,
            current: 0,
        }
    }

    /// Apply new search input and return the row to scroll to, if any
    ///
    /// Empty input clears all results. Input shorter than the minimum
    /// length is recorded but leaves the previous results untouched.
    pub fn update<I, S>(&mut self, input: &str, lines: I, item_count: usize) -> Option<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.input = input.to_string();

        if input.is_empty() {
            self.clear_results();
            return None;
        }
        if input.chars().count() < self.min_chars {
            return None;
        }

        let matches = search_indexes(lines, input, item_count);
        let found = !matches[0].is_not_found();
        self.matches = Some(matches);
        self.matcher = KeywordMatcher::new(input);

        if found {
            self.current = 1;
            self.current_row()
        } else {
            self.current = 0;
            None
        }
    }

    /// Forget the input and every result
    pub fn reset(&mut self) {
        self.input.clear();
        self.clear_results();
    }

    /// Drop results computed over text that has since been replaced; the
    /// input is kept so it can be run again
    pub fn invalidate(&mut self) {
        self.clear_results();
    }

    fn clear_results(&mut self) {
        self.matches = None;
        self.matcher = None;
        self.current = 0;
    }

    /// Focus the next match, wrapping to the first; returns its row
    pub fn next(&mut self) -> Option<usize> {
        let total = self.match_count();
        if total == 0 {
            return None;
        }
        self.current = self.current % total + 1;
        self.current_row()
    }

    /// Focus the previous match, wrapping to the last; returns its row
    pub fn prev(&mut self) -> Option<usize> {
        let total = self.match_count();
        if total == 0 {
            return None;
        }
        self.current = if self.current <= 1 {
            total
        } else {
            self.current - 1
        };
        self.current_row()
    }

    /// Real matches found by the last search (the sentinel counts as none)
    pub fn match_count(&self) -> usize {
        match &self.matches {
            Some(matches) if !matches.iter().any(SearchMatch::is_not_found) => matches.len(),
            _ => 0,
        }
    }

    pub fn current_match(&self) -> Option<SearchMatch> {
        if self.current == 0 || self.match_count() == 0 {
            return None;
        }
        self.matches
            .as_ref()
            .and_then(|m| m.get(self.current - 1))
            .copied()
    }

    fn current_row(&self) -> Option<usize> {
        self.current_match().and_then(|m| m.row())
    }

    /// One-based index of the focused match, 0 when none
    pub fn current(&self) -> usize {
        self.current
    }

    /// Counter text such as "2 / 7"
    pub fn count_label(&self) -> String {
        format!("{} / {}", self.current, self.match_count())
    }

    /// Results of the last search; `None` if no search has run
    pub fn matches(&self) -> Option<&[SearchMatch]> {
        self.matches.as_deref()
    }

    /// Matcher for highlighting the active term
    pub fn matcher(&self) -> Option<&KeywordMatcher> {
        self.matcher.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Whether the given occurrence is the focused one
    pub fn is_current(&self, row: usize, match_index: usize) -> bool {
        self.current_match()
            .is_some_and(|m| m.row() == Some(row) && m.match_index == match_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<String> {
        vec![
            "INFO starting server".to_string(),
            "ERROR failed to bind, error code 98".to_string(),
            "\x1b[31mError\x1b[0m: retrying".to_string(),
            "INFO ready".to_string(),
        ]
    }

    #[test]
    fn test_counts_every_occurrence() {
        let matches = search_indexes(lines(), "error", 10);
        assert_eq!(
            matches,
            vec![
                SearchMatch::new(1, 1),
                SearchMatch::new(1, 2),
                SearchMatch::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_no_match_returns_sentinel() {
        assert_eq!(search_indexes(lines(), "panic", 10), vec![SearchMatch::NOT_FOUND]);
    }

    #[test]
    fn test_item_count_limits_lines() {
        let matches = search_indexes(lines(), "error", 2);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.row() == Some(1)));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let text = ["a.b a+b (a|b) [x] $HOME", "axb"];
        assert_eq!(search_indexes(text, "a.b", 10), vec![SearchMatch::new(0, 1)]);
        assert_eq!(search_indexes(text, "(a|b)", 10), vec![SearchMatch::new(0, 1)]);
        assert_eq!(search_indexes(text, "[x]", 10), vec![SearchMatch::new(0, 1)]);
        assert_eq!(search_indexes(text, "$HOME", 10), vec![SearchMatch::new(0, 1)]);
        assert_eq!(search_indexes(text, "\\", 10), vec![SearchMatch::NOT_FOUND]);
    }

    #[test]
    fn test_escape_codes_do_not_split_matches() {
        let text = ["\x1b[1mErr\x1b[0mor here"];
        assert_eq!(search_indexes(text, "error", 10), vec![SearchMatch::new(0, 1)]);
        // The escape sequence itself is not content
        assert_eq!(search_indexes(text, "[1m", 10), vec![SearchMatch::NOT_FOUND]);
    }

    #[test]
    fn test_update_focuses_first_match() {
        let mut search = LogSearch::new(1);
        let row = search.update("error", lines(), 4);
        assert_eq!(row, Some(1));
        assert_eq!(search.count_label(), "1 / 3");
        assert!(search.is_current(1, 1));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut search = LogSearch::new(1);
        search.update("error", lines(), 4);

        assert_eq!(search.next(), Some(1));
        assert_eq!(search.current(), 2);
        assert_eq!(search.next(), Some(2));
        assert_eq!(search.next(), Some(1));
        assert_eq!(search.current(), 1);

        assert_eq!(search.prev(), Some(2));
        assert_eq!(search.current(), 3);
    }

    #[test]
    fn test_no_matches_reports_zero_of_zero() {
        let mut search = LogSearch::new(1);
        assert_eq!(search.update("panic", lines(), 4), None);
        assert_eq!(search.matches(), Some(&[SearchMatch::NOT_FOUND][..]));
        assert_eq!(search.count_label(), "0 / 0");
        assert_eq!(search.next(), None);
        assert_eq!(search.prev(), None);
    }

    #[test]
    fn test_short_input_keeps_previous_results() {
        let mut search = LogSearch::new(3);
        search.update("error", lines(), 4);
        let before = search.matches().map(<[SearchMatch]>::to_vec);

        assert_eq!(search.update("in", lines(), 4), None);
        assert_eq!(search.matches().map(<[SearchMatch]>::to_vec), before);
        assert_eq!(search.input(), "in");
    }

    #[test]
    fn test_empty_input_clears() {
        let mut search = LogSearch::new(3);
        search.update("error", lines(), 4);
        search.update("", lines(), 4);
        assert!(search.matches().is_none());
        assert!(search.matcher().is_none());
        assert_eq!(search.current(), 0);
    }

    #[test]
    fn test_not_searched_differs_from_no_matches() {
        let search = LogSearch::default();
        assert!(search.matches().is_none());
        assert_eq!(search.count_label(), "0 / 0");
    }

    #[test]
    fn test_find_ranges_for_highlighting() {
        let matcher = KeywordMatcher::new("ERR").unwrap();
        assert_eq!(matcher.find_ranges("err ok Err"), vec![(0, 3), (7, 10)]);
        assert_eq!(matcher.term(), "ERR");
        assert!(KeywordMatcher::new("").is_none());
    }
}
