//! Placeholder insertion into already rendered markup.
//!
//! Fragments are collected per integer position and spliced into a container
//! at `<!-- Insert Point N -->` comments when [`Inserter::flush`] runs.

use tracing::debug;

/// Something holding serialized markup that can be rewritten in place.
pub trait Container {
    fn inner_html(&self) -> String;
    fn set_inner_html(&mut self, html: String);
}

impl Container for String {
    fn inner_html(&self) -> String {
        self.clone()
    }

    fn set_inner_html(&mut self, html: String) {
        *self = html;
    }
}

/// The sentinel comment replaced for `position`.
pub fn insert_point(position: i64) -> String {
    format!("<!-- Insert Point {position} -->")
}

/// Collects fragments per position and splices them into a container.
#[derive(Debug)]
pub struct Inserter<C: Container> {
    container: C,
    /// Positions in first-use order.
    fragments: Vec<(i64, Vec<String>)>,
    default_position: i64,
}

impl<C: Container> Inserter<C> {
    pub fn new(container: C) -> Self {
        Self {
            container,
            fragments: Vec::new(),
            default_position: 0,
        }
    }

    /// Queue `content` at the current default position.
    pub fn insert(&mut self, content: impl Into<String>) -> &mut Self {
        let position = self.default_position;
        self.insert_at(content, position)
    }

    /// Queue `content` at `position`, after anything already queued there.
    pub fn insert_at(&mut self, content: impl Into<String>, position: i64) -> &mut Self {
        let content = content.into();
        match self.fragments.iter_mut().find(|(p, _)| *p == position) {
            Some((_, queued)) => queued.push(content),
            None => self.fragments.push((position, vec![content])),
        }
        self
    }

    /// Change the position used by [`insert`](Self::insert).
    pub fn set_default_position(&mut self, position: i64) -> &mut Self {
        self.default_position = position;
        self
    }

    pub fn default_position(&self) -> i64 {
        self.default_position
    }

    /// Fragments queued at `position`.
    pub fn pending(&self, position: i64) -> &[String] {
        self.fragments
            .iter()
            .find(|(p, _)| *p == position)
            .map(|(_, queued)| queued.as_slice())
            .unwrap_or_default()
    }

    /// Replace each position's sentinel (first occurrence only) with its
    /// newline-joined fragments. Positions without a sentinel are left alone.
    ///
    /// Returns the number of sentinels replaced.
    pub fn flush(&mut self) -> usize {
        let mut html = self.container.inner_html();
        let mut replaced = 0;
        for (position, queued) in &self.fragments {
            let sentinel = insert_point(*position);
            if html.contains(&sentinel) {
                html = html.replacen(&sentinel, &queued.join("\n"), 1);
                replaced += 1;
            } else {
                debug!(position, "No insert point found");
            }
        }
        self.container.set_inner_html(html);
        replaced
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn into_inner(self) -> C {
        self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn replaces_sentinel_with_joined_fragments() {
        let mut inserter = Inserter::new(String::from("<div><!-- Insert Point 0 --></div>"));
        inserter.insert("<p>a</p>").insert("<p>b</p>");
        assert_eq!(inserter.flush(), 1);
        assert_eq!(inserter.container(), "<div><p>a</p>\n<p>b</p></div>");
    }

    #[test]
    fn default_position_applies_to_later_inserts() {
        let page = "<!-- Insert Point 0 -->|<!-- Insert Point 2 -->".to_string();
        let mut inserter = Inserter::new(page);
        inserter.insert("zero").set_default_position(2).insert("two");
        assert_eq!(inserter.default_position(), 2);
        inserter.flush();
        assert_eq!(inserter.into_inner(), "zero|two");
    }

    #[test]
    fn explicit_position_overrides_default() {
        let mut inserter = Inserter::new("<!-- Insert Point 1 -->".to_string());
        inserter.insert_at("one", 1);
        assert_eq!(inserter.pending(1), ["one".to_string()]);
        assert!(inserter.pending(0).is_empty());
        inserter.flush();
        assert_eq!(inserter.container(), "one");
    }

    #[test]
    fn missing_sentinel_is_noop() {
        let mut inserter = Inserter::new("<div></div>".to_string());
        inserter.insert_at("x", 7);
        assert_eq!(inserter.flush(), 0);
        assert_eq!(inserter.container(), "<div></div>");
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let page = "<!-- Insert Point 0 --><!-- Insert Point 0 -->".to_string();
        let mut inserter = Inserter::new(page);
        inserter.insert("x");
        inserter.flush();
        assert_eq!(inserter.container(), "x<!-- Insert Point 0 -->");
    }

    #[test]
    fn negative_positions_are_allowed() {
        let mut inserter = Inserter::new("<!-- Insert Point -1 -->".to_string());
        inserter.insert_at("neg", -1);
        inserter.flush();
        assert_eq!(inserter.container(), "neg");
    }
}
