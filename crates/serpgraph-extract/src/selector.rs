//! Field selectors: CSS with a trailing projection.
//!
//! A field selector is a plain CSS selector optionally suffixed with `::text`
//! (concatenated text of the first match) or `::attr(name)` (one attribute of
//! the first match). A bare selector resolves to the element's text as well,
//! which lets presence checks and text fields share one code path.

use scraper::{ElementRef, Html, Selector};
use serpgraph_core::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Projection {
    Text,
    Attr(String),
}

#[derive(Debug, Clone)]
pub struct FieldSelector {
    raw: String,
    compiled: Selector,
    projection: Projection,
}

impl FieldSelector {
    /// Parse and compile a field selector. A selector that does not compile is
    /// a configuration defect, surfaced at catalogue construction rather than
    /// at extraction time.
    pub fn parse(raw: &str) -> Result<Self> {
        let (base, projection) = split_projection(raw)?;
        let compiled = Selector::parse(base)
            .map_err(|e| Error::Configuration(format!("invalid selector {raw:?}: {e}")))?;
        Ok(Self {
            raw: raw.to_string(),
            compiled,
            projection,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Resolve against a whole document.
    ///
    /// `None` means no element matched; `Some("")` means an element matched
    /// but carried no text. Callers that gate on the distinction rely on it.
    pub fn resolve(&self, doc: &Html) -> Option<String> {
        self.project(doc.select(&self.compiled).next()?)
    }

    /// Resolve against one result row.
    pub fn resolve_in(&self, scope: ElementRef<'_>) -> Option<String> {
        self.project(scope.select(&self.compiled).next()?)
    }

    fn project(&self, element: ElementRef<'_>) -> Option<String> {
        match &self.projection {
            Projection::Text => Some(element.text().collect()),
            Projection::Attr(name) => element.value().attr(name).map(str::to_string),
        }
    }
}

fn split_projection(raw: &str) -> Result<(&str, Projection)> {
    if let Some(base) = raw.strip_suffix("::text") {
        return Ok((base, Projection::Text));
    }
    if let Some(idx) = raw.find("::attr(") {
        let rest = &raw[idx + "::attr(".len()..];
        let name = rest.strip_suffix(')').ok_or_else(|| {
            Error::Configuration(format!("unterminated attr projection in {raw:?}"))
        })?;
        if name.is_empty() {
            return Err(Error::Configuration(format!(
                "empty attr projection in {raw:?}"
            )));
        }
        return Ok((&raw[..idx], Projection::Attr(name.to_string())));
    }
    Ok((raw, Projection::Text))
}

/// First non-`None` resolution across an ordered selector list.
pub fn first_match(selectors: &[FieldSelector], doc: &Html) -> Option<String> {
    selectors.iter().find_map(|s| s.resolve(doc))
}

/// Compile a batch of field selectors, stopping at the first bad one.
pub fn compile_all(raw: &[&str]) -> Result<Vec<FieldSelector>> {
    raw.iter().map(|s| FieldSelector::parse(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn text_projection_concatenates_descendant_text() {
        let d = doc("<div class=\"t\"><b>Hello</b> world</div>");
        let s = FieldSelector::parse("div.t::text").unwrap();
        assert_eq!(s.resolve(&d), Some("Hello world".to_string()));
    }

    #[test]
    fn attr_projection_reads_one_attribute() {
        let d = doc("<a class=\"l\" href=\"https://example.com/\">x</a>");
        let s = FieldSelector::parse("a.l::attr(href)").unwrap();
        assert_eq!(s.resolve(&d), Some("https://example.com/".to_string()));
    }

    #[test]
    fn absent_element_and_empty_text_are_distinct() {
        let d = doc("<span class=\"empty\"></span>");
        let hit = FieldSelector::parse("span.empty::text").unwrap();
        let miss = FieldSelector::parse("span.missing::text").unwrap();
        assert_eq!(hit.resolve(&d), Some(String::new()));
        assert_eq!(miss.resolve(&d), None);
    }

    #[test]
    fn missing_attribute_on_matched_element_is_none() {
        let d = doc("<a class=\"l\">x</a>");
        let s = FieldSelector::parse("a.l::attr(href)").unwrap();
        assert_eq!(s.resolve(&d), None);
    }

    #[test]
    fn bare_selector_projects_text() {
        let d = doc("<div id=\"box\">present</div>");
        let s = FieldSelector::parse("#box").unwrap();
        assert_eq!(s.resolve(&d), Some("present".to_string()));
    }

    #[test]
    fn first_match_respects_list_order() {
        let d = doc("<i class=\"b\">second</i><i class=\"a\">first</i>");
        let sels = compile_all(&["i.missing::text", "i.a::text", "i.b::text"]).unwrap();
        assert_eq!(first_match(&sels, &d), Some("first".to_string()));
    }

    #[test]
    fn invalid_selector_is_a_configuration_error() {
        assert!(matches!(
            FieldSelector::parse("div[[::text"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            FieldSelector::parse("a::attr(href"),
            Err(Error::Configuration(_))
        ));
    }
}
