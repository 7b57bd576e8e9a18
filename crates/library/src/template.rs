//! Naming templates.
//!
//! A template is free-form text with placeholders in braces. Every placeholder
//! has a long form and a short alias:
//!
//! | Placeholder                        | Value                                     |
//! |------------------------------------|-------------------------------------------|
//! | `{ProductID}`, `{id}`              | Identifier, e.g. `RJ123456`               |
//! | `{ProductName}`, `{title}`         | Title                                     |
//! | `{ProductCircle}`, `{publisher}`   | Publisher (circle) name                   |
//! | `{ProductDate}`, `{date}`          | Release date as `yyMMdd`, or empty        |
//! | `{ProductCVs}`, `{cast}`           | Voice cast joined with `、`, or empty     |
//!
//! Anything in braces that isn't a placeholder is kept as written. The
//! template is scanned once, left to right, so text coming from the catalog is
//! never itself treated as a template: a title containing `{ProductCircle}`
//! ends up in the name verbatim.
//!
//! # Example
//!
//! ```
//! use dlren_catalog::{CatalogRecord, Identifier};
//! use dlren_library::NameTemplate;
//!
//! let template: NameTemplate = "[{id}] [{publisher}] {title}".parse().unwrap();
//! let record = CatalogRecord::new("RJ123456".parse::<Identifier>().unwrap())
//!     .with_title("Title: Subtitle")
//!     .with_publisher("Circle");
//! assert_eq!(template.render(&record), "[RJ123456] [Circle] Title： Subtitle");
//! ```

use crate::error::{Error, ErrorKind};
use derive_more::Display;
use dlren_catalog::CatalogRecord;
use std::str::FromStr;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "[{ProductID}] [{ProductCircle}] {ProductName}";

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year repr:last_two][month][day]");
const CAST_SEPARATOR: &str = "、";

/// A value a template can refer to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    #[display("identifier")]
    Identifier,
    #[display("title")]
    Title,
    #[display("publisher")]
    Publisher,
    #[display("release date")]
    ReleaseDate,
    #[display("voice cast")]
    VoiceCast,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] =
        [Self::Identifier, Self::Title, Self::Publisher, Self::ReleaseDate, Self::VoiceCast];

    /// Long form and short alias, braces included.
    pub fn tokens(self) -> [&'static str; 2] {
        match self {
            Self::Identifier => ["{ProductID}", "{id}"],
            Self::Title => ["{ProductName}", "{title}"],
            Self::Publisher => ["{ProductCircle}", "{publisher}"],
            Self::ReleaseDate => ["{ProductDate}", "{date}"],
            Self::VoiceCast => ["{ProductCVs}", "{cast}"],
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.tokens().contains(&token))
    }

    fn value(self, record: &CatalogRecord) -> String {
        match self {
            Self::Identifier => record.identifier.to_string(),
            Self::Title => record.title.clone(),
            Self::Publisher => record.publisher.clone(),
            Self::ReleaseDate => {
                record.release_date.and_then(|date| date.format(DATE_FORMAT).ok()).unwrap_or_default()
            },
            Self::VoiceCast => record.voice_cast.join(CAST_SEPARATOR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value(Placeholder),
}

/// A parsed naming template.
///
/// Constructed via [`FromStr`]; the only template that is rejected is the
/// empty one, since it could never produce a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FromStr for NameTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            exn::bail!(ErrorKind::Template);
        }
        Ok(Self { source: s.to_string(), segments: Self::parse(s) })
    }
}

impl Default for NameTemplate {
    fn default() -> Self {
        Self { source: DEFAULT_TEMPLATE.to_string(), segments: Self::parse(DEFAULT_TEMPLATE) }
    }
}

impl NameTemplate {
    /// Splits the template into literal text and placeholders.
    ///
    /// An opening brace that doesn't start a known placeholder is literal
    /// text, and scanning resumes right after it, so `{{id}` is a literal `{`
    /// followed by the `{id}` placeholder.
    fn parse(s: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = s;
        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            rest = &rest[open..];
            let placeholder = rest.find('}').and_then(|close| Some((Placeholder::from_token(&rest[..=close])?, close)));
            match placeholder {
                Some((placeholder, close)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Value(placeholder));
                    rest = &rest[close + 1..];
                },
                None => {
                    literal.push('{');
                    rest = &rest[1..];
                },
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        segments
    }

    /// The template as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholders used by this template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Value(placeholder) => Some(*placeholder),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes `record` into the template, trims surrounding whitespace,
    /// then [sanitizes](sanitize) the result.
    ///
    /// Missing fields substitute as empty strings, so the result may be empty.
    pub fn render(&self, record: &CatalogRecord) -> String {
        let rendered: String = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Value(placeholder) => placeholder.value(record),
            })
            .collect();
        sanitize(rendered.trim())
    }
}

/// Makes `name` safe to use as a file or directory name on common platforms.
///
/// The seven symbols Windows reserves are swapped for their full-width
/// look-alikes; path separators and control characters become `_`. Everything
/// else is kept, and sanitizing twice changes nothing.
///
/// ```
/// use dlren_library::sanitize;
/// assert_eq!(sanitize("Who? <Me>: a/b"), "Who？ ＜Me＞： a_b");
/// ```
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ':' => '\u{FF1A}',
            '?' => '\u{FF1F}',
            '*' => '\u{FF0A}',
            '"' => '\u{FF02}',
            '<' => '\u{FF1C}',
            '>' => '\u{FF1E}',
            '|' => '\u{FF5C}',
            '/' | '\\' | '\0'..='\u{1F}' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlren_catalog::Identifier;
    use rstest::rstest;
    use time::macros::date;

    fn record() -> CatalogRecord {
        CatalogRecord::new("RJ123456".parse::<Identifier>().unwrap())
            .with_title("Title")
            .with_publisher("Circle")
            .with_release_date(date!(2021 - 03 - 09))
            .with_voice_cast(["A", "B"])
    }

    fn render(template: &str, record: &CatalogRecord) -> String {
        template.parse::<NameTemplate>().unwrap().render(record)
    }

    #[rstest]
    #[case("{ProductID}", "RJ123456")]
    #[case("{id}", "RJ123456")]
    #[case("{ProductName}", "Title")]
    #[case("{title}", "Title")]
    #[case("{ProductCircle}", "Circle")]
    #[case("{publisher}", "Circle")]
    #[case("{ProductDate}", "210309")]
    #[case("{date}", "210309")]
    #[case("{ProductCVs}", "A、B")]
    #[case("{cast}", "A、B")]
    fn test_placeholders(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(render(template, &record()), expected);
    }

    #[test]
    fn test_default_template() {
        assert_eq!(NameTemplate::default().render(&record()), "[RJ123456] [Circle] Title");
        assert_eq!(NameTemplate::default(), DEFAULT_TEMPLATE.parse::<NameTemplate>().unwrap());
    }

    #[test]
    fn test_empty_publisher_keeps_brackets() {
        let record = record().with_publisher("");
        assert_eq!(render("[{id}] [{publisher}] {title}", &record), "[RJ123456] [] Title");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let record = CatalogRecord::new("RJ123456".parse::<Identifier>().unwrap());
        assert_eq!(render("{id} {date}{cast}", &record), "RJ123456");
        assert_eq!(render("{title}", &record), "");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let record = record().with_title("{ProductCircle}").with_publisher("{ProductName}");
        assert_eq!(render("{title} / {publisher}", &record), "{ProductCircle} _ {ProductName}");
    }

    #[test]
    fn test_placeholder_order_does_not_matter() {
        let record = record();
        assert_eq!(render("{cast} {date} {id}", &record), "A、B 210309 RJ123456");
        assert_eq!(render("{id} {date} {cast}", &record), "RJ123456 210309 A、B");
    }

    #[rstest]
    #[case("{unknown} {id}", "{unknown} RJ123456")]
    #[case("{{id}}", "{RJ123456}")]
    #[case("{id", "{id")]
    #[case("}{id}{", "}RJ123456{")]
    #[case("{PRODUCTID}", "{PRODUCTID}")]
    fn test_unknown_tokens_pass_through(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(render(template, &record()), expected);
    }

    #[test]
    fn test_result_is_trimmed() {
        assert_eq!(render("  {title}  ", &record()), "Title");
        assert_eq!(render("{publisher} {title}", &record().with_publisher("")), "Title");
    }

    #[test]
    fn test_empty_template_is_rejected() {
        let err = "".parse::<NameTemplate>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
        assert!("   ".parse::<NameTemplate>().is_err());
    }

    #[test]
    fn test_placeholders_listed_in_order() {
        let template: NameTemplate = "{date} {title} {ProductDate} {nope}".parse().unwrap();
        assert_eq!(
            template.placeholders().collect::<Vec<_>>(),
            vec![Placeholder::ReleaseDate, Placeholder::Title, Placeholder::ReleaseDate]
        );
    }

    #[rstest]
    #[case(':', '：')]
    #[case('?', '？')]
    #[case('*', '＊')]
    #[case('"', '＂')]
    #[case('<', '＜')]
    #[case('>', '＞')]
    #[case('|', '｜')]
    #[case('/', '_')]
    #[case('\\', '_')]
    #[case('\0', '_')]
    #[case('\u{1}', '_')]
    #[case('\t', '_')]
    #[case('\u{1F}', '_')]
    #[case(' ', ' ')]
    #[case('\u{7F}', '\u{7F}')]
    #[case('、', '、')]
    fn test_sanitize_characters(#[case] input: char, #[case] expected: char) {
        assert_eq!(sanitize(&input.to_string()), expected.to_string());
    }

    #[rstest]
    #[case("Title: Part 1/2 <\"Special\"> *?|\\")]
    #[case("plain name")]
    #[case("already：sanitized＊")]
    #[case("tab\tand\nnewline")]
    fn test_sanitize_is_idempotent(#[case] input: &str) {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_render_sanitizes() {
        let record = record().with_title("Who? Me: \"Yes\" a/b");
        assert_eq!(render("{title}", &record), "Who？ Me： ＂Yes＂ a_b");
    }
}
