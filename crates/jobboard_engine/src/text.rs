use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::Html;

/// Text of an HTML fragment with markup removed and entities decoded.
///
/// Block elements act as word boundaries, whitespace runs collapse to a single
/// space, and script/style content is skipped.
pub fn html_to_text(html: &str) -> String {
    html_to_lines(html).join(" ")
}

/// Like [`html_to_text`] but keeps one line per block of text, joined with
/// `'\n'`. Whitespace collapses within a line and blank lines are dropped.
pub fn html_to_block_text(html: &str) -> String {
    html_to_lines(html).join("\n")
}

fn html_to_lines(html: &str) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    let fragment = Html::parse_fragment(html);
    let mut raw = String::with_capacity(html.len());
    for child in fragment.root_element().children() {
        collect_text(child, &mut raw);
    }
    raw.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        // Source newlines inside a text node are layout, not block breaks.
        Node::Text(text) => {
            out.extend(text.chars().map(|c| if c == '\n' { ' ' } else { c }));
        }
        Node::Element(element) => {
            let name = element.name();
            if matches!(name, "script" | "style" | "noscript" | "template") {
                return;
            }
            let block = is_block(name);
            if block {
                out.push('\n');
            }
            for child in node.children() {
                collect_text(child, out);
            }
            if block {
                out.push('\n');
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "br"
            | "li"
            | "ul"
            | "ol"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "table"
            | "tr"
            | "td"
            | "th"
            | "blockquote"
            | "hr"
    )
}

/// Removes every match of `pattern` line by line, then joins the non-empty
/// remainders with single spaces.
pub fn strip_boilerplate(text: &str, pattern: &Regex) -> String {
    text.lines()
        .map(|line| pattern.replace_all(line, ""))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive alternation of literal keywords, or `None` when no
/// non-blank keyword is given.
pub fn keyword_pattern<S: AsRef<str>>(keywords: &[S]) -> Result<Option<Regex>, regex::Error> {
    let alternation = keywords
        .iter()
        .map(|keyword| keyword.as_ref().trim())
        .filter(|keyword| !keyword.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    if alternation.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!("(?i){alternation}")).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes_entities() {
        let html = "<p>Build <b>data</b> pipelines &amp; dashboards</p><ul><li>SQL</li></ul>";
        assert_eq!(html_to_text(html), "Build data pipelines & dashboards SQL");
    }

    #[test]
    fn skips_script_content() {
        let html = "<div>Hello<script>alert('x')</script></div>";
        assert_eq!(html_to_text(html), "Hello");
    }

    #[test]
    fn inline_markup_does_not_split_words() {
        assert_eq!(
            html_to_text("<p>Analyse <em>things</em>.</p><p>Next</p>"),
            "Analyse things. Next"
        );
    }

    #[test]
    fn empty_html_gives_empty_text() {
        assert_eq!(html_to_text("   "), "");
    }

    #[test]
    fn boilerplate_is_removed_to_end_of_line() {
        let pattern = Regex::new("Please mention the word.*").unwrap();
        let text = "Great role. Please mention the word BEAUTY when applying";
        assert_eq!(strip_boilerplate(text, &pattern), "Great role.");
    }

    #[test]
    fn block_text_keeps_one_line_per_block() {
        let html = "<p>Intro\ntext</p><ul><li>SQL</li><li>Python</li></ul>";
        assert_eq!(html_to_block_text(html), "Intro text\nSQL\nPython");
    }

    #[test]
    fn boilerplate_stops_at_the_line_break() {
        let pattern = Regex::new("Please mention the word.*").unwrap();
        let text = "Intro\nPlease mention the word SUNNY when applying\nRequirements: SQL";
        assert_eq!(strip_boilerplate(text, &pattern), "Intro Requirements: SQL");
    }

    #[test]
    fn keyword_pattern_is_case_insensitive_and_literal() {
        let pattern = keyword_pattern(&["analy", "c++", "machine learning"])
            .unwrap()
            .unwrap();
        assert!(pattern.is_match("Senior ANALYST"));
        assert!(pattern.is_match("C++ developer"));
        assert!(pattern.is_match("Machine Learning Engineer"));
        assert!(!pattern.is_match("Sales"));
    }

    #[test]
    fn blank_keywords_give_no_pattern() {
        assert!(keyword_pattern::<&str>(&[]).unwrap().is_none());
        assert!(keyword_pattern(&["  ", ""]).unwrap().is_none());
    }
}
