//! Deterministic podcast script assembly from article records.
//!
//! This is intentionally a fixed template, not a generative model call: the
//! same articles always produce the same script, which keeps the
//! `generate_podcast` pipeline reproducible on low-power hardware.

use crate::defaults::{MAX_SCRIPT_ARTICLES, SUMMARY_MAX_CHARS};
use crate::error::{DoblajeError, Result};
use crate::protocol::Article;

const INTRO: &str =
    "Bienvenidos a su resumen de noticias. Estas son las historias más destacadas de hoy.";

const OUTRO: &str = "Eso es todo por este episodio. Gracias por escuchar y hasta la próxima.";

/// Connective phrases cycled through for middle articles.
const CONNECTIVES: &[&str] = &[
    "Continuamos con otra noticia.",
    "Por otro lado,",
    "También en las noticias de hoy,",
];

const OPENING: &str = "Comenzamos con la noticia principal.";
const CLOSING: &str = "Y para terminar,";

/// Assembled script plus how many articles were actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub text: String,
    pub article_count: usize,
}

/// Build a Spanish narration script from up to the first five articles.
///
/// Fails with a descriptive error when the article list is empty.
pub fn generate_script(articles: &[Article]) -> Result<Script> {
    if articles.is_empty() {
        return Err(DoblajeError::validation(
            "generate_script job requires a non-empty articles list (no articles provided)",
        ));
    }

    let used = &articles[..articles.len().min(MAX_SCRIPT_ARTICLES)];

    let mut parts: Vec<String> = Vec::with_capacity(used.len() + 2);
    parts.push(INTRO.to_string());

    for (i, article) in used.iter().enumerate() {
        let transition = if i == 0 {
            OPENING.to_string()
        } else if i == used.len() - 1 {
            CLOSING.to_string()
        } else {
            CONNECTIVES[(i - 1) % CONNECTIVES.len()].to_string()
        };

        let summary = clean_summary(&article.summary);
        let title = article.title.trim();

        let sentence = if summary.is_empty() {
            format!("{} {}.", transition, title)
        } else {
            format!("{} {}. {}", transition, title, summary)
        };
        parts.push(sentence);
    }

    parts.push(OUTRO.to_string());

    Ok(Script {
        text: parts.join(" "),
        article_count: used.len(),
    })
}

/// Strip simple markup, collapse whitespace, and truncate long summaries.
fn clean_summary(raw: &str) -> String {
    let without_tags = strip_tags(raw);
    let collapsed = without_tags.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > SUMMARY_MAX_CHARS {
        let truncated: String = collapsed.chars().take(SUMMARY_MAX_CHARS).collect();
        format!("{}...", truncated.trim_end())
    } else {
        collapsed
    }
}

/// Remove `<...>` tag spans. Feed summaries carry simple HTML at most;
/// anything unbalanced is passed through from the `<` onward.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, summary: &str) -> Article {
        Article {
            title: title.to_string(),
            summary: summary.to_string(),
        }
    }

    #[test]
    fn empty_articles_is_an_error() {
        let err = generate_script(&[]).unwrap_err();
        assert!(err.to_string().contains("no articles"));
    }

    #[test]
    fn seven_articles_uses_exactly_five() {
        let articles: Vec<Article> = (1..=7)
            .map(|i| article(&format!("Title {}", i), "Summary."))
            .collect();
        let script = generate_script(&articles).unwrap();
        assert_eq!(script.article_count, 5);
        assert!(script.text.contains("Title 5"));
        assert!(!script.text.contains("Title 6"));
        assert!(!script.text.contains("Title 7"));
    }

    #[test]
    fn script_is_deterministic() {
        let articles = vec![article("A", "one"), article("B", "two")];
        let first = generate_script(&articles).unwrap();
        let second = generate_script(&articles).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn script_has_intro_and_outro() {
        let script = generate_script(&[article("Solo", "summary")]).unwrap();
        assert!(script.text.starts_with(INTRO));
        assert!(script.text.ends_with(OUTRO));
    }

    #[test]
    fn single_article_gets_opening_phrasing() {
        let script = generate_script(&[article("Solo", "s")]).unwrap();
        assert!(script.text.contains(OPENING));
        assert!(!script.text.contains(CLOSING));
    }

    #[test]
    fn last_article_gets_closing_phrasing() {
        let articles = vec![article("First", "a"), article("Last", "b")];
        let script = generate_script(&articles).unwrap();
        assert!(script.text.contains(OPENING));
        assert!(script.text.contains(&format!("{} Last.", CLOSING)));
    }

    #[test]
    fn middle_articles_cycle_connectives() {
        let articles: Vec<Article> = (1..=5)
            .map(|i| article(&format!("T{}", i), "s"))
            .collect();
        let script = generate_script(&articles).unwrap();
        // Articles 2, 3 and 4 are middle; each takes the next connective
        assert!(script.text.contains(CONNECTIVES[0]));
        assert!(script.text.contains(CONNECTIVES[1]));
        assert!(script.text.contains(CONNECTIVES[2]));
    }

    #[test]
    fn summary_markup_is_stripped() {
        let script =
            generate_script(&[article("T", "<p>Hello <b>bold</b> world</p>")]).unwrap();
        assert!(script.text.contains("Hello bold world"));
        assert!(!script.text.contains('<'));
    }

    #[test]
    fn summary_whitespace_is_collapsed() {
        let script = generate_script(&[article("T", "too\n\n  many \t spaces")]).unwrap();
        assert!(script.text.contains("too many spaces"));
    }

    #[test]
    fn long_summary_is_truncated_with_ellipsis() {
        let long = "palabra ".repeat(100);
        let script = generate_script(&[article("T", &long)]).unwrap();
        assert!(script.text.contains("..."));
        // The cleaned summary may not exceed the cap plus the ellipsis
        let summary_part = script
            .text
            .split(". ")
            .find(|s| s.contains("palabra"))
            .unwrap();
        assert!(summary_part.chars().count() <= SUMMARY_MAX_CHARS + 3);
    }

    #[test]
    fn strip_tags_passes_unbalanced_angle_through() {
        assert_eq!(strip_tags("a < b"), "a < b");
        assert_eq!(strip_tags("<p>x</p>"), "x");
        assert_eq!(strip_tags("no tags"), "no tags");
    }
}
