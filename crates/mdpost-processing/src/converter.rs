use pulldown_cmark::{html, Options, Parser};

/// Turns Markdown text into HTML.
///
/// Implementations are total: every input produces some output.
pub trait MarkdownConverter: Send + Sync {
    fn to_html(&self, markdown: &str) -> String;
}

/// CommonMark converter with the GitHub-style table and strikethrough extensions.
/// Raw HTML in the input is passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkConverter;

impl CommonMarkConverter {
    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options
    }
}

impl MarkdownConverter for CommonMarkConverter {
    fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Self::options());
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_headings_and_emphasis() {
        let html = CommonMarkConverter.to_html("# Title\n\nHello *world*");
        assert_eq!(html, "<h1>Title</h1>\n<p>Hello <em>world</em></p>\n");
    }

    #[test]
    fn converts_images_to_img_tags() {
        let html = CommonMarkConverter.to_html("![a cat](https://example.com/cat.png)");
        assert_eq!(
            html,
            "<p><img src=\"https://example.com/cat.png\" alt=\"a cat\" /></p>\n"
        );
    }

    #[test]
    fn supports_tables_and_strikethrough() {
        let html = CommonMarkConverter.to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn passes_raw_html_through() {
        let html = CommonMarkConverter.to_html("<div class=\"note\">hi</div>\n");
        assert_eq!(html, "<div class=\"note\">hi</div>\n");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(CommonMarkConverter.to_html(""), "");
    }
}
