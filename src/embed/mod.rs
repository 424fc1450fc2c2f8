//! Embedded resources.
//!
//! - `serve` - live reload client injected into served HTML
//! - `scaffold` - source document written by `new-page`

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for reload.js.
    pub struct ReloadVars {
        pub ws_port: u16,
        /// Log reload activity in the browser console.
        pub notify: bool,
    }

    impl TemplateVars for ReloadVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__WS_PORT__", &self.ws_port.to_string())
                .replace("__NOTIFY__", if self.notify { "true" } else { "false" })
        }
    }

    /// Live reload client.
    pub const RELOAD_JS: Template<ReloadVars> = Template::new(include_str!("serve/reload.js"));

    /// Wrap the rendered client in a `<script>` element.
    pub fn reload_script(vars: &ReloadVars) -> String {
        format!("<script>\n{}</script>\n", RELOAD_JS.render(vars))
    }
}

pub mod scaffold {
    use super::{Template, TemplateVars};

    /// Variables for page.html.
    pub struct PageVars<'a> {
        pub prefix: &'a str,
        pub language: &'a str,
        pub name: &'a str,
        pub title: &'a str,
        pub description: &'a str,
        /// Page URL under the pages alias (`/html/about.html`).
        pub url: &'a str,
        pub breadcrumb: bool,
    }

    impl TemplateVars for PageVars<'_> {
        fn apply(&self, content: &str) -> String {
            let breadcrumb = if self.breadcrumb {
                format!(
                    r#", "breadcrumb": [{{ "title": {}, "url": {} }}]"#,
                    json(self.title),
                    json(self.url)
                )
            } else {
                String::new()
            };
            content
                .replace("__PREFIX__", self.prefix)
                .replace("__LANGUAGE__", &escape_html(self.language))
                .replace("__NAME__", &json(self.name))
                .replace("__TITLE__", &json(self.title))
                .replace("__DESCRIPTION__", &json(self.description))
                .replace("__URL__", &json(self.url))
                .replace("__BREADCRUMB__", &breadcrumb)
                .replace("__TITLE_TEXT__", &escape_html(self.title))
                .replace("__DESCRIPTION_TEXT__", &escape_html(self.description))
        }
    }

    /// New page source document.
    pub const PAGE_HTML: Template<PageVars<'static>> = Template::new(PAGE_SOURCE);

    const PAGE_SOURCE: &str = include_str!("scaffold/page.html");

    /// Render the page document for borrowed values.
    pub fn render_page(vars: &PageVars<'_>) -> String {
        Template::new(PAGE_SOURCE).render(vars)
    }

    /// JSON string literal for include parameters.
    fn json(value: &str) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| "\"\"".into())
    }

    fn escape_html(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                _ => out.push(c),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::scaffold::{PAGE_HTML, PageVars};
    use super::serve::{ReloadVars, reload_script};

    #[test]
    fn test_reload_script_port() {
        let script = reload_script(&ReloadVars {
            ws_port: 35730,
            notify: true,
        });
        assert!(script.starts_with("<script>"));
        assert!(script.contains("const port = 35730;"));
        assert!(script.contains("const verbose = true;"));
        assert!(!script.contains("__WS_PORT__"));
    }

    #[test]
    fn test_page_template() {
        let vars = PageVars {
            prefix: "@@",
            language: "en",
            name: "about",
            title: "About \"us\"",
            description: "Who we are",
            url: "/html/about.html",
            breadcrumb: true,
        };
        let html = PAGE_HTML.render(&vars);
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("@@include('../templates/_head.html'"));
        assert!(html.contains(r#""page_title": "About \"us\"""#));
        assert!(html.contains(r#""page_url": "/html/about.html", "breadcrumb": [{ "title": "About \"us\"", "url": "/html/about.html" }]"#));
        assert!(html.contains("<h1>About &quot;us&quot;</h1>"));
        for placeholder in ["__PREFIX__", "__NAME__", "__TITLE", "__DESCRIPTION", "__URL__", "__BREADCRUMB__"] {
            assert!(!html.contains(placeholder), "{placeholder}");
        }
    }

    #[test]
    fn test_page_template_without_breadcrumb() {
        let vars = PageVars {
            prefix: "$$",
            language: "ko",
            name: "faq",
            title: "Faq",
            description: "faq page",
            url: "/html/faq.html",
            breadcrumb: false,
        };
        let html = PAGE_HTML.render(&vars);
        assert!(!html.contains("breadcrumb"));
        assert!(html.contains("$$include('../templates/_footer.html')"));
        assert!(html.contains(r#""page_name": "faq""#));
    }
}
