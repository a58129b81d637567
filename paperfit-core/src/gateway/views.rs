//! HTML rendering of the single page with handlebars.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::controller::{LiveView, NO_CITATIONS_NOTICE};
use crate::report::{CITATIONS_HEADING, REVIEW_HEADING, SUMMARY_HEADING};

const PAGE_TEMPLATE: &str = "page";

const PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Research Paper Relevance Checker</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
label { display: block; margin: 0.75rem 0; }
.text { white-space: pre-wrap; }
.warning { background: #fff4e5; border-left: 4px solid #f0a020; padding: 0.5rem; }
.error { background: #fdecea; border-left: 4px solid #d33; padding: 0.5rem; }
.notice { background: #e8f1fb; border-left: 4px solid #3a7bd5; padding: 0.5rem; }
</style>
</head>
<body>
<h1>Research Paper Relevance Checker</h1>
<p>Upload a research paper and enter your thesis topic or upload your thesis draft (optional) to check for relevance.</p>
<form method="post" action="/analyze" enctype="multipart/form-data">
<label>Upload a research paper (PDF) <input type="file" name="paper" accept="application/pdf"></label>
<label>Enter your thesis topic <input type="text" name="thesis_topic" value="{{topic}}"></label>
<label>Or upload your thesis as a PDF (optional) <input type="file" name="thesis" accept="application/pdf"></label>
<button type="submit">Analyze Paper</button>
</form>
{{#if error}}
<div class="error">{{error}}</div>
{{/if}}
{{#with result}}
<h2>Relevance Score: <code>{{view.score}}</code></h2>
{{#if view.warning}}<p class="warning">{{view.warning}}</p>{{/if}}
<h3>{{summary_heading}}</h3>
<div class="text">{{view.summary}}</div>
<h3>{{citations_heading}}</h3>
{{#if view.citations}}
<ol>
{{#each view.citations}}<li>{{this}}</li>
{{/each}}</ol>
{{else}}
<p class="notice">{{no_citations}}</p>
{{/if}}
<h3>Sample {{review_heading}}</h3>
<div class="text">{{view.review}}</div>
<p><a href="{{download_href}}" download="{{file_name}}">Download Report as PDF</a></p>
{{/with}}
</body>
</html>
"#;

/// Data for one page render.
#[derive(Debug, Default, Serialize)]
pub struct PageContext {
    /// Echo of the submitted topic, so a failed run keeps the field filled.
    pub topic: String,
    pub error: Option<String>,
    pub result: Option<ResultContext>,
}

/// The live view plus its download link.
#[derive(Debug, Serialize)]
pub struct ResultContext {
    pub view: LiveView,
    pub download_href: String,
    pub file_name: String,
    summary_heading: &'static str,
    citations_heading: &'static str,
    review_heading: &'static str,
    no_citations: &'static str,
}

impl ResultContext {
    pub fn new(view: LiveView, download_href: String, file_name: String) -> Self {
        Self {
            view,
            download_href,
            file_name,
            summary_heading: SUMMARY_HEADING,
            citations_heading: CITATIONS_HEADING,
            review_heading: REVIEW_HEADING,
            no_citations: NO_CITATIONS_NOTICE,
        }
    }
}

/// `data:<content_type>;base64,<bytes>`
pub fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Compiled page templates.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_template_string(PAGE_TEMPLATE, PAGE)?;
        Ok(Self { registry })
    }

    pub fn page(&self, context: &PageContext) -> Result<String, RenderError> {
        self.registry.render(PAGE_TEMPLATE, context)
    }
}
