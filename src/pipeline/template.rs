//! Filename templates: compile once, render against the extracted fields.
//!
//! Rendering is delegated to tera. Formats are usually written in the Go
//! `text/template` style (`{{.Title}}.pdf`, `{{.Company | snakecase}}`), so
//! simple Go actions are rewritten into tera expressions before compiling:
//!
//! | Go action                  | tera expression            |
//! |----------------------------|----------------------------|
//! | `{{.Title}}`               | `{{ Title }}`              |
//! | `{{.Company \| snakecase}}` | `{{ Company \| snakecase}}` |
//! | `{{snakecase .Company}}`   | `{{ Company \| snakecase }}` |
//!
//! Anything else inside `{{ }}` is passed to tera unchanged, so native tera
//! expressions (`{{ Title | truncate(length=20) }}`) work as well. Outside
//! `{{ }}` the format is literal text: `{%` and `{#` are emitted as written
//! rather than opening a tera tag or comment. Missing keys are a render
//! error, which is tera's native behaviour.

use crate::error::{error_chain, RenameError};
use crate::pipeline::extract::ExtractedFields;
use crate::pipeline::helpers;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "filename";

/// Go template keywords that must never be read as a helper name.
const GO_KEYWORDS: &[&str] = &[
    "if", "else", "end", "range", "with", "define", "template", "block", "not", "and", "or",
];

static RE_ACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{(-?)(.*?)(-?)\}\}").unwrap());

/// Tera tag and comment openers.
static RE_OPENER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[%#]").unwrap());

/// A compiled filename template.
pub struct FilenameTemplate {
    format: String,
    tera: Tera,
}

impl std::fmt::Debug for FilenameTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilenameTemplate")
            .field("format", &self.format)
            .finish()
    }
}

impl FilenameTemplate {
    /// Compile `format`, registering the string helpers.
    pub fn compile(format: &str) -> Result<Self, RenameError> {
        let source = translate_go_actions(format);

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        helpers::register(&mut tera);
        tera.add_raw_template(TEMPLATE_NAME, &source)
            .map_err(|e| RenameError::TemplateCompile {
                format: format.to_string(),
                detail: error_chain(&e),
            })?;

        Ok(Self {
            format: format.to_string(),
            tera,
        })
    }

    /// The format string as given by the caller.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Render the template against `fields`.
    pub fn render(&self, fields: &ExtractedFields) -> Result<String, RenameError> {
        let context = Context::from_serialize(fields).map_err(|e| RenameError::TemplateRender {
            detail: error_chain(&e),
        })?;

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| RenameError::TemplateRender {
                detail: error_chain(&e),
            })
    }
}

/// Rewrite Go-style field actions into tera expressions and escape tera
/// openers in the literal text between actions.
pub fn translate_go_actions(format: &str) -> String {
    let mut out = String::with_capacity(format.len());
    let mut last = 0;
    for caps in RE_ACTION.captures_iter(format) {
        let Some(action) = caps.get(0) else { continue };
        out.push_str(&escape_literal(&format[last..action.start()]));

        let (lead, body, trail) = (&caps[1], &caps[2], &caps[3]);
        match rewrite_pipeline(body) {
            Some(rewritten) => out.push_str(&format!("{{{{{lead}{rewritten}{trail}}}}}")),
            None => out.push_str(action.as_str()),
        }
        last = action.end();
    }
    out.push_str(&escape_literal(&format[last..]));
    out
}

/// Emit `{%` and `{#` through a string expression so tera prints them.
fn escape_literal(text: &str) -> Cow<'_, str> {
    RE_OPENER.replace_all(text, |caps: &Captures<'_>| format!("{{{{ \"{}\" }}}}", &caps[0]))
}

/// `None` when no segment of the pipeline is Go-style.
fn rewrite_pipeline(body: &str) -> Option<String> {
    let mut changed = false;
    let segments: Vec<String> = body
        .split('|')
        .map(|seg| match rewrite_segment(seg.trim()) {
            Some(expr) => {
                changed = true;
                format!(" {expr} ")
            }
            None => seg.to_string(),
        })
        .collect();

    changed.then(|| segments.join("|"))
}

fn rewrite_segment(segment: &str) -> Option<String> {
    if let Some(path) = segment.strip_prefix('.') {
        return is_field_path(path).then(|| path.to_string());
    }

    let mut tokens = segment.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(func), Some(arg), None)
            if is_ident(func) && !GO_KEYWORDS.contains(&func) && arg.starts_with('.') =>
        {
            let path = &arg[1..];
            is_field_path(path).then(|| format!("{path} | {func}"))
        }
        _ => None,
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_field_path(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_ident)
}
