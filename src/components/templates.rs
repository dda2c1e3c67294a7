use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::errors::WikiError;
use crate::types::Page;
use crate::utils::escape_html;

const BUILTIN_VIEW: &str = include_str!("../../templates/view.html");
const BUILTIN_EDIT: &str = include_str!("../../templates/edit.html");

/// Names of the templates every deployment needs
pub const TEMPLATE_NAMES: [&str; 2] = ["view", "edit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Body,
    Instance,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "Title" => Some(Field::Title),
            "Body" => Some(Field::Body),
            "Instance" => Some(Field::Instance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed template: literal HTML interleaved with `{{Field}}` placeholders
#[derive(Debug, Clone)]
struct Template {
    segments: Vec<Segment>,
}

impl Template {
    fn parse(name: &str, source: &str) -> Result<Self, WikiError> {
        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or_else(|| {
                WikiError::Template(format!("{}: unclosed placeholder", name))
            })?;
            let key = after[..close].trim();
            let field = Field::parse(key).ok_or_else(|| {
                WikiError::Template(format!("{}: unknown placeholder {{{{{}}}}}", name, key))
            })?;
            segments.push(Segment::Field(field));
            rest = &after[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Self { segments })
    }

    fn fill(&self, page: &Page) -> String {
        let body = page.body_text();
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Title) => out.push_str(&escape_html(page.title().as_str())),
                Segment::Field(Field::Body) => out.push_str(&escape_html(&body)),
                Segment::Field(Field::Instance) => out.push_str(&escape_html(page.instance())),
            }
        }
        out
    }
}

/// Immutable set of named templates, parsed once at startup
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<String, Template>,
}

impl TemplateSet {
    /// Create a set with no templates
    pub fn new() -> Self {
        Self::default()
    }

    /// The templates compiled into the binary
    pub fn builtin() -> Result<Self, WikiError> {
        Self::new()
            .with_template("view", BUILTIN_VIEW)?
            .with_template("edit", BUILTIN_EDIT)
    }

    /// Load `view.html` and `edit.html` from `dir`, falling back to the
    /// built-in copy of each file that is missing
    pub fn load(dir: &Path) -> Result<Self, WikiError> {
        let mut set = Self::new();
        for name in TEMPLATE_NAMES {
            let path = dir.join(format!("{}.html", name));
            let source = if path.is_file() {
                info!("Loading template '{}' from {:?}", name, path);
                fs::read_to_string(&path)?
            } else {
                debug!("No template at {:?}, using built-in '{}'", path, name);
                match name {
                    "view" => BUILTIN_VIEW.to_string(),
                    _ => BUILTIN_EDIT.to_string(),
                }
            };
            set = set.with_template(name, &source)?;
        }
        Ok(set)
    }

    /// Add or replace the template called `name`
    pub fn with_template(mut self, name: &str, source: &str) -> Result<Self, WikiError> {
        let template = Template::parse(name, source)?;
        self.templates.insert(name.to_string(), template);
        Ok(self)
    }

    /// Fill the template called `name` with the fields of `page`
    pub fn fill(&self, name: &str, page: &Page) -> Result<String, WikiError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| WikiError::Template(format!("no template named {:?}", name)))?;
        Ok(template.fill(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Title;

    fn page(body: &str) -> Page {
        Page::new(Title::parse("Alice").unwrap(), body)
    }

    #[test]
    fn builtin_set_has_view_and_edit() {
        let set = TemplateSet::builtin().unwrap();
        for name in TEMPLATE_NAMES {
            let html = set.fill(name, &page("body text")).unwrap();
            assert!(html.contains("body text"), "{name}");
        }
    }

    #[test]
    fn fill_escapes_field_values() {
        let set = TemplateSet::new()
            .with_template("view", "<h1>{{Title}}</h1><div>{{ Body }}</div>")
            .unwrap();
        let html = set.fill("view", &page("<script>&")).unwrap();
        assert_eq!(html, "<h1>Alice</h1><div>&lt;script&gt;&amp;</div>");
    }

    #[test]
    fn unknown_placeholder_is_rejected_at_parse() {
        let err = TemplateSet::new().with_template("view", "{{Author}}").unwrap_err();
        assert!(matches!(err, WikiError::Template(_)));
        let err = TemplateSet::new().with_template("view", "{{Title").unwrap_err();
        assert!(matches!(err, WikiError::Template(_)));
    }

    #[test]
    fn missing_template_fails_to_fill() {
        let set = TemplateSet::new();
        assert!(matches!(set.fill("view", &page("x")), Err(WikiError::Template(_))));
    }

    #[test]
    fn load_falls_back_to_builtin_for_missing_files() {
        let set = TemplateSet::load(Path::new("this/dir/does/not/exist")).unwrap();
        let html = set.fill("edit", &page("draft")).unwrap();
        assert!(html.contains("action=\"/save/Alice\""));
        assert!(html.contains(">draft</textarea>"));
    }
}
