//! Template resource rendering
//!
//! The engine treats the low-level text renderer as a collaborator behind the
//! [`TemplateRenderer`] trait. Resources are plain text with `{{name}}`
//! placeholders; a placeholder may use a dotted path to reach into nested
//! context maps. Placeholders with no matching context value render empty.
//!
//! [`FsRenderer`] backs resources with files under a root directory and keeps
//! a compiled cache invalidated by file modification time. [`MemoryRenderer`]
//! keeps everything in a map, for tests and embedding.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;

use thiserror::Error;
use tracing::debug;

use crate::context::{lookup_path, ContextMap};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template resource not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read template resource {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write template resource {path}: {message}")]
    Write { path: String, message: String },
}

pub trait TemplateRenderer: Send + Sync {
    /// Compile and cache a resource; a no-op when the cache is current
    fn load(&self, resource: &str) -> Result<(), RenderError>;

    /// Render a resource with the given context
    fn render(&self, resource: &str, context: &ContextMap) -> Result<String, RenderError>;

    /// Raw resource text, bypassing the compiled cache
    fn get_content(&self, resource: &str) -> Result<String, RenderError>;

    /// Write resource text and invalidate any cached compilation
    fn save_content(&self, resource: &str, content: &str) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Placeholder(String),
}

#[derive(Debug, Clone)]
struct Compiled {
    segments: Vec<Segment>,
    modified: Option<SystemTime>,
}

fn compile(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        match rest[start + 2..].find("}}") {
            Some(end) => {
                let name = rest[start + 2..start + 2 + end].trim();
                if start > 0 {
                    segments.push(Segment::Text(rest[..start].to_string()));
                }
                segments.push(Segment::Placeholder(name.to_string()));
                rest = &rest[start + 2 + end + 2..];
            }
            // Unterminated placeholder: keep the remainder as literal text
            None => break,
        }
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest.to_string()));
    }
    segments
}

fn substitute(segments: &[Segment], context: &ContextMap) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                if let Some(value) = lookup_path(context, name) {
                    out.push_str(&value.to_text());
                }
            }
        }
    }
    out
}

/// Filesystem-backed renderer with an mtime-checked compiled cache
pub struct FsRenderer {
    root: PathBuf,
    cache: Mutex<HashMap<String, Compiled>>,
}

impl FsRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resource_path(&self, resource: &str) -> PathBuf {
        self.root.join(resource)
    }

    fn compiled(&self, resource: &str) -> Result<Compiled, RenderError> {
        let path = self.resource_path(resource);
        let modified = fs::metadata(&path).and_then(|meta| meta.modified()).ok();

        {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.get(resource) {
                if hit.modified == modified && modified.is_some() {
                    return Ok(hit.clone());
                }
                debug!(resource, "template resource changed, recompiling");
            }
        }

        let source = fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RenderError::NotFound {
                path: path.display().to_string(),
            },
            _ => RenderError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            },
        })?;

        let compiled = Compiled {
            segments: compile(&source),
            modified,
        };
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(resource.to_string(), compiled.clone());
        Ok(compiled)
    }
}

impl TemplateRenderer for FsRenderer {
    fn load(&self, resource: &str) -> Result<(), RenderError> {
        self.compiled(resource).map(|_| ())
    }

    fn render(&self, resource: &str, context: &ContextMap) -> Result<String, RenderError> {
        let compiled = self.compiled(resource)?;
        Ok(substitute(&compiled.segments, context))
    }

    fn get_content(&self, resource: &str) -> Result<String, RenderError> {
        let path = self.resource_path(resource);
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RenderError::NotFound {
                path: path.display().to_string(),
            },
            _ => RenderError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            },
        })
    }

    fn save_content(&self, resource: &str, content: &str) -> Result<(), RenderError> {
        let path = self.resource_path(resource);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| RenderError::Write {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        }
        fs::write(&path, content).map_err(|err| RenderError::Write {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.remove(resource);
        Ok(())
    }
}

/// In-memory renderer for tests and embedded use
#[derive(Default)]
pub struct MemoryRenderer {
    resources: Mutex<BTreeMap<String, String>>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(self, resource: impl Into<String>, content: impl Into<String>) -> Self {
        {
            let mut resources = self.resources.lock().unwrap_or_else(|e| e.into_inner());
            resources.insert(resource.into(), content.into());
        }
        self
    }

    pub fn resource_names(&self) -> Vec<String> {
        let resources = self.resources.lock().unwrap_or_else(|e| e.into_inner());
        resources.keys().cloned().collect()
    }
}

impl TemplateRenderer for MemoryRenderer {
    fn load(&self, resource: &str) -> Result<(), RenderError> {
        let resources = self.resources.lock().unwrap_or_else(|e| e.into_inner());
        if resources.contains_key(resource) {
            Ok(())
        } else {
            Err(RenderError::NotFound {
                path: resource.to_string(),
            })
        }
    }

    fn render(&self, resource: &str, context: &ContextMap) -> Result<String, RenderError> {
        let source = self.get_content(resource)?;
        Ok(substitute(&compile(&source), context))
    }

    fn get_content(&self, resource: &str) -> Result<String, RenderError> {
        let resources = self.resources.lock().unwrap_or_else(|e| e.into_inner());
        resources
            .get(resource)
            .cloned()
            .ok_or_else(|| RenderError::NotFound {
                path: resource.to_string(),
            })
    }

    fn save_content(&self, resource: &str, content: &str) -> Result<(), RenderError> {
        let mut resources = self.resources.lock().unwrap_or_else(|e| e.into_inner());
        resources.insert(resource.to_string(), content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextValue;

    fn ctx(pairs: &[(&str, &str)]) -> ContextMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ContextValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_compile_splits_segments() {
        let segments = compile("Hello {{name}}, welcome to {{place}}!");
        assert_eq!(
            segments,
            vec![
                Segment::Text("Hello ".to_string()),
                Segment::Placeholder("name".to_string()),
                Segment::Text(", welcome to ".to_string()),
                Segment::Placeholder("place".to_string()),
                Segment::Text("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_compile_unterminated_placeholder() {
        let segments = compile("before {{oops");
        assert_eq!(
            segments,
            vec![Segment::Text("before {{oops".to_string())]
        );
    }

    #[test]
    fn test_substitute_missing_renders_empty() {
        let segments = compile("[{{missing}}]");
        assert_eq!(substitute(&segments, &ContextMap::new()), "[]");
    }

    #[test]
    fn test_memory_renderer_round_trip() {
        let renderer = MemoryRenderer::new().with_resource("greet.tmpl", "Hi {{name}}");
        let out = renderer.render("greet.tmpl", &ctx(&[("name", "Ada")])).unwrap();
        assert_eq!(out, "Hi Ada");

        renderer.save_content("greet.tmpl", "Bye {{name}}").unwrap();
        let out = renderer.render("greet.tmpl", &ctx(&[("name", "Ada")])).unwrap();
        assert_eq!(out, "Bye Ada");
    }

    #[test]
    fn test_memory_renderer_missing_resource() {
        let renderer = MemoryRenderer::new();
        assert!(matches!(
            renderer.render("nope.tmpl", &ContextMap::new()),
            Err(RenderError::NotFound { .. })
        ));
        assert!(renderer.load("nope.tmpl").is_err());
    }

    #[test]
    fn test_dotted_placeholder() {
        let mut inner = ContextMap::new();
        inner.insert("name".to_string(), ContextValue::from("Ada"));
        let mut context = ContextMap::new();
        context.insert("user".to_string(), ContextValue::Map(inner));

        let renderer = MemoryRenderer::new().with_resource("t", "{{user.name}}");
        assert_eq!(renderer.render("t", &context).unwrap(), "Ada");
    }

    #[test]
    fn test_fs_renderer_reads_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FsRenderer::new(dir.path());
        renderer.save_content("a.tmpl", "value: {{v}}").unwrap();

        let out = renderer.render("a.tmpl", &ctx(&[("v", "1")])).unwrap();
        assert_eq!(out, "value: 1");

        // Rewriting through the renderer invalidates the cached compilation
        renderer.save_content("a.tmpl", "changed: {{v}}").unwrap();
        let out = renderer.render("a.tmpl", &ctx(&[("v", "2")])).unwrap();
        assert_eq!(out, "changed: 2");
    }

    #[test]
    fn test_fs_renderer_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FsRenderer::new(dir.path());
        assert!(matches!(
            renderer.get_content("missing.tmpl"),
            Err(RenderError::NotFound { .. })
        ));
    }
}
