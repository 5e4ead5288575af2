//! Template Weaver - a template inheritance and composition engine
//!
//! This library keeps a registry of base, child and composite UI templates,
//! resolves them through their inheritance chains into rendered text, and
//! composes new template configurations from free-form feature requests.
//!
//! # Example
//!
//! ```rust
//! use template_weaver::{CompositionRequest, Engine};
//!
//! let engine = Engine::in_memory();
//! let result = engine.compose(&CompositionRequest::new("user login form"));
//! assert!(result.success);
//! assert_eq!(result.composition.base_template, "form-panel");
//! ```

pub mod classification;
pub mod compose;
pub mod condition;
pub mod context;
pub mod hints;
pub mod render;
pub mod template;

pub use classification::{ClassificationLevel, ClassificationScheme, SecurityRequirements};
pub use compose::{
    CancelToken, Complexity, Composer, CompositionCache, CompositionRequest, CompositionResult,
    Preferences, RequestContext, Requirements, SelectionHeuristic, WeightedSelector,
};
pub use condition::{evaluate_str, ConditionError};
pub use context::{ContextMap, ContextValue, SlotMap};
pub use hints::{HintProvider, NoHints, StaticHints};
pub use render::{FsRenderer, MemoryRenderer, RenderError, TemplateRenderer};
pub use template::{
    AccessibilityLevel, BaseTemplate, ChildTemplate, ComponentRef, CompositeTemplate,
    ResolveContext, Slot, TemplateCategory, TemplateError, TemplateRegistry, TemplateResolver,
    Variant,
};

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::compose::{fingerprint, DEFAULT_CACHE_CAPACITY};

/// Configuration for an [`Engine`]
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Registry document location; `None` keeps the registry in memory only
    pub registry_path: Option<PathBuf>,
    /// Root directory for template resources
    pub templates_dir: PathBuf,
    /// Composition cache bound
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            registry_path: None,
            templates_dir: PathBuf::from("templates"),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist the registry to (and load it from) this TOML document
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = Some(path.into());
        self
    }

    /// Set the template resource root
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Set the composition cache bound
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

/// The engine owns the template registry, the resource renderer and the
/// composition cache, and is safe to share across threads. Template
/// registration goes through a staged copy of the registry, so a failed
/// registration leaves both the in-memory set and the persisted document
/// untouched.
pub struct Engine {
    config: EngineConfig,
    registry: RwLock<TemplateRegistry>,
    cache: Mutex<CompositionCache>,
    renderer: Arc<dyn TemplateRenderer>,
    heuristic: Box<dyn SelectionHeuristic>,
    hints: Box<dyn HintProvider>,
    scheme: ClassificationScheme,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine over a filesystem renderer. With a registry path the
    /// document is loaded, or created from the default set on first run;
    /// without one the default set is used directly.
    pub fn new(config: EngineConfig) -> Result<Self, TemplateError> {
        let renderer: Arc<dyn TemplateRenderer> =
            Arc::new(FsRenderer::new(config.templates_dir.clone()));
        let registry = match &config.registry_path {
            Some(path) => TemplateRegistry::load_or_init(path, renderer.as_ref())?,
            None => {
                let registry = TemplateRegistry::default_set();
                registry.seed_default_resources(renderer.as_ref())?;
                registry
            }
        };
        let cache = CompositionCache::new(config.cache_capacity);
        Ok(Self {
            registry: RwLock::new(registry),
            cache: Mutex::new(cache),
            renderer,
            heuristic: Box::new(WeightedSelector),
            hints: Box::new(NoHints),
            scheme: ClassificationScheme,
            config,
        })
    }

    /// Engine over the default template set with all resources in memory
    pub fn in_memory() -> Self {
        let renderer: Arc<dyn TemplateRenderer> = Arc::new(MemoryRenderer::new());
        let registry = TemplateRegistry::default_set();
        registry
            .seed_default_resources(renderer.as_ref())
            .expect("in-memory renderer accepts all writes");
        Self {
            registry: RwLock::new(registry),
            cache: Mutex::new(CompositionCache::default()),
            renderer,
            heuristic: Box::new(WeightedSelector),
            hints: Box::new(NoHints),
            scheme: ClassificationScheme,
            config: EngineConfig::default(),
        }
    }

    /// Replace the template selection heuristic
    pub fn with_heuristic(mut self, heuristic: impl SelectionHeuristic + 'static) -> Self {
        self.heuristic = Box::new(heuristic);
        self
    }

    /// Replace the hint provider consulted during pattern analysis
    pub fn with_hint_provider(mut self, hints: impl HintProvider + 'static) -> Self {
        self.hints = Box::new(hints);
        self
    }

    /// Resolve a template by name into rendered text
    ///
    /// # Example
    ///
    /// ```rust
    /// use template_weaver::{Engine, ResolveContext};
    ///
    /// let engine = Engine::in_memory();
    /// let markup = engine
    ///     .resolve_template("login-form", &ResolveContext::new())
    ///     .unwrap();
    /// assert!(markup.contains(r#"type="password""#));
    /// ```
    pub fn resolve_template(&self, name: &str, ctx: &ResolveContext) -> Result<String, TemplateError> {
        let registry = self.read_registry();
        let resolver = TemplateResolver::new(&registry, self.renderer.as_ref());
        resolver.resolve(name, ctx)
    }

    /// Compose a template configuration for a request. Never fails hard;
    /// pipeline errors degrade to a fallback result with `success == false`.
    pub fn compose(&self, request: &CompositionRequest) -> CompositionResult {
        self.compose_with_cancel(request, &CancelToken::new())
    }

    /// [`Engine::compose`] with cooperative cancellation. A cancelled
    /// composition returns the fallback result and is never cached.
    pub fn compose_with_cancel(
        &self,
        request: &CompositionRequest,
        cancel: &CancelToken,
    ) -> CompositionResult {
        let key = fingerprint(request);
        if let Some(hit) = self.lock_cache().get(key).cloned() {
            debug!(fingerprint = key, "composition cache hit");
            return hit;
        }

        let registry = self.read_registry();
        let composer = Composer::new(
            &registry,
            self.heuristic.as_ref(),
            self.hints.as_ref(),
            &self.scheme,
        );
        let result = composer.compose(request, cancel);
        drop(registry);

        if result.success && !cancel.is_cancelled() {
            self.lock_cache().insert(key, result.clone());
        }
        result
    }

    /// Register or replace a base template
    pub fn register_base(&self, template: BaseTemplate) -> Result<(), TemplateError> {
        self.mutate(move |registry| registry.register_base(template))
    }

    /// Register or replace a child template; the whole inheritance
    /// hierarchy is revalidated before the registry changes
    pub fn register_child(&self, template: ChildTemplate) -> Result<(), TemplateError> {
        self.mutate(move |registry| registry.register_child(template))
    }

    /// Register or replace a composite template
    pub fn register_composite(&self, template: CompositeTemplate) -> Result<(), TemplateError> {
        self.mutate(move |registry| registry.register_composite(template))
    }

    pub fn base_names(&self) -> Vec<String> {
        self.read_registry().base_names()
    }

    pub fn child_names(&self) -> Vec<String> {
        self.read_registry().child_names()
    }

    pub fn composite_names(&self) -> Vec<String> {
        self.read_registry().composite_names()
    }

    /// Number of memoised composition results
    pub fn cached_compositions(&self) -> usize {
        self.lock_cache().len()
    }

    /// The resource renderer, for reading and writing template content
    pub fn renderer(&self) -> &dyn TemplateRenderer {
        self.renderer.as_ref()
    }

    /// Stage a registry change, persist it when configured, then commit and
    /// drop the memoised compositions. Any failure leaves the live registry
    /// as it was.
    fn mutate<F>(&self, apply: F) -> Result<(), TemplateError>
    where
        F: FnOnce(&mut TemplateRegistry) -> Result<(), TemplateError>,
    {
        let mut guard = self.write_registry();
        let mut staged = guard.clone();
        apply(&mut staged)?;
        if let Some(path) = &self.config.registry_path {
            staged.persist(path)?;
        }
        *guard = staged;
        drop(guard);
        self.lock_cache().clear();
        Ok(())
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, TemplateRegistry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, TemplateRegistry> {
        self.registry.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_cache(&self) -> MutexGuard<'_, CompositionCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}
