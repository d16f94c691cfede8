//! services/chat/src/adapters/templates.rs
//!
//! This module contains the MiniJinja adapter for the `TemplateRenderer` port.
//!
//! A template group is one file in the templates directory. Its top-level
//! `{% block %}`s are the named sub-templates callers ask for, so a single
//! file can hold the page and every chat fragment.

use crate::config::BuildMode;
use marvin_core::ports::{PortError, PortResult, TemplateData, TemplateRenderer};
use minijinja::Environment;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Key under which the build version is injected into every render.
pub const BUILD_VERSION_KEY: &str = "build_version";

//=========================================================================================
// Compiled Template Groups
//=========================================================================================

/// One parsed template file, ready to render any of its blocks.
pub struct CompiledGroup {
    group: String,
    env: Environment<'static>,
}

impl CompiledGroup {
    /// Reads and parses `path`, registering it under the name `group`.
    pub fn compile(group: &str, path: &Path) -> PortResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            let stage = if e.kind() == ErrorKind::NotFound {
                "open"
            } else {
                "read"
            };
            template_error(group, stage, e)
        })?;

        let mut env = Environment::new();
        env.add_template_owned(group.to_string(), source)
            .map_err(|e| template_error(group, "parse", e))?;

        Ok(Self {
            group: group.to_string(),
            env,
        })
    }

    /// Renders the block `name` with `data` as its context.
    pub fn render_block(&self, name: &str, data: &TemplateData) -> PortResult<String> {
        let exec_error =
            |e: minijinja::Error| template_error(&self.group, "exec", format!("{:?}: {}", name, e));

        let template = self.env.get_template(&self.group).map_err(exec_error)?;
        let mut captured = template
            .render_captured_to(data, io::sink())
            .map_err(exec_error)?;
        captured
            .with_state_mut(|state| state.render_block(name))
            .map_err(exec_error)
    }
}

fn template_error(group: &str, stage: &'static str, reason: impl ToString) -> PortError {
    PortError::Template {
        group: group.to_string(),
        stage,
        reason: reason.to_string(),
    }
}

//=========================================================================================
// Template Cache
//=========================================================================================

/// Compiled groups keyed by group id.
///
/// Insertion is insert-if-absent: when two renders race on first access, the
/// first stored copy wins and both callers end up holding it.
#[derive(Default)]
pub struct TemplateCache {
    groups: RwLock<HashMap<String, Arc<CompiledGroup>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: &str) -> Option<Arc<CompiledGroup>> {
        self.groups.read().get(group).cloned()
    }

    /// Stores `compiled` unless the group is already cached, and returns the
    /// retained copy.
    pub fn get_or_insert(&self, group: &str, compiled: Arc<CompiledGroup>) -> Arc<CompiledGroup> {
        self.groups
            .write()
            .entry(group.to_string())
            .or_insert(compiled)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `TemplateRenderer` port with MiniJinja.
pub struct MiniJinjaRenderer {
    templates_path: PathBuf,
    build_mode: BuildMode,
    build_version: String,
    cache: TemplateCache,
}

impl MiniJinjaRenderer {
    /// Creates a new `MiniJinjaRenderer` reading templates from `templates_path`.
    pub fn new(
        templates_path: impl Into<PathBuf>,
        build_mode: BuildMode,
        build_version: impl Into<String>,
    ) -> Self {
        Self {
            templates_path: templates_path.into(),
            build_mode,
            build_version: build_version.into(),
            cache: TemplateCache::new(),
        }
    }

    /// Returns the compiled form of `group`.
    ///
    /// Embedded builds compile each group at most once per renderer; development
    /// builds re-read the file every time so edits show up without a restart.
    pub fn compiled(&self, group: &str) -> PortResult<Arc<CompiledGroup>> {
        if self.build_mode.is_embedded() {
            if let Some(compiled) = self.cache.get(group) {
                return Ok(compiled);
            }
        }

        debug!("Compiling template group {}", group);
        let compiled = Arc::new(CompiledGroup::compile(group, &self.templates_path.join(group))?);

        if self.build_mode.is_embedded() {
            return Ok(self.cache.get_or_insert(group, compiled));
        }
        Ok(compiled)
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }
}

//=========================================================================================
// `TemplateRenderer` Trait Implementation
//=========================================================================================

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, group: &str, name: &str, mut data: TemplateData) -> PortResult<String> {
        data.insert(
            BUILD_VERSION_KEY.to_string(),
            Value::String(self.build_version.clone()),
        );
        self.compiled(group)?.render_block(name, &data)
    }
}
