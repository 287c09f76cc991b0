//! Shader module registry.

use log::{debug, info};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

/// Error types for shader lookups.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader '{name}' not found in library")]
    NotLoaded { name: String },
}

/// Central registry for compiled shader modules, keyed by name.
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Compile a shader from a WGSL source string, replacing any module of the same name.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Arc<wgpu::ShaderModule> {
        debug!("Loading shader '{}' from source", name);

        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });

        let arc_module = Arc::new(module);
        let replaced = self
            .modules
            .insert(name.to_string(), arc_module.clone())
            .is_some();

        if replaced {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }

        arc_module
    }

    /// Return the cached module, compiling `source` on first use.
    pub fn get_or_load(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Arc<wgpu::ShaderModule> {
        match self.modules.get(name) {
            Some(module) => module.clone(),
            None => self.load_from_source(device, name, source),
        }
    }

    /// Get a previously loaded shader by name.
    pub fn get(&self, name: &str) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| ShaderError::NotLoaded {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}
