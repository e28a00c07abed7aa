use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Entry points of one shader pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPassDesc {
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
}

impl ShaderPassDesc {
    pub const fn new(vertex_entry: &'static str, fragment_entry: &'static str) -> Self {
        Self { vertex_entry, fragment_entry }
    }
}

/// WGSL shader source plus its pass table. Pass `i` is addressed by
/// `DrawMesh { pass: i, .. }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderAsset {
    pub name: Cow<'static, str>,
    pub source: Cow<'static, str>,
    pub passes: Vec<ShaderPassDesc>,
}

impl ShaderAsset {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        source: impl Into<Cow<'static, str>>,
        passes: Vec<ShaderPassDesc>,
    ) -> Self {
        Self { name: name.into(), source: source.into(), passes }
    }

    #[inline]
    pub fn pass(&self, index: u32) -> Option<&ShaderPassDesc> {
        self.passes.get(index as usize)
    }
}

/// Process-unique material identity. Backends key pipelines by it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MaterialId(u32);

/// A shader instance referenced by draw commands. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Material {
    id: MaterialId,
    shader: Arc<ShaderAsset>,
}

impl Material {
    pub fn new(shader: Arc<ShaderAsset>) -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self { id: MaterialId(NEXT.fetch_add(1, Ordering::Relaxed)), shader }
    }

    #[inline]
    pub fn id(&self) -> MaterialId {
        self.id
    }

    #[inline]
    pub fn shader(&self) -> &ShaderAsset {
        &self.shader
    }
}

impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Material {}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> Arc<ShaderAsset> {
        Arc::new(ShaderAsset::new("test", "", vec![ShaderPassDesc::new("vs", "fs")]))
    }

    #[test]
    fn materials_from_one_shader_are_distinct() {
        let shader = asset();
        let a = Material::new(shader.clone());
        let b = Material::new(shader);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn pass_lookup() {
        let m = Material::new(asset());
        assert_eq!(m.shader().pass(0).map(|p| p.fragment_entry), Some("fs"));
        assert!(m.shader().pass(1).is_none());
    }
}
