use kiln_core::Value;

/// Abstract classification of a material property.
///
/// Descriptive only; consumers map hints onto whatever shading model they use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SemanticHint {
    #[default]
    Unknown,
    Diffuse,
    Roughness,
    Metallic,
    Emissive,
    Normal,
    Opacity,
    RefractionIndex,
    Reflectivity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProperty {
    pub semantic: SemanticHint,
    /// Parameter name as used by the source format, e.g. `Kd`.
    pub name: String,
    pub value: Value,
}

impl MaterialProperty {
    pub fn new(semantic: SemanticHint, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            semantic,
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A texture bound to a named material slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureReference {
    pub semantic: String,
    pub texture: String,
}

/// Format-neutral material: an ordered list of hinted key/value properties.
///
/// Holds at most one property per parameter name (compared ASCII
/// case-insensitively).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    properties: Vec<MaterialProperty>,
    textures: Vec<TextureReference>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn properties(&self) -> &[MaterialProperty] {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&MaterialProperty> {
        self.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Shortcut for `property(name).map(|p| &p.value)`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.property(name).map(|p| &p.value)
    }

    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Adds `property` unless one with the same name already exists.
    ///
    /// Returns `false` if it was rejected.
    pub fn add_property(&mut self, property: MaterialProperty) -> bool {
        if self.has_property(&property.name) {
            return false;
        }
        self.properties.push(property);
        true
    }

    #[inline]
    #[must_use]
    pub fn textures(&self) -> &[TextureReference] {
        &self.textures
    }

    #[must_use]
    pub fn has_texture(&self, semantic: &str) -> bool {
        self.textures.iter().any(|t| t.semantic.eq_ignore_ascii_case(semantic))
    }

    /// Binds a texture unless the slot is already taken.
    pub fn add_texture(&mut self, texture: TextureReference) -> bool {
        if self.has_texture(&texture.semantic) {
            return false;
        }
        self.textures.push(texture);
        true
    }
}
