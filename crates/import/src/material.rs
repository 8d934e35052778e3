//! # Material Descriptor
//!
//! Per-material rendering parameters carried by exported model assets:
//! colors, specular response, texture slot bindings, free-form user data
//! and the glass-technique sub-record. The binary layout lives in
//! [`crate::binary`]; this module only defines the record itself and the
//! legacy draw-technique table used by pre-string-technique streams.

use glam::Vec3;
use indexmap::IndexMap;

// ============================================================================
// Well-known names
// ============================================================================

/// Technique identifier that gates the glass sub-record on the wire.
pub const TECHNIQUE_GLASS: &str = "GLASS";

/// Default technique for freshly constructed descriptors.
pub const TECHNIQUE_MESH: &str = "MESH";

/// Texture slot the legacy two-slot layout binds its first path to.
pub const DIFFUSE_TEXTURE_SLOT: &str = "DiffuseTexture";

/// Texture slot the legacy two-slot layout binds its second path to.
pub const NORMAL_TEXTURE_SLOT: &str = "NormalTexture";

// ============================================================================
// MaterialDescriptor
// ============================================================================

/// Material parameters persisted per mesh section.
///
/// `textures` and `user_data` keep insertion order so that repeated exports
/// of the same material produce identical bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    /// Material name; stored on the wire as an empty string when absent.
    pub material_name: Option<String>,
    /// Diffuse color, defaults to white.
    pub diffuse_color: Vec3,
    /// Specular exponent.
    pub specular_power: f32,
    /// Extra per-material data (holo animation parameters); the X component
    /// doubles as the specular intensity, see [`Self::specular_intensity`].
    pub extra_data: Vec3,
    /// Texture slot name -> texture path.
    pub textures: IndexMap<String, String>,
    /// Free-form exporter metadata.
    pub user_data: IndexMap<String, String>,
    /// Draw technique name, e.g. `"MESH"` or `"GLASS"`.
    pub technique: String,
    /// Clockwise glass geometry reference, meaningful only for `"GLASS"`.
    pub glass_cw: String,
    /// Counter-clockwise glass geometry reference, meaningful only for `"GLASS"`.
    pub glass_ccw: String,
    /// Smooth-normal flag for glass rendering, meaningful only for `"GLASS"`.
    pub glass_smooth_normals: bool,
}

impl Default for MaterialDescriptor {
    fn default() -> Self {
        Self {
            material_name: None,
            diffuse_color: Vec3::ONE,
            specular_power: 0.0,
            extra_data: Vec3::ZERO,
            textures: IndexMap::new(),
            user_data: IndexMap::new(),
            technique: TECHNIQUE_MESH.to_string(),
            glass_cw: String::new(),
            glass_ccw: String::new(),
            glass_smooth_normals: true,
        }
    }
}

impl MaterialDescriptor {
    /// Create a descriptor with the given name. An empty name normalizes
    /// to the absent value, matching what the reader does.
    pub fn new(material_name: impl Into<String>) -> Self {
        let name = material_name.into();
        Self {
            material_name: if name.is_empty() { None } else { Some(name) },
            ..Self::default()
        }
    }

    /// Specular intensity, a view over `extra_data.x`. Not stored
    /// separately.
    pub fn specular_intensity(&self) -> f32 {
        self.extra_data.x
    }

    /// Set the specular intensity by writing through to `extra_data.x`.
    pub fn set_specular_intensity(&mut self, value: f32) {
        self.extra_data.x = value;
    }

    /// Whether this material uses the glass technique and therefore
    /// carries the glass sub-record on the wire.
    pub fn is_glass(&self) -> bool {
        self.technique == TECHNIQUE_GLASS
    }
}

// ============================================================================
// DrawTechnique — legacy integer technique table
// ============================================================================

/// Draw techniques as they were numbered before the format switched to
/// string technique identifiers.
///
/// Streams older than [`crate::binary::VERSION_TECHNIQUE_STRING`] store the
/// technique as one of these codes. The set is closed and codes are never
/// reordered; new techniques only ever existed as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DrawTechnique {
    Mesh = 0,
    VoxelMap = 1,
    AlphaMasked = 2,
    ForwardDecal = 3,
    Holo = 4,
    VoxelsDebris = 5,
    Glass = 6,
}

impl DrawTechnique {
    /// Look up a legacy technique code, `None` when out of range.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Mesh),
            1 => Some(Self::VoxelMap),
            2 => Some(Self::AlphaMasked),
            3 => Some(Self::ForwardDecal),
            4 => Some(Self::Holo),
            5 => Some(Self::VoxelsDebris),
            6 => Some(Self::Glass),
            _ => None,
        }
    }

    /// Technique name as it appears in string-technique streams.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mesh => "MESH",
            Self::VoxelMap => "VOXEL_MAP",
            Self::AlphaMasked => "ALPHA_MASKED",
            Self::ForwardDecal => "FORWARD_DECAL",
            Self::Holo => "HOLO",
            Self::VoxelsDebris => "VOXELS_DEBRIS",
            Self::Glass => "GLASS",
        }
    }
}
