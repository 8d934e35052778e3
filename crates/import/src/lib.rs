//! # Modelkit Import
//!
//! Versioned binary material descriptors for the modelkit content pipeline.
//!
//! A [`MaterialDescriptor`] carries the per-material rendering parameters
//! persisted inside exported model assets: diffuse color, specular response,
//! texture slot bindings, free-form user data and a technique-specific glass
//! sub-record. The binary layout evolved over several format revisions; the
//! reader accepts every historical revision, gated by the format version the
//! containing asset file declares out-of-band.
//!
//! ## Modules
//!
//! - `material`: the descriptor record and the legacy draw-technique table
//! - `binary`: wire primitives, error taxonomy and the versioned codec

pub mod binary;
pub mod material;

pub use binary::{
    MaterialError, VERSION_GLASS_PARAMS, VERSION_TECHNIQUE_STRING, VERSION_TEXTURE_MAP,
    VERSION_USER_DATA,
};
pub use material::{DrawTechnique, MaterialDescriptor, TECHNIQUE_GLASS};
