//! CPU reference evaluator for the drape surface shader.
//!
//! A flat plane is displaced by layered sine waves and shaded with seven
//! radial color zones, ambient + point/environment lighting, optional PBR
//! texture compositing, border masking, depth darkening and film grain.
//! Every vertex and fragment is a pure function of `SurfaceParameters`.

pub mod audit;
pub mod color;
pub mod displacement;
pub mod environment;
pub mod error;
pub mod frame;
pub mod frame_loop;
pub mod grain;
pub mod grid;
pub mod lighting;
pub mod params;
pub mod pbr;
pub mod shading;
pub mod texture;
pub mod zones;

pub use error::{ColorError, ParamError, TextureError};
pub use frame::{render_frame, FrameBuffer, FrameSettings};
pub use grid::{evaluate_surface, PlaneGrid, SurfaceMesh};
pub use params::{DebugMode, LightSource, LightingMode, ParamValue, SurfaceParameters};
pub use shading::{Fragment, SurfaceShader};
pub use texture::Texture;
