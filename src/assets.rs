//! Asset manifest and background loading
//!
//! Every asset (font, matcap image, dessert models) loads on its own thread
//! and reports back over an mpsc channel. The render thread drains the channel
//! each frame and folds finished assets into the scene, so the window is live
//! and the camera responsive from the first frame. A failed load is logged
//! and its contribution simply never appears; nothing retries.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use thiserror::Error;

use crate::gfx::resources::material::Material;
use crate::gfx::scene::Mesh;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("obj load error: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Decoded RGBA8 matcap image.
pub struct MatcapImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// One named piece of a loaded model, with its resolved material.
pub struct ModelPart {
    pub name: String,
    pub mesh: Mesh,
    pub material_id: Option<String>,
}

/// A model loaded off-thread, ready to be scattered into the scene.
pub struct LoadedModel {
    pub spec: ModelSpec,
    pub parts: Vec<ModelPart>,
    pub materials: Vec<Material>,
}

/// Static description of one dessert model.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub name: &'static str,
    pub path: &'static str,
    /// Random per-instance scale range.
    pub min_scale: f32,
    pub max_scale: f32,
    /// Part names dropped at load time (stray helper geometry in the export).
    pub hidden_parts: &'static [&'static str],
}

/// Everything the scene loads at startup.
pub struct AssetManifest {
    pub font_path: PathBuf,
    pub matcap_path: PathBuf,
    pub models: Vec<ModelSpec>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("assets/fonts/helvetiker_regular.ttf"),
            matcap_path: PathBuf::from("assets/textures/matcap.png"),
            models: vec![
                ModelSpec {
                    name: "pink_donut",
                    path: "assets/models/pink_donut/scene.obj",
                    min_scale: 1.0,
                    max_scale: 8.0,
                    hidden_parts: &["Plane"],
                },
                ModelSpec {
                    name: "pink_glazed_donut",
                    path: "assets/models/pink_glazed_donut/scene.obj",
                    min_scale: 0.2,
                    max_scale: 0.5,
                    hidden_parts: &[],
                },
                ModelSpec {
                    name: "elegant_cupcake",
                    path: "assets/models/elegant_cupcake/scene.obj",
                    min_scale: 0.001,
                    max_scale: 0.004,
                    hidden_parts: &[],
                },
                ModelSpec {
                    name: "oreo_cupcake",
                    path: "assets/models/oreo_cupcake/scene.obj",
                    min_scale: 0.2,
                    max_scale: 0.4,
                    hidden_parts: &[],
                },
            ],
        }
    }
}

/// Messages sent from loader threads to the render thread.
pub enum AssetEvent {
    Font(Vec<u8>),
    Matcap(MatcapImage),
    Model(LoadedModel),
}

/// Spawns one loader thread per asset in the manifest.
///
/// Threads are detached; each sends at most one event and exits. Send errors
/// are ignored because they only happen when the receiver (the app) is gone.
pub fn spawn_loads(manifest: &AssetManifest, tx: Sender<AssetEvent>) {
    let font_path = manifest.font_path.clone();
    let font_tx = tx.clone();
    std::thread::spawn(move || match std::fs::read(&font_path) {
        Ok(bytes) => {
            let _ = font_tx.send(AssetEvent::Font(bytes));
        }
        Err(e) => log::warn!("failed to load font {}: {}", font_path.display(), e),
    });

    let matcap_path = manifest.matcap_path.clone();
    let matcap_tx = tx.clone();
    std::thread::spawn(move || match load_matcap(&matcap_path) {
        Ok(img) => {
            let _ = matcap_tx.send(AssetEvent::Matcap(img));
        }
        Err(e) => log::warn!("failed to load matcap {}: {}", matcap_path.display(), e),
    });

    for spec in manifest.models.iter().cloned() {
        let model_tx = tx.clone();
        std::thread::spawn(move || match load_model(&spec) {
            Ok(model) => {
                let _ = model_tx.send(AssetEvent::Model(model));
            }
            Err(e) => log::warn!("failed to load model {}: {}", spec.path, e),
        });
    }
}

fn load_matcap(path: &std::path::Path) -> Result<MatcapImage, AssetError> {
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(MatcapImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}

/// Loads an OBJ with its MTL materials.
///
/// Material names are prefixed with the model name so the four models cannot
/// collide in the shared material manager. Parts listed in `hidden_parts` are
/// dropped here rather than hidden later.
pub fn load_model(spec: &ModelSpec) -> Result<LoadedModel, AssetError> {
    let (models, materials) = tobj::load_obj(
        spec.path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let mtl_materials = materials.unwrap_or_else(|e| {
        log::debug!("no MTL for {}: {}", spec.path, e);
        Vec::new()
    });

    let material_name = |index: usize| -> String {
        let raw = &mtl_materials[index].name;
        if raw.is_empty() {
            format!("{}/material_{}", spec.name, index)
        } else {
            format!("{}/{}", spec.name, raw)
        }
    };

    let mut loaded_materials = Vec::with_capacity(mtl_materials.len());
    for (i, mtl) in mtl_materials.iter().enumerate() {
        let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
        // shininess maps inversely onto roughness
        let roughness = 1.0 - (mtl.shininess.unwrap_or(32.0) / 128.0).clamp(0.0, 1.0);
        loaded_materials.push(Material::new(
            &material_name(i),
            [
                diffuse[0],
                diffuse[1],
                diffuse[2],
                mtl.dissolve.unwrap_or(1.0),
            ],
            roughness,
        ));
    }

    let mut parts = Vec::new();
    for model in models.iter() {
        if spec.hidden_parts.iter().any(|h| model.name.contains(h)) {
            continue;
        }

        let mesh = &model.mesh;
        let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len() {
            mesh.normals.clone()
        } else {
            Mesh::calculate_face_normals(&mesh.positions, &mesh.indices)
        };

        parts.push(ModelPart {
            name: model.name.clone(),
            mesh: Mesh::new(mesh.positions.clone(), normals, mesh.indices.clone()),
            material_id: mesh
                .material_id
                .filter(|&id| id < mtl_materials.len())
                .map(|id| material_name(id)),
        });
    }

    Ok(LoadedModel {
        spec: spec.clone(),
        parts,
        materials: loaded_materials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_lists_all_dessert_models() {
        let manifest = AssetManifest::default();
        assert_eq!(manifest.models.len(), 4);
        let names: Vec<_> = manifest.models.iter().map(|m| m.name).collect();
        assert!(names.contains(&"pink_donut"));
        assert!(names.contains(&"pink_glazed_donut"));
        assert!(names.contains(&"elegant_cupcake"));
        assert!(names.contains(&"oreo_cupcake"));
    }

    #[test]
    fn test_scale_ranges_are_well_formed() {
        for spec in AssetManifest::default().models {
            assert!(spec.min_scale > 0.0, "{}", spec.name);
            assert!(spec.min_scale <= spec.max_scale, "{}", spec.name);
        }
    }

    #[test]
    fn test_plain_donut_hides_helper_plane() {
        let manifest = AssetManifest::default();
        let donut = manifest
            .models
            .iter()
            .find(|m| m.name == "pink_donut")
            .unwrap();
        assert!(donut.hidden_parts.contains(&"Plane"));
    }
}
