//! Scene assembly from loaded assets
//!
//! Folds finished asset loads into the scene: the extruded title text becomes
//! the bounce group, each dessert model is cloned fifteen times and scattered
//! around the origin. Assets arrive in arbitrary order, so each entry point
//! stands alone.

use cgmath::Rad;
use rand::Rng;

use crate::assets::LoadedModel;
use crate::gfx::scene::{Object, Scene, Shading};
use crate::responsive;
use crate::scatter::scatter_transforms;
use crate::text::{extrude_text, TextStyle};

/// The title rendered as extruded 3D text.
pub const TEXT_STRING: &str = "Patisserie";

/// Builds the text mesh and installs it as the scene's bounce group.
pub fn install_text(scene: &mut Scene, font_bytes: &[u8], width: f32) -> anyhow::Result<()> {
    let style = TextStyle::for_scale(responsive::text_scale(width));
    let mesh = extrude_text(TEXT_STRING, font_bytes, &style)?;

    let mut object = Object::new(vec![mesh]);
    object.set_name("bounce_text");
    object.shading = Shading::Matcap;

    scene.install_text_group(object);
    Ok(())
}

/// Scatters a loaded model into the scene as fifteen independent clones.
///
/// Registers the model's materials (existing names win), samples one transform
/// per clone, and adds every part of every clone as a direct scene child. The
/// parts of one clone share a transform so the model holds together.
pub fn scatter_model<R: Rng>(scene: &mut Scene, model: LoadedModel, width: f32, rng: &mut R) {
    for material in model.materials {
        scene.add_material(material);
    }

    if model.parts.is_empty() {
        log::warn!("model {} has no visible parts, skipping", model.spec.name);
        return;
    }

    let transforms = scatter_transforms(rng, width, model.spec.min_scale, model.spec.max_scale);

    for (i, transform) in transforms.iter().enumerate() {
        for part in &model.parts {
            let mut object = Object::new(vec![part.mesh.clone()]);
            object.set_name(format!("{}_{}/{}", model.spec.name, i, part.name));
            if let Some(material_id) = &part.material_id {
                object.set_material(material_id);
            }
            object.set_transform_trs(
                transform.position,
                Rad(transform.rotation_x),
                Rad(transform.rotation_y),
                transform.scale,
            );
            scene.add_object(object);
        }
    }

    log::info!(
        "scattered {} as {} clones ({} parts each)",
        model.spec.name,
        transforms.len(),
        model.parts.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ModelPart, ModelSpec};
    use crate::gfx::camera::{
        camera_controller::CameraController, camera_utils::CameraManager,
        orbit_camera::OrbitCamera,
    };
    use crate::gfx::resources::material::Material;
    use crate::gfx::scene::Mesh;
    use crate::scatter::INSTANCES_PER_MODEL;
    use cgmath::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_scene() -> Scene {
        let camera = OrbitCamera::new(3.5, 0.3, 0.0, Vector3::new(0.0, 0.0, 0.0), 1.5);
        let controller = CameraController::new(0.005, 0.1);
        Scene::new(CameraManager::new(camera, controller))
    }

    fn triangle() -> Mesh {
        Mesh::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0, 1, 2],
        )
    }

    fn donut_model(parts: usize) -> LoadedModel {
        LoadedModel {
            spec: ModelSpec {
                name: "pink_donut",
                path: "assets/models/pink_donut/scene.obj",
                min_scale: 1.0,
                max_scale: 8.0,
                hidden_parts: &[],
            },
            parts: (0..parts)
                .map(|i| ModelPart {
                    name: format!("part_{}", i),
                    mesh: triangle(),
                    material_id: Some("pink_donut/glaze".to_string()),
                })
                .collect(),
            materials: vec![Material::new("pink_donut/glaze", [1.0, 0.7, 0.8, 1.0], 0.3)],
        }
    }

    #[test]
    fn test_scatter_adds_fifteen_clones_per_part() {
        let mut scene = test_scene();
        let mut rng = StdRng::seed_from_u64(7);
        scatter_model(&mut scene, donut_model(2), 1920.0, &mut rng);
        assert_eq!(scene.object_count(), INSTANCES_PER_MODEL * 2);
    }

    #[test]
    fn test_scatter_registers_materials() {
        let mut scene = test_scene();
        let mut rng = StdRng::seed_from_u64(7);
        scatter_model(&mut scene, donut_model(1), 1920.0, &mut rng);
        assert!(scene
            .material_manager
            .get_material("pink_donut/glaze")
            .is_some());
        assert_eq!(
            scene.get_material_for_object(&scene.objects[0]).name,
            "pink_donut/glaze"
        );
    }

    #[test]
    fn test_scatter_empty_model_is_a_noop() {
        let mut scene = test_scene();
        let mut rng = StdRng::seed_from_u64(7);
        scatter_model(&mut scene, donut_model(0), 1920.0, &mut rng);
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_parts_of_one_clone_share_a_transform() {
        let mut scene = test_scene();
        let mut rng = StdRng::seed_from_u64(7);
        scatter_model(&mut scene, donut_model(3), 1920.0, &mut rng);
        // first three objects are the three parts of clone 0
        let first = scene.objects[0].transform;
        assert_eq!(scene.objects[1].transform, first);
        assert_eq!(scene.objects[2].transform, first);
        // clone 1 sits elsewhere
        assert_ne!(scene.objects[3].transform, first);
    }

    #[test]
    fn test_install_text_rejects_invalid_font() {
        let mut scene = test_scene();
        let result = install_text(&mut scene, &[0u8; 16], 1920.0);
        assert!(result.is_err());
        assert!(scene.text_group.is_none());
    }
}
