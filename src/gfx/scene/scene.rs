use cgmath::{Rad, Vector3};
use wgpu::Device;

use crate::gfx::{
    camera::camera_utils::CameraManager,
    resources::material::{Material, MaterialManager},
};

use super::object::Object;

/// Angular frequency of the text bounce (radians per second of elapsed time).
pub const BOUNCE_SPEED: f32 = 1.2;

/// Peak vertical displacement of the text bounce.
pub const BOUNCE_AMPLITUDE: f32 = 0.25;

/// The container animated by the frame driver and rescaled by the resize
/// handler.
///
/// The vertical position is set absolutely from a stored baseline every frame,
/// so the bounce stays centered for the process lifetime, and scale is set
/// absolutely on resize, so repeated resizes to the same width are idempotent.
#[derive(Debug, Clone, Copy)]
pub struct BounceTextGroup {
    /// Index of the text object in [`Scene::objects`].
    pub object_index: usize,
    /// Resting vertical position the bounce oscillates around.
    pub baseline_y: f32,
    /// Current uniform scale of the group.
    pub scale: f32,
}

/// Main scene containing objects, materials, camera and the bounce text group.
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager,
    pub text_group: Option<BounceTextGroup>,
    /// Last text scale requested. Retained so a resize that happens while the
    /// font is still loading applies once the group is installed.
    text_scale: f32,
}

impl Scene {
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            material_manager: MaterialManager::new(),
            text_group: None,
            text_scale: 1.0,
        }
    }

    /// Adds an object as a direct child of the scene root.
    pub fn add_object(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Installs the text object as the bounce text group. Runs once, at font
    /// load completion; there is no re-entry path. The group picks up the most
    /// recent text scale, so resizes that raced the font load are not lost.
    pub fn install_text_group(&mut self, object: Object) -> usize {
        let object_index = self.add_object(object);
        self.text_group = Some(BounceTextGroup {
            object_index,
            baseline_y: 0.0,
            scale: self.text_scale,
        });
        object_index
    }

    /// Advances per-frame state: camera damping, camera matrices and the text
    /// bounce.
    pub fn update(&mut self, elapsed: f32) {
        self.camera_manager.update();
        self.animate_text(elapsed);
    }

    /// Sets the text group's vertical position for the given elapsed time.
    ///
    /// Absolute, not cumulative: `y = baseline + sin(t * speed) * amplitude`,
    /// which keeps the bounce bounded and frame-rate independent.
    pub fn animate_text(&mut self, elapsed: f32) {
        let Some(group) = self.text_group else {
            return;
        };
        let y = group.baseline_y + (elapsed * BOUNCE_SPEED).sin() * BOUNCE_AMPLITUDE;
        if let Some(object) = self.objects.get_mut(group.object_index) {
            object.set_transform_trs(
                Vector3::new(0.0, y, 0.0),
                Rad(0.0),
                Rad(0.0),
                group.scale,
            );
        }
    }

    /// Sets the text group's uniform scale absolutely. Takes effect on the
    /// installed group immediately, or at install time if the font is still
    /// loading.
    pub fn set_text_scale(&mut self, scale: f32) {
        self.text_scale = scale;
        if let Some(group) = self.text_group.as_mut() {
            group.scale = scale;
        }
    }

    /// Registers a material, keeping an existing one with the same name.
    pub fn add_material(&mut self, material: Material) {
        if self.material_manager.get_material(&material.name).is_none() {
            self.material_manager.add_material(material);
        }
    }

    /// Material used to render an object, falling back to the default.
    pub fn get_material_for_object(&self, object: &Object) -> &Material {
        self.material_manager
            .get_material_for_object(object.material_id.as_ref())
    }

    /// Uploads GPU resources for objects and materials that do not have them
    /// yet. Called every frame because assets finish loading at arbitrary
    /// times after startup.
    pub fn ensure_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        for object in self.objects.iter_mut() {
            if object.gpu_resources.is_none() {
                object.init_gpu_resources(device);
            }
        }
        self.material_manager.update_all_gpu_resources(device, queue);
    }

    /// Syncs all object transforms to the GPU.
    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        for object in &self.objects {
            object.update_transform(queue);
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{camera_controller::CameraController, orbit_camera::OrbitCamera};
    use crate::gfx::scene::object::{Mesh, Shading};
    use cgmath::Matrix4;

    fn test_scene() -> Scene {
        let camera = OrbitCamera::new(3.5, 0.3, 0.0, Vector3::new(0.0, 0.0, 0.0), 1.5);
        let controller = CameraController::new(0.005, 0.1);
        Scene::new(CameraManager::new(camera, controller))
    }

    fn text_object() -> Object {
        let mesh = Mesh::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0, 1, 2],
        );
        let mut object = Object::new(vec![mesh]);
        object.shading = Shading::Matcap;
        object.set_name("bounce_text");
        object
    }

    fn translation_y(m: &Matrix4<f32>) -> f32 {
        m.w.y
    }

    #[test]
    fn test_install_text_group_tracks_object() {
        let mut scene = test_scene();
        let index = scene.install_text_group(text_object());
        let group = scene.text_group.expect("group installed");
        assert_eq!(group.object_index, index);
        assert_eq!(group.scale, 1.0);
    }

    #[test]
    fn test_bounce_is_absolute_not_cumulative() {
        let mut scene = test_scene();
        scene.install_text_group(text_object());

        scene.animate_text(1.0);
        let first = translation_y(&scene.objects[0].transform);
        // animating repeatedly at the same timestamp must not drift
        for _ in 0..100 {
            scene.animate_text(1.0);
        }
        let after = translation_y(&scene.objects[0].transform);
        assert_eq!(first, after);
        assert!((first - (1.0 * BOUNCE_SPEED).sin() * BOUNCE_AMPLITUDE).abs() < 1e-6);
    }

    #[test]
    fn test_bounce_stays_within_amplitude() {
        let mut scene = test_scene();
        scene.install_text_group(text_object());
        for i in 0..1000 {
            scene.animate_text(i as f32 * 0.016);
            let y = translation_y(&scene.objects[0].transform);
            assert!(y.abs() <= BOUNCE_AMPLITUDE + 1e-6);
        }
    }

    #[test]
    fn test_resize_before_font_load_is_not_lost() {
        let mut scene = test_scene();
        // window resized to tablet width while the font is still loading
        scene.set_text_scale(0.45);
        scene.install_text_group(text_object());
        let group = scene.text_group.expect("group installed");
        assert_eq!(group.scale, 0.45);

        // and the scale flows into the rendered transform
        scene.animate_text(0.0);
        let m = scene.objects[0].transform;
        assert!((m.x.x - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_resize_does_not_accumulate_scale() {
        let mut scene = test_scene();
        scene.install_text_group(text_object());

        scene.set_text_scale(0.45);
        scene.animate_text(0.0);
        let once = scene.objects[0].transform;

        for _ in 0..10 {
            scene.set_text_scale(0.45);
        }
        scene.animate_text(0.0);
        let many = scene.objects[0].transform;

        assert_eq!(once, many);
    }

    #[test]
    fn test_scattered_objects_are_scene_children() {
        let mut scene = test_scene();
        for _ in 0..15 {
            scene.add_object(text_object());
        }
        assert_eq!(scene.object_count(), 15);
    }
}
