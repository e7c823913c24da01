//! Extruded 3D text meshes
//!
//! Glyph outlines are pulled from a TTF with `ttf_parser`, assembled into a
//! single `lyon` path, tessellated into a front face, mirrored into a back
//! face and closed with beveled side strips. The result is a regular [`Mesh`]
//! that renders through the matcap pipeline like any other object.

use anyhow::anyhow;
use lyon_path::math;
use lyon_path::Path;
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    VertexBuffers,
};
use ttf_parser::{Face, OutlineBuilder};

use crate::gfx::scene::{Mesh, Vertex3D};

/// Geometry parameters for the extrusion, all in world units.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    /// Glyph height (cap height scale factor against the font's em square).
    pub size: f32,
    /// Extrusion depth along Z.
    pub depth: f32,
    /// Outward offset of the bevel.
    pub bevel_size: f32,
    /// Number of rings in each bevel.
    pub bevel_segments: u32,
    /// Tessellation tolerance for the face fill.
    pub tolerance: f32,
}

impl TextStyle {
    /// Style for a given responsive text scale. Depth is a third of the glyph
    /// size so the proportions hold across breakpoints.
    pub fn for_scale(scale: f32) -> Self {
        Self {
            size: scale,
            depth: scale * 0.33,
            bevel_size: 0.01,
            bevel_segments: 5,
            tolerance: 0.01,
        }
    }
}

struct PathSink<'a> {
    builder: &'a mut lyon_path::path::Builder,
    scale: f32,
    offset_x: f32,
}

impl OutlineBuilder for PathSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder
            .begin(math::point(self.offset_x + x * self.scale, y * self.scale));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder
            .line_to(math::point(self.offset_x + x * self.scale, y * self.scale));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quadratic_bezier_to(
            math::point(self.offset_x + x1 * self.scale, y1 * self.scale),
            math::point(self.offset_x + x * self.scale, y * self.scale),
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_bezier_to(
            math::point(self.offset_x + x1 * self.scale, y1 * self.scale),
            math::point(self.offset_x + x2 * self.scale, y2 * self.scale),
            math::point(self.offset_x + x * self.scale, y * self.scale),
        );
    }

    fn close(&mut self) {
        self.builder.end(true);
    }
}

#[derive(Clone, Copy)]
struct FrontVertexCtor;

impl FillVertexConstructor<Vertex3D> for FrontVertexCtor {
    fn new_vertex(&mut self, v: FillVertex) -> Vertex3D {
        let p = v.position();
        Vertex3D {
            position: [p.x, p.y, 0.0],
            normal: [0.0, 0.0, 1.0],
        }
    }
}

/// Builds an extruded, beveled mesh for `text`, centered on the origin.
pub fn extrude_text(text: &str, font_bytes: &[u8], style: &TextStyle) -> anyhow::Result<Mesh> {
    let face = Face::parse(font_bytes, 0).map_err(|_| anyhow!("invalid font data"))?;
    let units = face.units_per_em() as f32;
    let scale = (style.size / units).max(1e-9);

    // One combined path for all glyphs, advanced along X
    let mut path_builder = Path::builder();
    let mut x_cursor = 0.0f32;

    for ch in text.chars() {
        let Some(gid) = face.glyph_index(ch) else {
            continue;
        };
        let mut sink = PathSink {
            builder: &mut path_builder,
            scale,
            offset_x: x_cursor,
        };
        let _ = face.outline_glyph(gid, &mut sink);
        x_cursor += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
    }

    let path = path_builder.build();

    // Front face
    let mut buffers: VertexBuffers<Vertex3D, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    tessellator
        .tessellate_path(
            path.as_slice(),
            &FillOptions::tolerance(style.tolerance),
            &mut BuffersBuilder::new(&mut buffers, FrontVertexCtor),
        )
        .map_err(|e| anyhow!("glyph tessellation failed: {:?}", e))?;

    if buffers.indices.is_empty() {
        return Err(anyhow!("text '{}' produced no glyph outlines", text));
    }

    let mut vertices = buffers.vertices.clone();
    let mut indices = buffers.indices.clone();

    // Back face at z = -depth, reversed winding
    let back_offset = vertices.len() as u32;
    for v in &buffers.vertices {
        vertices.push(Vertex3D {
            position: [v.position[0], v.position[1], -style.depth],
            normal: [0.0, 0.0, -1.0],
        });
    }
    let mut back_tris: Vec<u32> = Vec::with_capacity(indices.len());
    for tri in indices.chunks_exact(3) {
        back_tris.push(back_offset + tri[0]);
        back_tris.push(back_offset + tri[2]);
        back_tris.push(back_offset + tri[1]);
    }
    indices.extend(back_tris);

    // Side walls with beveled rims, walking the flattened outline edges
    let flatten_tolerance = style.tolerance.max(0.005);
    for event in path.iter() {
        match event {
            lyon_path::Event::Begin { .. } => {}
            lyon_path::Event::Line { from, to } => {
                add_side_strips(&mut vertices, &mut indices, from, to, style);
            }
            lyon_path::Event::Quadratic { from, ctrl, to } => {
                let seg = lyon_geom::QuadraticBezierSegment { from, ctrl, to };
                seg.for_each_flattened(flatten_tolerance, &mut |ls: &lyon_geom::LineSegment<f32>| {
                    add_side_strips(&mut vertices, &mut indices, ls.from, ls.to, style);
                });
            }
            lyon_path::Event::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                let seg = lyon_geom::CubicBezierSegment {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                };
                seg.for_each_flattened(flatten_tolerance, &mut |ls: &lyon_geom::LineSegment<f32>| {
                    add_side_strips(&mut vertices, &mut indices, ls.from, ls.to, style);
                });
            }
            lyon_path::Event::End { last, first, close } => {
                if close {
                    add_side_strips(&mut vertices, &mut indices, last, first, style);
                }
            }
        }
    }

    recenter(&mut vertices);

    let index_count = indices.len() as u32;
    Ok(Mesh::from_vertices(vertices, indices, index_count))
}

/// Extrudes one outline edge into quad strips from the front face to the back
/// face, with bevel rings flaring outward at both rims.
fn add_side_strips(
    vertices: &mut Vec<Vertex3D>,
    indices: &mut Vec<u32>,
    from: math::Point,
    to: math::Point,
    style: &TextStyle,
) {
    let edge = [to.x - from.x, to.y - from.y];
    let len = (edge[0] * edge[0] + edge[1] * edge[1]).sqrt();
    if len < 1e-6 {
        return;
    }
    // outward normal of the edge in the glyph plane
    let n = [edge[1] / len, -edge[0] / len];

    let bevel = style.bevel_size.max(0.0);
    let segments = style.bevel_segments.max(1) as usize;

    // Rings run front rim, straight middle, back rim. Each ring is a depth
    // plus an outward offset.
    let mut rings: Vec<(f32, f32)> = Vec::new();
    for k in 0..=segments {
        let t = k as f32 / segments as f32;
        rings.push((-bevel * t, bevel * t));
    }
    if style.depth > 2.0 * bevel {
        rings.push((-(style.depth - bevel), bevel));
    }
    for k in (0..=segments).rev() {
        let t = k as f32 / segments as f32;
        rings.push((-(style.depth - bevel * t), bevel * t));
    }

    for pair in rings.windows(2) {
        let (z0, off0) = pair[0];
        let (z1, off1) = pair[1];
        let start = vertices.len() as u32;
        let normal = [n[0], n[1], 0.0];

        vertices.push(Vertex3D {
            position: [from.x + n[0] * off0, from.y + n[1] * off0, z0],
            normal,
        });
        vertices.push(Vertex3D {
            position: [to.x + n[0] * off0, to.y + n[1] * off0, z0],
            normal,
        });
        vertices.push(Vertex3D {
            position: [to.x + n[0] * off1, to.y + n[1] * off1, z1],
            normal,
        });
        vertices.push(Vertex3D {
            position: [from.x + n[0] * off1, from.y + n[1] * off1, z1],
            normal,
        });
        indices.extend_from_slice(&[start, start + 1, start + 2, start, start + 2, start + 3]);
    }
}

/// Translates the mesh so its bounding box is centered on the origin.
fn recenter(vertices: &mut [Vertex3D]) {
    if vertices.is_empty() {
        return;
    }

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for v in vertices.iter() {
        for axis in 0..3 {
            min[axis] = min[axis].min(v.position[axis]);
            max[axis] = max[axis].max(v.position[axis]);
        }
    }

    let center = [
        (min[0] + max[0]) * 0.5,
        (min[1] + max[1]) * 0.5,
        (min[2] + max[2]) * 0.5,
    ];

    for v in vertices.iter_mut() {
        for axis in 0..3 {
            v.position[axis] -= center[axis];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_proportions_follow_scale() {
        let desktop = TextStyle::for_scale(0.6);
        let mobile = TextStyle::for_scale(0.32);
        assert!((desktop.depth / desktop.size - 0.33).abs() < 1e-6);
        assert!((mobile.depth / mobile.size - 0.33).abs() < 1e-6);
        assert!(desktop.size > mobile.size);
    }

    #[test]
    fn test_recenter_moves_bbox_to_origin() {
        let mut vertices = vec![
            Vertex3D {
                position: [1.0, 2.0, 3.0],
                normal: [0.0, 0.0, 1.0],
            },
            Vertex3D {
                position: [3.0, 6.0, 5.0],
                normal: [0.0, 0.0, 1.0],
            },
        ];
        recenter(&mut vertices);
        assert_eq!(vertices[0].position, [-1.0, -2.0, -1.0]);
        assert_eq!(vertices[1].position, [1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_recenter_handles_empty_input() {
        let mut vertices: Vec<Vertex3D> = Vec::new();
        recenter(&mut vertices);
        assert!(vertices.is_empty());
    }

    #[test]
    fn test_side_strip_count_matches_bevel_segments() {
        let style = TextStyle {
            size: 1.0,
            depth: 0.33,
            bevel_size: 0.01,
            bevel_segments: 5,
            tolerance: 0.01,
        };
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        add_side_strips(
            &mut vertices,
            &mut indices,
            math::point(0.0, 0.0),
            math::point(1.0, 0.0),
            &style,
        );
        // front bevel rings + middle ring + back bevel rings
        let rings = (style.bevel_segments as usize + 1) * 2 + 1;
        assert_eq!(vertices.len(), (rings - 1) * 4);
        assert_eq!(indices.len(), (rings - 1) * 6);
    }
}
