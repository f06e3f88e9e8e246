//! CPU-side mesh representation for the displayed object.

/// Vertex with position/normal/tangent/uv. Values are in object space.
/// `tangent.w` is the bitangent sign.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub uv: [f32; 2],
}

/// Indexed triangle mesh with tightly-packed vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Returns `true` if both vertex and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    /// Box centered on the origin, every face mapped to the full `[0, 1]` UV
    /// square so each face shows the whole texture set.
    pub fn cuboid(half_extents: [f32; 3]) -> Self {
        // (normal, tangent, bitangent) per face; bitangent = v direction.
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let [hx, hy, hz] = half_extents;
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (n, t, b) in FACES {
            let base = vertices.len() as u32;
            for (s, v) in CORNERS {
                let p = [
                    (n[0] + t[0] * s + b[0] * v) * hx,
                    (n[1] + t[1] * s + b[1] * v) * hy,
                    (n[2] + t[2] * s + b[2] * v) * hz,
                ];
                vertices.push(MeshVertex {
                    position: p,
                    normal: n,
                    tangent: [t[0], t[1], t[2], 1.0],
                    // Image rows run top-down, so v flips.
                    uv: [(s + 1.0) * 0.5, (1.0 - v) * 0.5],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vertices, indices)
    }

    /// Radius of the smallest origin-centered sphere holding every vertex.
    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| {
                let [x, y, z] = v.position;
                (x * x + y * y + z * z).sqrt()
            })
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn cuboid_has_six_quads() {
        let mesh = MeshData::cuboid([1.0, 0.5, 0.1]);
        assert!(mesh.is_valid());
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn cuboid_triangles_wind_outward() {
        let mesh = MeshData::cuboid([1.0, 1.0, 1.0]);
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| mesh.vertices[tri[i] as usize]);
            let face = cross(sub(b.position, a.position), sub(c.position, a.position));
            let n = a.normal;
            let d = face[0] * n[0] + face[1] * n[1] + face[2] * n[2];
            assert!(d > 0.0, "triangle {tri:?} winds inward");
        }
    }

    #[test]
    fn bounding_radius_of_unit_cube() {
        let r = MeshData::cuboid([1.0, 1.0, 1.0]).bounding_radius();
        assert!((r - 3f32.sqrt()).abs() < 1e-5);
    }
}
