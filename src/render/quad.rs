/// Two triangles covering clip space, three floats per vertex.
pub(crate) const QUAD_VERTICES: &[f32] = &[
    // bottom left triangle
    -1.0, -1.0, 0.0, // bottom left
    -1.0, 1.0, 0.0, // top left
    1.0, -1.0, 0.0, // bottom right
    // top right triangle
    1.0, -1.0, 0.0, // bottom right
    -1.0, 1.0, 0.0, // top left
    1.0, 1.0, 0.0, // top right
];

pub(crate) const QUAD_VERTEX_COUNT: u32 = (QUAD_VERTICES.len() / 3) as u32;

pub(crate) const QUAD_STRIDE: u64 = (3 * std::mem::size_of::<f32>()) as u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space() {
        assert_eq!(QUAD_VERTEX_COUNT, 6);
        for vertex in QUAD_VERTICES.chunks(3) {
            assert_eq!(vertex[0].abs(), 1.0);
            assert_eq!(vertex[1].abs(), 1.0);
            assert_eq!(vertex[2], 0.0);
        }
    }
}
