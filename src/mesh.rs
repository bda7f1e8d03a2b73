use crate::game::Cell;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

const fn v(x: f32, y: f32, z: f32) -> Vertex {
    Vertex { position: [x, y, z] }
}

/// Two triangles per face, six faces.
pub const CUBE_VERTICES: [Vertex; 36] = [
    // +z
    v(-0.5, -0.5, 0.5), v(0.5, -0.5, 0.5), v(0.5, 0.5, 0.5),
    v(-0.5, -0.5, 0.5), v(0.5, 0.5, 0.5), v(-0.5, 0.5, 0.5),
    // -z
    v(-0.5, -0.5, -0.5), v(-0.5, 0.5, -0.5), v(0.5, 0.5, -0.5),
    v(-0.5, -0.5, -0.5), v(0.5, 0.5, -0.5), v(0.5, -0.5, -0.5),
    // +y
    v(-0.5, 0.5, -0.5), v(-0.5, 0.5, 0.5), v(0.5, 0.5, 0.5),
    v(-0.5, 0.5, -0.5), v(0.5, 0.5, 0.5), v(0.5, 0.5, -0.5),
    // -y
    v(-0.5, -0.5, -0.5), v(0.5, -0.5, -0.5), v(0.5, -0.5, 0.5),
    v(-0.5, -0.5, -0.5), v(0.5, -0.5, 0.5), v(-0.5, -0.5, 0.5),
    // +x
    v(0.5, -0.5, -0.5), v(0.5, 0.5, -0.5), v(0.5, 0.5, 0.5),
    v(0.5, -0.5, -0.5), v(0.5, 0.5, 0.5), v(0.5, -0.5, 0.5),
    // -x
    v(-0.5, -0.5, -0.5), v(-0.5, -0.5, 0.5), v(-0.5, 0.5, 0.5),
    v(-0.5, -0.5, -0.5), v(-0.5, 0.5, 0.5), v(-0.5, 0.5, -0.5),
];

/// Maps grid cells onto the board plane (z = 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub grid_size: u32,
    pub cell_size: f32,
}

impl BoardLayout {
    pub fn new(grid_size: u32, cell_size: f32) -> Self {
        Self { grid_size, cell_size }
    }

    pub fn half_extent(&self) -> f32 {
        self.grid_size as f32 * self.cell_size / 2.0
    }

    /// World-space centre of a cell. Columns are counted from the board's
    /// low edge, so cell `-limit` sits in the first column.
    pub fn cell_to_world(&self, cell: Cell) -> [f32; 2] {
        let limit = (self.grid_size / 2) as i32;
        let offset = -self.half_extent() + self.cell_size / 2.0;
        [
            offset + (cell.x + limit) as f32 * self.cell_size,
            offset + (cell.y + limit) as f32 * self.cell_size,
        ]
    }

    pub fn board_vertices(&self) -> Vec<Vertex> {
        let h = self.half_extent();
        vec![
            v(-h, -h, 0.0),
            v(h, -h, 0.0),
            v(h, h, 0.0),
            v(-h, -h, 0.0),
            v(h, h, 0.0),
            v(-h, h, 0.0),
        ]
    }

    /// Line-list pairs: one horizontal and one vertical line per grid index.
    pub fn grid_vertices(&self) -> Vec<Vertex> {
        let h = self.half_extent();
        let limit = (self.grid_size / 2) as i32;
        let mut out = Vec::with_capacity(4 * (self.grid_size as usize + 1));
        for i in -limit..=limit {
            let p = i as f32 * self.cell_size;
            out.push(v(-h, p, 0.0));
            out.push(v(h, p, 0.0));
            out.push(v(p, -h, 0.0));
            out.push(v(p, h, 0.0));
        }
        out
    }
}
