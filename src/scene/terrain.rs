use nalgebra::Vector3;

/// Square grass field with gentle sine hills, centred on the origin.
#[derive(Clone, Debug)]
pub struct Terrain {
    pub size: f32,
    pub segments: u16,
}

impl Default for Terrain {
    fn default() -> Self {
        Terrain { size: 50.0, segments: 50 }
    }
}

impl Terrain {
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        (x / 5.0).sin() * (z / 5.0).cos() * 0.5
    }

    /// Upward unit normal of the height field at `(x, z)`.
    pub fn normal_at(&self, x: f32, z: f32) -> Vector3<f32> {
        let dx = (x / 5.0).cos() * (z / 5.0).cos() * 0.1;
        let dz = -(x / 5.0).sin() * (z / 5.0).sin() * 0.1;
        Vector3::new(-dx, 1.0, -dz).normalize()
    }

    pub fn half_extent(&self) -> f32 {
        self.size / 2.0
    }

    /// Grid vertices as `(x, height, z)`, row-major along z then x.
    pub fn grid(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        let n = self.segments as usize;
        let step = self.size / self.segments as f32;
        let start = -self.half_extent();
        (0..=n).flat_map(move |row| {
            (0..=n).map(move |col| {
                let x = start + col as f32 * step;
                let z = start + row as f32 * step;
                [x, self.height_at(x, z), z]
            })
        })
    }
}
