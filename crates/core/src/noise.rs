//! Seedable 2-D gradient noise.
//!
//! Classic Perlin construction: a 512-entry permutation table derived from a
//! fixed base permutation and a seed, twelve canonical gradient directions,
//! and quintic fade interpolation. The field is zero at every integer lattice
//! point and continuous with a continuous first derivative across cells.
//!
//! Each engine owns its own [`NoiseField`]; there is no shared instance.

/// The twelve edge-midpoint directions of a cube. Only `x` and `y` take part
/// in 2-D dot products.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Ken Perlin's reference permutation of 0..=255.
const BASE_PERMUTATION: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

/// Deterministic 2-D gradient noise generator.
#[derive(Debug, Clone)]
pub struct NoiseField {
    perm: [u16; 512],
    grad: [u8; 512],
}

impl NoiseField {
    /// Creates a noise field seeded with `seed`.
    pub fn new(seed: f64) -> Self {
        let mut field = Self {
            perm: [0; 512],
            grad: [0; 512],
        };
        field.seed(seed);
        field
    }

    /// Rebuilds the permutation and gradient tables from `value`.
    ///
    /// Fractional seeds in (0, 1) are scaled by 65536 first; the result is
    /// floored to an integer. Seeds below 256 are mirrored into the high byte.
    /// Non-finite seeds behave like 0.
    pub fn seed(&mut self, value: f64) {
        let mut scaled = if value.is_finite() { value } else { 0.0 };
        if scaled > 0.0 && scaled < 1.0 {
            scaled *= 65536.0;
        }
        // Saturating cast; only the low 16 bits matter below.
        let mut seed = scaled.floor() as i64;
        if seed < 256 {
            seed |= seed << 8;
        }

        for i in 0..256 {
            let mix = if i & 1 == 1 {
                seed & 255
            } else {
                (seed >> 8) & 255
            };
            let v = (BASE_PERMUTATION[i] as i64 ^ mix) as u16;
            self.perm[i] = v;
            self.perm[i + 256] = v;
            let g = (v % 12) as u8;
            self.grad[i] = g;
            self.grad[i + 256] = g;
        }
    }

    /// Samples the noise field at `(x, y)`. Pure; output lies roughly in [-1, 1].
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let cell_x = x.floor();
        let cell_y = y.floor();
        let fx = x - cell_x;
        let fy = y - cell_y;
        let xi = (cell_x as i64 & 255) as usize;
        let yi = (cell_y as i64 & 255) as usize;

        let row0 = self.perm[yi] as usize;
        let row1 = self.perm[yi + 1] as usize;
        let n00 = self.dot(xi + row0, fx, fy);
        let n01 = self.dot(xi + row1, fx, fy - 1.0);
        let n10 = self.dot(xi + 1 + row0, fx - 1.0, fy);
        let n11 = self.dot(xi + 1 + row1, fx - 1.0, fy - 1.0);

        let u = fade(fx);
        lerp(lerp(n00, n10, u), lerp(n01, n11, u), fade(fy))
    }

    fn dot(&self, index: usize, dx: f64, dy: f64) -> f64 {
        let g = GRAD3[self.grad[index] as usize];
        g[0] * dx + g[1] * dy
    }
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`: zero first and second
/// derivative at both ends.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
