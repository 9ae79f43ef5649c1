//! Polygon panels: arbitrary outlines for dishes without a ring structure.

/// Closed polygon given by its vertices in order (first vertex not repeated).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<[f64; 2]>,
}

impl Polygon {
    pub fn new(vertices: Vec<[f64; 2]>) -> Self {
        Self { vertices }
    }

    /// Even-odd containment test; points lying on an edge count as inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let [xi, yi] = self.vertices[i];
            let [xj, yj] = self.vertices[j];
            if on_segment(x, y, xi, yi, xj, yj) {
                return true;
            }
            if (yi > y) != (yj > y) {
                let x_cross = xi + (y - yi) * (xj - xi) / (yj - yi);
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Signed area (positive for counterclockwise vertices).
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|([x0, y0], [x1, y1])| x0 * y1 - x1 * y0).sum::<f64>() * 0.5
    }

    /// Area centroid; falls back to the vertex mean for degenerate outlines.
    pub fn centroid(&self) -> [f64; 2] {
        let area = self.signed_area();
        if area.abs() < 1e-15 {
            let n = self.vertices.len().max(1) as f64;
            let sx: f64 = self.vertices.iter().map(|v| v[0]).sum();
            let sy: f64 = self.vertices.iter().map(|v| v[1]).sum();
            return [sx / n, sy / n];
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for ([x0, y0], [x1, y1]) in self.edges() {
            let cross = x0 * y1 - x1 * y0;
            cx += (x0 + x1) * cross;
            cy += (y0 + y1) * cross;
        }
        [cx / (6.0 * area), cy / (6.0 * area)]
    }

    fn edges(&self) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

fn on_segment(x: f64, y: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> bool {
    let cross = (x1 - x0) * (y - y0) - (y1 - y0) * (x - x0);
    let scale = (x1 - x0).abs().max((y1 - y0).abs()).max(1.0);
    if cross.abs() > 1e-12 * scale {
        return false;
    }
    x >= x0.min(x1) && x <= x0.max(x1) && y >= y0.min(y1) && y <= y0.max(y1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]])
    }

    #[test]
    fn test_contains() {
        let sq = square();
        assert!(sq.contains(1.0, 1.0));
        assert!(!sq.contains(3.0, 1.0));
        assert!(!sq.contains(-0.1, 1.0));
        // Edges and vertices are inside.
        assert!(sq.contains(2.0, 1.0));
        assert!(sq.contains(0.0, 0.0));
        assert!(sq.contains(1.0, 2.0));
    }

    #[test]
    fn test_concave() {
        // L shape
        let l = Polygon::new(vec![
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [0.0, 2.0],
        ]);
        assert!(l.contains(0.5, 1.5));
        assert!(!l.contains(1.5, 1.5));
    }

    #[test]
    fn test_area_and_centroid() {
        let sq = square();
        assert!((sq.signed_area() - 4.0).abs() < 1e-15);
        let c = sq.centroid();
        assert!((c[0] - 1.0).abs() < 1e-15 && (c[1] - 1.0).abs() < 1e-15);
    }
}
