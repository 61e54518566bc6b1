use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn translate(&self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Same size, with the center moved to `center`.
    pub fn centered_at(&self, center: Point) -> Self {
        Self::new(
            center.x - self.width / 2.0,
            center.y - self.height / 2.0,
            self.width,
            self.height,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_at() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 80.0).centered_at(Point::new(150.0, 140.0));
        assert_eq!(bounds, Bounds::new(100.0, 100.0, 100.0, 80.0));
        assert_eq!(bounds.center(), Point::new(150.0, 140.0));
    }
}
