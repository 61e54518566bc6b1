use bpmn_core::ModelerResult;

use crate::{Bounds, Diagram, Point};

/// Straight connection between the centers of two shapes.
pub fn straight(source: &Bounds, target: &Bounds) -> Vec<Point> {
    vec![source.center(), target.center()]
}

/// Waypoints for a connection from `source` to `target`.
pub fn connection_waypoints(diagram: &Diagram, source: &str, target: &str) -> ModelerResult<Vec<Point>> {
    Ok(straight(
        &diagram.element(source)?.bounds,
        &diagram.element(target)?.bounds,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_connects_centers() {
        let waypoints = straight(
            &Bounds::new(0.0, 0.0, 100.0, 80.0),
            &Bounds::new(200.0, 22.0, 36.0, 36.0),
        );
        assert_eq!(waypoints, vec![Point::new(50.0, 40.0), Point::new(218.0, 40.0)]);
    }
}
