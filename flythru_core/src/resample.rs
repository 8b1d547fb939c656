//! Segment grouping and arc-length resampling of the position track.
//!
//! Position waypoints are split into maximal runs sharing an interpolation
//! order. Each run is parametrized by cumulative Euclidean arc length,
//! fitted with a spline of its order, and resampled into evenly
//! time-spaced steps. Arc length is measured in unscaled units; space and
//! time scales are applied to the emitted steps only.

use crate::error::PathError;
use crate::spline::InterpolatingSpline;
use crate::waypoint::{InterpolationOrder, PositionWaypoint, Step};
use nalgebra::Vector3;
use tracing::debug;

/// A maximal run of consecutive position waypoints sharing one order.
///
/// Consecutive groups share their boundary waypoint: the waypoint where the
/// order changes closes one group and opens the next.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentGroup {
    pub order: InterpolationOrder,

    /// `(duration, value)` pairs in authoring order
    pub waypoints: Vec<(f64, Vector3<f64>)>,
}

impl SegmentGroup {
    fn new(order: InterpolationOrder) -> Self {
        Self {
            order,
            waypoints: Vec::new(),
        }
    }

    /// Number of waypoints in the group.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Cumulative arc length at each waypoint, starting at 0.
    pub fn arc_lengths(&self) -> Vec<f64> {
        let mut lengths = Vec::with_capacity(self.waypoints.len());
        let mut total = 0.0;
        for (i, (_, value)) in self.waypoints.iter().enumerate() {
            if i > 0 {
                total += (value - self.waypoints[i - 1].1).norm();
            }
            lengths.push(total);
        }
        lengths
    }
}

/// Partitions position waypoints into segment groups.
///
/// A group left holding a single waypoint is already the endpoint of its
/// neighbour and is dropped.
pub fn group_waypoints(waypoints: &[PositionWaypoint]) -> Vec<SegmentGroup> {
    let Some(first) = waypoints.first() else {
        return Vec::new();
    };

    let mut groups = Vec::new();
    let mut current = SegmentGroup::new(first.order);

    for wp in waypoints {
        if wp.order != current.order {
            current.waypoints.push((wp.duration, wp.value));
            let next = SegmentGroup::new(wp.order);
            groups.push(std::mem::replace(&mut current, next));
        }
        current.waypoints.push((wp.duration, wp.value));
    }
    groups.push(current);

    groups.retain(|g| g.len() >= 2);
    groups
}

/// Resamples position waypoints into a dense step sequence.
///
/// The first step holds the first waypoint for its dwell duration. Every
/// interval `(i, i + 1)` of every group then receives
/// `max(1, step_budget / group_len)` samples uniform in arc length, each
/// held `duration_{i+1} / samples`. Zero-duration intervals collapse into a
/// single instantaneous step at their endpoint.
pub fn resample_positions(
    waypoints: &[PositionWaypoint],
    space_scale: f64,
    time_scale: f64,
    step_budget: usize,
) -> Result<Vec<Step<Vector3<f64>>>, PathError> {
    let first = match waypoints {
        [] | [_] => {
            return Err(PathError::malformed(format!(
                "trajectory needs at least two position waypoints, got {}",
                waypoints.len()
            )))
        }
        [first, ..] => first,
    };

    let groups = group_waypoints(waypoints);
    let mut steps = vec![Step::new(first.duration * time_scale, first.value * space_scale)];

    for (index, group) in groups.iter().enumerate() {
        let before = steps.len();
        resample_group(group, space_scale, time_scale, step_budget, &mut steps)?;
        debug!(
            "segment group {} (order {:?}, {} waypoints): {} steps",
            index,
            group.order,
            group.len(),
            steps.len() - before
        );
    }

    Ok(steps)
}

fn resample_group(
    group: &SegmentGroup,
    space_scale: f64,
    time_scale: f64,
    step_budget: usize,
    steps: &mut Vec<Step<Vector3<f64>>>,
) -> Result<(), PathError> {
    let arc = group.arc_lengths();
    if let Some(i) = arc.windows(2).position(|w| !(w[1] > w[0])) {
        return Err(PathError::malformed(format!(
            "coincident waypoints at {:?}: an arc-length interval must not be empty",
            group.waypoints[i + 1].1
        )));
    }

    let values: Vec<Vector3<f64>> = group.waypoints.iter().map(|(_, v)| *v).collect();
    let spline = InterpolatingSpline::fit(&arc, &values, group.order.degree())?;
    let samples = (step_budget / group.len()).max(1);

    for i in 0..group.len() - 1 {
        let (duration, target) = group.waypoints[i + 1];

        if duration <= 0.0 {
            steps.push(Step::new(0.0, target * space_scale));
            continue;
        }

        let dt = duration / samples as f64 * time_scale;
        let (s0, s1) = (arc[i], arc[i + 1]);
        for k in 1..=samples {
            // Land exactly on the waypoint so groups join without a seam
            let value = if k == samples {
                target
            } else {
                spline.evaluate(s0 + (s1 - s0) * k as f64 / samples as f64)
            };
            steps.push(Step::new(dt, value * space_scale));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waypoint::total_dt;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn wp(duration: f64, x: f64, y: f64, z: f64, order: i64) -> PositionWaypoint {
        PositionWaypoint::new(
            duration,
            Vector3::new(x, y, z),
            InterpolationOrder::try_from(order).unwrap(),
        )
    }

    fn scenario_a() -> Vec<PositionWaypoint> {
        vec![
            wp(0.0, 0.0, 0.0, 0.0, 3),
            wp(10.0, 10.0, 0.0, 0.0, 3),
            wp(10.0, 10.0, 10.0, 0.0, 3),
        ]
    }

    #[test]
    fn test_single_group() {
        let groups = group_waypoints(&scenario_a());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].order, InterpolationOrder::Cubic);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn test_groups_share_boundary_waypoint() {
        let waypoints = vec![
            wp(0.0, 0.0, 0.0, 0.0, 3),
            wp(1.0, 1.0, 0.0, 0.0, 3),
            wp(1.0, 2.0, 0.0, 0.0, 1),
            wp(1.0, 3.0, 0.0, 0.0, 1),
            wp(1.0, 4.0, 1.0, 0.0, 2),
            wp(1.0, 5.0, 3.0, 0.0, 2),
        ];
        let groups = group_waypoints(&waypoints);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].order, InterpolationOrder::Cubic);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].order, InterpolationOrder::Linear);
        assert_eq!(groups[1].len(), 3);
        assert_eq!(groups[2].order, InterpolationOrder::Quadratic);
        assert_eq!(groups[2].len(), 2);

        // Boundary waypoints appear in both neighbours
        assert_eq!(groups[0].waypoints[2], groups[1].waypoints[0]);
        assert_eq!(groups[1].waypoints[2], groups[2].waypoints[0]);
    }

    #[test]
    fn test_trailing_lone_waypoint_folded() {
        let waypoints = vec![
            wp(0.0, 0.0, 0.0, 0.0, 3),
            wp(1.0, 1.0, 1.0, 0.0, 3),
            wp(1.0, 2.0, 0.0, 0.0, 1),
        ];
        let groups = group_waypoints(&waypoints);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0].waypoints[2].1, Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_arc_lengths() {
        let groups = group_waypoints(&scenario_a());
        let arc = groups[0].arc_lengths();
        assert_eq!(arc, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_scenario_a() {
        let steps = resample_positions(&scenario_a(), 1.0, 1.0, 100).unwrap();

        // Dwell step + 2 intervals of 100 / 3 samples
        assert_eq!(steps.len(), 1 + 2 * 33);
        assert_relative_eq!(total_dt(&steps), 20.0, epsilon = 1e-9);
        assert_relative_eq!(steps[0].value, Vector3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(steps.last().unwrap().value, Vector3::new(10.0, 10.0, 0.0));
    }

    #[test]
    fn test_scaling_applied_after_sampling() {
        let unscaled = resample_positions(&scenario_a(), 1.0, 1.0, 60).unwrap();
        let scaled = resample_positions(&scenario_a(), 1000.0, 0.5, 60).unwrap();

        assert_eq!(unscaled.len(), scaled.len());
        for (u, s) in unscaled.iter().zip(&scaled) {
            assert_relative_eq!(s.value, u.value * 1000.0, epsilon = 1e-6);
            assert_relative_eq!(s.dt, u.dt * 0.5, epsilon = 1e-12);
        }
        assert_relative_eq!(total_dt(&scaled), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dwell_counts_toward_duration() {
        let waypoints = vec![wp(4.0, 0.0, 0.0, 0.0, 1), wp(6.0, 3.0, 4.0, 0.0, 1)];
        let steps = resample_positions(&waypoints, 1.0, 2.0, 10).unwrap();

        assert_relative_eq!(steps[0].dt, 8.0);
        assert_relative_eq!(total_dt(&steps), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_duration_interval_is_instantaneous() {
        let waypoints = vec![
            wp(0.0, 0.0, 0.0, 0.0, 1),
            wp(0.0, 1.0, 0.0, 0.0, 1),
            wp(2.0, 2.0, 0.0, 0.0, 1),
        ];
        let steps = resample_positions(&waypoints, 1.0, 1.0, 30).unwrap();

        assert_eq!(steps[1], Step::new(0.0, Vector3::new(1.0, 0.0, 0.0)));
        assert_relative_eq!(total_dt(&steps), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_waypoint_is_undefined() {
        let waypoints = vec![wp(1.0, 0.0, 0.0, 0.0, 3)];
        assert!(matches!(
            resample_positions(&waypoints, 1.0, 1.0, 100),
            Err(PathError::MalformedPathError(_))
        ));
        assert!(matches!(
            resample_positions(&[], 1.0, 1.0, 100),
            Err(PathError::MalformedPathError(_))
        ));
    }

    #[test]
    fn test_coincident_waypoints_rejected() {
        let waypoints = vec![
            wp(0.0, 1.0, 1.0, 1.0, 3),
            wp(1.0, 1.0, 1.0, 1.0, 3),
            wp(1.0, 2.0, 1.0, 1.0, 3),
        ];
        assert!(matches!(
            resample_positions(&waypoints, 1.0, 1.0, 100),
            Err(PathError::MalformedPathError(_))
        ));
    }

    #[test]
    fn test_mixed_orders_continuous() {
        let waypoints = vec![
            wp(0.0, 0.0, 0.0, 0.0, 3),
            wp(2.0, 5.0, 1.0, 0.0, 3),
            wp(2.0, 10.0, 0.0, 0.0, 3),
            wp(2.0, 15.0, 5.0, 0.0, 1),
            wp(2.0, 20.0, 5.0, 5.0, 2),
            wp(2.0, 25.0, 0.0, 5.0, 2),
        ];
        let steps = resample_positions(&waypoints, 1.0, 1.0, 600).unwrap();

        assert_relative_eq!(total_dt(&steps), 10.0, epsilon = 1e-9);
        // Every authored waypoint is hit exactly
        for w in &waypoints {
            assert!(steps.iter().any(|s| (s.value - w.value).norm() < 1e-12));
        }
        // No jumps larger than an authored interval
        for pair in steps.windows(2) {
            assert!((pair[1].value - pair[0].value).norm() < 2.0);
        }
    }

    #[test]
    fn test_resampling_is_deterministic() {
        let a = resample_positions(&scenario_a(), 2.0, 3.0, 500).unwrap();
        let b = resample_positions(&scenario_a(), 2.0, 3.0, 500).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_two_waypoints_monotone(
            order in 1i64..=3,
            a in prop::array::uniform3(-100.0f64..100.0),
            d in prop::array::uniform3(0.5f64..50.0),
            duration in 0.1f64..30.0,
            budget in 2usize..400,
        ) {
            let start = Vector3::from(a);
            let end = start + Vector3::from(d);
            let waypoints = vec![
                PositionWaypoint::new(0.0, start, InterpolationOrder::try_from(order).unwrap()),
                PositionWaypoint::new(duration, end, InterpolationOrder::try_from(order).unwrap()),
            ];
            let steps = resample_positions(&waypoints, 1.0, 1.0, budget).unwrap();

            prop_assert!((steps[0].value - start).norm() < 1e-9);
            prop_assert!((steps.last().unwrap().value - end).norm() < 1e-9);

            let mut travelled = 0.0;
            for s in &steps {
                let along = (s.value - start).norm();
                prop_assert!(along + 1e-9 >= travelled);
                travelled = along;
            }
        }

        #[test]
        fn prop_total_dt_matches_duration(
            durations in prop::collection::vec(0.0f64..20.0, 2..8),
            orders in prop::collection::vec(1i64..=3, 8),
            time_scale in 0.1f64..5.0,
        ) {
            let waypoints: Vec<PositionWaypoint> = durations
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let t = i as f64;
                    PositionWaypoint::new(
                        *d,
                        Vector3::new(t * 3.0, (t * 1.3).sin() * 4.0, t * t * 0.5),
                        InterpolationOrder::try_from(orders[i]).unwrap(),
                    )
                })
                .collect();
            let groups = group_waypoints(&waypoints).len().max(1);
            let steps = resample_positions(&waypoints, 1.0, time_scale, groups * 2).unwrap();

            let expected: f64 = durations.iter().sum::<f64>() * time_scale;
            prop_assert!((total_dt(&steps) - expected).abs() < 1e-6);
            prop_assert!(steps.iter().all(|s| s.dt >= 0.0));
        }
    }
}
