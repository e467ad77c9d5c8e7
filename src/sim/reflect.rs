//! Reflection solver
//!
//! Every surface reflects the travel direction about its normal
//! (`Incidence::normal`). With angles in degrees that is
//! `out = 2·normal − 180 − in`. Walls and brick faces have cardinal normals;
//! brick corners use the diagonal normal pointing out of the corner. The paddle
//! A zones reflect like the floor and then bias the result.

use super::collision::Incidence;
use crate::consts::{PADDLE_ANGLE_BIAS, PADDLE_MAX_EXIT_ANGLE, PADDLE_MIN_EXIT_ANGLE};
use crate::normalize_degrees;

/// New travel angle after striking a surface of class `incidence`
pub fn reflect(incidence: Incidence, angle: f32) -> f32 {
    match incidence {
        Incidence::PaddleAnglePos => {
            paddle_exit(mirror(incidence.normal(), angle) + PADDLE_ANGLE_BIAS)
        }
        Incidence::PaddleAngleNeg => {
            paddle_exit(mirror(incidence.normal(), angle) - PADDLE_ANGLE_BIAS)
        }
        Incidence::LeftWall
        | Incidence::RightWall
        | Incidence::TopWall
        | Incidence::BottomWall
        | Incidence::BrickSe
        | Incidence::BrickNe
        | Incidence::BrickNw
        | Incidence::BrickSw => mirror(incidence.normal(), angle),
    }
}

/// Reflect `angle` about a surface whose outward normal points at `normal` degrees
fn mirror(normal: i32, angle: f32) -> f32 {
    if let Some(exact) = cardinal(angle) {
        return (2 * normal - 180 - exact).rem_euclid(360) as f32;
    }
    normalize_degrees((2 * normal - 180) as f32 - angle)
}

/// Exactly axis-aligned angles take the integer path so they never drift
fn cardinal(angle: f32) -> Option<i32> {
    [0, 90, 180, 270]
        .into_iter()
        .find(|&c| angle == c as f32 || (c == 0 && angle == 360.0))
}

fn paddle_exit(angle: f32) -> f32 {
    angle.clamp(PADDLE_MIN_EXIT_ANGLE, PADDLE_MAX_EXIT_ANGLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MIRROR_CLASSES: [Incidence; 8] = [
        Incidence::LeftWall,
        Incidence::RightWall,
        Incidence::TopWall,
        Incidence::BottomWall,
        Incidence::BrickSe,
        Incidence::BrickNe,
        Incidence::BrickNw,
        Incidence::BrickSw,
    ];

    fn angle_diff(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_walls() {
        assert_eq!(reflect(Incidence::LeftWall, 135.0), 45.0);
        assert_eq!(reflect(Incidence::LeftWall, 225.0), 315.0);
        assert_eq!(reflect(Incidence::RightWall, 45.0), 135.0);
        assert_eq!(reflect(Incidence::RightWall, 300.0), 240.0);
        assert_eq!(reflect(Incidence::TopWall, 60.0), 300.0);
        assert_eq!(reflect(Incidence::TopWall, 120.0), 240.0);
        assert_eq!(reflect(Incidence::BottomWall, 300.0), 60.0);
        assert_eq!(reflect(Incidence::BottomWall, 200.0), 160.0);
    }

    #[test]
    fn test_axis_aligned_inputs_are_exact() {
        assert_eq!(reflect(Incidence::BottomWall, 270.0), 90.0);
        assert_eq!(reflect(Incidence::TopWall, 90.0), 270.0);
        assert_eq!(reflect(Incidence::LeftWall, 180.0), 0.0);
        assert_eq!(reflect(Incidence::RightWall, 0.0), 180.0);
        assert_eq!(reflect(Incidence::RightWall, 360.0), 180.0);
        assert_eq!(reflect(Incidence::BrickSe, 90.0), 0.0);
        assert_eq!(reflect(Incidence::BrickNe, 180.0), 90.0);
        assert_eq!(reflect(Incidence::BrickNw, 0.0), 90.0);
        assert_eq!(reflect(Incidence::BrickSw, 90.0), 180.0);
    }

    #[test]
    fn test_corner_uses_diagonal_axis() {
        // 45° into a north-east corner: 2·45 − 180 − 45
        let out = reflect(Incidence::BrickNe, 45.0);
        assert_eq!(out, 225.0);
        assert_ne!(out, reflect(Incidence::TopWall, 45.0));
        assert_ne!(out, reflect(Incidence::RightWall, 45.0));

        // Travelling up-left into the south-east corner of a brick
        assert_eq!(reflect(Incidence::BrickSe, 135.0), 315.0);
        // Travelling down-right into the north-west corner
        assert_eq!(reflect(Incidence::BrickNw, 315.0), 135.0);
    }

    #[test]
    fn test_paddle_bias() {
        assert_eq!(reflect(Incidence::PaddleAnglePos, 270.0), 105.0);
        assert_eq!(reflect(Incidence::PaddleAngleNeg, 270.0), 75.0);
        assert_eq!(reflect(Incidence::PaddleAnglePos, 300.0), 75.0);
        assert_eq!(reflect(Incidence::PaddleAngleNeg, 240.0), 105.0);
    }

    #[test]
    fn test_paddle_bias_is_clamped() {
        // 190° in → 170° out of the floor, +15 would be 185
        assert_eq!(reflect(Incidence::PaddleAnglePos, 190.0), 165.0);
        // 350° in → 10° out of the floor, −15 would be −5
        assert_eq!(reflect(Incidence::PaddleAngleNeg, 350.0), 15.0);
        assert_eq!(reflect(Incidence::PaddleAngleNeg, 340.0), 15.0);
    }

    proptest! {
        #[test]
        fn prop_mirror_classes_are_involutions(angle in 0.0f32..360.0, idx in 0usize..8) {
            let class = MIRROR_CLASSES[idx];
            let back = reflect(class, reflect(class, angle));
            prop_assert!(angle_diff(back, angle) < 1e-3, "{:?}: {} -> {}", class, angle, back);
        }

        #[test]
        fn prop_outputs_stay_in_range(angle in 0.0f32..360.0, idx in 0usize..8) {
            let out = reflect(MIRROR_CLASSES[idx], angle);
            prop_assert!((0.0..360.0).contains(&out));
        }

        #[test]
        fn prop_paddle_exit_never_flat(angle in 180.5f32..359.5) {
            for class in [Incidence::PaddleAnglePos, Incidence::PaddleAngleNeg] {
                let out = reflect(class, angle);
                prop_assert!((15.0..=165.0).contains(&out));
            }
        }

        #[test]
        fn prop_floor_sends_ball_upward(angle in 180.5f32..359.5) {
            let out = reflect(Incidence::BottomWall, angle);
            prop_assert!(out > 0.0 && out < 180.0);
        }
    }
}
