use nalgebra as na;

/// Local rotation expressed as three Euler angles in degrees.
///
/// Channels are stored exactly as written. Angles are never wrapped into
/// `[0, 360)`, so a channel that is not touched keeps its bit pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Euler {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Euler {
    pub const ZERO: Euler = Euler {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Euler { x, y, z }
    }

    /// Returns copy of this rotation with Y channel replaced.
    pub fn with_y(self, y: f32) -> Self {
        Euler { y, ..self }
    }

    /// Composes rotation in engine axis order.
    /// Rotation around Z is applied first, then X, then Y.
    pub fn to_quaternion(&self) -> na::UnitQuaternion<f32> {
        let x = na::UnitQuaternion::from_axis_angle(
            &na::Vector3::x_axis(),
            self.x.to_radians(),
        );
        let y = na::UnitQuaternion::from_axis_angle(
            &na::Vector3::y_axis(),
            self.y.to_radians(),
        );
        let z = na::UnitQuaternion::from_axis_angle(
            &na::Vector3::z_axis(),
            self.z.to_radians(),
        );
        y * x * z
    }
}

impl From<[f32; 3]> for Euler {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Euler { x, y, z }
    }
}
