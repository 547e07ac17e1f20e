//! Typed uniform values.
//!
//! A single [`UniformValue`] enum replaces a family of per-type setters. The
//! program dispatches on the variant to pick the matching driver call.

use std::fmt;

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// A value that can be written to a GLSL uniform.
///
/// Matrices are column-major, matching both `glam` and the layout OpenGL
/// expects when `transpose` is `false`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `bool`, uploaded as a 1-component integer.
    Bool(bool),
    /// `int`, also used for sampler texture units.
    Int(i32),
    /// `float`.
    Float(f32),
    /// `vec2`.
    Vec2(Vec2),
    /// `vec3`.
    Vec3(Vec3),
    /// `vec4`.
    Vec4(Vec4),
    /// `mat2`.
    Mat2(Mat2),
    /// `mat3`.
    Mat3(Mat3),
    /// `mat4`.
    Mat4(Mat4),
}

/// The shape of a [`UniformValue`], without the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `vec2`
    Vec2,
    /// `vec3`
    Vec3,
    /// `vec4`
    Vec4,
    /// `mat2`
    Mat2,
    /// `mat3`
    Mat3,
    /// `mat4`
    Mat4,
}

impl UniformKind {
    /// Number of scalar components a value of this kind occupies.
    pub const fn component_count(self) -> usize {
        match self {
            Self::Bool | Self::Int | Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// Whether the driver stores this kind as integers rather than floats.
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Bool | Self::Int)
    }

    /// The GLSL type name for this kind.
    pub const fn glsl_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
        }
    }

    /// Parse a GLSL type name. Returns `None` for anything that is not one
    /// of the nine value shapes (samplers included).
    pub fn from_glsl_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "float" => Self::Float,
            "vec2" => Self::Vec2,
            "vec3" => Self::Vec3,
            "vec4" => Self::Vec4,
            "mat2" => Self::Mat2,
            "mat3" => Self::Mat3,
            "mat4" => Self::Mat4,
            _ => return None,
        })
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

impl UniformValue {
    /// The shape of this value.
    pub const fn kind(&self) -> UniformKind {
        match self {
            Self::Bool(_) => UniformKind::Bool,
            Self::Int(_) => UniformKind::Int,
            Self::Float(_) => UniformKind::Float,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Vec4(_) => UniformKind::Vec4,
            Self::Mat2(_) => UniformKind::Mat2,
            Self::Mat3(_) => UniformKind::Mat3,
            Self::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// The float components of a vector or matrix value, column-major.
    ///
    /// Returns `None` for `Bool` and `Int`, which are uploaded as integers.
    pub fn float_components(&self) -> Option<&[f32]> {
        match self {
            Self::Bool(_) | Self::Int(_) => None,
            Self::Float(v) => Some(std::slice::from_ref(v)),
            Self::Vec2(v) => Some(bytemuck::cast_slice(std::slice::from_ref(v))),
            Self::Vec3(v) => Some(bytemuck::cast_slice(std::slice::from_ref(v))),
            Self::Vec4(v) => Some(bytemuck::cast_slice(std::slice::from_ref(v))),
            Self::Mat2(m) => Some(bytemuck::cast_slice(std::slice::from_ref(m))),
            Self::Mat3(m) => Some(bytemuck::cast_slice(std::slice::from_ref(m))),
            Self::Mat4(m) => Some(bytemuck::cast_slice(std::slice::from_ref(m))),
        }
    }

    /// The integer payload of a `Bool` or `Int` value.
    pub fn integer(&self) -> Option<i32> {
        match *self {
            Self::Bool(b) => Some(i32::from(b)),
            Self::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Rebuild a float-backed value of `kind` from its components.
    ///
    /// Returns `None` if `kind` is integer-backed or `components` is shorter
    /// than [`UniformKind::component_count`].
    pub fn from_float_components(kind: UniformKind, components: &[f32]) -> Option<Self> {
        if kind.is_integer() || components.len() < kind.component_count() {
            return None;
        }
        let c = components;
        Some(match kind {
            UniformKind::Float => Self::Float(c[0]),
            UniformKind::Vec2 => Self::Vec2(Vec2::from_slice(c)),
            UniformKind::Vec3 => Self::Vec3(Vec3::from_slice(c)),
            UniformKind::Vec4 => Self::Vec4(Vec4::from_slice(c)),
            UniformKind::Mat2 => Self::Mat2(Mat2::from_cols_slice(c)),
            UniformKind::Mat3 => Self::Mat3(Mat3::from_cols_slice(c)),
            UniformKind::Mat4 => Self::Mat4(Mat4::from_cols_slice(c)),
            UniformKind::Bool | UniformKind::Int => return None,
        })
    }

    /// Rebuild an integer-backed value of `kind`.
    pub const fn from_integer(kind: UniformKind, value: i32) -> Option<Self> {
        match kind {
            UniformKind::Bool => Some(Self::Bool(value != 0)),
            UniformKind::Int => Some(Self::Int(value)),
            _ => None,
        }
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat2> for UniformValue {
    fn from(m: Mat2) -> Self {
        Self::Mat2(m)
    }
}

impl From<Mat3> for UniformValue {
    fn from(m: Mat3) -> Self {
        Self::Mat3(m)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        Self::Mat4(m)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        Self::Vec2(Vec2::from_array(v))
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(Vec3::from_array(v))
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        Self::Vec4(Vec4::from_array(v))
    }
}

// Column arrays, as produced by most math libraries.
impl From<[[f32; 2]; 2]> for UniformValue {
    fn from(cols: [[f32; 2]; 2]) -> Self {
        Self::Mat2(Mat2::from_cols_array_2d(&cols))
    }
}

impl From<[[f32; 3]; 3]> for UniformValue {
    fn from(cols: [[f32; 3]; 3]) -> Self {
        Self::Mat3(Mat3::from_cols_array_2d(&cols))
    }
}

impl From<[[f32; 4]; 4]> for UniformValue {
    fn from(cols: [[f32; 4]; 4]) -> Self {
        Self::Mat4(Mat4::from_cols_array_2d(&cols))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn component_counts_match_float_slices() {
        let values = [
            UniformValue::Float(1.0),
            UniformValue::Vec2(Vec2::ONE),
            UniformValue::Vec3(Vec3::ONE),
            UniformValue::Vec4(Vec4::ONE),
            UniformValue::Mat2(Mat2::IDENTITY),
            UniformValue::Mat3(Mat3::IDENTITY),
            UniformValue::Mat4(Mat4::IDENTITY),
        ];
        for value in values {
            let components = value.float_components().unwrap();
            assert_eq!(components.len(), value.kind().component_count(), "{value:?}");
        }
    }

    #[test]
    fn integer_values_have_no_float_components() {
        assert!(UniformValue::Bool(true).float_components().is_none());
        assert!(UniformValue::Int(3).float_components().is_none());
        assert_eq!(UniformValue::Bool(true).integer(), Some(1));
        assert_eq!(UniformValue::Bool(false).integer(), Some(0));
        assert_eq!(UniformValue::Int(-7).integer(), Some(-7));
        assert_eq!(UniformValue::Float(1.0).integer(), None);
    }

    #[test]
    fn matrix_components_are_column_major() {
        let m = Mat2::from_cols(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0));
        let value = UniformValue::from(m);
        assert_eq!(value.float_components().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn mat4_rebuilt_from_components_is_unchanged() {
        let translation = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0));
        let value = UniformValue::Mat4(translation);
        let rebuilt = UniformValue::from_float_components(
            UniformKind::Mat4,
            value.float_components().unwrap(),
        );
        assert_eq!(rebuilt, Some(value));
    }

    #[test]
    fn from_float_components_rejects_short_or_integer_input() {
        assert_eq!(UniformValue::from_float_components(UniformKind::Vec3, &[1.0, 2.0]), None);
        assert_eq!(UniformValue::from_float_components(UniformKind::Int, &[1.0]), None);
        assert_eq!(UniformValue::from_integer(UniformKind::Float, 1), None);
        assert_eq!(
            UniformValue::from_integer(UniformKind::Bool, 5),
            Some(UniformValue::Bool(true))
        );
    }

    #[test]
    fn array_conversions_pick_the_matching_shape() {
        assert_eq!(UniformValue::from([1.0, 2.0]).kind(), UniformKind::Vec2);
        assert_eq!(UniformValue::from([1.0, 2.0, 3.0]).kind(), UniformKind::Vec3);
        assert_eq!(UniformValue::from([0.2, 0.3, 0.3, 1.0]).kind(), UniformKind::Vec4);
        let identity = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        assert_eq!(UniformValue::from(identity), UniformValue::Mat4(Mat4::IDENTITY));
    }

    #[test]
    fn glsl_names_round_trip() {
        for kind in [
            UniformKind::Bool,
            UniformKind::Int,
            UniformKind::Float,
            UniformKind::Vec2,
            UniformKind::Vec3,
            UniformKind::Vec4,
            UniformKind::Mat2,
            UniformKind::Mat3,
            UniformKind::Mat4,
        ] {
            assert_eq!(UniformKind::from_glsl_name(kind.glsl_name()), Some(kind));
        }
        assert_eq!(UniformKind::from_glsl_name("sampler2D"), None);
    }
}
