//! 数学库模块
//!
//! 提供向量和 4x4 矩阵等小型值类型，对标量类型泛型：
//! 上传到 GPU 的数据使用 `f32`，需要精度的地方使用 `f64`。
//!
//! # 约定
//!
//! - 矩阵按行主序存储（`m[row][col]`）
//! - 向量为行向量：点的变换写作 `v * M`，平移分量位于第 3 行，
//!   `a * b` 表示先应用 `a` 再应用 `b`
//! - 旋转函数的角度参数单位为度
//!
//! # 模块组织
//!
//! - [`Vec2`]、[`Vec3`]、[`Vec4`]：向量类型
//! - [`Matr`]：4x4 变换矩阵，含投影和观察矩阵构造
//! - [`Scalar`]：`f32` 与 `f64` 共同实现的标量 trait
//! - 通过 `From` 与 `nalgebra` 互相转换

mod matr;
mod vec2;
mod vec3;
mod vec4;

pub use matr::{determ3x3, Matr};
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// 圆周率（`f64`）
pub const PI: f64 = std::f64::consts::PI;

/// 单精度类型别名（渲染器使用）
pub type Vec2f = Vec2<f32>;
pub type Vec3f = Vec3<f32>;
pub type Vec4f = Vec4<f32>;
pub type Matrf = Matr<f32>;

/// 双精度类型别名
pub type Vec3d = Vec3<f64>;
pub type Matrd = Matr<f64>;

/// 可作为向量/矩阵分量的标量类型
pub trait Scalar:
    Copy
    + Debug
    + PartialEq
    + PartialOrd
    + Default
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + bytemuck::Pod
{
    /// 判断“近似为零”时使用的容差
    const EPSILON: Self;

    fn zero() -> Self;
    fn one() -> Self;
    fn sqrt(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn abs(self) -> Self;
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
}

macro_rules! impl_scalar {
    ($t:ty, $eps:expr) => {
        impl Scalar for $t {
            const EPSILON: Self = $eps;

            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn one() -> Self {
                1.0
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }

            #[inline]
            fn sin(self) -> Self {
                <$t>::sin(self)
            }

            #[inline]
            fn cos(self) -> Self {
                <$t>::cos(self)
            }

            #[inline]
            fn abs(self) -> Self {
                <$t>::abs(self)
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_scalar!(f32, 1e-6);
impl_scalar!(f64, 1e-12);

/// 角度转弧度
#[inline]
pub fn deg_to_rad<T: Scalar>(degrees: T) -> T {
    degrees * T::from_f64(PI / 180.0)
}

/// 弧度转角度
#[inline]
pub fn rad_to_deg<T: Scalar>(radians: T) -> T {
    radians * T::from_f64(180.0 / PI)
}

/// 按绝对容差比较是否近似相等
#[inline]
pub fn approx_eq<T: Scalar>(a: T, b: T, epsilon: T) -> bool {
    Scalar::abs(a - b) <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_conversion() {
        assert!(approx_eq(deg_to_rad(180.0_f64), PI, 1e-12));
        assert!(approx_eq(rad_to_deg(std::f32::consts::FRAC_PI_2), 90.0, 1e-4));
    }

    #[test]
    fn test_scalar_identities() {
        assert_eq!(<f32 as Scalar>::zero(), 0.0);
        assert_eq!(<f64 as Scalar>::one(), 1.0);
        assert_eq!(Scalar::sqrt(16.0_f32), 4.0);
        assert_eq!(<f32 as Scalar>::from_f64(0.5), 0.5_f32);
    }
}
