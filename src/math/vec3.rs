//! 三维向量

use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

use super::{Scalar, Vec4};

/// 三维向量（点、方向或法线）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

unsafe impl<T: Scalar> bytemuck::Zeroable for Vec3<T> {}
unsafe impl<T: Scalar> bytemuck::Pod for Vec3<T> {}

impl<T: Scalar> Vec3<T> {
    #[inline]
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// 三个分量都设为 `v`
    #[inline]
    pub fn splat(v: T) -> Self {
        Self::new(v, v, v)
    }

    #[inline]
    pub fn zero() -> Self {
        Self::splat(T::zero())
    }

    /// 点积
    #[inline]
    pub fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// 叉积（右手系）
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// 长度的平方
    #[inline]
    pub fn length2(&self) -> T {
        self.dot(self)
    }

    #[inline]
    pub fn length(&self) -> T {
        self.length2().sqrt()
    }

    /// 两点间的欧氏距离
    #[inline]
    pub fn distance(&self, other: &Self) -> T {
        (*self - *other).length()
    }

    /// 返回单位化副本
    ///
    /// 零向量返回零向量，而不是 NaN。
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len <= T::EPSILON {
            Self::zero()
        } else {
            *self / len
        }
    }

    /// 原地单位化
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// 扩展为 [`Vec4`]，`w` 由参数给出
    #[inline]
    pub fn extend(&self, w: T) -> Vec4<T> {
        Vec4::new(self.x, self.y, self.z, w)
    }

    #[inline]
    pub fn as_array(&self) -> [T; 3] {
        [self.x, self.y, self.z]
    }
}

impl<T: Scalar> From<[T; 3]> for Vec3<T> {
    fn from(a: [T; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

impl<T: Scalar> From<Vec3<T>> for [T; 3] {
    fn from(v: Vec3<T>) -> Self {
        v.as_array()
    }
}

impl From<Vec3<f32>> for nalgebra::Vector3<f32> {
    fn from(v: Vec3<f32>) -> Self {
        nalgebra::Vector3::new(v.x, v.y, v.z)
    }
}

impl From<nalgebra::Vector3<f32>> for Vec3<f32> {
    fn from(v: nalgebra::Vector3<f32>) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl<T: Scalar> Add for Vec3<T> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Scalar> Sub for Vec3<T> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T: Scalar> Neg for Vec3<T> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// 分量逐个相乘
impl<T: Scalar> Mul for Vec3<T> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl<T: Scalar> Mul<T> for Vec3<T> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: T) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<T: Scalar> Div<T> for Vec3<T> {
    type Output = Self;

    #[inline]
    fn div(self, rhs: T) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl<T: Scalar> AddAssign for Vec3<T> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl<T: Scalar> SubAssign for Vec3<T> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl<T: Scalar> MulAssign for Vec3<T> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        self.x *= rhs.x;
        self.y *= rhs.y;
        self.z *= rhs.z;
    }
}

impl<T: Scalar> MulAssign<T> for Vec3<T> {
    #[inline]
    fn mul_assign(&mut self, rhs: T) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl<T: Scalar> DivAssign<T> for Vec3<T> {
    #[inline]
    fn div_assign(&mut self, rhs: T) {
        self.x /= rhs;
        self.y /= rhs;
        self.z /= rhs;
    }
}

impl<T> Index<usize> for Vec3<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of range: {}", i),
        }
    }
}

impl<T> IndexMut<usize> for Vec3<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vec3 index out of range: {}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_follows_right_hand_rule() {
        let x = Vec3::new(1.0_f32, 0.0, 0.0);
        let y = Vec3::new(0.0_f32, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(&x), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_length_and_distance() {
        let v = Vec3::new(2.0_f64, 3.0, 6.0);
        assert_eq!(v.length2(), 49.0);
        assert_eq!(v.length(), 7.0);
        assert_eq!(v.distance(&Vec3::zero()), 7.0);
    }

    #[test]
    fn test_normalize() {
        let mut v = Vec3::new(0.0_f32, 3.0, 4.0);
        v.normalize();
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_stays_zero() {
        let v = Vec3::<f32>::zero().normalized();
        assert_eq!(v, Vec3::zero());
        assert!(!v.x.is_nan());
    }

    #[test]
    fn test_operators() {
        let mut a = Vec3::new(1.0_f32, 2.0, 3.0);
        let b = Vec3::splat(2.0_f32);

        assert_eq!(a + b, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(a - b, Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(a * b, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(a * 3.0, Vec3::new(3.0, 6.0, 9.0));
        assert_eq!(a / 2.0, Vec3::new(0.5, 1.0, 1.5));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(a.dot(&b), 12.0);

        a += b;
        a *= 2.0;
        assert_eq!(a, Vec3::new(6.0, 8.0, 10.0));
        a /= 2.0;
        a -= b;
        assert_eq!(a, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_indexing() {
        let mut v = Vec3::new(1.0_f32, 2.0, 3.0);
        v[1] = 5.0;
        assert_eq!(v[0], 1.0);
        assert_eq!(v[1], 5.0);
        assert_eq!(v[2], 3.0);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let v = Vec3::new(1.0_f32, 2.0, 3.0);
        let _ = v[3];
    }
}
