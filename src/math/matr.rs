//! 4x4 变换矩阵
//!
//! 行主序存储，采用行向量约定（`v' = v * M`）：
//! `a * b` 表示先应用 `a` 再应用 `b`，平移分量位于第 3 行。
//! 投影矩阵输出 OpenGL 风格的裁剪空间（`z` 属于 `[-1, 1]`）。

use std::ops::{Index, IndexMut, Mul};

use super::{deg_to_rad, Scalar, Vec3, Vec4};

/// 构造 3x3 余子式用的索引表：第 `i` 项是去掉第 `i` 行（列）后剩下的三行（列）
const MINOR_INDICES: [[usize; 3]; 4] = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];

/// 4x4 矩阵
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matr<T> {
    pub m: [[T; 4]; 4],
}

unsafe impl<T: Scalar> bytemuck::Zeroable for Matr<T> {}
unsafe impl<T: Scalar> bytemuck::Pod for Matr<T> {}

/// 按行给出的 3x3 矩阵的行列式
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn determ3x3<T: Scalar>(
    a11: T, a12: T, a13: T,
    a21: T, a22: T, a23: T,
    a31: T, a32: T, a33: T,
) -> T {
    a11 * a22 * a33 - a11 * a23 * a32 - a12 * a21 * a33
        + a12 * a23 * a31 + a13 * a21 * a32 - a13 * a22 * a31
}

impl<T: Scalar> Default for Matr<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: Scalar> Matr<T> {
    /// 按行顺序由 16 个元素构造矩阵
    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub fn new(
        a00: T, a01: T, a02: T, a03: T,
        a10: T, a11: T, a12: T, a13: T,
        a20: T, a21: T, a22: T, a23: T,
        a30: T, a31: T, a32: T, a33: T,
    ) -> Self {
        Self {
            m: [
                [a00, a01, a02, a03],
                [a10, a11, a12, a13],
                [a20, a21, a22, a23],
                [a30, a31, a32, a33],
            ],
        }
    }

    #[inline]
    pub fn from_rows(m: [[T; 4]; 4]) -> Self {
        Self { m }
    }

    pub fn zero() -> Self {
        Self { m: [[T::zero(); 4]; 4] }
    }

    pub fn identity() -> Self {
        let mut r = Self::zero();
        for i in 0..4 {
            r.m[i][i] = T::one();
        }
        r
    }

    /// 重置为单位矩阵
    pub fn set_identity(&mut self) {
        *self = Self::identity();
    }

    pub fn transpose(&self) -> Self {
        let mut r = Self::zero();
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = self.m[j][i];
            }
        }
        r
    }

    /// 去掉 `row` 行和 `col` 列后剩余 3x3 子矩阵的行列式
    fn minor(&self, row: usize, col: usize) -> T {
        let r = MINOR_INDICES[row];
        let c = MINOR_INDICES[col];
        let m = &self.m;
        determ3x3(
            m[r[0]][c[0]], m[r[0]][c[1]], m[r[0]][c[2]],
            m[r[1]][c[0]], m[r[1]][c[1]], m[r[1]][c[2]],
            m[r[2]][c[0]], m[r[2]][c[1]], m[r[2]][c[2]],
        )
    }

    #[inline]
    fn cofactor(&self, row: usize, col: usize) -> T {
        let minor = self.minor(row, col);
        if (row + col) % 2 == 0 {
            minor
        } else {
            -minor
        }
    }

    /// 行列式（按第一行展开）
    pub fn determ(&self) -> T {
        (0..4).fold(T::zero(), |acc, j| acc + self.m[0][j] * self.cofactor(0, j))
    }

    /// 逆矩阵
    ///
    /// # 返回值
    ///
    /// 仅当行列式恰好为 0 时返回 `None`
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determ();
        if det == T::zero() {
            return None;
        }

        let mut r = Self::zero();
        for i in 0..4 {
            for j in 0..4 {
                // 伴随矩阵 = 代数余子式矩阵的转置
                r.m[j][i] = self.cofactor(i, j) / det;
            }
        }
        Some(r)
    }

    /// 逆矩阵，奇异时退化为单位矩阵
    pub fn inverse_or_identity(&self) -> Self {
        self.inverse().unwrap_or_else(Self::identity)
    }

    /// 平移矩阵
    #[rustfmt::skip]
    pub fn translate(t: Vec3<T>) -> Self {
        let (o, l) = (T::zero(), T::one());
        Self::new(
            l,   o,   o,   o,
            o,   l,   o,   o,
            o,   o,   l,   o,
            t.x, t.y, t.z, l,
        )
    }

    /// 缩放矩阵（各轴可不同）
    #[rustfmt::skip]
    pub fn scale(s: Vec3<T>) -> Self {
        let (o, l) = (T::zero(), T::one());
        Self::new(
            s.x, o,   o,   o,
            o,   s.y, o,   o,
            o,   o,   s.z, o,
            o,   o,   o,   l,
        )
    }

    /// 绕 X 轴旋转，角度单位为度
    #[rustfmt::skip]
    pub fn rotate_x(angle_deg: T) -> Self {
        let a = deg_to_rad(angle_deg);
        let (s, c) = (a.sin(), a.cos());
        let (o, l) = (T::zero(), T::one());
        Self::new(
            l, o,  o, o,
            o, c,  s, o,
            o, -s, c, o,
            o, o,  o, l,
        )
    }

    /// 绕 Y 轴旋转，角度单位为度
    #[rustfmt::skip]
    pub fn rotate_y(angle_deg: T) -> Self {
        let a = deg_to_rad(angle_deg);
        let (s, c) = (a.sin(), a.cos());
        let (o, l) = (T::zero(), T::one());
        Self::new(
            c, o, -s, o,
            o, l, o,  o,
            s, o, c,  o,
            o, o, o,  l,
        )
    }

    /// 绕 Z 轴旋转，角度单位为度
    #[rustfmt::skip]
    pub fn rotate_z(angle_deg: T) -> Self {
        let a = deg_to_rad(angle_deg);
        let (s, c) = (a.sin(), a.cos());
        let (o, l) = (T::zero(), T::one());
        Self::new(
            c,  s, o, o,
            -s, c, o, o,
            o,  o, l, o,
            o,  o, o, l,
        )
    }

    /// 绕任意轴旋转
    ///
    /// # 参数
    ///
    /// * `angle_deg` - 旋转角度（度）
    /// * `axis` - 旋转轴，不要求单位长度
    #[rustfmt::skip]
    pub fn rotate(angle_deg: T, axis: Vec3<T>) -> Self {
        let a = deg_to_rad(angle_deg);
        let (s, c) = (a.sin(), a.cos());
        let n = axis.normalized();
        let (x, y, z) = (n.x, n.y, n.z);
        let k = T::one() - c;
        let (o, l) = (T::zero(), T::one());
        Self::new(
            c + x * x * k,     x * y * k + z * s, x * z * k - y * s, o,
            y * x * k - z * s, c + y * y * k,     y * z * k + x * s, o,
            z * x * k + y * s, z * y * k - x * s, c + z * z * k,     o,
            o,                 o,                 o,                 l,
        )
    }

    /// 右手系观察矩阵
    ///
    /// # 参数
    ///
    /// * `loc` - 相机位置
    /// * `at` - 注视点
    /// * `up` - 近似向上方向
    #[rustfmt::skip]
    pub fn view(loc: Vec3<T>, at: Vec3<T>, up: Vec3<T>) -> Self {
        let d = (at - loc).normalized();
        let r = d.cross(&up).normalized();
        let u = r.cross(&d);
        let (o, l) = (T::zero(), T::one());
        Self::new(
            r.x,           u.x,           -d.x,       o,
            r.y,           u.y,           -d.y,       o,
            r.z,           u.z,           -d.z,       o,
            -loc.dot(&r),  -loc.dot(&u),  loc.dot(&d), l,
        )
    }

    /// 透视视锥投影矩阵
    #[rustfmt::skip]
    pub fn frustum(l: T, r: T, b: T, t: T, n: T, f: T) -> Self {
        let two = T::one() + T::one();
        let o = T::zero();
        Self::new(
            two * n / (r - l), o,                 o,                       o,
            o,                 two * n / (t - b), o,                       o,
            (r + l) / (r - l), (t + b) / (t - b), -(f + n) / (f - n),      -T::one(),
            o,                 o,                 -two * n * f / (f - n),  o,
        )
    }

    /// 对称透视投影，`fov_y_deg` 为垂直视场角（度）
    pub fn perspective(fov_y_deg: T, aspect: T, near: T, far: T) -> Self {
        let half = deg_to_rad(fov_y_deg) / (T::one() + T::one());
        let top = near * half.sin() / half.cos();
        let right = top * aspect;
        Self::frustum(-right, right, -top, top, near, far)
    }

    /// 正交投影矩阵
    #[rustfmt::skip]
    pub fn ortho(l: T, r: T, b: T, t: T, n: T, f: T) -> Self {
        let two = T::one() + T::one();
        let o = T::zero();
        Self::new(
            two / (r - l),      o,                  o,                  o,
            o,                  two / (t - b),      o,                  o,
            o,                  o,                  -two / (f - n),     o,
            -(r + l) / (r - l), -(t + b) / (t - b), -(n + f) / (f - n), T::one(),
        )
    }

    /// 变换点（隐含 `w = 1`，不做透视除法）
    pub fn transform_point(&self, v: Vec3<T>) -> Vec3<T> {
        let m = &self.m;
        Vec3::new(
            v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + m[3][0],
            v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + m[3][1],
            v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + m[3][2],
        )
    }

    /// 变换方向向量（隐含 `w = 0`）
    pub fn transform_vector(&self, v: Vec3<T>) -> Vec3<T> {
        let m = &self.m;
        Vec3::new(
            v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0],
            v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1],
            v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2],
        )
    }

    /// 用逆转置矩阵变换法线
    ///
    /// 奇异矩阵不改变法线。
    pub fn transform_normal(&self, n: Vec3<T>) -> Vec3<T> {
        let inv = self.inverse_or_identity().m;
        Vec3::new(
            n.x * inv[0][0] + n.y * inv[0][1] + n.z * inv[0][2],
            n.x * inv[1][0] + n.y * inv[1][1] + n.z * inv[1][2],
            n.x * inv[2][0] + n.y * inv[2][1] + n.z * inv[2][2],
        )
    }

    /// 完整的齐次变换，最后除以 `w`
    pub fn transform_4x4(&self, v: Vec3<T>) -> Vec3<T> {
        let m = &self.m;
        let w = v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + m[3][3];
        self.transform_point(v) / w
    }

    /// 原始行数据（例如上传到常量缓冲区）
    #[inline]
    pub fn as_rows(&self) -> &[[T; 4]; 4] {
        &self.m
    }
}

impl<T: Scalar> Mul for Matr<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut r = Self::zero();
        for i in 0..4 {
            for j in 0..4 {
                let mut acc = T::zero();
                for k in 0..4 {
                    acc += self.m[i][k] * rhs.m[k][j];
                }
                r.m[i][j] = acc;
            }
        }
        r
    }
}

/// 行向量乘矩阵
impl<T: Scalar> Mul<Matr<T>> for Vec4<T> {
    type Output = Vec4<T>;

    fn mul(self, rhs: Matr<T>) -> Vec4<T> {
        let mut r = [T::zero(); 4];
        for (j, out) in r.iter_mut().enumerate() {
            *out = self.x * rhs.m[0][j] + self.y * rhs.m[1][j] + self.z * rhs.m[2][j] + self.w * rhs.m[3][j];
        }
        Vec4::from(r)
    }
}

impl<T> Index<usize> for Matr<T> {
    type Output = [T; 4];

    fn index(&self, row: usize) -> &[T; 4] {
        &self.m[row]
    }
}

impl<T> IndexMut<usize> for Matr<T> {
    fn index_mut(&mut self, row: usize) -> &mut [T; 4] {
        &mut self.m[row]
    }
}

// nalgebra 使用列向量，同一变换在其中是转置关系
impl From<Matr<f32>> for nalgebra::Matrix4<f32> {
    fn from(m: Matr<f32>) -> Self {
        nalgebra::Matrix4::from_fn(|i, j| m.m[j][i])
    }
}

impl From<nalgebra::Matrix4<f32>> for Matr<f32> {
    fn from(n: nalgebra::Matrix4<f32>) -> Self {
        let mut r = Matr::zero();
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = n[(j, i)];
            }
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Matrd, Matrf, Vec3d, Vec3f};

    fn assert_matr_eq(a: &Matrd, b: &Matrd, eps: f64) {
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (a.m[i][j] - b.m[i][j]).abs() < eps,
                    "mismatch at [{}][{}]: {} vs {}",
                    i, j, a.m[i][j], b.m[i][j]
                );
            }
        }
    }

    fn assert_vec_eq(a: Vec3d, b: Vec3d, eps: f64) {
        assert!((a - b).length() < eps, "{:?} vs {:?}", a, b);
    }

    /// 无对称结构的矩阵，行列混淆会暴露出来
    #[rustfmt::skip]
    fn general() -> Matrd {
        Matrd::new(
            2.0, 0.5, -1.0, 0.0,
            1.0, 3.0,  0.0, 0.25,
            0.0, 1.0,  4.0, -2.0,
            5.0, -1.0, 2.0, 7.0,
        )
    }

    #[test]
    fn test_identity_is_neutral() {
        let m = general();
        assert_eq!(Matrd::identity() * m, m);
        assert_eq!(m * Matrd::identity(), m);
        assert_eq!(Matrd::default(), Matrd::identity());
    }

    #[test]
    fn test_determ3x3() {
        assert_eq!(determ3x3(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0), 1.0);
        assert_eq!(determ3x3(2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 2.0), 6.0);
    }

    #[test]
    fn test_determ_matches_nalgebra() {
        let m = general();
        let n = nalgebra::Matrix4::from_fn(|i, j| m.m[i][j]);
        assert!((m.determ() - n.determinant()).abs() < 1e-9);
    }

    #[test]
    fn test_determ_uses_last_row() {
        // 只改 m[3][3] 也必须影响行列式
        let mut m = Matrd::identity();
        m.m[3][3] = 5.0;
        assert!((m.determ() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_determ_of_product() {
        let a = general();
        let b = Matrd::rotate(30.0, Vec3d::new(1.0, 2.0, 3.0)) * Matrd::scale(Vec3d::new(2.0, 3.0, 4.0));
        assert!(((a * b).determ() - a.determ() * b.determ()).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = general();
        let inv = m.inverse().expect("matrix is invertible");
        assert_matr_eq(&(m * inv), &Matrd::identity(), 1e-12);
        assert_matr_eq(&(inv * m), &Matrd::identity(), 1e-12);
    }

    #[test]
    fn test_inverse_of_singular_matrix() {
        let mut m = general();
        m.m[2] = m.m[1];
        assert!(m.inverse().is_none());
        assert_eq!(m.inverse_or_identity(), Matrd::identity());
        assert_eq!(Matrd::zero().inverse(), None);
    }

    #[test]
    fn test_inverse_of_small_uniform_scale() {
        // det = 1.25e-7，比 f32 的 Scalar::EPSILON（1e-6）还小
        let m = Matrf::scale(Vec3f::splat(0.005));
        let inv = m.inverse().expect("small scale is invertible");
        assert!((inv.m[0][0] - 200.0).abs() < 1e-2);

        let product = m * inv;
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((product.m[i][j] - expected).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_transform_normal_under_small_scale() {
        // 逆矩阵存在时法线不能退回单位矩阵的结果
        let m = Matrd::scale(Vec3d::new(0.001, 0.002, 0.001));
        let n = m.transform_normal(Vec3d::new(1.0, 0.0, 0.0));
        assert!((n.x - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_matches_nalgebra() {
        let m = Matrf::rotate_x(20.0) * Matrf::translate(Vec3f::new(1.0, -2.0, 3.0)) * Matrf::scale(Vec3f::splat(2.0));
        let expected: Matrf = nalgebra::Matrix4::<f32>::from(m)
            .try_inverse()
            .expect("invertible")
            .into();
        let actual = m.inverse().expect("invertible");
        for i in 0..4 {
            for j in 0..4 {
                assert!((actual.m[i][j] - expected.m[i][j]).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_translate_matches_nalgebra_convention() {
        let t = Vec3f::new(1.0, 2.0, 3.0);
        let ours = Matrf::translate(t);
        let theirs: Matrf = nalgebra::Matrix4::new_translation(&nalgebra::Vector3::from(t)).into();
        assert_eq!(ours, theirs);
    }

    #[test]
    fn test_transform_point_and_vector() {
        let m = Matrd::translate(Vec3d::new(10.0, 0.0, 0.0));
        let p = Vec3d::new(1.0, 2.0, 3.0);
        assert_eq!(m.transform_point(p), Vec3d::new(11.0, 2.0, 3.0));
        assert_eq!(m.transform_vector(p), p);
    }

    #[test]
    fn test_composition_order() {
        // 先缩放再平移
        let m = Matrd::scale(Vec3d::splat(2.0)) * Matrd::translate(Vec3d::new(1.0, 0.0, 0.0));
        assert_eq!(m.transform_point(Vec3d::new(1.0, 1.0, 1.0)), Vec3d::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_axis_rotations() {
        let x = Vec3d::new(1.0, 0.0, 0.0);
        let y = Vec3d::new(0.0, 1.0, 0.0);
        let z = Vec3d::new(0.0, 0.0, 1.0);

        assert_vec_eq(Matrd::rotate_z(90.0).transform_vector(x), y, 1e-12);
        assert_vec_eq(Matrd::rotate_x(90.0).transform_vector(y), z, 1e-12);
        assert_vec_eq(Matrd::rotate_y(90.0).transform_vector(z), x, 1e-12);
    }

    #[test]
    fn test_arbitrary_axis_matches_axis_rotations() {
        let angle = 37.0;
        assert_matr_eq(&Matrd::rotate(angle, Vec3d::new(0.0, 0.0, 5.0)), &Matrd::rotate_z(angle), 1e-12);
        assert_matr_eq(&Matrd::rotate(angle, Vec3d::new(2.0, 0.0, 0.0)), &Matrd::rotate_x(angle), 1e-12);
        assert_matr_eq(&Matrd::rotate(angle, Vec3d::new(0.0, 1.0, 0.0)), &Matrd::rotate_y(angle), 1e-12);
    }

    #[test]
    fn test_rotation_preserves_length() {
        let r = Matrd::rotate(123.0, Vec3d::new(1.0, -1.0, 2.0));
        let v = Vec3d::new(3.0, -4.0, 12.0);
        assert!((r.transform_vector(v).length() - 13.0).abs() < 1e-9);
        assert!((r.determ() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_transpose() {
        let m = general();
        assert_eq!(m.transpose().transpose(), m);
        assert_eq!(m.transpose().m[3][0], m.m[0][3]);
    }

    #[test]
    fn test_view_moves_eye_to_origin() {
        let eye = Vec3d::new(0.0, 0.0, 10.0);
        let at = Vec3d::zero();
        let v = Matrd::view(eye, at, Vec3d::new(0.0, 1.0, 0.0));

        assert_vec_eq(v.transform_point(eye), Vec3d::zero(), 1e-12);
        // 注视点位于正前方 -Z 上
        assert_vec_eq(v.transform_point(at), Vec3d::new(0.0, 0.0, -10.0), 1e-12);
    }

    #[test]
    fn test_frustum_maps_near_and_far_planes() {
        let p = Matrd::frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0);
        let near = p.transform_4x4(Vec3d::new(0.0, 0.0, -1.0));
        let far = p.transform_4x4(Vec3d::new(0.0, 0.0, -100.0));
        assert!((near.z + 1.0).abs() < 1e-9);
        assert!((far.z - 1.0).abs() < 1e-9);

        let corner = p.transform_4x4(Vec3d::new(1.0, 1.0, -1.0));
        assert!((corner.x - 1.0).abs() < 1e-9);
        assert!((corner.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_perspective_is_symmetric_frustum() {
        let p = Matrd::perspective(90.0, 2.0, 1.0, 10.0);
        let f = Matrd::frustum(-2.0, 2.0, -1.0, 1.0, 1.0, 10.0);
        assert_matr_eq(&p, &f, 1e-12);
    }

    #[test]
    fn test_ortho_maps_box_to_unit_cube() {
        let o = Matrd::ortho(0.0, 800.0, 0.0, 600.0, 0.1, 10.0);
        assert_vec_eq(o.transform_point(Vec3d::new(0.0, 0.0, -0.1)), Vec3d::new(-1.0, -1.0, -1.0), 1e-12);
        assert_vec_eq(o.transform_point(Vec3d::new(800.0, 600.0, -10.0)), Vec3d::new(1.0, 1.0, 1.0), 1e-12);
    }

    #[test]
    fn test_transform_normal_under_nonuniform_scale() {
        let m = Matrd::scale(Vec3d::new(2.0, 1.0, 1.0));
        // 平面 x + y = 0 的法线
        let n = Vec3d::new(1.0, 1.0, 0.0);
        let tangent = Vec3d::new(1.0, -1.0, 0.0);

        let n2 = m.transform_normal(n);
        let t2 = m.transform_vector(tangent);
        assert!(n2.dot(&t2).abs() < 1e-12);
    }

    #[test]
    fn test_row_vector_times_matrix() {
        let m = Matrd::translate(Vec3d::new(1.0, 2.0, 3.0));
        let p = Vec4::new(1.0, 1.0, 1.0, 1.0) * m;
        assert_eq!(p, Vec4::new(2.0, 3.0, 4.0, 1.0));
    }

    #[test]
    fn test_pod_layout() {
        let m = Matrf::identity();
        let bytes: &[u8] = bytemuck::bytes_of(&m);
        assert_eq!(bytes.len(), 64);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(floats[0], 1.0);
        assert_eq!(floats[5], 1.0);
        assert_eq!(floats[1], 0.0);
    }
}
