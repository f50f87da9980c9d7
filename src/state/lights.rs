use cgmath::Vector3;

/// Point light with inverse-distance attenuation `1 / (c + l*d + q*d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,

    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vector3::new(3.0, -3.0, 0.0),
            ambient: Vector3::new(0.5, 0.5, 0.5),
            diffuse: Vector3::new(1.0, 0.9, 0.7),
            specular: Vector3::new(1.0, 1.0, 1.0),
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

impl PointLight {
    /// Attenuation factor at `distance`
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vector3::new(-10.0, -5.0, -2.0),
            ambient: Vector3::new(0.3, 0.3, 0.3),
            diffuse: Vector3::new(1.0, 0.9, 0.7),
            specular: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation() {
        let mut light = PointLight::default();
        assert_eq!(light.attenuation(10.0), 1.0);

        light.linear = 0.5;
        light.quadratic = 0.25;
        // 1 / (1 + 0.5*2 + 0.25*4) = 1/3
        assert!((light.attenuation(2.0) - 1.0 / 3.0).abs() < 1e-6);
    }
}
