/// Directional lighting model used to shade flat faces and gradient samples
use nalgebra::Vector3;

use crate::color::Color;
use crate::surface::Paint;
use crate::vector;

/// Material shading category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Finish {
    /// Ignores every light and keeps the base color.
    Constant,
    #[default]
    Matte,
    Plastic,
    Metal,
}

/// Ambient/diffuse/specular weights of a finish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishParams {
    pub ka: f64,
    pub kd: f64,
    pub ks: f64,
    pub roughness: f64,
}

impl Finish {
    pub fn params(self) -> FinishParams {
        match self {
            Finish::Constant => FinishParams {
                ka: 1.0,
                kd: 0.0,
                ks: 0.0,
                roughness: 1.0,
            },
            Finish::Matte => FinishParams {
                ka: 0.2,
                kd: 0.8,
                ks: 0.0,
                roughness: 0.05,
            },
            Finish::Plastic => FinishParams {
                ka: 0.2,
                kd: 0.7,
                ks: 0.6,
                roughness: 0.05,
            },
            Finish::Metal => FinishParams {
                ka: 0.35,
                kd: 0.3,
                ks: 0.8,
                roughness: 0.05,
            },
        }
    }

    /// Exponent of the specular lobe.
    pub fn shininess(self) -> f64 {
        match self {
            Finish::Constant | Finish::Matte => 0.0,
            Finish::Plastic | Finish::Metal => 1.0 / self.params().roughness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub finish: Finish,
    pub color: Color,
}

impl Material {
    pub fn new(finish: Finish, color: Color) -> Self {
        Self { finish, color }
    }
}

/// Fill descriptor of an object: a flat color or a lit material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Flat(Color),
    Material(Material),
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Fill::Flat(color)
    }
}

impl From<Material> for Fill {
    fn from(material: Material) -> Self {
        Fill::Material(material)
    }
}

/// A directional light; `direction` is the way the light travels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub direction: Vector3<f64>,
    pub color: Color,
    pub intensity: f64,
}

impl Light {
    pub fn new(direction: Vector3<f64>, color: Color) -> Self {
        Self {
            direction,
            color,
            intensity: 1.0,
        }
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ambient {
    pub color: Color,
    pub intensity: f64,
}

impl Default for Ambient {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
        }
    }
}

/// The lighting model: a set of lights seen from a fixed view direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    /// Direction the viewer looks along.
    pub incident: Vector3<f64>,
    pub lights: Vec<Light>,
    pub ambient: Ambient,
    pub specular: Color,
}

impl Lighting {
    pub fn new(
        incident: Vector3<f64>,
        lights: Vec<Light>,
        ambient: Ambient,
        specular: Color,
    ) -> Self {
        Self {
            incident: vector::normalize(&incident),
            lights,
            ambient,
            specular,
        }
    }

    /// Summed Lambert term of every light, weighted by intensity.
    pub fn diffuse(&self, normal: &Vector3<f64>) -> f64 {
        let n = vector::normalize(normal);
        self.lights
            .iter()
            .map(|light| light.intensity * lambert(&n, light))
            .sum()
    }

    /// Summed specular term of every light for the given exponent.
    pub fn specular(&self, normal: &Vector3<f64>, exponent: f64) -> f64 {
        let n = vector::normalize(normal);
        self.lights
            .iter()
            .map(|light| light.intensity * highlight(&n, light, &self.incident, exponent))
            .sum()
    }

    /// Shades `material` for a face with the given normal.
    pub fn shade(&self, normal: &Vector3<f64>, material: &Material) -> Color {
        if material.finish == Finish::Constant {
            return material.color;
        }

        let params = material.finish.params();
        let exponent = material.finish.shininess();
        let n = vector::normalize(normal);
        let base = material.color;
        let highlight_tint = match material.finish {
            Finish::Metal => base,
            _ => self.specular,
        };

        let ambient = [
            self.ambient.intensity * self.ambient.color.r,
            self.ambient.intensity * self.ambient.color.g,
            self.ambient.intensity * self.ambient.color.b,
        ];
        let mut diffuse = [0.0; 3];
        let mut specular = [0.0; 3];
        for light in &self.lights {
            let d = light.intensity * lambert(&n, light);
            diffuse[0] += d * light.color.r;
            diffuse[1] += d * light.color.g;
            diffuse[2] += d * light.color.b;
            if exponent > 0.0 && params.ks > 0.0 {
                let s = light.intensity * highlight(&n, light, &self.incident, exponent);
                specular[0] += s * light.color.r;
                specular[1] += s * light.color.g;
                specular[2] += s * light.color.b;
            }
        }

        let channel = |i: usize, base: f64, tint: f64| {
            base * (params.ka * ambient[i] + params.kd * diffuse[i])
                + params.ks * specular[i] * tint
        };
        Color::rgba(
            channel(0, base.r, highlight_tint.r),
            channel(1, base.g, highlight_tint.g),
            channel(2, base.b, highlight_tint.b),
            base.a,
        )
        .clamped()
    }

    /// Resolves a fill descriptor into a flat 2D paint for a face.
    pub fn fill(&self, normal: &Vector3<f64>, fill: &Fill) -> Paint {
        match fill {
            Fill::Flat(color) => Paint::Solid(*color),
            Fill::Material(material) => Paint::Solid(self.shade(normal, material)),
        }
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::new(
            Vector3::new(0.0, 0.0, 1.0),
            Vec::new(),
            Ambient::default(),
            Color::WHITE,
        )
    }
}

fn lambert(n: &Vector3<f64>, light: &Light) -> f64 {
    let l = vector::normalize(&light.direction);
    vector::dot(n, &-l).max(0.0)
}

fn highlight(n: &Vector3<f64>, light: &Light, incident: &Vector3<f64>, exponent: f64) -> f64 {
    let l = vector::normalize(&light.direction);
    if n.dot(&-l) <= 0.0 {
        return 0.0;
    }
    let reflected = l - n * (2.0 * l.dot(n));
    reflected.dot(&-incident).max(0.0).powf(exponent)
}
