//! Per-eye viewport and projection geometry.
//!
//! The free functions are pure over a config snapshot. [`StereoDisplay`] binds
//! them to the live configuration for the host's display queries.

use std::sync::Arc;

use openstereo_profile::{MIN_CONVERGENCE, StereoConfig};

use crate::shared::LiveConfig;

/// Which eye a query is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// The other eye.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Pixel rectangle of one eye inside the output window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Tangent-space frustum extents, as the host's `GetProjectionRaw` expects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectionBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Placement of the output window on the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Lens-corrected texture coordinates per color channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistortionCoordinates {
    pub red: [f32; 2],
    pub green: [f32; 2],
    pub blue: [f32; 2],
}

/// The optical inputs of [`projection_raw`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumGeometry {
    /// Horizontal field of view in degrees
    pub fov: f32,
    pub aspect_ratio: f32,
}

impl FrustumGeometry {
    pub fn from_config(config: &StereoConfig) -> Self {
        Self {
            fov: config.fov,
            aspect_ratio: config.aspect_ratio,
        }
    }
}

/// Where `eye` is drawn in the output window.
///
/// Side-by-side splits the width; top/bottom splits the height, leaving
/// `framepack_offset` pixels between the two images. `reverse_enable` swaps
/// the eyes.
pub fn eye_viewport(eye: Eye, config: &StereoConfig) -> ViewportRect {
    let eye = if config.reverse_enable { eye.opposite() } else { eye };

    if config.tab_enable {
        let height = config.window_height.saturating_sub(config.framepack_offset) / 2;
        let y = match eye {
            Eye::Left => 0,
            Eye::Right => height.saturating_add(config.framepack_offset),
        };
        ViewportRect {
            x: 0,
            y,
            width: config.window_width,
            height,
        }
    } else {
        let width = config.window_width / 2;
        let x = match eye {
            Eye::Left => 0,
            Eye::Right => width,
        };
        let (y, height) = if config.vd_fsbs_hack {
            (config.window_height / 4, config.window_height / 2)
        } else {
            (0, config.window_height)
        };
        ViewportRect { x, y, width, height }
    }
}

/// Frustum of `eye`.
///
/// Depth and convergence are coupled as a ratio: both frusta are shifted
/// horizontally by `depth / (2 * convergence)`, towards `+x` for the left eye
/// and `-x` for the right. Convergence is floored at [`MIN_CONVERGENCE`]
/// before dividing.
pub fn projection_raw(
    eye: Eye,
    geometry: &FrustumGeometry,
    depth: f32,
    convergence: f32,
) -> ProjectionBounds {
    let convergence = convergence.max(MIN_CONVERGENCE);
    let shift = depth / (2.0 * convergence);
    let offset = match eye {
        Eye::Left => shift,
        Eye::Right => -shift,
    };

    let horizontal = (geometry.fov.to_radians() / 2.0).tan();
    let vertical = horizontal / geometry.aspect_ratio;

    ProjectionBounds {
        left: -horizontal + offset,
        right: horizontal + offset,
        top: -vertical,
        bottom: vertical,
    }
}

/// Display queries the host makes against the device.
pub trait DisplayComponent: Send + Sync {
    fn window_bounds(&self) -> WindowBounds;

    fn recommended_render_target_size(&self) -> (u32, u32);

    fn eye_viewport(&self, eye: Eye) -> ViewportRect;

    fn projection_raw(&self, eye: Eye) -> ProjectionBounds;

    fn compute_distortion(&self, eye: Eye, u: f32, v: f32) -> DistortionCoordinates;

    fn is_display_on_desktop(&self) -> bool {
        false
    }

    fn is_display_real_display(&self) -> bool {
        false
    }
}

/// The stereo display over the live configuration.
#[derive(Debug, Clone)]
pub struct StereoDisplay {
    live: Arc<LiveConfig>,
}

impl StereoDisplay {
    pub fn new(live: Arc<LiveConfig>) -> Self {
        Self { live }
    }

    /// Both frusta for an explicit convergence, with geometry and depth
    /// read from the live config.
    pub fn projections_with(&self, convergence: f32) -> (ProjectionBounds, ProjectionBounds) {
        let geometry = self.live.read(FrustumGeometry::from_config);
        let depth = self.live.depth();
        (
            projection_raw(Eye::Left, &geometry, depth, convergence),
            projection_raw(Eye::Right, &geometry, depth, convergence),
        )
    }
}

impl DisplayComponent for StereoDisplay {
    fn window_bounds(&self) -> WindowBounds {
        self.live.read(|c| WindowBounds {
            x: c.window_x,
            y: c.window_y,
            width: c.window_width,
            height: c.window_height,
        })
    }

    fn recommended_render_target_size(&self) -> (u32, u32) {
        self.live.read(|c| (c.render_width, c.render_height))
    }

    fn eye_viewport(&self, eye: Eye) -> ViewportRect {
        self.live.read(|c| eye_viewport(eye, c))
    }

    fn projection_raw(&self, eye: Eye) -> ProjectionBounds {
        let geometry = self.live.read(FrustumGeometry::from_config);
        projection_raw(eye, &geometry, self.live.depth(), self.live.convergence())
    }

    fn compute_distortion(&self, _eye: Eye, u: f32, v: f32) -> DistortionCoordinates {
        DistortionCoordinates {
            red: [u, v],
            green: [u, v],
            blue: [u, v],
        }
    }
}
