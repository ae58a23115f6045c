use crate::error::PipelineError;

use super::ClearColor;

/// Depth value the depth buffer is cleared to (the far plane).
pub const CLEAR_DEPTH: f32 = 1.0;

/// Size of the offscreen target in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel rectangle draws are mapped into.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(size: TargetSize) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    fn fits(self, size: TargetSize) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.saturating_add(self.width) <= size.width
            && self.y.saturating_add(self.height) <= size.height
    }
}

/// One non-instanced draw of the scene's geometry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub first: u32,
    pub count: u32,
    pub indexed: bool,
}

/// What a scene asks of the surface for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassDesc {
    pub clear_color: ClearColor,
    pub depth_test: bool,
    pub draw: DrawCall,
}

/// A single surface operation, in execution order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SurfaceStep {
    /// Match the offscreen target to the visible surface.
    ResizeTarget(TargetSize),
    SetViewport(Viewport),
    EnableDepthTest,
    /// `depth` is `Some` only when the depth buffer is cleared too.
    Clear { color: ClearColor, depth: Option<f32> },
    Draw(DrawCall),
    /// Copy the finished offscreen image onto the visible surface.
    Blit,
}

/// Plans one frame: resize, viewport, optional depth enable, clear, draw, blit.
///
/// A zero-sized surface still gets a 1x1 target so the plan is always valid;
/// callers skip presenting while minimized.
pub fn plan_frame(surface: TargetSize, pass: &PassDesc) -> Vec<SurfaceStep> {
    let size = TargetSize::new(surface.width.max(1), surface.height.max(1));

    let mut steps = vec![
        SurfaceStep::ResizeTarget(size),
        SurfaceStep::SetViewport(Viewport::full(size)),
    ];
    if pass.depth_test {
        steps.push(SurfaceStep::EnableDepthTest);
    }
    steps.push(SurfaceStep::Clear {
        color: pass.clear_color,
        depth: pass.depth_test.then_some(CLEAR_DEPTH),
    });
    steps.push(SurfaceStep::Draw(pass.draw));
    steps.push(SurfaceStep::Blit);
    steps
}

/// A validated frame, ready to be executed on the GPU.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassRecipe {
    pub size: TargetSize,
    pub viewport: Viewport,
    pub depth_test: bool,
    pub clear_color: ClearColor,
    pub clear_depth: Option<f32>,
    pub draw: Option<DrawCall>,
}

impl PassRecipe {
    /// Checks the step order and folds the steps into one render pass.
    pub fn from_steps(steps: &[SurfaceStep]) -> Result<Self, PipelineError> {
        let order = |reason: &str| PipelineError::StepOrder {
            reason: reason.to_string(),
        };

        let Some((SurfaceStep::ResizeTarget(size), rest)) = steps.split_first() else {
            return Err(order("the target must be resized first"));
        };
        let size = *size;
        if size.is_empty() {
            return Err(order("the target cannot be resized to zero"));
        }
        let Some((SurfaceStep::Blit, body)) = rest.split_last() else {
            return Err(order("the blit must be the last step"));
        };

        let mut viewport = None;
        let mut depth_test = false;
        let mut clear = None;
        let mut draw = None;

        for step in body {
            match *step {
                SurfaceStep::ResizeTarget(_) => {
                    return Err(order("the target can only be resized once per frame"));
                }
                SurfaceStep::Blit => return Err(order("the blit must be the last step")),
                SurfaceStep::SetViewport(v) => {
                    if clear.is_some() {
                        return Err(order("the viewport must be set before clearing"));
                    }
                    if !v.fits(size) {
                        return Err(order("the viewport lies outside the target"));
                    }
                    viewport = Some(v);
                }
                SurfaceStep::EnableDepthTest => {
                    if clear.is_some() {
                        return Err(order("depth testing must be enabled before clearing"));
                    }
                    depth_test = true;
                }
                SurfaceStep::Clear { color, depth } => {
                    if clear.is_some() {
                        return Err(order("the target is cleared once per frame"));
                    }
                    if depth.is_some() && !depth_test {
                        return Err(order("depth cleared before depth testing was enabled"));
                    }
                    clear = Some((color, depth));
                }
                SurfaceStep::Draw(call) => {
                    if clear.is_none() {
                        return Err(order("drawing before the target was cleared"));
                    }
                    if draw.is_some() {
                        return Err(order("only one draw per frame is supported"));
                    }
                    draw = Some(call);
                }
            }
        }

        let Some((clear_color, clear_depth)) = clear else {
            return Err(order("the target is never cleared"));
        };
        if depth_test && clear_depth.is_none() {
            return Err(order("depth testing needs a depth clear"));
        }

        Ok(Self {
            size,
            viewport: viewport.unwrap_or(Viewport::full(size)),
            depth_test,
            clear_color,
            clear_depth,
            draw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(depth_test: bool) -> PassDesc {
        PassDesc {
            clear_color: ClearColor::CYAN,
            depth_test,
            draw: DrawCall {
                first: 0,
                count: 36,
                indexed: true,
            },
        }
    }

    // ── plan_frame ────────────────────────────────────────────────────────

    #[test]
    fn depth_scene_plans_enable_before_clear() {
        let steps = plan_frame(TargetSize::new(640, 480), &pass(true));
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[0], SurfaceStep::ResizeTarget(TargetSize::new(640, 480)));
        assert_eq!(steps[2], SurfaceStep::EnableDepthTest);
        assert_eq!(
            steps[3],
            SurfaceStep::Clear {
                color: ClearColor::CYAN,
                depth: Some(CLEAR_DEPTH)
            }
        );
        assert_eq!(steps.last(), Some(&SurfaceStep::Blit));
    }

    #[test]
    fn flat_scene_skips_depth() {
        let steps = plan_frame(TargetSize::new(10, 10), &pass(false));
        assert!(!steps.contains(&SurfaceStep::EnableDepthTest));
        let recipe = PassRecipe::from_steps(&steps).unwrap();
        assert!(!recipe.depth_test);
        assert_eq!(recipe.clear_depth, None);
        assert_eq!(recipe.viewport, Viewport::full(TargetSize::new(10, 10)));
    }

    #[test]
    fn minimized_surface_plans_unit_target() {
        let steps = plan_frame(TargetSize::new(0, 300), &pass(false));
        assert_eq!(steps[0], SurfaceStep::ResizeTarget(TargetSize::new(1, 300)));
        PassRecipe::from_steps(&steps).unwrap();
    }

    #[test]
    fn planned_frame_round_trips_into_recipe() {
        let recipe = PassRecipe::from_steps(&plan_frame(TargetSize::new(8, 4), &pass(true))).unwrap();
        assert!(recipe.depth_test);
        assert_eq!(recipe.draw, Some(pass(true).draw));
        assert_eq!(recipe.clear_color, ClearColor::CYAN);
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn depth_clear_before_enable_is_rejected() {
        let mut steps = plan_frame(TargetSize::new(8, 8), &pass(true));
        steps.swap(2, 3);
        let err = PassRecipe::from_steps(&steps).unwrap_err();
        assert!(matches!(err, PipelineError::StepOrder { .. }));
    }

    #[test]
    fn draw_before_clear_is_rejected() {
        let mut steps = plan_frame(TargetSize::new(8, 8), &pass(false));
        steps.swap(2, 3);
        assert!(matches!(
            PassRecipe::from_steps(&steps),
            Err(PipelineError::StepOrder { .. })
        ));
    }

    #[test]
    fn blit_must_be_last() {
        let mut steps = plan_frame(TargetSize::new(8, 8), &pass(false));
        let blit = steps.pop().unwrap();
        steps.insert(3, blit);
        assert!(PassRecipe::from_steps(&steps).is_err());
    }

    #[test]
    fn resize_must_come_first() {
        let mut steps = plan_frame(TargetSize::new(8, 8), &pass(false));
        steps.swap(0, 1);
        assert!(PassRecipe::from_steps(&steps).is_err());
        assert!(PassRecipe::from_steps(&[]).is_err());
    }

    #[test]
    fn oversized_viewport_is_rejected() {
        let steps = [
            SurfaceStep::ResizeTarget(TargetSize::new(8, 8)),
            SurfaceStep::SetViewport(Viewport {
                x: 4,
                y: 0,
                width: 8,
                height: 8,
            }),
            SurfaceStep::Clear {
                color: ClearColor::BLACK,
                depth: None,
            },
            SurfaceStep::Blit,
        ];
        assert!(PassRecipe::from_steps(&steps).is_err());
    }

    #[test]
    fn clear_only_frame_has_no_draw() {
        let steps = [
            SurfaceStep::ResizeTarget(TargetSize::new(8, 8)),
            SurfaceStep::Clear {
                color: ClearColor::BLACK,
                depth: None,
            },
            SurfaceStep::Blit,
        ];
        let recipe = PassRecipe::from_steps(&steps).unwrap();
        assert_eq!(recipe.draw, None);
        assert_eq!(recipe.viewport, Viewport::full(TargetSize::new(8, 8)));
    }
}
