//! Responsive sizing
//!
//! Maps the current viewport width (device-independent pixels) to one of three
//! discrete size tiers and provides the breakpoint table shared by initial
//! camera setup and the resize handler.

/// Discrete viewport size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Desktop,
    Tablet,
    Mobile,
}

impl Tier {
    /// Selects the tier for a viewport width in device-independent pixels.
    ///
    /// width > 1024 is desktop, 600 < width <= 1024 is tablet, everything
    /// else (including non-positive widths) is mobile.
    pub fn for_width(width: f32) -> Self {
        if width > DESKTOP_BREAKPOINT {
            Tier::Desktop
        } else if width > TABLET_BREAKPOINT {
            Tier::Tablet
        } else {
            Tier::Mobile
        }
    }

    /// Picks one of three caller-supplied values for this tier.
    pub fn pick(self, desktop: f32, tablet: f32, mobile: f32) -> f32 {
        match self {
            Tier::Desktop => desktop,
            Tier::Tablet => tablet,
            Tier::Mobile => mobile,
        }
    }
}

pub const DESKTOP_BREAKPOINT: f32 = 1024.0;
pub const TABLET_BREAKPOINT: f32 = 600.0;

/// Returns exactly one of the three supplied values based on viewport width.
///
/// Pure and total: any numeric width is valid input. Each responsively sized
/// quantity calls this independently with its own value triple.
pub fn responsive_value(width: f32, desktop: f32, tablet: f32, mobile: f32) -> f32 {
    Tier::for_width(width).pick(desktop, tablet, mobile)
}

/// Uniform scale applied to the bounce text group (desktop/tablet/mobile).
pub fn text_scale(width: f32) -> f32 {
    responsive_value(width, 0.6, 0.45, 0.32)
}

/// Side length of the cube scattered instances are placed in.
pub fn scatter_distance(width: f32) -> f32 {
    responsive_value(width, 10.0, 8.0, 6.0)
}

/// Tier-adjusts a desktop instance-scale bound (0.8x on tablet, 0.5x on mobile).
pub fn instance_scale(width: f32, desktop: f32) -> f32 {
    responsive_value(width, desktop, desktop * 0.8, desktop * 0.5)
}

/// Orbit distance of the camera from the scene origin.
///
/// Narrow viewports pull the camera back so the scattered scene still fits.
/// Both initial camera setup and the resize handler consume this one table.
pub fn camera_distance(width: f32) -> f32 {
    if width < TABLET_BREAKPOINT {
        5.0
    } else {
        3.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_breakpoints() {
        assert_eq!(Tier::for_width(1920.0), Tier::Desktop);
        assert_eq!(Tier::for_width(1025.0), Tier::Desktop);
        // desktop requires strictly more than 1024
        assert_eq!(Tier::for_width(1024.0), Tier::Tablet);
        assert_eq!(Tier::for_width(700.0), Tier::Tablet);
        assert_eq!(Tier::for_width(601.0), Tier::Tablet);
        // tablet requires strictly more than 600
        assert_eq!(Tier::for_width(600.0), Tier::Mobile);
        assert_eq!(Tier::for_width(500.0), Tier::Mobile);
        assert_eq!(Tier::for_width(0.0), Tier::Mobile);
        assert_eq!(Tier::for_width(-100.0), Tier::Mobile);
    }

    #[test]
    fn test_responsive_value_selects_exactly_one() {
        assert_eq!(responsive_value(1920.0, 1.0, 2.0, 3.0), 1.0);
        assert_eq!(responsive_value(700.0, 1.0, 2.0, 3.0), 2.0);
        assert_eq!(responsive_value(500.0, 1.0, 2.0, 3.0), 3.0);
    }

    #[test]
    fn test_responsive_value_is_pure() {
        let a = responsive_value(800.0, 0.6, 0.45, 0.32);
        let b = responsive_value(800.0, 0.6, 0.45, 0.32);
        assert_eq!(a, b);
    }

    #[test]
    fn test_desktop_scenario() {
        // width=1920: desktop tier for every scaler call during assembly
        assert_eq!(text_scale(1920.0), 0.6);
        assert_eq!(scatter_distance(1920.0), 10.0);
        assert_eq!(instance_scale(1920.0, 1.0), 1.0);
        assert_eq!(instance_scale(1920.0, 8.0), 8.0);
    }

    #[test]
    fn test_mobile_scenario() {
        assert_eq!(text_scale(500.0), 0.32);
        assert_eq!(scatter_distance(500.0), 6.0);
        assert_eq!(camera_distance(500.0), 5.0);
    }

    #[test]
    fn test_tablet_scenario() {
        assert_eq!(text_scale(700.0), 0.45);
        assert_eq!(scatter_distance(700.0), 8.0);
        assert_eq!(camera_distance(700.0), 3.5);
    }

    #[test]
    fn test_instance_scale_multipliers() {
        assert_eq!(instance_scale(700.0, 0.5), 0.4);
        assert_eq!(instance_scale(500.0, 0.5), 0.25);
    }

    #[test]
    fn test_camera_distance_boundary() {
        // 600 is not "narrow": the mobile camera distance needs strictly less
        assert_eq!(camera_distance(600.0), 3.5);
        assert_eq!(camera_distance(599.0), 5.0);
    }
}
