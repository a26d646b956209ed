// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Configures the area of the framebuffer that pixels will be written to.
//!
//! The viewport is the region of the image which corresponds to the vertex coordinates `-1.0` to
//! `1.0`, while any pixel outside of the scissor box is discarded. Modifying the viewport
//! stretches the image, whereas modifying the scissor box acts like a filter.
//!
//! Either the counts, the values, or both can be dynamic. A pipeline with a dynamic viewport
//! count always has dynamic viewports as well.

use crate::{
    chain::{find_struct, slice_from_raw},
    DynamicState, DynamicStates, MAX_SCISSORS, MAX_VIEWPORTS,
};
use ash::vk;

/// The viewports and scissors of a graphics pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// The number of viewports.
    ///
    /// The default value is `0`.
    pub viewport_count: u32,

    pub viewports: [Viewport; MAX_VIEWPORTS],

    /// The number of scissors.
    ///
    /// The default value is `0`.
    pub scissor_count: u32,

    pub scissors: [Scissor; MAX_SCISSORS],

    /// Whether the clip-space depth range is `-1.0..1.0` instead of `0.0..1.0`.
    ///
    /// The default value is `false`.
    pub depth_clip_negative_one_to_one: bool,
}

impl Default for ViewportState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportState {
    /// Returns a `ViewportState` with no viewports and no scissors.
    #[inline]
    pub const fn new() -> Self {
        Self {
            viewport_count: 0,
            viewports: [Viewport::new(); MAX_VIEWPORTS],
            scissor_count: 0,
            scissors: [Scissor::new(); MAX_SCISSORS],
            depth_clip_negative_one_to_one: false,
        }
    }

    /// Builds the state from `info`.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkPipelineViewportStateCreateInfo`, including its `pNext` chain.
    ///
    /// # Panics
    ///
    /// - Panics if more than [`MAX_VIEWPORTS`] viewports or [`MAX_SCISSORS`] scissors are given.
    pub unsafe fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineViewportStateCreateInfo<'_>>,
    ) -> Self {
        let mut state = Self::new();

        let Some(info) = info else {
            return state;
        };

        if !dynamic.contains(DynamicState::VpViewportCount) {
            assert!(info.viewport_count as usize <= MAX_VIEWPORTS);
            state.viewport_count = info.viewport_count;
        }

        if !dynamic.contains(DynamicState::VpViewports) {
            assert!(info.viewport_count as usize <= MAX_VIEWPORTS);

            let viewports = unsafe { slice_from_raw(info.p_viewports, info.viewport_count) };

            for (dst, src) in state.viewports.iter_mut().zip(viewports) {
                *dst = Viewport::from(*src);
            }
        }

        if !dynamic.contains(DynamicState::VpScissorCount) {
            assert!(info.scissor_count as usize <= MAX_SCISSORS);
            state.scissor_count = info.scissor_count;
        }

        if !dynamic.contains(DynamicState::VpScissors) {
            assert!(info.scissor_count as usize <= MAX_SCISSORS);

            let scissors = unsafe { slice_from_raw(info.p_scissors, info.scissor_count) };

            for (dst, src) in state.scissors.iter_mut().zip(scissors) {
                *dst = Scissor::from(*src);
            }
        }

        if !dynamic.contains(DynamicState::VpDepthClipNegativeOneToOne) {
            let depth_clip_control: Option<&vk::PipelineViewportDepthClipControlCreateInfoEXT<'_>> =
                unsafe { find_struct(info.p_next) };

            if let Some(depth_clip_control) = depth_clip_control {
                state.depth_clip_negative_one_to_one =
                    depth_clip_control.negative_one_to_one != vk::FALSE;
            }
        }

        state
    }
}

/// State of a single viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// Coordinates in pixels of the top-left hand corner of the viewport.
    pub offset: [f32; 2],

    /// Dimensions in pixels of the viewport.
    pub extent: [f32; 2],

    /// The depth value that vertex Z coordinate `0.0` maps to.
    pub min_depth: f32,

    /// The depth value that vertex Z coordinate `1.0` maps to.
    pub max_depth: f32,
}

impl Default for Viewport {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Returns a zero-sized `Viewport`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            offset: [0.0; 2],
            extent: [0.0; 2],
            min_depth: 0.0,
            max_depth: 0.0,
        }
    }
}

impl From<vk::Viewport> for Viewport {
    #[inline]
    fn from(val: vk::Viewport) -> Self {
        Viewport {
            offset: [val.x, val.y],
            extent: [val.width, val.height],
            min_depth: val.min_depth,
            max_depth: val.max_depth,
        }
    }
}

impl From<Viewport> for vk::Viewport {
    #[inline]
    fn from(val: Viewport) -> Self {
        vk::Viewport {
            x: val.offset[0],
            y: val.offset[1],
            width: val.extent[0],
            height: val.extent[1],
            min_depth: val.min_depth,
            max_depth: val.max_depth,
        }
    }
}

/// State of a single scissor box. Also used for discard rectangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scissor {
    /// Coordinates in pixels of the top-left hand corner of the box.
    pub offset: [i32; 2],

    /// Dimensions in pixels of the box.
    pub extent: [u32; 2],
}

impl Scissor {
    /// Returns an empty `Scissor` at the origin.
    #[inline]
    pub const fn new() -> Self {
        Self {
            offset: [0; 2],
            extent: [0; 2],
        }
    }
}

impl From<vk::Rect2D> for Scissor {
    #[inline]
    fn from(val: vk::Rect2D) -> Self {
        Scissor {
            offset: [val.offset.x, val.offset.y],
            extent: [val.extent.width, val.extent.height],
        }
    }
}

impl From<Scissor> for vk::Rect2D {
    #[inline]
    fn from(val: Scissor) -> Self {
        vk::Rect2D {
            offset: vk::Offset2D {
                x: val.offset[0],
                y: val.offset[1],
            },
            extent: vk::Extent2D {
                width: val.extent[0],
                height: val.extent[1],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Scissor, Viewport, ViewportState};
    use crate::{DynamicStates, StateGroups};
    use ash::vk;

    fn viewports() -> [vk::Viewport; 2] {
        [
            vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: 640.0,
                height: 480.0,
                min_depth: 0.0,
                max_depth: 1.0,
            },
            vk::Viewport {
                x: 640.0,
                y: 0.0,
                width: 640.0,
                height: 480.0,
                min_depth: 0.5,
                max_depth: 1.0,
            },
        ]
    }

    fn scissors() -> [vk::Rect2D; 2] {
        [
            vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: vk::Extent2D {
                    width: 640,
                    height: 480,
                },
            },
            vk::Rect2D {
                offset: vk::Offset2D { x: -4, y: 8 },
                extent: vk::Extent2D {
                    width: 16,
                    height: 16,
                },
            },
        ]
    }

    #[test]
    fn static_viewports() {
        let viewports = viewports();
        let scissors = scissors();
        let mut depth_clip_control =
            vk::PipelineViewportDepthClipControlCreateInfoEXT::default().negative_one_to_one(true);
        let info = vk::PipelineViewportStateCreateInfo::default()
            .viewports(&viewports)
            .scissors(&scissors)
            .push_next(&mut depth_clip_control);

        let state = unsafe { ViewportState::from_vk(DynamicStates::empty(), Some(&info)) };

        assert_eq!(state.viewport_count, 2);
        assert_eq!(state.scissor_count, 2);
        assert_eq!(state.viewports[1].min_depth, 0.5);
        assert_eq!(vk::Viewport::from(state.viewports[0]).width, 640.0);
        assert_eq!(
            state.scissors[1],
            Scissor {
                offset: [-4, 8],
                extent: [16, 16],
            },
        );
        assert!(state.depth_clip_negative_one_to_one);
    }

    #[test]
    fn dynamic_viewports_not_read() {
        let scissors = scissors();
        // Dangling viewport pointer: must not be dereferenced when the viewports are dynamic.
        let info = vk::PipelineViewportStateCreateInfo {
            viewport_count: 2,
            p_viewports: std::ptr::NonNull::<vk::Viewport>::dangling()
                .as_ptr()
                .cast_const(),
            ..Default::default()
        }
        .scissors(&scissors);
        let dynamic = DynamicStates::from_vk(&[vk::DynamicState::VIEWPORT]);

        let state = unsafe { ViewportState::from_vk(dynamic, Some(&info)) };

        assert_eq!(state.viewport_count, 2);
        assert_eq!(state.viewports[0], Viewport::new());
        assert_eq!(state.scissors[0].extent, [640, 480]);
    }

    #[test]
    fn fully_dynamic_counts() {
        let info = vk::PipelineViewportStateCreateInfo {
            viewport_count: 3,
            scissor_count: 3,
            ..Default::default()
        };
        let dynamic = DynamicStates::from_groups(StateGroups::VIEWPORT);

        let state = unsafe { ViewportState::from_vk(dynamic, Some(&info)) };
        assert_eq!(state, ViewportState::new());
    }

    #[test]
    fn too_many_viewports() {
        let info = vk::PipelineViewportStateCreateInfo {
            viewport_count: 17,
            ..Default::default()
        };
        let dynamic = DynamicStates::from_vk(&[vk::DynamicState::VIEWPORT]);

        assert_should_panic!({
            unsafe { ViewportState::from_vk(dynamic, Some(&info)) };
        });
    }
}
