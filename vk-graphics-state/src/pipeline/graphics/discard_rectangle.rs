// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! A test to discard pixels that would be written to certain areas of a framebuffer.
//!
//! The discard rectangle test is similar to, but separate from the scissor test.

use super::viewport::Scissor;
use crate::{
    chain::slice_from_raw, macros::vulkan_enum, DynamicState, DynamicStates,
    MAX_DISCARD_RECTANGLES,
};
use ash::vk;

/// The state in a graphics pipeline describing how the discard rectangle test should behave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiscardRectangleState {
    /// Sets whether the discard rectangle test operates inclusively or exclusively.
    ///
    /// The default value is [`DiscardRectangleMode::Inclusive`].
    pub mode: DiscardRectangleMode,

    /// The number of discard rectangles in use. The test is enabled when this is not zero.
    ///
    /// The default value is `0`.
    pub rectangle_count: u32,

    /// Specifies the discard rectangles.
    pub rectangles: [Scissor; MAX_DISCARD_RECTANGLES],
}

impl Default for DiscardRectangleState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DiscardRectangleState {
    /// Returns a `DiscardRectangleState` with no rectangles.
    #[inline]
    pub const fn new() -> Self {
        Self {
            mode: DiscardRectangleMode::Inclusive,
            rectangle_count: 0,
            rectangles: [Scissor::new(); MAX_DISCARD_RECTANGLES],
        }
    }

    /// Builds the state from `info`, which is found in the `pNext` chain of the pipeline create
    /// info itself.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkPipelineDiscardRectangleStateCreateInfoEXT`.
    ///
    /// # Panics
    ///
    /// - Panics if more than [`MAX_DISCARD_RECTANGLES`] rectangles are given.
    pub unsafe fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineDiscardRectangleStateCreateInfoEXT<'_>>,
    ) -> Self {
        let mut state = Self::new();

        let Some(info) = info else {
            return state;
        };

        assert!(info.discard_rectangle_count as usize <= MAX_DISCARD_RECTANGLES);

        if !dynamic.contains(DynamicState::DrMode) {
            state.mode = DiscardRectangleMode::from_vk(info.discard_rectangle_mode);
        }

        state.rectangle_count = info.discard_rectangle_count;

        if !dynamic.contains(DynamicState::DrRectangles) {
            let rectangles = unsafe {
                slice_from_raw(info.p_discard_rectangles, info.discard_rectangle_count)
            };

            for (dst, src) in state.rectangles.iter_mut().zip(rectangles) {
                *dst = Scissor::from(*src);
            }
        }

        state
    }
}

vulkan_enum! {
    /// The mode in which the discard rectangle test operates.
    DiscardRectangleMode = DiscardRectangleModeEXT(i32);

    /// Samples that are inside a rectangle are kept, samples that are outside all rectangles
    /// are discarded.
    Inclusive = INCLUSIVE,

    /// Samples that are inside a rectangle are discarded, samples that are outside all rectangles
    /// are kept.
    Exclusive = EXCLUSIVE,
}

impl Default for DiscardRectangleMode {
    #[inline]
    fn default() -> Self {
        Self::Inclusive
    }
}

#[cfg(test)]
mod tests {
    use super::{DiscardRectangleMode, DiscardRectangleState};
    use crate::{pipeline::graphics::viewport::Scissor, DynamicState, DynamicStates};
    use ash::vk;

    fn rectangles() -> [vk::Rect2D; 2] {
        [
            vk::Rect2D {
                offset: vk::Offset2D { x: 1, y: 2 },
                extent: vk::Extent2D {
                    width: 3,
                    height: 4,
                },
            },
            vk::Rect2D::default(),
        ]
    }

    #[test]
    fn static_rectangles() {
        let rectangles = rectangles();
        let info = vk::PipelineDiscardRectangleStateCreateInfoEXT::default()
            .discard_rectangle_mode(vk::DiscardRectangleModeEXT::EXCLUSIVE)
            .discard_rectangles(&rectangles);

        let state = unsafe { DiscardRectangleState::from_vk(DynamicStates::empty(), Some(&info)) };
        assert_eq!(state.mode, DiscardRectangleMode::Exclusive);
        assert_eq!(state.rectangle_count, 2);
        assert_eq!(
            state.rectangles[0],
            Scissor {
                offset: [1, 2],
                extent: [3, 4],
            },
        );
    }

    #[test]
    fn dynamic_rectangles_keep_count() {
        let rectangles = rectangles();
        let info = vk::PipelineDiscardRectangleStateCreateInfoEXT::default()
            .discard_rectangles(&rectangles);
        let dynamic = DynamicStates::from(DynamicState::DrRectangles);

        let state = unsafe { DiscardRectangleState::from_vk(dynamic, Some(&info)) };
        assert_eq!(state.rectangle_count, 2);
        assert_eq!(state.rectangles[0], Scissor::new());
    }

    #[test]
    fn too_many_rectangles() {
        let rectangles = [vk::Rect2D::default(); 5];
        let info = vk::PipelineDiscardRectangleStateCreateInfoEXT::default()
            .discard_rectangles(&rectangles);

        assert_should_panic!({
            unsafe { DiscardRectangleState::from_vk(DynamicStates::empty(), Some(&info)) };
        });
    }
}
