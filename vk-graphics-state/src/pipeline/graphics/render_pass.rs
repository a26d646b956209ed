// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The attachments that a graphics pipeline renders into.
//!
//! With a render pass object, the driver knows everything about the attachments and hands over a
//! ready-made [`RenderPassState`]. With dynamic rendering, the formats come from
//! `VkPipelineRenderingCreateInfo` instead, but only the pipeline (or library) that provides the
//! fragment output interface is allowed to look at them. Other libraries only get the view mask,
//! and produce an *incomplete* state that is completed when the libraries are linked.

use crate::{
    chain::{rendering_create_info, sample_count_info, slice_from_raw},
    image::{ImageAspects, SampleCount},
    pipeline::GraphicsPipelineLibraryFlags,
    MAX_COLOR_ATTACHMENTS,
};
use ash::vk;

/// The render pass or dynamic rendering information of a graphics pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderPassState {
    /// The aspects of all attachments together, or `None` if they aren't known yet.
    ///
    /// The default value is `Some(ImageAspects::empty())`.
    pub attachment_aspects: Option<ImageAspects>,

    /// The views that are rendered to, when multiview is used.
    ///
    /// The default value is `0`.
    pub view_mask: u32,

    /// The number of color attachments.
    ///
    /// The default value is `0`.
    pub color_attachment_count: u32,

    /// The format of each color attachment, or `vk::Format::UNDEFINED` if it is unused.
    pub color_attachment_formats: [vk::Format; MAX_COLOR_ATTACHMENTS],

    /// The format of the depth attachment, or `vk::Format::UNDEFINED` if there is none.
    pub depth_attachment_format: vk::Format,

    /// The format of the stencil attachment, or `vk::Format::UNDEFINED` if there is none.
    pub stencil_attachment_format: vk::Format,

    /// The sample count of each color attachment, when it differs from the rasterization sample
    /// count.
    ///
    /// The default value is [`SampleCount::Sample1`] for every attachment.
    pub color_attachment_samples: [SampleCount; MAX_COLOR_ATTACHMENTS],

    /// The sample count of the depth/stencil attachment.
    ///
    /// The default value is [`SampleCount::Sample1`].
    pub depth_stencil_attachment_samples: SampleCount,
}

impl Default for RenderPassState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassState {
    /// Returns a complete `RenderPassState` with no attachments.
    #[inline]
    pub const fn new() -> Self {
        Self {
            attachment_aspects: Some(ImageAspects::empty()),
            view_mask: 0,
            color_attachment_count: 0,
            color_attachment_formats: [vk::Format::UNDEFINED; MAX_COLOR_ATTACHMENTS],
            depth_attachment_format: vk::Format::UNDEFINED,
            stencil_attachment_format: vk::Format::UNDEFINED,
            color_attachment_samples: [SampleCount::Sample1; MAX_COLOR_ATTACHMENTS],
            depth_stencil_attachment_samples: SampleCount::Sample1,
        }
    }

    /// Returns an incomplete `RenderPassState`, which only knows the view mask.
    #[inline]
    pub const fn incomplete(view_mask: u32) -> Self {
        Self {
            attachment_aspects: None,
            view_mask,
            ..Self::new()
        }
    }

    /// Returns whether the attachment information is known.
    #[inline]
    pub const fn is_complete(&self) -> bool {
        self.attachment_aspects.is_some()
    }

    /// Returns whether the state is complete and has at least one color attachment.
    #[inline]
    pub fn has_color(&self) -> bool {
        self.has_aspects(ImageAspects::COLOR)
    }

    /// Returns whether the state is complete and has a depth attachment.
    #[inline]
    pub fn has_depth(&self) -> bool {
        self.has_aspects(ImageAspects::DEPTH)
    }

    /// Returns whether the state is complete and has a stencil attachment.
    #[inline]
    pub fn has_stencil(&self) -> bool {
        self.has_aspects(ImageAspects::STENCIL)
    }

    fn has_aspects(&self, aspects: ImageAspects) -> bool {
        self.attachment_aspects
            .is_some_and(|present| present.intersects(aspects))
    }

    /// Builds the state for a pipeline, or pipeline library, that provides `lib`.
    ///
    /// - If `old` is complete, it is returned unchanged.
    /// - If `info` has a render pass object, `driver_rp` is its state and is returned unchanged.
    /// - Otherwise, the state is read from `VkPipelineRenderingCreateInfo`. Without the fragment
    ///   output interface, only the view mask is read and the result is incomplete.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkGraphicsPipelineCreateInfo`, including its `pNext` chain.
    ///
    /// # Panics
    ///
    /// - Panics if there are more than [`MAX_COLOR_ATTACHMENTS`] color attachments.
    /// - Panics if `VkAttachmentSampleCountInfoAMD` doesn't describe every color attachment.
    pub unsafe fn from_vk(
        old: Option<&RenderPassState>,
        driver_rp: Option<&RenderPassState>,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
        lib: GraphicsPipelineLibraryFlags,
    ) -> Self {
        if let Some(old) = old.filter(|old| old.is_complete()) {
            return *old;
        }

        let has_render_pass = info.render_pass != vk::RenderPass::null();

        if has_render_pass {
            if let Some(driver_rp) = driver_rp {
                return *driver_rp;
            }
        }

        let mut state = Self::new();

        let Some(rendering_info) = (unsafe { rendering_create_info(info) }) else {
            return state;
        };

        state.view_mask = rendering_info.view_mask;

        if !has_render_pass && !lib.intersects(GraphicsPipelineLibraryFlags::FRAGMENT_OUTPUT_INTERFACE)
        {
            return Self::incomplete(rendering_info.view_mask);
        }

        assert!(rendering_info.color_attachment_count as usize <= MAX_COLOR_ATTACHMENTS);

        let mut aspects = ImageAspects::empty();
        let color_formats = unsafe {
            slice_from_raw(
                rendering_info.p_color_attachment_formats,
                rendering_info.color_attachment_count,
            )
        };

        state.color_attachment_count = rendering_info.color_attachment_count;

        for (dst, &format) in state.color_attachment_formats.iter_mut().zip(color_formats) {
            *dst = format;

            if format != vk::Format::UNDEFINED {
                aspects |= ImageAspects::COLOR;
            }
        }

        state.depth_attachment_format = rendering_info.depth_attachment_format;

        if rendering_info.depth_attachment_format != vk::Format::UNDEFINED {
            aspects |= ImageAspects::DEPTH;
        }

        state.stencil_attachment_format = rendering_info.stencil_attachment_format;

        if rendering_info.stencil_attachment_format != vk::Format::UNDEFINED {
            aspects |= ImageAspects::STENCIL;
        }

        state.attachment_aspects = Some(aspects);

        if let Some(samples_info) = unsafe { sample_count_info(info) } {
            assert_eq!(
                samples_info.color_attachment_count, state.color_attachment_count,
                "the attachment sample count info doesn't describe every color attachment",
            );

            let color_samples = unsafe {
                slice_from_raw(
                    samples_info.p_color_attachment_samples,
                    samples_info.color_attachment_count,
                )
            };

            for (dst, &samples) in state.color_attachment_samples.iter_mut().zip(color_samples) {
                *dst = SampleCount::from_vk(samples);
            }

            // Zero means that there is no depth/stencil attachment.
            if !samples_info.depth_stencil_attachment_samples.is_empty() {
                state.depth_stencil_attachment_samples =
                    SampleCount::from_vk(samples_info.depth_stencil_attachment_samples);
            }
        }

        state
    }
}
