// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Helpers for reading Vulkan create-info structures and their `pNext` chains.

use ash::vk;
use std::{ffi::c_void, slice};

/// Finds the first structure of type `T` in the `pNext` chain starting at `p_next`.
///
/// # Safety
///
/// - `p_next` must be null or point to a valid chain of Vulkan structures that outlives `'a`.
pub(crate) unsafe fn find_struct<'a, T: vk::TaggedStructure>(p_next: *const c_void) -> Option<&'a T> {
    let mut next = p_next.cast::<vk::BaseInStructure<'a>>();

    // SAFETY: The caller must ensure that every pointer in the chain is valid.
    while let Some(base) = unsafe { next.as_ref() } {
        if base.s_type == T::STRUCTURE_TYPE {
            // SAFETY: `s_type` identifies the structure as a `T`.
            return Some(unsafe { &*next.cast::<T>() });
        }

        next = base.p_next;
    }

    None
}

/// Turns a Vulkan pointer and count pair into a slice.
///
/// # Safety
///
/// - If `len` is not zero and `ptr` is not null, `ptr` must point to `len` valid elements that
///   outlive `'a`.
pub(crate) unsafe fn slice_from_raw<'a, T>(ptr: *const T, len: u32) -> &'a [T] {
    if len == 0 || ptr.is_null() {
        &[]
    } else {
        // SAFETY: Guaranteed by the caller.
        unsafe { slice::from_raw_parts(ptr, len as usize) }
    }
}

/// Returns the dynamic rendering information of a pipeline create info, if any.
///
/// This is only meaningful when `info.render_pass` is null. With a real render pass object, the
/// driver provides the equivalent information itself.
///
/// # Safety
///
/// - `info` must be a valid `VkGraphicsPipelineCreateInfo`.
pub(crate) unsafe fn rendering_create_info<'a>(
    info: &'a vk::GraphicsPipelineCreateInfo<'_>,
) -> Option<&'a vk::PipelineRenderingCreateInfo<'a>> {
    unsafe { find_struct(info.p_next) }
}

/// Returns the per-attachment sample counts of a pipeline create info, if any.
///
/// # Safety
///
/// - `info` must be a valid `VkGraphicsPipelineCreateInfo`.
pub(crate) unsafe fn sample_count_info<'a>(
    info: &'a vk::GraphicsPipelineCreateInfo<'_>,
) -> Option<&'a vk::AttachmentSampleCountInfoAMD<'a>> {
    unsafe { find_struct(info.p_next) }
}
