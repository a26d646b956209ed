// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Graphics pipeline state tracking for Vulkan driver runtimes.
//!
//! A Vulkan graphics pipeline can receive its fixed-function state in three ways: baked into the
//! pipeline object, supplied per draw through `vkCmdSet*` commands, or inherited from pipeline
//! libraries that are linked together. This crate reconciles those into a single canonical
//! snapshot that a driver backend can consume when emitting hardware commands.
//!
//! # Brief summary
//!
//! - Every individually settable piece of state is a [`DynamicState`]. Each one belongs to
//!   exactly one group of [`StateGroups`], which mirrors a pipeline create-info sub-structure.
//!   Sets of states are stored in a [`DynamicStates`] bitset.
//!
//! - A [`GraphicsPipelineState`] is built from a `VkGraphicsPipelineCreateInfo` with
//!   [`GraphicsPipelineState::fill`]. It holds one normalized value per group that the pipeline
//!   (or pipeline library) provides statically. Pipeline libraries are linked with
//!   [`GraphicsPipelineState::merge`], and an independent snapshot is taken with
//!   [`GraphicsPipelineState::copy`].
//!
//! - A [`DynamicGraphicsState`] is the live state of a command buffer. It is filled from the
//!   bound pipeline, updated by one setter per `vkCmdSet*` command, and tracks which values
//!   changed since the driver last looked at them.
//!
//! - [`DepthStencilState::optimize`] removes depth/stencil work that can have no observable
//!   effect given the attachments that are actually present.
//!
//! # Errors
//!
//! Running out of host memory while building pipeline state is the only recoverable error, and is
//! reported as [`OomError`]. Everything else this crate checks is a violation of rules that
//! Vulkan's own validation already enforces, and causes a panic.
//!
//! [`GraphicsPipelineState`]: crate::pipeline::graphics::GraphicsPipelineState
//! [`GraphicsPipelineState::fill`]: crate::pipeline::graphics::GraphicsPipelineState::fill
//! [`GraphicsPipelineState::merge`]: crate::pipeline::graphics::GraphicsPipelineState::merge
//! [`GraphicsPipelineState::copy`]: crate::pipeline::graphics::GraphicsPipelineState::copy
//! [`DynamicGraphicsState`]: crate::command_buffer::DynamicGraphicsState
//! [`DepthStencilState::optimize`]: crate::pipeline::graphics::depth_stencil::DepthStencilState::optimize

pub use crate::dynamic_state::{DynamicState, DynamicStates, StateGroups};
use std::{
    alloc::Layout,
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

#[macro_use]
mod tests;
mod chain;
pub mod command_buffer;
mod dynamic_state;
pub mod image;
mod macros;
pub mod pipeline;

/// The maximum number of viewports that can be tracked.
pub const MAX_VIEWPORTS: usize = 16;

/// The maximum number of scissors that can be tracked.
pub const MAX_SCISSORS: usize = 16;

/// The maximum number of discard rectangles that can be tracked.
pub const MAX_DISCARD_RECTANGLES: usize = 4;

/// The maximum number of vertex buffer bindings.
pub const MAX_VERTEX_BINDINGS: usize = 32;

/// The maximum number of vertex attributes.
pub const MAX_VERTEX_ATTRIBUTES: usize = 32;

/// The maximum stride of a vertex buffer binding, in bytes.
pub const MAX_VERTEX_BINDING_STRIDE: u32 = 2048;

/// The maximum number of color attachments in a subpass or rendering.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// The maximum number of rasterization samples.
pub const MAX_SAMPLES: u32 = 16;

/// The maximum number of custom sample locations, over the whole sample location grid.
pub const MAX_SAMPLE_LOCATIONS: usize = 64;

/// Error type returned when host memory for pipeline state could not be obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OomError {
    /// There is no memory available on the host (ie. the CPU, RAM, etc.).
    OutOfHostMemory,
}

impl Error for OomError {}

impl fmt::Display for OomError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                OomError::OutOfHostMemory => "no memory available on the host",
            }
        )
    }
}

impl From<OomError> for ash::vk::Result {
    #[inline]
    fn from(err: OomError) -> Self {
        match err {
            OomError::OutOfHostMemory => ash::vk::Result::ERROR_OUT_OF_HOST_MEMORY,
        }
    }
}

/// Host memory allocation capability, consulted whenever pipeline state needs storage that the
/// caller didn't provide.
///
/// This plays the role of `VkAllocationCallbacks`: an implementation may refuse any allocation,
/// in which case the operation that requested it fails with [`OomError`]. Every allocation that
/// succeeded is later given back with [`deallocate`](Self::deallocate), with the same layout and
/// scope. [`HostAllocation`] takes care of the pairing.
pub trait HostAllocator: Send + Sync {
    /// Requests an allocation of `layout` with the given lifetime `scope`.
    fn allocate(
        &self,
        layout: Layout,
        scope: ash::vk::SystemAllocationScope,
    ) -> Result<(), OomError>;

    /// Gives back an allocation of `layout` that was previously granted by
    /// [`allocate`](Self::allocate).
    fn deallocate(&self, layout: Layout, scope: ash::vk::SystemAllocationScope);
}

/// An allocation granted by a [`HostAllocator`], given back to it when dropped.
pub struct HostAllocation {
    allocator: Arc<dyn HostAllocator>,
    layout: Layout,
    scope: ash::vk::SystemAllocationScope,
}

impl HostAllocation {
    /// Requests an allocation of `layout` from `allocator`.
    #[inline]
    pub fn new(
        allocator: Arc<dyn HostAllocator>,
        layout: Layout,
        scope: ash::vk::SystemAllocationScope,
    ) -> Result<Self, OomError> {
        allocator.allocate(layout, scope)?;

        Ok(HostAllocation {
            allocator,
            layout,
            scope,
        })
    }

    /// Returns the layout of the allocation.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the scope of the allocation.
    #[inline]
    pub fn scope(&self) -> ash::vk::SystemAllocationScope {
        self.scope
    }
}

impl Drop for HostAllocation {
    #[inline]
    fn drop(&mut self) {
        self.allocator.deallocate(self.layout, self.scope);
    }
}

impl fmt::Debug for HostAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostAllocation")
            .field("layout", &self.layout)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// A [`HostAllocator`] that always succeeds and leaves the work to the global allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl HostAllocator for SystemAllocator {
    #[inline]
    fn allocate(
        &self,
        _layout: Layout,
        _scope: ash::vk::SystemAllocationScope,
    ) -> Result<(), OomError> {
        Ok(())
    }

    #[inline]
    fn deallocate(&self, _layout: Layout, _scope: ash::vk::SystemAllocationScope) {}
}

/// A [`HostAllocator`] that refuses allocations once a fixed budget of bytes is in use.
#[derive(Debug)]
pub struct LimitedAllocator {
    remaining: AtomicUsize,
}

impl LimitedAllocator {
    /// Creates an allocator that will hand out at most `budget` bytes at a time.
    #[inline]
    pub const fn new(budget: usize) -> Self {
        LimitedAllocator {
            remaining: AtomicUsize::new(budget),
        }
    }

    /// Returns the number of bytes that can still be allocated.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Relaxed)
    }
}

impl HostAllocator for LimitedAllocator {
    fn allocate(
        &self,
        layout: Layout,
        _scope: ash::vk::SystemAllocationScope,
    ) -> Result<(), OomError> {
        self.remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |remaining| {
                remaining.checked_sub(layout.size())
            })
            .map(|_| ())
            .map_err(|_| OomError::OutOfHostMemory)
    }

    #[inline]
    fn deallocate(&self, layout: Layout, _scope: ash::vk::SystemAllocationScope) {
        self.remaining.fetch_add(layout.size(), Ordering::Relaxed);
    }
}
