// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Configures how data from vertex buffers is read into vertex shader input locations.

use crate::{
    chain::{find_struct, slice_from_raw},
    macros::vulkan_enum,
    DynamicState, DynamicStates, MAX_VERTEX_ATTRIBUTES, MAX_VERTEX_BINDINGS,
    MAX_VERTEX_BINDING_STRIDE,
};
use ash::vk;

/// The state in a graphics pipeline describing how vertex buffers are laid out.
///
/// Bindings and attributes are indexed by binding number and location respectively. Only the
/// entries whose bit is set in `bindings_valid` or `attributes_valid` are meaningful.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexInputState {
    /// Bit mask of the binding numbers that are used.
    pub bindings_valid: u32,

    pub bindings: [VertexInputBinding; MAX_VERTEX_BINDINGS],

    /// Bit mask of the attribute locations that are used.
    pub attributes_valid: u32,

    pub attributes: [VertexInputAttribute; MAX_VERTEX_ATTRIBUTES],
}

impl Default for VertexInputState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl VertexInputState {
    /// Returns a `VertexInputState` with no bindings and no attributes.
    #[inline]
    pub const fn new() -> Self {
        Self {
            bindings_valid: 0,
            bindings: [VertexInputBinding::new(); MAX_VERTEX_BINDINGS],
            attributes_valid: 0,
            attributes: [VertexInputAttribute::new(); MAX_VERTEX_ATTRIBUTES],
        }
    }

    /// Builds the state from `info`.
    ///
    /// # Safety
    ///
    /// - `info` must be a valid `VkPipelineVertexInputStateCreateInfo`, including its `pNext`
    ///   chain.
    ///
    /// # Panics
    ///
    /// - Panics if a binding, attribute location or stride is out of range.
    pub unsafe fn from_vk(
        dynamic: DynamicStates,
        info: Option<&vk::PipelineVertexInputStateCreateInfo<'_>>,
    ) -> Self {
        let mut state = Self::new();

        let Some(info) = info else {
            return state;
        };

        assert!(info.vertex_binding_description_count as usize <= MAX_VERTEX_BINDINGS);
        assert!(info.vertex_attribute_description_count as usize <= MAX_VERTEX_ATTRIBUTES);

        let binding_descriptions = unsafe {
            slice_from_raw(
                info.p_vertex_binding_descriptions,
                info.vertex_binding_description_count,
            )
        };

        for desc in binding_descriptions {
            assert!((desc.binding as usize) < MAX_VERTEX_BINDINGS);
            assert!(desc.stride <= MAX_VERTEX_BINDING_STRIDE);

            let binding = &mut state.bindings[desc.binding as usize];
            state.bindings_valid |= 1 << desc.binding;

            if !dynamic.contains(DynamicState::ViBindingStrides) {
                binding.stride = desc.stride;
            }

            binding.input_rate = VertexInputRate::from_vk(desc.input_rate);
            binding.divisor = 1;
        }

        let attribute_descriptions = unsafe {
            slice_from_raw(
                info.p_vertex_attribute_descriptions,
                info.vertex_attribute_description_count,
            )
        };

        for desc in attribute_descriptions {
            assert!((desc.location as usize) < MAX_VERTEX_ATTRIBUTES);
            assert!((desc.binding as usize) < MAX_VERTEX_BINDINGS);

            state.attributes_valid |= 1 << desc.location;
            state.attributes[desc.location as usize] = VertexInputAttribute {
                binding: desc.binding,
                format: desc.format,
                offset: desc.offset,
            };
        }

        let divisor_info: Option<&vk::PipelineVertexInputDivisorStateCreateInfoEXT<'_>> =
            unsafe { find_struct(info.p_next) };

        if let Some(divisor_info) = divisor_info {
            let divisors = unsafe {
                slice_from_raw(
                    divisor_info.p_vertex_binding_divisors,
                    divisor_info.vertex_binding_divisor_count,
                )
            };

            for desc in divisors {
                assert!(
                    state.bindings_valid & (1 << desc.binding) != 0,
                    "vertex binding divisor given for unused binding {}",
                    desc.binding,
                );

                state.bindings[desc.binding as usize].divisor = desc.divisor;
            }
        }

        state
    }

    /// Returns the bindings that are used, along with their binding number.
    #[inline]
    pub fn valid_bindings(&self) -> impl Iterator<Item = (u32, &VertexInputBinding)> {
        let bindings_valid = self.bindings_valid;

        (0u32..)
            .zip(&self.bindings)
            .filter(move |&(binding, _)| bindings_valid & (1 << binding) != 0)
    }

    /// Returns the attributes that are used, along with their location.
    #[inline]
    pub fn valid_attributes(&self) -> impl Iterator<Item = (u32, &VertexInputAttribute)> {
        let attributes_valid = self.attributes_valid;

        (0u32..)
            .zip(&self.attributes)
            .filter(move |&(location, _)| attributes_valid & (1 << location) != 0)
    }
}

/// Describes a single vertex buffer binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexInputBinding {
    /// The number of bytes from the start of one element in the vertex buffer to the start of the
    /// next element.
    ///
    /// The default value is `0`.
    pub stride: u32,

    /// How often the vertex input should advance to the next element.
    ///
    /// The default value is [`VertexInputRate::Vertex`].
    pub input_rate: VertexInputRate,

    /// With an instance input rate, the number of instances that use the same element.
    ///
    /// The default value is `1`.
    pub divisor: u32,
}

impl Default for VertexInputBinding {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl VertexInputBinding {
    /// Returns a default `VertexInputBinding`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            stride: 0,
            input_rate: VertexInputRate::Vertex,
            divisor: 1,
        }
    }
}

/// Describes a single vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexInputAttribute {
    /// The vertex buffer binding that the attribute reads from.
    pub binding: u32,

    /// How the data in the vertex buffer is interpreted.
    pub format: vk::Format,

    /// The number of bytes between the start of an element and the start of this attribute.
    pub offset: u32,
}

impl Default for VertexInputAttribute {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl VertexInputAttribute {
    /// Returns a default `VertexInputAttribute`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            binding: 0,
            format: vk::Format::UNDEFINED,
            offset: 0,
        }
    }
}

vulkan_enum! {
    /// How the vertex source should be unrolled.
    VertexInputRate = VertexInputRate(i32);

    /// Each element of the source corresponds to a vertex.
    Vertex = VERTEX,

    /// Each element of the source corresponds to an instance.
    Instance = INSTANCE,
}

impl Default for VertexInputRate {
    #[inline]
    fn default() -> Self {
        VertexInputRate::Vertex
    }
}

#[cfg(test)]
mod tests {
    use super::{VertexInputRate, VertexInputState};
    use crate::{DynamicState, DynamicStates};
    use ash::vk;

    fn bindings() -> [vk::VertexInputBindingDescription; 2] {
        [
            vk::VertexInputBindingDescription {
                binding: 0,
                stride: 16,
                input_rate: vk::VertexInputRate::VERTEX,
            },
            vk::VertexInputBindingDescription {
                binding: 3,
                stride: 64,
                input_rate: vk::VertexInputRate::INSTANCE,
            },
        ]
    }

    fn attributes() -> [vk::VertexInputAttributeDescription; 2] {
        [
            vk::VertexInputAttributeDescription {
                location: 0,
                binding: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: 0,
            },
            vk::VertexInputAttributeDescription {
                location: 5,
                binding: 3,
                format: vk::Format::R8G8B8A8_UNORM,
                offset: 12,
            },
        ]
    }

    #[test]
    fn null_info() {
        let state = unsafe { VertexInputState::from_vk(DynamicStates::empty(), None) };
        assert_eq!(state, VertexInputState::new());
        assert_eq!(state.valid_bindings().count(), 0);
    }

    #[test]
    fn bindings_and_attributes() {
        let bindings = bindings();
        let attributes = attributes();
        let divisors = [vk::VertexInputBindingDivisorDescriptionEXT {
            binding: 3,
            divisor: 4,
        }];
        let mut divisor_info = vk::PipelineVertexInputDivisorStateCreateInfoEXT::default()
            .vertex_binding_divisors(&divisors);
        let info = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes)
            .push_next(&mut divisor_info);

        let state = unsafe { VertexInputState::from_vk(DynamicStates::empty(), Some(&info)) };

        assert_eq!(state.bindings_valid, 0b1001);
        assert_eq!(state.attributes_valid, 0b10_0001);
        assert_eq!(state.bindings[0].stride, 16);
        assert_eq!(state.bindings[0].divisor, 1);
        assert_eq!(state.bindings[3].stride, 64);
        assert_eq!(state.bindings[3].input_rate, VertexInputRate::Instance);
        assert_eq!(state.bindings[3].divisor, 4);
        assert_eq!(state.attributes[5].binding, 3);
        assert_eq!(state.attributes[5].format, vk::Format::R8G8B8A8_UNORM);
        assert_eq!(state.attributes[5].offset, 12);
        assert_eq!(
            state.valid_attributes().map(|(l, _)| l).collect::<Vec<_>>(),
            [0, 5],
        );
    }

    #[test]
    fn dynamic_strides_not_read() {
        let bindings = bindings();
        let info =
            vk::PipelineVertexInputStateCreateInfo::default().vertex_binding_descriptions(&bindings);
        let dynamic = DynamicStates::from(DynamicState::ViBindingStrides);

        let state = unsafe { VertexInputState::from_vk(dynamic, Some(&info)) };
        assert_eq!(state.bindings_valid, 0b1001);
        assert_eq!(state.bindings[3].stride, 0);
    }

    #[test]
    fn binding_out_of_range() {
        let bindings = [vk::VertexInputBindingDescription {
            binding: 32,
            stride: 4,
            input_rate: vk::VertexInputRate::VERTEX,
        }];
        let info =
            vk::PipelineVertexInputStateCreateInfo::default().vertex_binding_descriptions(&bindings);

        assert_should_panic!({
            unsafe { VertexInputState::from_vk(DynamicStates::empty(), Some(&info)) };
        });
    }
}
