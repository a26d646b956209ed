// Copyright (c) 2026 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

#![cfg(test)]

/// Runs `$code` and checks that it panics with a message containing `$msg`.
macro_rules! assert_should_panic {
    ($msg:expr, $code:block) => {{
        let res = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $code));

        match res {
            Ok(_) => panic!("Test expected to panic but didn't"),
            Err(err) => {
                if let Some(msg) = err.downcast_ref::<String>() {
                    assert!(msg.contains($msg), "unexpected panic message: {}", msg);
                } else if let Some(&msg) = err.downcast_ref::<&str>() {
                    assert!(msg.contains($msg), "unexpected panic message: {}", msg);
                } else {
                    panic!("Couldn't decode the panic message of the test")
                }
            }
        }
    }};

    ($code:block) => {{
        let res = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $code));

        if res.is_ok() {
            panic!("Test expected to panic but didn't");
        }
    }};
}

use crate::{HostAllocation, HostAllocator, LimitedAllocator, OomError, SystemAllocator};
use ash::vk;
use std::{alloc::Layout, sync::Arc};

#[test]
fn limited_allocator_budget() {
    let allocator = LimitedAllocator::new(16);
    let scope = vk::SystemAllocationScope::OBJECT;

    assert!(allocator.allocate(Layout::new::<[u8; 12]>(), scope).is_ok());
    assert_eq!(allocator.remaining(), 4);
    assert_eq!(
        allocator.allocate(Layout::new::<[u8; 8]>(), scope),
        Err(OomError::OutOfHostMemory),
    );
    assert_eq!(allocator.remaining(), 4);

    allocator.deallocate(Layout::new::<[u8; 12]>(), scope);
    assert_eq!(allocator.remaining(), 16);
    assert!(allocator.allocate(Layout::new::<[u8; 8]>(), scope).is_ok());
}

#[test]
fn host_allocation_given_back_on_drop() {
    let allocator = Arc::new(LimitedAllocator::new(64));
    let layout = Layout::new::<[u32; 8]>();
    let scope = vk::SystemAllocationScope::OBJECT;

    let first = HostAllocation::new(allocator.clone(), layout, scope).unwrap();
    let second = HostAllocation::new(allocator.clone(), layout, scope).unwrap();
    assert_eq!(first.layout(), layout);
    assert_eq!(second.scope(), scope);
    assert_eq!(allocator.remaining(), 0);
    assert_eq!(
        HostAllocation::new(allocator.clone(), layout, scope).unwrap_err(),
        OomError::OutOfHostMemory,
    );

    drop(first);
    assert_eq!(allocator.remaining(), 32);
    drop(second);
    assert_eq!(allocator.remaining(), 64);
}

#[test]
fn system_allocator_never_refuses() {
    let layout = Layout::new::<[u64; 1024]>();
    assert!(SystemAllocator
        .allocate(layout, vk::SystemAllocationScope::DEVICE)
        .is_ok());
}

#[test]
fn oom_error_to_vk() {
    assert_eq!(
        vk::Result::from(OomError::OutOfHostMemory),
        vk::Result::ERROR_OUT_OF_HOST_MEMORY,
    );
    assert_eq!(
        OomError::OutOfHostMemory.to_string(),
        "no memory available on the host",
    );
}
