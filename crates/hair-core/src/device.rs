//! Data-parallel compute device.
//!
//! A dispatch launches `groups` thread groups of `width` invocations each.
//! Groups run concurrently on the rayon pool when the `parallel` feature is
//! enabled and in order otherwise; nothing is ordered within a dispatch.
//! Invocations whose global id reaches the work count return without
//! touching any buffer.

use std::sync::atomic::{fence, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Hardware-reported dispatch limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Largest local group width a program may be linked with.
    pub max_group_width: u32,
    /// Largest number of groups in a single dispatch.
    pub max_group_count: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_group_width: 1024,
            max_group_count: 65_535,
        }
    }
}

pub struct ComputeDevice {
    limits: DeviceLimits,
    dispatches: u64,
    barriers: u64,
}

impl Default for ComputeDevice {
    fn default() -> Self {
        Self::new(DeviceLimits::default())
    }
}

impl ComputeDevice {
    pub fn new(limits: DeviceLimits) -> Self {
        Self {
            limits,
            dispatches: 0,
            barriers: 0,
        }
    }

    pub fn limits(&self) -> DeviceLimits {
        self.limits
    }

    /// Launch a dispatch whose invocations only read shared state, or write
    /// through atomics. `kernel` receives the global invocation id.
    pub fn dispatch<K>(&mut self, groups: u32, width: u32, work_count: u32, kernel: K)
    where
        K: Fn(u32) + Sync + Send,
    {
        let run = |group: u32| {
            let base = group as u64 * width as u64;
            for local in 0..width as u64 {
                let gid = base + local;
                if gid >= work_count as u64 {
                    break;
                }
                kernel(gid as u32);
            }
        };

        #[cfg(feature = "parallel")]
        (0..groups).into_par_iter().for_each(run);

        #[cfg(not(feature = "parallel"))]
        (0..groups).for_each(run);

        self.dispatches += 1;
    }

    /// Launch a dispatch where invocation `gid` owns elements
    /// `gid * stride .. (gid + 1) * stride` of both buffers.
    ///
    /// The buffers are split into disjoint per-group chunks, so no
    /// invocation can reach another's elements. The covered range is the
    /// smaller of `groups * width` invocations, `work_count`, and what the
    /// buffers hold; nothing past the end of either buffer is ever touched.
    pub fn dispatch_chunked<T, K>(
        &mut self,
        groups: u32,
        width: u32,
        work_count: u32,
        stride: usize,
        a: &mut [T],
        b: &mut [T],
        kernel: K,
    ) where
        T: Send,
        K: Fn(u32, &mut [T], &mut [T]) + Sync + Send,
    {
        self.dispatches += 1;
        if width == 0 || stride == 0 {
            return;
        }

        let width = width as usize;
        let launched = groups as usize * width;
        let active = (work_count as usize)
            .min(launched)
            .min(a.len() / stride)
            .min(b.len() / stride);
        let limit = active * stride;
        let chunk = width * stride;

        let run = |(group, (ca, cb)): (usize, (&mut [T], &mut [T]))| {
            for local in 0..ca.len() / stride {
                let gid = group * width + local;
                let range = local * stride..(local + 1) * stride;
                kernel(gid as u32, &mut ca[range.clone()], &mut cb[range]);
            }
        };

        #[cfg(feature = "parallel")]
        a[..limit]
            .par_chunks_mut(chunk)
            .zip(b[..limit].par_chunks_mut(chunk))
            .enumerate()
            .for_each(run);

        #[cfg(not(feature = "parallel"))]
        a[..limit]
            .chunks_mut(chunk)
            .zip(b[..limit].chunks_mut(chunk))
            .enumerate()
            .for_each(run);
    }

    /// Full memory barrier: every write of the previous dispatch is visible
    /// to the next.
    pub fn barrier(&mut self) {
        fence(Ordering::SeqCst);
        self.barriers += 1;
    }

    pub fn dispatch_count(&self) -> u64 {
        self.dispatches
    }

    pub fn barrier_count(&self) -> u64 {
        self.barriers
    }
}
