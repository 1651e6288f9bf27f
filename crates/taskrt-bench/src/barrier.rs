//! Compiler barriers for benchmark bodies
//!
//! Neither helper emits an instruction. They only constrain what the
//! optimiser may assume.

cfg_if::cfg_if! {
    if #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))] {
        use std::arch::asm;

        /// Make the compiler treat `value` as read by an opaque observer
        ///
        /// The value (and anything reachable through it) must be fully
        /// materialised in memory at this point, so the computation that
        /// produced it cannot be elided.
        #[inline(always)]
        pub fn do_not_optimize<T: ?Sized>(value: &T) {
            // SAFETY: empty template; the asm block may read through the
            // pointer but writes nothing and touches no stack
            unsafe {
                asm!(
                    "/* {0} */",
                    in(reg) value as *const T as *const u8,
                    options(nostack, preserves_flags)
                );
            }
        }

        /// Full compiler memory fence
        ///
        /// Pending stores must be emitted before, and loads reissued after.
        #[inline(always)]
        pub fn clobber_memory() {
            // SAFETY: empty template; without `nomem` the compiler assumes
            // arbitrary memory access
            unsafe { asm!("", options(nostack, preserves_flags)) };
        }
    } else {
        use std::sync::atomic::{compiler_fence, Ordering};

        #[inline(always)]
        pub fn do_not_optimize<T: ?Sized>(value: &T) {
            std::hint::black_box(value);
        }

        #[inline(always)]
        pub fn clobber_memory() {
            compiler_fence(Ordering::SeqCst);
        }
    }
}
