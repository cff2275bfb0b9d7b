#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

#[cfg(target_arch = "avr")]
use core::arch::asm;

use cfg_if::cfg_if;
pub use nano_fmt_macro::{write, P};

/// Writer trait for resource constrained systems.
pub trait NanoWrite {
    /// Write a byte to the writer.
    fn write_byte(&mut self, b: u8);
}

/// Display trait for resource constrained systems.
pub trait NanoDisplay {
    /// Write formatted representation of `self` to `f`.
    fn fmt<F: NanoWrite>(self, f: &mut F);
}

/// Implement NanoDisplay for an unsigned type.
macro_rules! display_unsigned {
    ($ty:ident) => {
        impl $crate::NanoDisplay for $ty {
            fn fmt<F: $crate::NanoWrite>(mut self, f: &mut F) {
                const MAX_POW10: $ty = <$ty>::pow(10, $ty::MAX.ilog10() as u32);

                let mut div = MAX_POW10;
                let mut print = false;

                while div > 0 {
                    let dig = (self / div) as u8;
                    self %= div;
                    div /= 10;

                    if !print && dig > 0 {
                        print = true;
                    }

                    if print || (div == 0) {
                        f.write_byte(b'0' + dig);
                    }
                }
            }
        }
    };
}

display_unsigned!(u8);
display_unsigned!(u16);
display_unsigned!(u32);
display_unsigned!(usize);

/// Zero padded hexadecimal with a `0x` prefix, as produced by `{:x}`.
#[derive(Clone, Copy)]
pub struct Hex<T>(pub T);

/// All bits with a `0b` prefix, as produced by `{:b}`.
#[derive(Clone, Copy)]
pub struct Bin<T>(pub T);

fn hex_digit(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        _ => b'a' + nibble - 10,
    }
}

macro_rules! display_radix {
    ($ty:ident) => {
        impl $crate::NanoDisplay for Hex<$ty> {
            fn fmt<F: $crate::NanoWrite>(self, f: &mut F) {
                f.write_byte(b'0');
                f.write_byte(b'x');
                let mut shift = $ty::BITS;
                while shift > 0 {
                    shift -= 4;
                    f.write_byte(hex_digit(((self.0 >> shift) & 0xF) as u8));
                }
            }
        }

        impl $crate::NanoDisplay for Bin<$ty> {
            fn fmt<F: $crate::NanoWrite>(self, f: &mut F) {
                f.write_byte(b'0');
                f.write_byte(b'b');
                let mut shift = $ty::BITS;
                while shift > 0 {
                    shift -= 1;
                    f.write_byte(b'0' + ((self.0 >> shift) & 1) as u8);
                }
            }
        }
    };
}

display_radix!(u8);
display_radix!(u16);

/// C-style string stored in program memory.
/// It is only suitable for formatted output.
#[derive(Clone, Copy)]
pub struct PStr(*const u8);

impl PStr {
    /// # Safety
    ///
    /// `ptr` must point to a NUL terminated string placed in program memory
    /// (or in RAM when not building for AVR).
    pub unsafe fn new(ptr: *const u8) -> Self {
        Self(ptr)
    }
}

impl NanoDisplay for PStr {
    fn fmt<F: NanoWrite>(self, f: &mut F) {
        let mut p = self.0;

        loop {
            let b: u8;

            unsafe {
                cfg_if! {
                    if #[cfg(target_arch = "avr")] {
                        asm! {
                            "lpm {b}, Z+",
                            b = out(reg) b,
                            inout("Z") p,
                            options(pure, nomem, preserves_flags, nostack),
                        };
                    } else {
                        b = *p;
                        p = p.add(1);
                    }
                }
            }

            if b == 0 {
                break;
            }

            f.write_byte(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Buf {
        data: [u8; 32],
        len: usize,
    }

    impl Buf {
        fn new() -> Self {
            Self {
                data: [0; 32],
                len: 0,
            }
        }

        fn as_str(&self) -> &str {
            core::str::from_utf8(&self.data[..self.len]).unwrap()
        }
    }

    impl NanoWrite for Buf {
        fn write_byte(&mut self, b: u8) {
            self.data[self.len] = b;
            self.len += 1;
        }
    }

    fn render(value: impl NanoDisplay) -> Buf {
        let mut buf = Buf::new();
        value.fmt(&mut buf);
        buf
    }

    #[test]
    fn decimal() {
        assert_eq!(render(0u8).as_str(), "0");
        assert_eq!(render(62_500u32).as_str(), "62500");
        assert_eq!(render(u16::MAX).as_str(), "65535");
        assert_eq!(render(100u32).as_str(), "100");
    }

    #[test]
    fn hex() {
        assert_eq!(render(Hex(0x02u8)).as_str(), "0x02");
        assert_eq!(render(Hex(0xC4u8)).as_str(), "0xc4");
        assert_eq!(render(Hex(0x0Cu16)).as_str(), "0x000c");
        assert_eq!(render(Hex(0xF424u16)).as_str(), "0xf424");
    }

    #[test]
    fn binary() {
        assert_eq!(render(Bin(0x02u8)).as_str(), "0b00000010");
        assert_eq!(render(Bin(0x81u8)).as_str(), "0b10000001");
        assert_eq!(render(Bin(0x0100u16)).as_str(), "0b0000000100000000");
    }

    #[test]
    fn ram_string() {
        static TEXT: [u8; 6] = *b"timer\0";
        let s = unsafe { PStr::new(TEXT.as_ptr()) };
        assert_eq!(render(s).as_str(), "timer");
    }
}
