#![no_std]

#[cfg(not(any(feature = "atmega1280", feature = "atmega2560", feature = "atmega328p")))]
compile_error!(
    "select a chip with exactly one of the features `atmega1280`, `atmega2560` or `atmega328p`"
);

#[cfg(any(
    all(feature = "atmega1280", feature = "atmega2560"),
    all(feature = "atmega1280", feature = "atmega328p"),
    all(feature = "atmega2560", feature = "atmega328p"),
))]
compile_error!(
    "only one chip feature may be enabled, build with `--no-default-features --features <chip>`"
);

pub mod clock;
pub mod led;
pub mod timer;
pub mod usart;

pub use atmega_hal as hal;
